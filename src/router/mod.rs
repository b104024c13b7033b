//! Router Module
//!
//! Client pool, selection strategy and the retrying dispatcher.

pub mod dispatcher;
pub mod key_pool;
pub mod retry;
pub mod strategy;

pub use dispatcher::{Dispatcher, ExecuteOptions, DEFAULT_MAX_RETRIES};
pub use key_pool::{
    parse_credentials, ClientPool, ClientStats, Credential, PoolClient, PoolStats,
};
pub use retry::RoundBackoff;
pub use strategy::{
    normalize_preferred_index, parse_preferred_key, resolve_order, RotationCursor,
    PREFERRED_KEY_HEADER,
};
