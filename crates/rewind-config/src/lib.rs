//! # Rewind Config
//!
//! TOML configuration for the recording and replay engine: debounce
//! windows, mutation thresholds, the tunable selector-scoring table, the
//! sensitive-field deny-list, session limits and executor budgets.
//!
//! The scoring table and the various empirically chosen windows are
//! configuration, not structural rules; everything here has a sane default
//! and can be overridden per deployment.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{
    CaptureConfig, ExecutorConfig, MutationConfig, PrivacyConfig, RewindConfig, SelectorConfig,
    SessionLimits,
};
pub use validator::ConfigValidator;
