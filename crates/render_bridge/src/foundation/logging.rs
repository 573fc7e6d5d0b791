//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

use crate::core::config::LoggingConfig;

/// Initialize the logging system from `RUST_LOG`
pub fn init() {
    env_logger::init();
}

/// Initialize the logging system with the configured default filter
///
/// `RUST_LOG` still wins when it is set. Calling this more than once is harmless;
/// later calls keep the logger that is already installed.
pub fn init_with_config(config: &LoggingConfig) {
    let env = env_logger::Env::default().default_filter_or(config.level.as_str());
    if let Err(err) = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .is_test(config.test_mode)
        .try_init()
    {
        debug!("Logger already installed, keeping it: {err}");
    }
}
