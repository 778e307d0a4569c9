//! Logging utilities
//!
//! The kernel reports recoverable problems (singular matrices, NaN bounds,
//! inconsistent attribute counts) through the `log` facade. Applications pick
//! the backend; these helpers install `env_logger`.

pub use log::{debug, error, info, trace, warn};

/// Initialize logging from the `RUST_LOG` environment variable
pub fn init() {
    env_logger::init();
}

/// Initialize logging with a default filter, still overridable by `RUST_LOG`
pub fn init_with_level(level: log::LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Initialize logging for tests; safe to call more than once
pub fn init_for_tests() {
    let _ = env_logger::builder().is_test(true).try_init();
}
