//! Tracing setup for hosts that do not install their own subscriber.

use tracing_subscriber::EnvFilter;

use crate::config::NewsConfig;

/// Default filter directive for a config: `news_cycle=debug` when debug
/// logging is on, `news_cycle=info` otherwise.
pub fn default_directive(config: &NewsConfig) -> &'static str {
    if config.debug_logging {
        "news_cycle=debug"
    } else {
        "news_cycle=info"
    }
}

/// Install a fmt subscriber filtered by `RUST_LOG`, falling back to the
/// config's level. Returns `false` if a global subscriber already exists.
pub fn init_tracing(config: &NewsConfig) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(config)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
