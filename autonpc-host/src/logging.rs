//! Tracing subscriber setup for servers embedding autonomous creatures.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use autonpc_core::config::GeneralConfig;

use crate::error::HostError;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Filter directive for `general`: `RUST_LOG` wins, otherwise the configured
/// level applies to the autonpc crates and `warn` to everything else.
#[must_use]
pub fn filter_for(general: &GeneralConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if general.debug_logging { "debug" } else { general.log_level.as_str() };
        EnvFilter::new(format!("warn,autonpc_core={level},autonpc_host={level}"))
    })
}

/// Install the global subscriber.
///
/// # Errors
///
/// [`HostError::Logging`] if a global subscriber is already set.
pub fn init_logging(general: &GeneralConfig, format: LogFormat) -> Result<(), HostError> {
    let registry = tracing_subscriber::registry().with(filter_for(general));
    let result = match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).try_init(),
    };
    result.map_err(|e| HostError::Logging(e.to_string()))
}
