//! Observability subsystem for shopgraph
//!
//! Logging goes through `tracing`: every event uses an upper-case event name
//! as its message plus structured fields, e.g.
//!
//! ```ignore
//! tracing::info!(kind = %EntityKind::Product, id = %id, "ENTITY_CREATED");
//! ```
//!
//! Counters live in [`MetricsRegistry`], shared by `Arc` between the store,
//! the executor, the mutation pipeline and the notifier.

mod metrics;

pub use metrics::{MetricsRegistry, MetricsSnapshot};

use tracing_subscriber::EnvFilter;

/// Log line format for the binary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Install the global tracing subscriber.
///
/// Logs go to stderr so stdout stays reserved for responses. `RUST_LOG`
/// overrides the default `shopgraph=info` filter. Calling this twice is
/// harmless; the second install is ignored.
pub fn init_tracing(format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("shopgraph=info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
