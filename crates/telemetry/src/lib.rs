//! Tracing subscriber setup shared by the sharenote binaries.

use sharenote_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` wins over `telemetry.level`.
///
/// Logs go to stderr so command output on stdout stays pipeable. Calling this
/// twice is harmless; the second call keeps the first subscriber.
pub fn init(settings: &TelemetrySettings) {
    let filter = build_filter(settings);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match settings.log_format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    if installed.is_ok() {
        tracing::debug!(
            target: "sharenote-telemetry",
            format = ?settings.log_format,
            "telemetry initialized"
        );
    }
}

fn build_filter(settings: &TelemetrySettings) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
