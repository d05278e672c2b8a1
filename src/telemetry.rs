//! Telemetry helpers for dashboards embedding `linked-charts`.
//!
//! Filter toggles, throttle coalescing and gesture guard rejections are
//! reported through `tracing` at `trace` level; render and focus changes at
//! `debug`. Hosts can call `init_default_tracing` or install their own
//! subscriber.

/// Installs a compact `tracing` subscriber honoring `RUST_LOG`.
///
/// Returns `false` when the `telemetry` feature is disabled or when the host
/// application already installed a global subscriber.
#[must_use]
pub fn init_default_tracing() -> bool {
    #[cfg(feature = "telemetry")]
    {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_target(true)
            .compact();

        return builder.try_init().is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        false
    }
}
