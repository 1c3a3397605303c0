//! Observability features: structured logging and resolution metrics

use metrics::{counter, histogram};
use once_cell::sync::OnceCell;
use std::time::{Duration, Instant};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LoggingConfig, ObservabilityConfig};

/// Global observability system
static OBSERVABILITY: OnceCell<ObservabilitySystem> = OnceCell::new();

/// Observability system for centralized logging and metrics
#[derive(Debug)]
pub struct ObservabilitySystem {
    metrics_enabled: bool,
}

impl ObservabilitySystem {
    /// Initialize the observability system
    pub fn init(config: &ObservabilityConfig) -> anyhow::Result<()> {
        if OBSERVABILITY.get().is_some() {
            anyhow::bail!("Observability system already initialized");
        }

        Self::init_logging(&config.logging)?;

        OBSERVABILITY
            .set(Self {
                metrics_enabled: config.metrics.enabled,
            })
            .map_err(|_| anyhow::anyhow!("Observability system already initialized"))?;

        info!(metrics = config.metrics.enabled, "Observability system initialized");
        Ok(())
    }

    /// Initialize structured logging
    fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
        let env_filter = EnvFilter::builder()
            .with_default_directive(parse_level(&config.level).into())
            .from_env_lossy();

        let registry = tracing_subscriber::registry().with(env_filter);

        // Logs go to stderr so stdout stays clean for command output.
        match config.format.to_lowercase().as_str() {
            "json" => {
                let json_layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr);
                registry.with(json_layer).try_init()?;
            }
            _ => {
                let pretty_layer = tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr);
                registry.with(pretty_layer).try_init()?;
            }
        }

        Ok(())
    }

    /// Get the global observability system
    pub fn get() -> Option<&'static ObservabilitySystem> {
        OBSERVABILITY.get()
    }

    pub fn metrics_enabled(&self) -> bool {
        self.metrics_enabled
    }
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Mapping resolution metrics. Recording is skipped unless the global
/// observability system was initialized with metrics enabled.
pub struct ResolutionMetrics;

impl ResolutionMetrics {
    fn enabled() -> bool {
        ObservabilitySystem::get().is_some_and(ObservabilitySystem::metrics_enabled)
    }

    /// Record a successful resolution and how many options it produced
    pub fn resolution_completed(query_kind: &'static str, options: usize) {
        if !Self::enabled() {
            return;
        }
        counter!("paramap_resolutions_total", "query_kind" => query_kind).increment(1);
        counter!("paramap_mapping_options_total", "query_kind" => query_kind)
            .increment(options as u64);
    }

    /// Record a failed resolution
    pub fn resolution_failed(query_kind: &'static str, error_kind: &'static str) {
        if !Self::enabled() {
            return;
        }
        counter!("paramap_resolution_failures_total",
                "query_kind" => query_kind,
                "error_kind" => error_kind)
            .increment(1);
    }

    /// Record resolution duration
    pub fn resolution_duration(duration: Duration, query_kind: &'static str) {
        if !Self::enabled() {
            return;
        }
        histogram!("paramap_resolution_duration_seconds", "query_kind" => query_kind)
            .record(duration.as_secs_f64());
    }
}

/// Measures one resolution and records it when dropped
pub struct ResolutionTimer {
    start: Instant,
    query_kind: &'static str,
}

impl ResolutionTimer {
    pub fn start(query_kind: &'static str) -> Self {
        Self {
            start: Instant::now(),
            query_kind,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for ResolutionTimer {
    fn drop(&mut self) {
        if !std::thread::panicking() {
            ResolutionMetrics::resolution_duration(self.start.elapsed(), self.query_kind);
        }
    }
}
