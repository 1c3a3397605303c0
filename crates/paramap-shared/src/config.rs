//! Configuration management for paramap

use config::{Config, ConfigError, Environment, File, FileFormat};
use paramap_core::ResolverOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for paramap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamapConfig {
    /// Observability configuration
    pub observability: ObservabilityConfig,

    /// Mapping resolution configuration
    pub resolver: ResolverConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Metrics configuration
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json or pretty)
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Record resolution counters
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Deepest chain of nested source queries accepted
    pub max_source_depth: usize,

    /// Offer fields reached through the source table's foreign keys
    pub include_implicit_joins: bool,
}

impl Default for ParamapConfig {
    fn default() -> Self {
        let resolver = ResolverOptions::default();
        Self {
            observability: ObservabilityConfig {
                logging: LoggingConfig {
                    level: "info".to_string(),
                    format: "pretty".to_string(),
                },
                metrics: MetricsConfig { enabled: false },
            },
            resolver: ResolverConfig {
                max_source_depth: resolver.max_source_depth,
                include_implicit_joins: resolver.include_implicit_joins,
            },
        }
    }
}

impl From<&ResolverConfig> for ResolverOptions {
    fn from(config: &ResolverConfig) -> Self {
        ResolverOptions {
            max_source_depth: config.max_source_depth,
            include_implicit_joins: config.include_implicit_joins,
        }
    }
}

impl ParamapConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("paramap.toml")
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&ParamapConfig::default())?);

        if path.as_ref().exists() {
            builder = builder.add_source(File::from(path.as_ref()));
        }

        builder
            .add_source(Environment::with_prefix("PARAMAP").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Load configuration from environment variables only
    pub fn load_from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Config::try_from(&ParamapConfig::default())?)
            .add_source(Environment::with_prefix("PARAMAP").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Load configuration from TOML text layered over the defaults
    pub fn load_from_str(toml: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Config::try_from(&ParamapConfig::default())?)
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions::from(&self.resolver)
    }
}
