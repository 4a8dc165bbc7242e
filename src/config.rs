use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::latency::{LatencySource, NoLatency, RandomLatency};
use crate::observability::{ObservationSink, TracingObservationSink};
use crate::storage::StorageConfig;

const ENV_PREFIX: &str = "CUSTOMER_API";

/// Top-level application configuration loaded from file + environment.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageSection,
    pub latency: LatencySection,
    pub observability: ObservabilitySection,
    pub logging: LoggingSection,
}

impl AppConfig {
    /// Load configuration from disk and environment.
    ///
    /// Environment keys look like `CUSTOMER_API_SERVER__PORT=9000`.
    pub fn load() -> Result<Self> {
        let config_path =
            env::var("CUSTOMER_API_CONFIG").unwrap_or_else(|_| "config.toml".to_string());

        let mut builder = config::Config::builder();

        if Path::new(&config_path).exists() {
            builder = builder.add_source(config::File::from(PathBuf::from(&config_path)));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder.build()?;
        let mut config: Self = settings.try_deserialize()?;

        if config.logging.level.trim().is_empty() {
            config.logging.level = "info".to_string();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.storage_runtime()?;
        self.latency.validate()?;
        Ok(())
    }

    /// Resolve the storage backend configuration.
    pub fn storage_runtime(&self) -> Result<StorageConfig> {
        self.storage.to_runtime()
    }

    /// Latency source for the customer service.
    pub fn latency_source(&self) -> Result<Arc<dyn LatencySource>> {
        self.latency.validate()?;

        if !self.latency.enabled {
            return Ok(Arc::new(NoLatency));
        }

        Ok(Arc::new(RandomLatency::new(
            Duration::from_millis(self.latency.max_ms),
            Duration::from_millis(self.latency.high_threshold_ms),
        )))
    }

    /// Observation sink, if observations are enabled.
    pub fn observation_sink(&self) -> Option<Arc<dyn ObservationSink>> {
        if self.observability.enabled {
            Some(Arc::new(TracingObservationSink))
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    pub backend: StorageBackendKind,
    pub local: Option<LocalStorageSection>,
    pub s3: Option<S3StorageSection>,
}

impl StorageSection {
    pub fn to_runtime(&self) -> Result<StorageConfig> {
        match self.backend {
            StorageBackendKind::Memory => Ok(StorageConfig::Memory),
            StorageBackendKind::Local => {
                let local = self.local.clone().unwrap_or_default();

                if local.root_path.trim().is_empty() {
                    bail!("storage.local.root_path must not be empty");
                }

                Ok(StorageConfig::Local {
                    root_path: local.root_path,
                })
            }
            StorageBackendKind::S3 => {
                let s3 = self
                    .s3
                    .clone()
                    .context("storage.s3 configuration required when backend is 's3'")?;

                if s3.bucket.trim().is_empty() {
                    bail!("storage.s3.bucket must be specified");
                }
                if s3.region.trim().is_empty() {
                    bail!("storage.s3.region must be specified");
                }

                Ok(StorageConfig::S3 {
                    bucket: s3.bucket,
                    region: s3.region,
                    endpoint: s3.endpoint.filter(|e| !e.trim().is_empty()),
                })
            }
        }
    }
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            backend: StorageBackendKind::Local,
            local: Some(LocalStorageSection::default()),
            s3: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendKind {
    Memory,
    #[default]
    Local,
    S3,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LocalStorageSection {
    pub root_path: String,
}

impl Default for LocalStorageSection {
    fn default() -> Self {
        Self {
            root_path: "./data".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct S3StorageSection {
    pub bucket: String,
    pub region: String,
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LatencySection {
    pub enabled: bool,
    /// Exclusive upper bound of the random delay
    pub max_ms: u64,
    pub high_threshold_ms: u64,
}

impl LatencySection {
    fn validate(&self) -> Result<()> {
        if self.enabled && self.max_ms == 0 {
            bail!("latency.max_ms must be greater than zero when latency is enabled");
        }
        Ok(())
    }
}

impl Default for LatencySection {
    fn default() -> Self {
        Self {
            enabled: true,
            max_ms: 500,
            high_threshold_ms: 250,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilitySection {
    pub enabled: bool,
}

impl Default for ObservabilitySection {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}
