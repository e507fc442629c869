use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for docflow
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DocflowConfig {
    /// Document store settings
    pub store: StoreConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
    /// Session handling
    pub session: SessionConfig,
    /// Reporting aggregator settings
    pub reports: ReportsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Maximum attempts for version-conflicted document writes
    pub write_retry_attempts: u32,
    /// Base backoff delay between conflicted writes, in milliseconds
    pub write_retry_base_delay_ms: u64,
    /// Backoff cap in milliseconds
    pub write_retry_max_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Enable structured tracing output
    pub tracing_enabled: bool,
    /// Log level
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Minutes of inactivity before a session is signed out
    pub idle_timeout_minutes: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportsConfig {
    /// Months covered by the throughput series
    pub trailing_months: u32,
    /// Window for the "completed recently" headline count, in days
    pub completed_window_days: i64,
}

impl Default for DocflowConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig {
                write_retry_attempts: 3,
                write_retry_base_delay_ms: 50,
                write_retry_max_delay_ms: 2000,
            },
            observability: ObservabilityConfig {
                tracing_enabled: true,
                log_level: "info".to_string(),
            },
            session: SessionConfig {
                idle_timeout_minutes: 15,
            },
            reports: ReportsConfig {
                trailing_months: 6,
                completed_window_days: 30,
            },
        }
    }
}

impl DocflowConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (docflow.toml, .docflow-rc)
    /// 3. Environment variables (prefixed with DOCFLOW_)
    pub fn load() -> Result<Self> {
        let defaults = Config::try_from(&DocflowConfig::default())?;
        let mut builder = Config::builder().add_source(defaults);

        if Path::new("docflow.toml").exists() {
            builder = builder.add_source(File::with_name("docflow"));
        }

        if Path::new(".docflow-rc").exists() {
            builder = builder.add_source(File::with_name(".docflow-rc"));
        }

        builder = builder.add_source(
            Environment::with_prefix("DOCFLOW")
                .separator("_")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }

    pub fn retry_config(&self) -> crate::store::RetryConfig {
        crate::store::RetryConfig {
            max_attempts: self.store.write_retry_attempts,
            base_delay: std::time::Duration::from_millis(self.store.write_retry_base_delay_ms),
            max_delay: std::time::Duration::from_millis(self.store.write_retry_max_delay_ms),
        }
    }

    pub fn report_options(&self) -> crate::reports::ReportOptions {
        crate::reports::ReportOptions {
            trailing_months: self.reports.trailing_months,
            completed_window_days: self.reports.completed_window_days,
            now: chrono::Utc::now(),
        }
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<DocflowConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        // Load .env file first
        let _ = DocflowConfig::load_env_file();
        DocflowConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static DocflowConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

/// Initialize configuration (called at startup)
pub fn init_config() -> Result<()> {
    let _config = config()?;
    tracing::info!("Configuration loaded successfully");
    Ok(())
}
