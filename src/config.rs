use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};

/// Application configuration loaded from config.toml, if present.
///
/// The dump itself takes all its real parameters from CLI flags (spec.md
/// §6); this only covers the one knob the driver has discretion over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub processing: ProcessingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Emit a progress log line every N UTXO records scanned.
    pub progress_interval_records: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            progress_interval_records: 500_000,
        }
    }
}

impl AppConfig {
    /// Load configuration from config.toml if it exists, falling back to
    /// defaults otherwise. Absence of the file is not an error.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = ProcessingConfig::default();
        let config = Config::builder()
            .set_default(
                "processing.progress_interval_records",
                defaults.progress_interval_records as i64,
            )?
            .add_source(File::with_name("config").required(false))
            .build()?;

        config.try_deserialize()
    }
}
