use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub engine: EngineConfig,
    pub cleaner: CleanerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct EngineConfig {
    /// Base directory for managed tables when a caller passes a bare table name.
    pub data_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CleanerConfig {
    /// Retention policy name: KEEP_LATEST_COMMITS, KEEP_LATEST_FILE_VERSIONS
    /// or KEEP_LATEST_BY_HOURS.
    pub policy: String,
    pub commits_retained: Option<usize>,
    pub file_versions_retained: Option<usize>,
    pub hours_retained: Option<u64>,
    /// Upper bound on concurrent file deletions during execution.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

fn default_max_concurrency() -> usize {
    8
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub log_dir: String,
    pub stdout_level: String,
    pub file_level: String,
}

use std::env;

pub fn load_settings() -> Result<Settings, config::ConfigError> {
    let config_path = env::var("STRATADB_CONFIG").unwrap_or_else(|_| "config".to_string());

    let settings: Settings = config::Config::builder()
        .add_source(config::File::with_name(&config_path))
        .build()?
        .try_deserialize()?;

    Ok(settings)
}
