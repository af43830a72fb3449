use crate::error::{NightlightError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Upper bound accepted for `manifest_max_retries`
pub const MAX_MANIFEST_RETRIES: u32 = 100;

/// Layered configuration for the sync tooling
///
/// Defaults name the buckets, queue and documents of the production deployment;
/// `data_root` is where the filesystem adapters keep them.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub data_root: ConfigValue<PathBuf>,
    pub raw_bucket: ConfigValue<String>,
    pub processed_bucket: ConfigValue<String>,
    pub source_url_key: ConfigValue<String>,
    pub create_queue: ConfigValue<String>,
    pub write_dir: ConfigValue<PathBuf>,
    pub manifest_key: ConfigValue<String>,
    pub secrets_key: ConfigValue<String>,
    pub catalog_path: ConfigValue<PathBuf>,
    pub manifest_max_retries: ConfigValue<u32>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        let default = |s: &str| ConfigValue::new(s.to_string(), ConfigSource::Default);

        Self {
            data_root: ConfigValue::new(PathBuf::from("nightlight-data"), ConfigSource::Default),
            raw_bucket: default("conflict-nightlight-raw-tif"),
            processed_bucket: default("conflict-nightlight-processed-tif"),
            source_url_key: default("source-url"),
            create_queue: default("conflict-nightlight-download-and-crop-raw-tif-request"),
            write_dir: ConfigValue::new(env::temp_dir(), ConfigSource::Default),
            manifest_key: default("conflict-nightlight-map-options.json"),
            secrets_key: default("conflict-nightlight-secrets"),
            catalog_path: ConfigValue::new(PathBuf::from("catalog.json"), ConfigSource::Default),
            manifest_max_retries: ConfigValue::new(5, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| NightlightError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| NightlightError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        let source = ConfigSource::File;

        if let Some(data_root) = file_config.data_root {
            self.data_root.update(data_root, source);
        }
        if let Some(raw_bucket) = file_config.raw_bucket {
            self.raw_bucket.update(raw_bucket, source);
        }
        if let Some(processed_bucket) = file_config.processed_bucket {
            self.processed_bucket.update(processed_bucket, source);
        }
        if let Some(source_url_key) = file_config.source_url_key {
            self.source_url_key.update(source_url_key, source);
        }
        if let Some(create_queue) = file_config.create_queue {
            self.create_queue.update(create_queue, source);
        }
        if let Some(write_dir) = file_config.write_dir {
            self.write_dir.update(write_dir, source);
        }
        if let Some(manifest_key) = file_config.manifest_key {
            self.manifest_key.update(manifest_key, source);
        }
        if let Some(secrets_key) = file_config.secrets_key {
            self.secrets_key.update(secrets_key, source);
        }
        if let Some(catalog_path) = file_config.catalog_path {
            self.catalog_path.update(catalog_path, source);
        }
        if let Some(retries) = file_config.manifest_max_retries {
            validate_manifest_retries(retries)?;
            self.manifest_max_retries.update(retries, source);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        let source = ConfigSource::Environment;

        if let Ok(data_root) = env::var("NIGHTLIGHT_DATA_ROOT") {
            self.data_root.update(PathBuf::from(data_root), source);
        }
        if let Ok(raw_bucket) = env::var("RAW_TIF_BUCKET") {
            self.raw_bucket.update(raw_bucket, source);
        }
        if let Ok(processed_bucket) = env::var("PROCESSED_TIF_BUCKET_NAME") {
            self.processed_bucket.update(processed_bucket, source);
        }
        if let Ok(source_url_key) = env::var("SOURCE_URL_KEY") {
            self.source_url_key.update(source_url_key, source);
        }
        if let Ok(create_queue) = env::var("DOWNLOAD_RAW_TIF_QUEUE") {
            self.create_queue.update(create_queue, source);
        }
        if let Ok(write_dir) = env::var("WRITE_DIR") {
            self.write_dir.update(PathBuf::from(write_dir), source);
        }
        if let Ok(manifest_key) = env::var("FRONTEND_MAP_OPTIONS_JSON") {
            self.manifest_key.update(manifest_key, source);
        }
        if let Ok(secrets_key) = env::var("CONFLICT_NIGHTLIGHT_SECRETS_KEY") {
            self.secrets_key.update(secrets_key, source);
        }
        if let Ok(catalog_path) = env::var("NIGHTLIGHT_CATALOG") {
            self.catalog_path.update(PathBuf::from(catalog_path), source);
        }

        // NIGHTLIGHT_MANIFEST_RETRIES
        if let Ok(retries_str) = env::var("NIGHTLIGHT_MANIFEST_RETRIES") {
            match parse_manifest_retries(&retries_str) {
                Ok(retries) => self.manifest_max_retries.update(retries, source),
                Err(_) => tracing::warn!(
                    "Invalid NIGHTLIGHT_MANIFEST_RETRIES value '{}': expected an integer between 0 and {}",
                    retries_str,
                    MAX_MANIFEST_RETRIES
                ),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(data_root) = overrides.data_root {
            self.data_root.update(data_root, ConfigSource::Cli);
        }

        if let Some(write_dir) = overrides.write_dir {
            self.write_dir.update(write_dir, ConfigSource::Cli);
        }
    }

    /// Catalog file location; relative paths are taken from the data root
    pub fn catalog_file(&self) -> PathBuf {
        if self.catalog_path.value.is_absolute() {
            self.catalog_path.value.clone()
        } else {
            self.data_root.value.join(&self.catalog_path.value)
        }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> BTreeMap<String, (String, ConfigSource)> {
        let mut map = BTreeMap::new();

        let mut insert = |key: &str, value: String, source: ConfigSource| {
            map.insert(key.to_string(), (value, source));
        };

        insert("data_root", self.data_root.value.display().to_string(), self.data_root.source);
        insert("raw_bucket", self.raw_bucket.value.clone(), self.raw_bucket.source);
        insert(
            "processed_bucket",
            self.processed_bucket.value.clone(),
            self.processed_bucket.source,
        );
        insert("source_url_key", self.source_url_key.value.clone(), self.source_url_key.source);
        insert("create_queue", self.create_queue.value.clone(), self.create_queue.source);
        insert("write_dir", self.write_dir.value.display().to_string(), self.write_dir.source);
        insert("manifest_key", self.manifest_key.value.clone(), self.manifest_key.source);
        insert("secrets_key", self.secrets_key.value.clone(), self.secrets_key.source);
        insert("catalog_path", self.catalog_file().display().to_string(), self.catalog_path.source);
        insert(
            "manifest_max_retries",
            self.manifest_max_retries.value.to_string(),
            self.manifest_max_retries.source,
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    data_root: Option<PathBuf>,
    raw_bucket: Option<String>,
    processed_bucket: Option<String>,
    source_url_key: Option<String>,
    create_queue: Option<String>,
    write_dir: Option<PathBuf>,
    manifest_key: Option<String>,
    secrets_key: Option<String>,
    catalog_path: Option<PathBuf>,
    manifest_max_retries: Option<u32>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub data_root: Option<PathBuf>,
    pub write_dir: Option<PathBuf>,
}

/// Parse the manifest conflict retry count
pub fn parse_manifest_retries(s: &str) -> Result<u32> {
    let retries = s.trim().parse::<u32>().map_err(|e| NightlightError::ConfigInvalid {
        key: "manifest_max_retries".to_string(),
        reason: format!("Invalid retry count '{}': {}", s, e),
    })?;
    validate_manifest_retries(retries)?;
    Ok(retries)
}

fn validate_manifest_retries(retries: u32) -> Result<()> {
    if retries > MAX_MANIFEST_RETRIES {
        return Err(NightlightError::ConfigInvalid {
            key: "manifest_max_retries".to_string(),
            reason: format!("{} exceeds the maximum of {}", retries, MAX_MANIFEST_RETRIES),
        });
    }
    Ok(())
}
