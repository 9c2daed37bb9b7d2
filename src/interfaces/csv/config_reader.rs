use crate::domain::config::{ConfigMap, ConfigValue};
use crate::domain::ports::ConfigSource;
use crate::error::{ConfigError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::io::Read;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Deserialize)]
struct ConfigRow {
    #[serde(alias = "Key")]
    key: String,
    #[serde(alias = "Value", default)]
    value: String,
}

/// Reads a key/value configuration table from CSV.
///
/// The header row must name a `key` and a `value` column (`Key`/`Value` are
/// accepted too). Rows with a blank key are skipped.
pub struct ConfigReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ConfigReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn read(self) -> Result<ConfigMap> {
        let mut entries = Vec::new();
        for row in self.reader.into_deserialize::<ConfigRow>() {
            let row = row?;
            if row.key.is_empty() {
                continue;
            }
            let value = ConfigValue::parse(&row.value);
            entries.push((row.key, value));
        }
        ConfigMap::from_entries(entries)
    }
}

/// Loads the configuration from a CSV file on every call.
pub struct CsvConfigSource {
    path: Option<PathBuf>,
}

impl CsvConfigSource {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

#[async_trait]
impl ConfigSource for CsvConfigSource {
    async fn load(&self) -> Result<ConfigMap> {
        let path = self.path.as_ref().ok_or(ConfigError::PathNotSet)?;
        info!(path = %path.display(), "loading configuration");
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ConfigError::Unreachable {
                path: path.clone(),
                source,
            })?;
        let config = ConfigReader::new(bytes.as_slice()).read()?;
        info!(keys = config.len(), "configuration loaded");
        Ok(config)
    }
}
