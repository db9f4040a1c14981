use std::time::Duration;

use log::info;
use roster_states::State;
use serde::Deserialize;

use crate::TableError;

/// Tunables of the user table, read from `ROSTER_*` environment variables.
///
/// Every field is optional; missing variables fall back to [`TableConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Rows per page; must be positive.
    pub page_size: usize,
    /// Records produced by the mock data source.
    pub mock_count: usize,
    pub load_latency_ms: u64,
    pub delete_latency_ms: u64,
    pub save_latency_ms: u64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            page_size: 25,
            mock_count: 100,
            load_latency_ms: 1000,
            delete_latency_ms: 500,
            save_latency_ms: 1000,
        }
    }
}

impl State for TableConfig {}

impl TableConfig {
    pub const ENV_PREFIX: &'static str = "ROSTER_";

    pub fn from_env() -> Result<Self, TableError> {
        let config = Self::from_iter(std::env::vars())?;
        info!("Loaded table config: {config:?}");
        Ok(config)
    }

    /// Build from `(name, value)` pairs; only names carrying [`TableConfig::ENV_PREFIX`] are read.
    pub fn from_iter<I, K, V>(vars: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let scoped: Vec<(String, String)> = vars
            .into_iter()
            .filter_map(|(key, value)| {
                key.as_ref()
                    .strip_prefix(Self::ENV_PREFIX)
                    .map(|name| (name.to_owned(), value.into()))
            })
            .collect();
        Ok(serde_env::from_iter(scoped)?)
    }

    pub fn load_latency(&self) -> Duration {
        Duration::from_millis(self.load_latency_ms)
    }

    pub fn delete_latency(&self) -> Duration {
        Duration::from_millis(self.delete_latency_ms)
    }

    pub fn save_latency(&self) -> Duration {
        Duration::from_millis(self.save_latency_ms)
    }
}
