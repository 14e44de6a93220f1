use std::path::Path;

use serde::Deserialize;

use crate::cache::DEFAULT_CAPACITY;
use crate::error::Result;

pub const CONFIG_BASENAME: &str = "rowmatch";
pub const ENV_PREFIX: &str = "ROWMATCH";

/// Engine settings, read from an optional `rowmatch.{toml,json,yaml}` file
/// and overridden by `ROWMATCH_*` environment variables.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// Entries kept by the match cache before the least recently used is evicted.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// `tracing` filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_capacity: default_cache_capacity(),
            log_filter: default_log_filter(),
        }
    }
}

impl EngineConfig {
    /// Loads `rowmatch.*` from the working directory if present.
    pub fn load() -> Result<Self> {
        Self::build(config::File::with_name(CONFIG_BASENAME).required(false))
    }
    /// Loads the given file, which must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        Self::build(config::File::from(path).required(true))
    }
    fn build<S>(file: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config = config::Config::builder()
            .add_source(file)
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize::<EngineConfig>()?;
        Ok(config.clamped())
    }
    fn clamped(mut self) -> Self {
        self.cache_capacity = self.cache_capacity.max(1);
        self
    }
}

fn default_cache_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_log_filter() -> String {
    "warn".to_string()
}
