use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::lookup::DEFAULT_SEARCH_LIMIT;

/// Root application configuration, loaded from `~/.config/bookgraph/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub recommend: RecommendConfig,
    pub openlibrary: OpenLibraryConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendConfig {
    /// Global cap on returned recommendations across all strategies.
    pub cap: usize,
    pub per_query_limit: usize,
    /// Lookups in flight at once within one pass.
    pub concurrency: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intersection_language: Option<String>,
    #[serde(default)]
    pub extra_generic_subjects: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenLibraryConfig {
    pub base_url: String,
    pub min_interval_ms: u64,
    pub max_retries: u32,
    pub cache_enabled: bool,
    pub cache_ttl_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            cap: 10,
            per_query_limit: DEFAULT_SEARCH_LIMIT,
            concurrency: 3,
            intersection_language: Some("eng".to_string()),
            extra_generic_subjects: Vec::new(),
        }
    }
}

impl Default for OpenLibraryConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openlibrary.org".to_string(),
            min_interval_ms: 200,
            max_retries: 3,
            cache_enabled: true,
            cache_ttl_secs: 7 * 24 * 60 * 60,
            user_agent: concat!("bookgraph/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl AppConfig {
    /// Standard config file path: `~/.config/bookgraph/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("BOOKGRAPH_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("bookgraph")
            .join("config.toml")
    }

    /// Load config from disk, falling back to defaults if file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.recommend.cap == 0 {
            return Err(crate::BookgraphError::ConfigError(
                "recommend.cap must be at least 1".to_string(),
            ));
        }
        if self.recommend.concurrency == 0 {
            return Err(crate::BookgraphError::ConfigError(
                "recommend.concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Directory for cached lookup responses.
    pub fn cache_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("bookgraph")
    }
}
