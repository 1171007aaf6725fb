use serde::{Deserialize, Serialize};

/// Top-level configuration (loaded from sse.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SseConfig {
    pub log: LogConfig,
    pub index: IndexConfig,
    pub build: BuildConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level or EnvFilter directive (default: warn)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Wire format written by `enc` (reading auto-detects)
    pub format: IndexFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Worker thread count for document encryption (0 = cpu_count, 1 = sequential)
    pub workers: usize,
}

/// Index wire format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexFormat {
    /// Length-prefixed tagged records
    #[default]
    Records,
    /// One line per token: raw token, then space-separated paths
    Lines,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            format: "text".into(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self { workers: 1 }
    }
}
