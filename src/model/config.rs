use serde::{Deserialize, Serialize};

/// Configuration from desk.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeskConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub comments: CommentConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// What to do when a persisted slot holds data that does not parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Keep the bad payload in the recovery log and start from defaults
    #[default]
    Fallback,
    /// Refuse to load
    Strict,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub on_malformed: MalformedPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentConfig {
    /// Author recorded on user comments
    #[serde(default = "default_author")]
    pub author: String,
    /// Use the profile name instead of `author`
    #[serde(default)]
    pub author_from_profile: bool,
}

impl Default for CommentConfig {
    fn default() -> Self {
        CommentConfig {
            author: default_author(),
            author_from_profile: false,
        }
    }
}

/// Default: see src/cli/handlers/init.rs
fn default_author() -> String {
    "John Doe".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            recent_limit: default_recent_limit(),
        }
    }
}

fn default_recent_limit() -> usize {
    5
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory for export files, relative to the desk root (unset = the root itself)
    #[serde(default)]
    pub dir: Option<String>,
}
