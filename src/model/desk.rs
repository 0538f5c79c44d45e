use std::path::PathBuf;

use super::config::DeskConfig;

/// A located desk: where its files live and how it is configured
#[derive(Debug)]
pub struct Desk {
    /// Root directory (parent of `desk/`)
    pub root: PathBuf,
    /// Path to the `desk/` directory holding slots, config and recovery log
    pub desk_dir: PathBuf,
    /// Parsed desk.toml
    pub config: DeskConfig,
}
