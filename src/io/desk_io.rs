use std::fs;
use std::path::{Path, PathBuf};

use crate::io::slots::DirSlots;
use crate::io::storage::Storage;
use crate::model::config::DeskConfig;
use crate::model::desk::Desk;
use crate::ops::store::{CommentAuthor, StoreError, TicketStore};

/// Directory holding a desk's files, relative to its root
pub const DESK_DIR: &str = "desk";
/// Config file inside the desk directory
pub const CONFIG_FILE: &str = "desk.toml";

/// Error type for locating and loading a desk
#[derive(Debug, thiserror::Error)]
pub enum DeskError {
    #[error("not a ticket desk: no desk/desk.toml found (run `td init`)")]
    NotADesk,
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse desk.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Walk up from `start` looking for a `desk/desk.toml`.
pub fn discover_desk(start: &Path) -> Result<PathBuf, DeskError> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(DESK_DIR).join(CONFIG_FILE).is_file() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(DeskError::NotADesk);
        }
    }
}

/// Load the desk rooted at `root`.
pub fn load_desk(root: &Path) -> Result<Desk, DeskError> {
    let desk_dir = root.join(DESK_DIR);
    let config_path = desk_dir.join(CONFIG_FILE);
    if !config_path.is_file() {
        return Err(DeskError::NotADesk);
    }
    let text = fs::read_to_string(&config_path).map_err(|e| DeskError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    let config: DeskConfig = toml::from_str(&text)?;

    Ok(Desk {
        root: root.to_path_buf(),
        desk_dir,
        config,
    })
}

/// Build the ticket store for a desk, honoring its storage and comment settings.
pub fn open_store(desk: &Desk) -> Result<TicketStore<DirSlots>, DeskError> {
    let storage = Storage::new(DirSlots::new(&desk.desk_dir))
        .with_policy(desk.config.storage.on_malformed)
        .with_recovery_dir(&desk.desk_dir);
    let author = if desk.config.comments.author_from_profile {
        CommentAuthor::Profile
    } else {
        CommentAuthor::Fixed(desk.config.comments.author.clone())
    };
    Ok(TicketStore::open(storage)?.with_author(author))
}

/// Where `td export` writes by default
pub fn export_dir(desk: &Desk) -> PathBuf {
    match &desk.config.export.dir {
        Some(dir) => desk.root.join(dir),
        None => desk.root.clone(),
    }
}
