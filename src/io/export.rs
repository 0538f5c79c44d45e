use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::io::recovery::atomic_write;
use crate::model::profile::Profile;
use crate::model::ticket::Ticket;

/// Error type for export operations
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("could not serialize export: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Everything on the desk, as one downloadable document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub tickets: Vec<Ticket>,
    pub profile: Profile,
    pub export_date: DateTime<Utc>,
}

impl ExportDocument {
    pub fn new(tickets: &[Ticket], profile: &Profile, export_date: DateTime<Utc>) -> Self {
        ExportDocument {
            tickets: tickets.to_vec(),
            profile: profile.clone(),
            export_date,
        }
    }

    /// `tickets_export_<YYYY-MM-DD>.json`, dated by the export time (UTC)
    pub fn file_name(&self) -> String {
        format!("tickets_export_{}.json", self.export_date.format("%Y-%m-%d"))
    }

    pub fn to_json_pretty(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Write the document into `dir` and return the file's path. An existing export
/// from the same day is overwritten.
pub fn write_export(dir: &Path, doc: &ExportDocument) -> Result<PathBuf, ExportError> {
    let path = dir.join(doc.file_name());
    let content = doc.to_json_pretty()?;
    atomic_write(&path, content.as_bytes()).map_err(|source| ExportError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
