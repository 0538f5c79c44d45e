use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::io::recovery::{self, RecoveryCategory, RecoveryEntry};
use crate::io::slots::{SlotError, SlotStore};
use crate::model::config::MalformedPolicy;
use crate::model::profile::Profile;
use crate::model::ticket::Ticket;
use crate::ops::sample;

/// Slot holding the ticket collection
pub const TICKETS_KEY: &str = "tickets";
/// Slot holding the profile record
pub const PROFILE_KEY: &str = "profile";
/// Slot holding the highest ticket id ever assigned
pub const SEQUENCE_KEY: &str = "sequence";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Sequence {
    last_id: u64,
}

/// Error type for storage adapter operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error(transparent)]
    Slot(#[from] SlotError),
    #[error("slot {key} holds malformed data: {source}")]
    Malformed {
        key: &'static str,
        source: serde_json::Error,
    },
    #[error("could not serialize {key}: {source}")]
    Serialize {
        key: &'static str,
        source: serde_json::Error,
    },
}

/// Reads and writes tickets and the profile through a [`SlotStore`].
pub struct Storage<S> {
    slots: S,
    policy: MalformedPolicy,
    /// Where unusable payloads are preserved. `None` disables the recovery log.
    recovery_dir: Option<PathBuf>,
}

impl<S: SlotStore> Storage<S> {
    pub fn new(slots: S) -> Self {
        Storage {
            slots,
            policy: MalformedPolicy::default(),
            recovery_dir: None,
        }
    }

    pub fn with_policy(mut self, policy: MalformedPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_recovery_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.recovery_dir = Some(dir.into());
        self
    }

    pub fn slots(&self) -> &S {
        &self.slots
    }

    /// The persisted collection, or the sample dataset anchored at `now` when absent.
    pub fn load_tickets(&self, now: DateTime<Utc>) -> Result<Vec<Ticket>, StorageError> {
        Ok(self
            .load_slot(TICKETS_KEY)?
            .unwrap_or_else(|| sample::sample_tickets(now)))
    }

    pub fn save_tickets(&mut self, tickets: &[Ticket]) -> Result<(), StorageError> {
        self.save_slot(TICKETS_KEY, &tickets)
    }

    pub fn load_profile(&self) -> Result<Profile, StorageError> {
        Ok(self.load_slot(PROFILE_KEY)?.unwrap_or_default())
    }

    pub fn save_profile(&mut self, profile: &Profile) -> Result<(), StorageError> {
        self.save_slot(PROFILE_KEY, profile)
    }

    /// Highest id handed out so far, including deleted tickets. 0 when never recorded.
    pub fn load_last_id(&self) -> Result<u64, StorageError> {
        Ok(self
            .load_slot::<Sequence>(SEQUENCE_KEY)?
            .unwrap_or_default()
            .last_id)
    }

    pub fn save_last_id(&mut self, last_id: u64) -> Result<(), StorageError> {
        self.save_slot(SEQUENCE_KEY, &Sequence { last_id })
    }

    /// Remove every slot. The next load starts from sample data and the default profile.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.slots.remove(TICKETS_KEY)?;
        self.slots.remove(PROFILE_KEY)?;
        self.slots.remove(SEQUENCE_KEY)?;
        Ok(())
    }

    /// `Ok(None)` when the slot is empty, or malformed under the fallback policy.
    fn load_slot<T: DeserializeOwned>(&self, key: &'static str) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.slots.get(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(source) => match self.policy {
                MalformedPolicy::Strict => Err(StorageError::Malformed { key, source }),
                MalformedPolicy::Fallback => {
                    tracing::warn!(slot = key, "malformed slot, using defaults: {}", source);
                    eprintln!(
                        "warning: could not parse {} ({}); using defaults, original kept in recovery log",
                        key, source
                    );
                    if let Some(dir) = &self.recovery_dir {
                        preserve_malformed(dir, key, &source, raw);
                    }
                    Ok(None)
                }
            },
        }
    }

    fn save_slot<T: serde::Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), StorageError> {
        let json = serde_json::to_string(value)
            .map_err(|source| StorageError::Serialize { key, source })?;
        if let Err(e) = self.slots.set(key, &json) {
            if let Some(dir) = &self.recovery_dir {
                recovery::log_recovery(
                    dir,
                    RecoveryEntry::new(RecoveryCategory::Write, format!("{} write failed", key))
                        .field("Slot", key)
                        .field("Error", e.to_string())
                        .body(json),
                );
            }
            return Err(e.into());
        }
        Ok(())
    }
}

/// Log an unparsable payload unless the newest entry for this slot already holds it.
fn preserve_malformed(dir: &Path, key: &str, source: &serde_json::Error, raw: String) {
    let already_kept = recovery::find_latest(dir, |e| {
        e.category == RecoveryCategory::Malformed && e.field_value("Slot") == Some(key)
    })
    .is_some_and(|e| e.body_matches(&raw));
    if already_kept {
        return;
    }
    recovery::log_recovery(
        dir,
        RecoveryEntry::new(RecoveryCategory::Malformed, "unparsable slot replaced by defaults")
            .field("Slot", key)
            .field("Error", source.to_string())
            .body(raw),
    );
}
