use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::io::export::ExportDocument;
use crate::io::slots::SlotStore;
use crate::io::storage::{Storage, StorageError};
use crate::model::profile::Profile;
use crate::model::ticket::{Comment, CommentKind, NewTicket, Status, Ticket};

/// Author recorded on status-change comments
pub const SYSTEM_AUTHOR: &str = "System";

/// Error type for ticket store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("no ticket ids left: {0} is the highest id there can be")]
    IdsExhausted(u64),
}

/// Who is credited with user comments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentAuthor {
    /// Always this name, whatever the profile says
    Fixed(String),
    /// The current profile name
    Profile,
}

impl Default for CommentAuthor {
    fn default() -> Self {
        CommentAuthor::Fixed(Profile::default().name)
    }
}

/// Ticket counts by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketStats {
    pub total: usize,
    pub open: usize,
    pub in_progress: usize,
    pub resolved: usize,
    pub closed: usize,
}

/// In-memory ticket collection, persisted in full after every mutation.
///
/// Lookups by an unknown id are not errors: mutations report the miss through
/// their return value (`false` / `None`) and leave storage untouched.
pub struct TicketStore<S> {
    storage: Storage<S>,
    tickets: Vec<Ticket>,
    profile: Profile,
    /// Highest id ever handed out, including deleted tickets
    last_id: u64,
    author: CommentAuthor,
}

impl<S: SlotStore> TicketStore<S> {
    /// Load tickets and profile from `storage`. Empty storage yields the sample set.
    pub fn open(storage: Storage<S>) -> Result<Self, StoreError> {
        let tickets = storage.load_tickets(Utc::now())?;
        let profile = storage.load_profile()?;
        let last_id = highest_id(&tickets).max(storage.load_last_id()?);
        Ok(TicketStore {
            storage,
            tickets,
            profile,
            last_id,
            author: CommentAuthor::default(),
        })
    }

    pub fn with_author(mut self, author: CommentAuthor) -> Self {
        self.author = author;
        self
    }

    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    pub fn get(&self, id: u64) -> Option<&Ticket> {
        self.tickets.iter().find(|t| t.id == id)
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Highest id handed out so far. The next ticket gets one more.
    pub fn last_id(&self) -> u64 {
        self.last_id
    }

    /// Add a new open ticket and persist. Field validation is the caller's job.
    pub fn create(&mut self, fields: NewTicket) -> Result<Ticket, StoreError> {
        let now = Utc::now();
        let id = self
            .last_id
            .checked_add(1)
            .ok_or(StoreError::IdsExhausted(self.last_id))?;
        self.last_id = id;

        let ticket = Ticket {
            id,
            title: fields.title,
            category: fields.category,
            priority: fields.priority,
            description: fields.description,
            status: Status::Open,
            created_at: now,
            updated_at: now,
            comments: Vec::new(),
            attachments: fields.attachment.into_iter().collect(),
        };
        self.tickets.push(ticket.clone());
        self.storage.save_last_id(id)?;
        self.persist()?;
        Ok(ticket)
    }

    /// Set the status and record a system comment. Any status may follow any other.
    /// Returns `false` when no ticket has this id.
    pub fn update_status(&mut self, id: u64, status: Status) -> Result<bool, StoreError> {
        let Some(ticket) = self.tickets.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };

        let now = touch(ticket);
        ticket.status = status;
        ticket.comments.push(Comment {
            id: now.timestamp_millis(),
            content: format!("Status changed to {}", status),
            author: SYSTEM_AUTHOR.to_string(),
            created_at: now,
            kind: CommentKind::StatusChange,
        });
        self.persist()?;
        Ok(true)
    }

    /// Append a user comment. Returns `None` when no ticket has this id.
    pub fn add_comment(
        &mut self,
        id: u64,
        content: impl Into<String>,
    ) -> Result<Option<Comment>, StoreError> {
        let author = match &self.author {
            CommentAuthor::Fixed(name) => name.clone(),
            CommentAuthor::Profile => self.profile.name.clone(),
        };
        let Some(ticket) = self.tickets.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };

        let now = touch(ticket);
        let comment = Comment {
            id: now.timestamp_millis(),
            content: content.into(),
            author,
            created_at: now,
            kind: CommentKind::Comment,
        };
        ticket.comments.push(comment.clone());
        self.persist()?;
        Ok(Some(comment))
    }

    /// Remove a ticket. Its id is not handed out again, in this process or a later one.
    pub fn delete(&mut self, id: u64) -> Result<Option<Ticket>, StoreError> {
        let Some(pos) = self.tickets.iter().position(|t| t.id == id) else {
            return Ok(None);
        };
        let removed = self.tickets.remove(pos);
        self.storage.save_last_id(self.last_id)?;
        self.persist()?;
        Ok(Some(removed))
    }

    pub fn stats(&self) -> TicketStats {
        let mut stats = TicketStats {
            total: self.tickets.len(),
            ..TicketStats::default()
        };
        for ticket in &self.tickets {
            match ticket.status {
                Status::Open => stats.open += 1,
                Status::InProgress => stats.in_progress += 1,
                Status::Resolved => stats.resolved += 1,
                Status::Closed => stats.closed += 1,
            }
        }
        stats
    }

    pub fn update_profile(&mut self, profile: Profile) -> Result<(), StoreError> {
        self.storage.save_profile(&profile)?;
        self.profile = profile;
        Ok(())
    }

    pub fn export(&self, now: DateTime<Utc>) -> ExportDocument {
        ExportDocument::new(&self.tickets, &self.profile, now)
    }

    /// Wipe every slot and start over from the sample set and default profile.
    pub fn clear_all(&mut self) -> Result<(), StoreError> {
        self.storage.clear()?;
        self.tickets = self.storage.load_tickets(Utc::now())?;
        self.profile = self.storage.load_profile()?;
        self.last_id = highest_id(&self.tickets);
        Ok(())
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        self.storage.save_tickets(&self.tickets)?;
        Ok(())
    }
}

fn highest_id(tickets: &[Ticket]) -> u64 {
    tickets.iter().map(|t| t.id).max().unwrap_or(0)
}

/// Refresh `updated_at`, never moving it behind `created_at` or its previous value.
fn touch(ticket: &mut Ticket) -> DateTime<Utc> {
    let now = Utc::now().max(ticket.updated_at).max(ticket.created_at);
    ticket.updated_at = now;
    now
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::slots::{DirSlots, MemorySlots};
    use crate::io::storage::{SEQUENCE_KEY, TICKETS_KEY};
    use crate::model::profile::Department;
    use crate::model::ticket::{Attachment, Category, Priority};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample_store() -> TicketStore<MemorySlots> {
        TicketStore::open(Storage::new(MemorySlots::new())).unwrap()
    }

    fn persisted(store: &TicketStore<MemorySlots>) -> Vec<Ticket> {
        let raw = store.storage.slots().get(TICKETS_KEY).unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn sample_stats() {
        let store = sample_store();
        assert_eq!(
            store.stats(),
            TicketStats {
                total: 3,
                open: 1,
                in_progress: 1,
                resolved: 1,
                closed: 0,
            }
        );
        let json = serde_json::to_value(store.stats()).unwrap();
        assert_eq!(json["inProgress"], 1);
    }

    #[test]
    fn create_printer_jam() {
        let mut store = sample_store();
        let ticket = store
            .create(NewTicket::new("Printer jam", Category::Technical, Priority::Low))
            .unwrap();
        assert_eq!(ticket.id, 4);
        assert_eq!(ticket.status, Status::Open);
        assert!(ticket.comments.is_empty());
        assert!(ticket.attachments.is_empty());
        assert_eq!(ticket.created_at, ticket.updated_at);
        assert_eq!(persisted(&store).len(), 4);
    }

    #[test]
    fn create_keeps_single_attachment() {
        let mut store = sample_store();
        let attachment = Attachment {
            name: "screen.png".into(),
            size: 2048,
            mime_type: "image/png".into(),
        };
        let ticket = store
            .create(
                NewTicket::new("Screen flicker", Category::Technical, Priority::Medium)
                    .description("Flickers after lunch")
                    .attachment(attachment.clone()),
            )
            .unwrap();
        assert_eq!(ticket.attachments, vec![attachment]);
        assert_eq!(ticket.description, "Flickers after lunch");
    }

    #[test]
    fn ids_increase_and_are_not_reused_after_delete() {
        let mut store = sample_store();
        let a = store
            .create(NewTicket::new("a", Category::General, Priority::Low))
            .unwrap();
        assert!(store.delete(a.id).unwrap().is_some());
        let b = store
            .create(NewTicket::new("b", Category::General, Priority::Low))
            .unwrap();
        assert!(b.id > a.id);

        store.delete(1).unwrap();
        let c = store
            .create(NewTicket::new("c", Category::General, Priority::Low))
            .unwrap();
        assert!(c.id > b.id);
    }

    #[test]
    fn ids_are_not_reused_after_reopening() {
        let mut store = sample_store();
        let created = store
            .create(NewTicket::new("short-lived", Category::Other, Priority::Low))
            .unwrap();
        store.delete(created.id).unwrap();

        let slots = store.storage.slots().clone();
        let reopened = TicketStore::open(Storage::new(slots)).unwrap();
        assert_eq!(reopened.last_id(), created.id);
    }

    #[test]
    fn deleting_highest_sample_survives_reopen() {
        let tmp = TempDir::new().unwrap();
        let mut store = TicketStore::open(Storage::new(DirSlots::new(tmp.path()))).unwrap();
        store.delete(3).unwrap().unwrap();
        drop(store);

        let mut reopened = TicketStore::open(Storage::new(DirSlots::new(tmp.path()))).unwrap();
        let ticket = reopened
            .create(NewTicket::new("after delete", Category::General, Priority::Low))
            .unwrap();
        assert_eq!(ticket.id, 4);
    }

    #[test]
    fn highest_possible_id_does_not_overflow() {
        let mut slots = MemorySlots::new();
        slots
            .set(SEQUENCE_KEY, &format!("{{\"lastId\":{}}}", u64::MAX))
            .unwrap();
        let mut store = TicketStore::open(Storage::new(slots)).unwrap();
        assert_eq!(store.last_id(), u64::MAX);

        let err = store
            .create(NewTicket::new("one too many", Category::Other, Priority::Low))
            .unwrap_err();
        assert!(matches!(err, StoreError::IdsExhausted(u64::MAX)));
        assert_eq!(store.tickets().len(), 3);
        assert_eq!(store.storage.slots().get(TICKETS_KEY).unwrap(), None);
    }

    #[test]
    fn ticket_with_max_id_opens() {
        let mut tickets = crate::ops::sample::sample_tickets(Utc::now());
        tickets[2].id = u64::MAX;
        let mut slots = MemorySlots::new();
        slots
            .set(TICKETS_KEY, &serde_json::to_string(&tickets).unwrap())
            .unwrap();

        let mut store = TicketStore::open(Storage::new(slots)).unwrap();
        assert!(store
            .create(NewTicket::new("x", Category::Other, Priority::Low))
            .is_err());
        assert_eq!(store.get(u64::MAX).unwrap().title, "Billing discrepancy in last invoice");
    }

    #[test]
    fn id_allocation_follows_highest_loaded_id() {
        let mut slots = MemorySlots::new();
        let mut tickets = crate::ops::sample::sample_tickets(Utc::now());
        tickets.remove(0);
        tickets[1].id = 9;
        slots
            .set(TICKETS_KEY, &serde_json::to_string(&tickets).unwrap())
            .unwrap();
        let store = TicketStore::open(Storage::new(slots)).unwrap();
        assert_eq!(store.last_id(), 9);
    }

    #[test]
    fn update_status_appends_one_system_comment() {
        let mut store = sample_store();
        let before = store.get(1).unwrap().clone();

        assert!(store.update_status(1, Status::Closed).unwrap());

        let after = store.get(1).unwrap();
        assert_eq!(after.status, Status::Closed);
        assert_eq!(after.comments.len(), before.comments.len() + 1);
        let comment = after.comments.last().unwrap();
        assert_eq!(comment.content, "Status changed to closed");
        assert_eq!(comment.kind, CommentKind::StatusChange);
        assert_eq!(comment.author, SYSTEM_AUTHOR);
        assert!(after.updated_at >= before.updated_at);
        assert_eq!(persisted(&store)[0].status, Status::Closed);
    }

    #[test]
    fn same_status_transition_is_allowed() {
        let mut store = sample_store();
        assert!(store.update_status(1, Status::Open).unwrap());
        assert_eq!(store.get(1).unwrap().comments.len(), 2);
    }

    #[test]
    fn unknown_id_mutations_change_nothing() {
        let mut store = sample_store();
        let before = store.tickets().to_vec();

        assert!(!store.update_status(99, Status::Closed).unwrap());
        assert_eq!(store.add_comment(99, "hello").unwrap(), None);
        assert_eq!(store.delete(99).unwrap(), None);

        assert_eq!(store.tickets(), before.as_slice());
        // nothing has been written yet
        assert_eq!(store.storage.slots().get(TICKETS_KEY).unwrap(), None);
    }

    #[test]
    fn add_comment_uses_fixed_author_by_default() {
        let mut store = sample_store();
        store
            .update_profile(Profile {
                name: "Ada Park".into(),
                email: "ada@example.com".into(),
                phone: "555-0100".into(),
                department: Department::Hr,
            })
            .unwrap();

        let comment = store.add_comment(3, "Thanks!").unwrap().unwrap();
        assert_eq!(comment.author, "John Doe");
        assert_eq!(comment.kind, CommentKind::Comment);
        assert_eq!(store.get(3).unwrap().comments.last(), Some(&comment));
        assert_eq!(store.get(3).unwrap().updated_at, comment.created_at);
    }

    #[test]
    fn add_comment_can_credit_profile() {
        let mut store = sample_store().with_author(CommentAuthor::Profile);
        let mut profile = store.profile().clone();
        profile.name = "Ada Park".into();
        store.update_profile(profile).unwrap();

        let comment = store.add_comment(2, "Any update?").unwrap().unwrap();
        assert_eq!(comment.author, "Ada Park");
    }

    #[test]
    fn delete_returns_removed_ticket() {
        let mut store = sample_store();
        let removed = store.delete(2).unwrap().unwrap();
        assert_eq!(removed.title, "Request for new software license");
        assert!(store.get(2).is_none());
        assert_eq!(store.stats().total, 2);
        assert_eq!(persisted(&store).len(), 2);
    }

    #[test]
    fn export_snapshots_current_state() {
        let mut store = sample_store();
        store.delete(3).unwrap();
        let now = Utc::now();
        let doc = store.export(now);
        assert_eq!(doc.tickets, store.tickets());
        assert_eq!(doc.profile, Profile::default());
        assert_eq!(doc.export_date, now);
    }

    #[test]
    fn clear_all_restores_samples() {
        let mut store = sample_store();
        store
            .create(NewTicket::new("x", Category::Other, Priority::High))
            .unwrap();
        store.delete(1).unwrap();

        store.clear_all().unwrap();
        assert_eq!(store.tickets().len(), 3);
        assert_eq!(store.last_id(), 3);
        assert_eq!(store.profile(), &Profile::default());
        assert_eq!(store.storage.slots().get(TICKETS_KEY).unwrap(), None);
    }
}
