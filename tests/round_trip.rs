use pretty_assertions::assert_eq;
use std::fs;

use chrono::Utc;
use ticketdesk::io::slots::DirSlots;
use ticketdesk::io::storage::Storage;
use ticketdesk::model::{Category, NewTicket, Priority, Status};
use ticketdesk::ops::filter::TicketFilter;
use ticketdesk::ops::store::TicketStore;

fn open_store(dir: &std::path::Path) -> TicketStore<DirSlots> {
    TicketStore::open(Storage::new(DirSlots::new(dir))).unwrap()
}

/// Saving what was loaded and loading again yields an equal collection,
/// and a second save writes byte-identical JSON.
#[test]
fn round_trip_sample_data() {
    let tmp = tempfile::TempDir::new().unwrap();
    let mut storage = Storage::new(DirSlots::new(tmp.path()));

    let loaded = storage.load_tickets(Utc::now()).unwrap();
    storage.save_tickets(&loaded).unwrap();
    let first = fs::read_to_string(tmp.path().join("tickets.json")).unwrap();

    let reloaded = storage.load_tickets(Utc::now()).unwrap();
    assert_eq!(reloaded, loaded);

    storage.save_tickets(&reloaded).unwrap();
    let second = fs::read_to_string(tmp.path().join("tickets.json")).unwrap();
    assert_eq!(second, first, "re-save changed the stored JSON");
}

#[test]
fn round_trip_after_mutations() {
    let tmp = tempfile::TempDir::new().unwrap();

    let mut store = open_store(tmp.path());
    let created = store
        .create(
            NewTicket::new("VPN drops every hour", Category::Technical, Priority::High)
                .description("Happens on the office network only"),
        )
        .unwrap();
    assert!(store.update_status(created.id, Status::InProgress).unwrap());
    store
        .add_comment(created.id, "Seeing it again this morning")
        .unwrap()
        .unwrap();
    store.delete(3).unwrap().unwrap();
    let before: Vec<_> = store.tickets().to_vec();

    let reopened = open_store(tmp.path());
    assert_eq!(reopened.tickets(), before.as_slice());
    assert_eq!(reopened.stats(), store.stats());

    let ticket = reopened.get(created.id).unwrap();
    assert_eq!(ticket.comments.len(), 2);
    assert_eq!(ticket.comments[0].content, "Status changed to in-progress");
    assert!(ticket.updated_at >= ticket.created_at);
}

#[test]
fn filter_over_reloaded_collection() {
    let tmp = tempfile::TempDir::new().unwrap();
    let mut store = open_store(tmp.path());
    store
        .create(NewTicket::new("Invoice copy needed", Category::Billing, Priority::Medium))
        .unwrap();

    let reopened = open_store(tmp.path());
    let filter = TicketFilter::default().search("invoice");
    let ids: Vec<u64> = filter.apply(reopened.tickets()).iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![3, 4]);

    // applying twice changes nothing
    let once = filter.apply(reopened.tickets());
    let twice = filter.apply(once.iter().copied());
    assert_eq!(twice, once);
}
