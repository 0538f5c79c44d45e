use crate::model::ticket::{Priority, Status, Ticket};

/// Search and facet filters for the ticket list. Inactive fields pass everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketFilter {
    /// Case-insensitive substring of title, description, or id. Empty = inactive.
    pub search: String,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
}

impl TicketFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn is_active(&self) -> bool {
        !self.search.is_empty() || self.status.is_some() || self.priority.is_some()
    }

    pub fn matches(&self, ticket: &Ticket) -> bool {
        self.matches_search(ticket)
            && self.status.is_none_or(|s| ticket.status == s)
            && self.priority.is_none_or(|p| ticket.priority == p)
    }

    fn matches_search(&self, ticket: &Ticket) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let term = self.search.to_lowercase();
        ticket.title.to_lowercase().contains(&term)
            || ticket.description.to_lowercase().contains(&term)
            || ticket.id.to_string().contains(&term)
    }

    /// Matching tickets in input order.
    pub fn apply<'a, I>(&self, tickets: I) -> Vec<&'a Ticket>
    where
        I: IntoIterator<Item = &'a Ticket>,
    {
        tickets.into_iter().filter(|t| self.matches(t)).collect()
    }
}

/// Most recently updated first. Ties keep their relative order.
pub fn sort_by_updated(tickets: &mut [&Ticket]) {
    tickets.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}

/// The `limit` most recently created tickets, newest first.
pub fn recent(tickets: &[Ticket], limit: usize) -> Vec<&Ticket> {
    let mut sorted: Vec<&Ticket> = tickets.iter().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted.truncate(limit);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::sample::sample_tickets;
    use chrono::{Duration, Utc};

    fn ids(tickets: &[&Ticket]) -> Vec<u64> {
        tickets.iter().map(|t| t.id).collect()
    }

    #[test]
    fn inactive_filter_passes_everything_in_order() {
        let tickets = sample_tickets(Utc::now());
        let filter = TicketFilter::new();
        assert!(!filter.is_active());
        assert_eq!(ids(&filter.apply(&tickets)), vec![1, 2, 3]);
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_description() {
        let tickets = sample_tickets(Utc::now());
        assert_eq!(ids(&TicketFilter::new().search("LOGIN").apply(&tickets)), vec![1]);
        assert_eq!(ids(&TicketFilter::new().search("adobe").apply(&tickets)), vec![2]);
        assert!(TicketFilter::new().search("printer").apply(&tickets).is_empty());
    }

    #[test]
    fn search_matches_id_text() {
        let mut tickets = sample_tickets(Utc::now());
        tickets[0].id = 13;
        assert_eq!(ids(&TicketFilter::new().search("3").apply(&tickets)), vec![13, 3]);
    }

    #[test]
    fn filters_compose_with_and() {
        let tickets = sample_tickets(Utc::now());
        let filter = TicketFilter::new().search("in").status(Status::InProgress);
        assert_eq!(ids(&filter.apply(&tickets)), vec![2]);

        let filter = TicketFilter::new()
            .status(Status::Open)
            .priority(Priority::Low);
        assert!(filter.apply(&tickets).is_empty());
    }

    #[test]
    fn applying_twice_is_idempotent() {
        let tickets = sample_tickets(Utc::now());
        let filter = TicketFilter::new().search("i");
        let once = filter.apply(&tickets);
        let twice = filter.apply(once.iter().copied());
        assert_eq!(ids(&once), ids(&twice));
    }

    #[test]
    fn sort_by_updated_puts_latest_first() {
        let mut tickets = sample_tickets(Utc::now());
        tickets[2].updated_at = Utc::now() + Duration::seconds(1);
        let mut view: Vec<&Ticket> = tickets.iter().collect();
        sort_by_updated(&mut view);
        // samples 1 and 2 share an updated_at and keep input order
        assert_eq!(ids(&view), vec![3, 1, 2]);
    }

    #[test]
    fn recent_is_newest_created_and_capped() {
        let mut tickets = sample_tickets(Utc::now());
        for i in 0..4 {
            let mut extra = tickets[0].clone();
            extra.id = 10 + i;
            extra.created_at = Utc::now() + Duration::seconds(i as i64);
            tickets.push(extra);
        }
        assert_eq!(ids(&recent(&tickets, 5)), vec![13, 12, 11, 10, 1]);
        assert!(recent(&[], 5).is_empty());
    }
}
