use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::profile::Profile;
use crate::model::ticket::{CommentKind, Ticket};
use crate::ops::attachment::format_file_size;
use crate::ops::store::TicketStats;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct DashboardJson<'a> {
    pub stats: TicketStats,
    pub recent: Vec<&'a Ticket>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedJson {
    pub path: String,
    pub tickets: usize,
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

fn format_time(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

/// One-line summary: `#4 [open] Printer jam (low, technical)`
pub fn format_ticket_line(ticket: &Ticket) -> String {
    format!(
        "#{} [{}] {} ({}, {})",
        ticket.id, ticket.status, ticket.title, ticket.priority, ticket.category
    )
}

/// Full ticket view with attachments and comment thread
pub fn format_ticket_detail(ticket: &Ticket) -> Vec<String> {
    let mut lines = vec![
        format!("#{} {}", ticket.id, ticket.title),
        format!(
            "status: {}  priority: {}  category: {}",
            ticket.status, ticket.priority, ticket.category
        ),
        format!(
            "created: {}  updated: {}",
            format_time(&ticket.created_at),
            format_time(&ticket.updated_at)
        ),
    ];

    if !ticket.description.is_empty() {
        lines.push(String::new());
        lines.extend(ticket.description.lines().map(|l| format!("  {}", l)));
    }

    if !ticket.attachments.is_empty() {
        lines.push(String::new());
        lines.push("attachments:".to_string());
        for att in &ticket.attachments {
            lines.push(format!(
                "  {} ({}, {})",
                att.name,
                format_file_size(att.size),
                att.mime_type
            ));
        }
    }

    lines.push(String::new());
    if ticket.comments.is_empty() {
        lines.push("no comments".to_string());
    } else {
        lines.push(format!("comments ({}):", ticket.comments.len()));
        for c in &ticket.comments {
            let marker = match c.kind {
                CommentKind::Comment => "",
                CommentKind::StatusChange => "* ",
            };
            lines.push(format!(
                "  {}{} {}: {}",
                marker,
                format_time(&c.created_at),
                c.author,
                c.content
            ));
        }
    }

    lines
}

pub fn format_stats(stats: &TicketStats) -> String {
    format!(
        "total {}  open {}  in-progress {}  resolved {}  closed {}",
        stats.total, stats.open, stats.in_progress, stats.resolved, stats.closed
    )
}

pub fn format_profile(profile: &Profile) -> Vec<String> {
    vec![
        format!("name:       {}", profile.name),
        format!("email:      {}", profile.email),
        format!("phone:      {}", profile.phone),
        format!("department: {}", profile.department),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ticket::{Attachment, Comment, Status};
    use crate::ops::sample::sample_tickets;
    use chrono::TimeZone;
    use insta::assert_snapshot;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn ticket_line() {
        let tickets = sample_tickets(fixed_now());
        assert_eq!(
            format_ticket_line(&tickets[1]),
            "#2 [in-progress] Request for new software license (medium, general)"
        );
    }

    #[test]
    fn ticket_detail() {
        let mut ticket = sample_tickets(fixed_now()).remove(0);
        ticket.attachments.push(Attachment {
            name: "portal.png".into(),
            size: 1536,
            mime_type: "image/png".into(),
        });
        ticket.status = Status::InProgress;
        ticket.comments.push(Comment {
            id: 5,
            content: "Status changed to in-progress".into(),
            author: "System".into(),
            created_at: fixed_now(),
            kind: CommentKind::StatusChange,
        });

        let output = format_ticket_detail(&ticket).join("\n");
        assert_snapshot!(output, @r#"
        #1 Login issues with company portal
        status: in-progress  priority: high  category: technical
        created: 2025-06-09 12:00  updated: 2025-06-09 12:00

          Unable to login to the company portal. Getting error message "Invalid credentials" even with correct password.

        attachments:
          portal.png (1.5 KB, image/png)

        comments (2):
          2025-06-09 13:46 John Doe: I have tried resetting my password but the issue persists.
          * 2025-06-10 12:00 System: Status changed to in-progress
        "#);
    }

    #[test]
    fn detail_without_comments() {
        let ticket = sample_tickets(fixed_now()).remove(2);
        let lines = format_ticket_detail(&ticket);
        assert_eq!(lines.last().map(String::as_str), Some("no comments"));
        assert!(!lines.iter().any(|l| l == "attachments:"));
    }

    #[test]
    fn stats_line() {
        let stats = TicketStats {
            total: 3,
            open: 1,
            in_progress: 1,
            resolved: 1,
            closed: 0,
        };
        assert_eq!(
            format_stats(&stats),
            "total 3  open 1  in-progress 1  resolved 1  closed 0"
        );
    }
}
