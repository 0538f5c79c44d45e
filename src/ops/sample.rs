use chrono::{DateTime, Duration, Utc};

use crate::model::ticket::{Category, Comment, CommentKind, Priority, Status, Ticket};

/// The three tickets a fresh desk starts with, dated relative to `now`.
pub fn sample_tickets(now: DateTime<Utc>) -> Vec<Ticket> {
    let ago = |ms: i64| now - Duration::milliseconds(ms);
    const DAY: i64 = 86_400_000;

    vec![
        Ticket {
            id: 1,
            title: "Login issues with company portal".to_string(),
            category: Category::Technical,
            priority: Priority::High,
            description: "Unable to login to the company portal. Getting error message \
                          \"Invalid credentials\" even with correct password."
                .to_string(),
            status: Status::Open,
            created_at: ago(DAY),
            updated_at: ago(DAY),
            comments: vec![Comment {
                id: 1,
                content: "I have tried resetting my password but the issue persists.".to_string(),
                author: "John Doe".to_string(),
                created_at: ago(80_000_000),
                kind: CommentKind::Comment,
            }],
            attachments: Vec::new(),
        },
        Ticket {
            id: 2,
            title: "Request for new software license".to_string(),
            category: Category::General,
            priority: Priority::Medium,
            description: "Need to request a new license for Adobe Creative Suite for the \
                          marketing team."
                .to_string(),
            status: Status::InProgress,
            created_at: ago(2 * DAY),
            updated_at: ago(DAY),
            comments: vec![Comment {
                id: 2,
                content: "Status changed to in-progress".to_string(),
                author: "System".to_string(),
                created_at: ago(DAY),
                kind: CommentKind::StatusChange,
            }],
            attachments: Vec::new(),
        },
        Ticket {
            id: 3,
            title: "Billing discrepancy in last invoice".to_string(),
            category: Category::Billing,
            priority: Priority::Low,
            description: "There seems to be a discrepancy in the last billing invoice. The \
                          amount charged is different from what was agreed."
                .to_string(),
            status: Status::Resolved,
            created_at: ago(3 * DAY),
            updated_at: ago(2 * DAY),
            comments: Vec::new(),
            attachments: Vec::new(),
        },
    ]
}
