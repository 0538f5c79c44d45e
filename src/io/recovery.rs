use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use tempfile::NamedTempFile;

/// Age in days after which `td recovery --prune` drops an entry.
pub const PRUNE_AGE_DAYS: i64 = 30;

const LOG_FILE: &str = ".recovery.log";

/// Written once at the top of a new recovery log.
const PREAMBLE: &str = "\
<!-- ticketdesk recovery log: data that could not be used or saved normally.
     Malformed slot contents, failed writes, deleted tickets and cleared
     desks end up here.
     View with: td recovery
     Prune old entries: td recovery --prune
     Safe to delete. -->

---
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryCategory {
    /// A persisted slot did not parse
    Malformed,
    /// A slot write failed
    Write,
    /// A ticket was deleted
    Delete,
    /// All data was cleared
    Clear,
}

impl RecoveryCategory {
    const ALL: [RecoveryCategory; 4] = [
        RecoveryCategory::Malformed,
        RecoveryCategory::Write,
        RecoveryCategory::Delete,
        RecoveryCategory::Clear,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RecoveryCategory::Malformed => "malformed",
            RecoveryCategory::Write => "write",
            RecoveryCategory::Delete => "delete",
            RecoveryCategory::Clear => "clear",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

impl fmt::Display for RecoveryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in the recovery log: a header line, `Key: value` fields, and an
/// optional fenced body holding the preserved data.
#[derive(Debug, Clone)]
pub struct RecoveryEntry {
    pub timestamp: DateTime<Utc>,
    pub category: RecoveryCategory,
    pub description: String,
    pub fields: Vec<(String, String)>,
    pub body: String,
}

impl RecoveryEntry {
    pub fn new(category: RecoveryCategory, description: impl Into<String>) -> Self {
        RecoveryEntry {
            timestamp: Utc::now(),
            category,
            description: description.into(),
            fields: Vec::new(),
            body: String::new(),
        }
    }

    pub fn field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields.push((key.to_string(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn field_value(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether `body` holds `payload`. Trailing newlines are not preserved by
    /// the log format, so they are ignored.
    pub fn body_matches(&self, payload: &str) -> bool {
        self.body.trim_end_matches('\n') == payload.trim_end_matches('\n')
    }

    pub fn to_markdown(&self) -> String {
        let mut out = format!(
            "## {} [{}] {}\n\n",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.category,
            self.description,
        );
        for (key, value) in &self.fields {
            out.push_str(&format!("{}: {}\n", key, value));
        }
        if !self.body.is_empty() {
            out.push_str("\n```text\n");
            out.push_str(self.body.trim_end_matches('\n'));
            out.push_str("\n```\n");
        }
        out.push_str("\n---\n");
        out
    }

    pub fn to_json(&self) -> serde_json::Value {
        let fields: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();

        serde_json::json!({
            "timestamp": self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            "category": self.category.as_str(),
            "description": self.description,
            "fields": fields,
            "body": self.body,
        })
    }
}

pub fn recovery_log_path(desk_dir: &Path) -> PathBuf {
    desk_dir.join(LOG_FILE)
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Append an entry to the log. Failures are reported as warnings, never returned.
pub fn log_recovery(desk_dir: &Path, entry: RecoveryEntry) {
    if let Err(e) = append_entry(desk_dir, &entry) {
        tracing::warn!(category = %entry.category, "could not write to recovery log: {}", e);
        eprintln!("warning: could not write to recovery log: {}", e);
    }
}

fn append_entry(desk_dir: &Path, entry: &RecoveryEntry) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(recovery_log_path(desk_dir))?;
    if file.metadata()?.len() == 0 {
        file.write_all(PREAMBLE.as_bytes())?;
    }
    file.write_all(entry.to_markdown().as_bytes())
}

/// Entries most recent first, at most `limit` of them.
pub fn read_recovery_entries(desk_dir: &Path, limit: Option<usize>) -> Vec<RecoveryEntry> {
    let Some(content) = read_log(desk_dir) else {
        return Vec::new();
    };
    let (_, sections) = split_log(&content);
    sections
        .into_iter()
        .rev()
        .take(limit.unwrap_or(usize::MAX))
        .map(|s| s.entry)
        .collect()
}

/// The most recent entry satisfying `pred`.
pub fn find_latest(
    desk_dir: &Path,
    pred: impl Fn(&RecoveryEntry) -> bool,
) -> Option<RecoveryEntry> {
    let content = read_log(desk_dir)?;
    let (_, sections) = split_log(&content);
    sections.into_iter().rev().map(|s| s.entry).find(|e| pred(e))
}

/// Drop entries stamped before `before` (default: `PRUNE_AGE_DAYS` ago), or
/// every entry when `all` is set. Returns how many were removed.
pub fn prune_recovery(
    desk_dir: &Path,
    before: Option<DateTime<Utc>>,
    all: bool,
) -> io::Result<usize> {
    let Some(content) = read_log(desk_dir) else {
        return Ok(0);
    };
    let cutoff = before.unwrap_or_else(|| Utc::now() - chrono::Duration::days(PRUNE_AGE_DAYS));
    let (preamble, sections) = split_log(&content);

    let mut kept = if preamble.is_empty() {
        PREAMBLE.to_string()
    } else {
        preamble.to_string()
    };
    let mut removed = 0;
    for section in &sections {
        if all || section.entry.timestamp < cutoff {
            removed += 1;
        } else {
            kept.push_str(section.text);
        }
    }
    if removed > 0 {
        atomic_write(&recovery_log_path(desk_dir), kept.as_bytes())?;
    }
    Ok(removed)
}

fn read_log(desk_dir: &Path) -> Option<String> {
    fs::read_to_string(recovery_log_path(desk_dir)).ok()
}

/// An entry together with the exact text it occupies in the file.
struct Section<'a> {
    text: &'a str,
    entry: RecoveryEntry,
}

/// Split the log into the text before the first entry and the entries.
/// Lines inside a fenced body are never taken for headers or fields.
fn split_log(content: &str) -> (&str, Vec<Section<'_>>) {
    let mut sections = Vec::new();
    let mut open: Option<(usize, RecoveryEntry)> = None;
    let mut body: Vec<&str> = Vec::new();
    let mut in_body = false;
    let mut preamble_end = content.len();
    let mut offset = 0;

    for raw in content.split_inclusive('\n') {
        let start = offset;
        offset += raw.len();
        let line = raw.strip_suffix('\n').unwrap_or(raw);

        if in_body {
            if line == "```" {
                in_body = false;
            } else {
                body.push(line);
            }
            continue;
        }

        if let Some(header) = line.strip_prefix("## ").and_then(parse_entry_header) {
            if let Some((begin, mut entry)) = open.take() {
                entry.body = body.join("\n");
                sections.push(Section {
                    text: &content[begin..start],
                    entry,
                });
            } else {
                preamble_end = start;
            }
            body.clear();
            let (timestamp, category, description) = header;
            open = Some((
                start,
                RecoveryEntry {
                    timestamp,
                    category,
                    description,
                    fields: Vec::new(),
                    body: String::new(),
                },
            ));
            continue;
        }

        let Some((_, entry)) = open.as_mut() else {
            continue;
        };
        if line.starts_with("```") {
            in_body = true;
        } else if let Some((key, value)) = line.split_once(": ") {
            entry.fields.push((key.to_string(), value.to_string()));
        }
    }

    if let Some((begin, mut entry)) = open {
        entry.body = body.join("\n");
        sections.push(Section {
            text: &content[begin..],
            entry,
        });
    }
    (&content[..preamble_end], sections)
}

/// `<rfc3339> [<category>] <description>`
fn parse_entry_header(header: &str) -> Option<(DateTime<Utc>, RecoveryCategory, String)> {
    let (stamp, rest) = header.split_once(' ')?;
    let (category, description) = rest.strip_prefix('[')?.split_once("] ")?;
    let timestamp = DateTime::parse_from_rfc3339(stamp).ok()?.with_timezone(&Utc);
    Some((
        timestamp,
        RecoveryCategory::from_name(category)?,
        description.to_string(),
    ))
}
