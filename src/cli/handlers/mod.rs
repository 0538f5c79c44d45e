mod init;
pub use init::cmd_init;

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::desk_io::{self, DeskError};
use crate::io::export;
use crate::io::recovery::{self, RecoveryCategory, RecoveryEntry};
use crate::io::slots::DirSlots;
use crate::model::desk::Desk;
use crate::model::ticket::{NewTicket, Ticket};
use crate::ops::attachment;
use crate::ops::filter::{self, TicketFilter};
use crate::ops::store::TicketStore;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let start = match cli.desk_dir {
        Some(ref dir) => std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir.display(), e))?,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Some(Commands::Init(args)) => cmd_init(args, &start),
        None | Some(Commands::Dashboard) => cmd_dashboard(&start, json),
        Some(Commands::List(args)) => cmd_list(args, &start, json),
        Some(Commands::Show(args)) => cmd_show(args, &start, json),
        Some(Commands::New(args)) => cmd_new(args, &start, json),
        Some(Commands::Status(args)) => cmd_status(args, &start, json),
        Some(Commands::Comment(args)) => cmd_comment(args, &start, json),
        Some(Commands::Delete(args)) => cmd_delete(args, &start),
        Some(Commands::Stats) => cmd_stats(&start, json),
        Some(Commands::Profile(args)) => cmd_profile(args, &start, json),
        Some(Commands::Export(args)) => cmd_export(args, &start, json),
        Some(Commands::Clear(args)) => cmd_clear(args, &start),
        Some(Commands::Recovery(args)) => cmd_recovery(args, &start, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_desk_from(start: &Path) -> Result<Desk, DeskError> {
    let root = desk_io::discover_desk(start)?;
    desk_io::load_desk(&root)
}

fn open(start: &Path) -> Result<(Desk, TicketStore<DirSlots>), DeskError> {
    let desk = load_desk_from(start)?;
    let store = desk_io::open_store(&desk)?;
    Ok((desk, store))
}

fn not_found(id: u64) -> Box<dyn std::error::Error> {
    format!("ticket not found: {}", id).into()
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Ask on stdin; only `y` or `yes` counts as agreement.
fn confirm(prompt: &str) -> std::io::Result<bool> {
    eprint!("{} [y/N] ", prompt);
    std::io::stderr().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

// ---------------------------------------------------------------------------
// Read command handlers
// ---------------------------------------------------------------------------

fn cmd_dashboard(start: &Path, json: bool) -> CmdResult {
    let (desk, store) = open(start)?;
    let stats = store.stats();
    let recent = filter::recent(store.tickets(), desk.config.dashboard.recent_limit);

    if json {
        return print_json(&DashboardJson { stats, recent });
    }

    println!("{}", format_stats(&stats));
    println!();
    if recent.is_empty() {
        println!("No tickets yet. Create one with `td new`.");
    } else {
        println!("recent:");
        for ticket in recent {
            println!("  {}", format_ticket_line(ticket));
        }
    }
    Ok(())
}

fn cmd_list(args: ListArgs, start: &Path, json: bool) -> CmdResult {
    let (_desk, store) = open(start)?;
    let filter = TicketFilter {
        search: args.search.unwrap_or_default(),
        status: args.status,
        priority: args.priority,
    };

    let mut tickets = filter.apply(store.tickets());
    filter::sort_by_updated(&mut tickets);

    if json {
        return print_json(&tickets);
    }
    if tickets.is_empty() {
        println!("No tickets found.");
    }
    for ticket in tickets {
        println!("{}", format_ticket_line(ticket));
    }
    Ok(())
}

fn cmd_show(args: ShowArgs, start: &Path, json: bool) -> CmdResult {
    let (_desk, store) = open(start)?;
    let ticket = store.get(args.id).ok_or_else(|| not_found(args.id))?;

    if json {
        return print_json(ticket);
    }
    for line in format_ticket_detail(ticket) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_stats(start: &Path, json: bool) -> CmdResult {
    let (_desk, store) = open(start)?;
    let stats = store.stats();
    if json {
        return print_json(&stats);
    }
    println!("{}", format_stats(&stats));
    Ok(())
}

fn cmd_recovery(args: RecoveryArgs, start: &Path, json: bool) -> CmdResult {
    let desk = load_desk_from(start)?;

    if args.prune {
        let removed = recovery::prune_recovery(&desk.desk_dir, None, args.all)?;
        println!("pruned {} entries", removed);
        return Ok(());
    }

    let entries = recovery::read_recovery_entries(&desk.desk_dir, Some(args.limit));
    if json {
        let values: Vec<serde_json::Value> = entries.iter().map(|e| e.to_json()).collect();
        return print_json(&values);
    }
    if entries.is_empty() {
        println!("recovery log is empty");
    }
    for entry in entries {
        print!("{}", entry.to_markdown());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write command handlers
// ---------------------------------------------------------------------------

fn cmd_new(args: NewArgs, start: &Path, json: bool) -> CmdResult {
    let title = args.title.trim();
    if title.is_empty() {
        return Err("title cannot be empty".into());
    }

    let (_desk, mut store) = open(start)?;
    let mut fields = NewTicket::new(title, args.category, args.priority).description(args.description);
    if let Some(ref path) = args.attach {
        let att = attachment::attachment_from_path(path, args.mime.as_deref())
            .map_err(|e| format!("cannot attach {}: {}", path.display(), e))?;
        fields = fields.attachment(att);
    }

    let ticket = store.create(fields)?;
    if json {
        return print_json(&ticket);
    }
    println!("{}", ticket.id);
    Ok(())
}

fn cmd_status(args: StatusArgs, start: &Path, json: bool) -> CmdResult {
    let (_desk, mut store) = open(start)?;
    if !store.update_status(args.id, args.status)? {
        return Err(not_found(args.id));
    }
    if json {
        return print_json(&store.get(args.id));
    }
    println!("#{} → {}", args.id, args.status);
    Ok(())
}

fn cmd_comment(args: CommentArgs, start: &Path, json: bool) -> CmdResult {
    if args.text.trim().is_empty() {
        return Err("comment cannot be empty".into());
    }
    let (_desk, mut store) = open(start)?;
    let comment = store
        .add_comment(args.id, args.text)?
        .ok_or_else(|| not_found(args.id))?;
    if json {
        return print_json(&comment);
    }
    println!("comment added to #{}", args.id);
    Ok(())
}

fn cmd_delete(args: DeleteArgs, start: &Path) -> CmdResult {
    let (desk, mut store) = open(start)?;
    let ticket = store.get(args.id).ok_or_else(|| not_found(args.id))?;

    if !args.yes && !confirm(&format!("Delete {}?", format_ticket_line(ticket)))? {
        println!("aborted");
        return Ok(());
    }

    if let Some(removed) = store.delete(args.id)? {
        log_deletion(&desk.desk_dir, &removed);
    }
    println!("deleted #{}", args.id);
    Ok(())
}

fn log_deletion(desk_dir: &Path, ticket: &Ticket) {
    let body = serde_json::to_string_pretty(ticket).unwrap_or_default();
    recovery::log_recovery(
        desk_dir,
        RecoveryEntry::new(
            RecoveryCategory::Delete,
            format!("ticket {} deleted", ticket.id),
        )
        .field("Ticket", ticket.id.to_string())
        .field("Title", ticket.title.clone())
        .body(body),
    );
}

fn cmd_profile(args: ProfileArgs, start: &Path, json: bool) -> CmdResult {
    let (_desk, mut store) = open(start)?;

    if args.has_changes() {
        let mut profile = store.profile().clone();
        if let Some(name) = args.name {
            profile.name = name;
        }
        if let Some(email) = args.email {
            profile.email = email;
        }
        if let Some(phone) = args.phone {
            profile.phone = phone;
        }
        if let Some(department) = args.department {
            profile.department = department;
        }
        store.update_profile(profile)?;
    }

    if json {
        return print_json(store.profile());
    }
    for line in format_profile(store.profile()) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_export(args: ExportArgs, start: &Path, json: bool) -> CmdResult {
    let (desk, store) = open(start)?;
    let dir: PathBuf = args.out.unwrap_or_else(|| desk_io::export_dir(&desk));
    std::fs::create_dir_all(&dir)?;

    let doc = store.export(Utc::now());
    let path = export::write_export(&dir, &doc)?;

    if json {
        return print_json(&ExportedJson {
            path: path.display().to_string(),
            tickets: doc.tickets.len(),
        });
    }
    println!("{}", path.display());
    Ok(())
}

fn cmd_clear(args: ClearArgs, start: &Path) -> CmdResult {
    let (desk, mut store) = open(start)?;

    if !args.yes {
        if !confirm("Clear all data? This cannot be undone.")? {
            println!("aborted");
            return Ok(());
        }
        if !confirm("This deletes every ticket and resets your profile. Are you absolutely sure?")? {
            println!("aborted");
            return Ok(());
        }
    }

    let snapshot = store.export(Utc::now()).to_json_pretty()?;
    store.clear_all()?;
    recovery::log_recovery(
        &desk.desk_dir,
        RecoveryEntry::new(RecoveryCategory::Clear, "all data cleared").body(snapshot),
    );
    println!("all data cleared");
    Ok(())
}
