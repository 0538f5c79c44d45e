use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::model::profile::Department;
use crate::model::ticket::{Category, Priority, Status};

#[derive(Parser)]
#[command(name = "td", about = concat!("ticketdesk v", env!("CARGO_PKG_VERSION"), " - support tickets on your own disk"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different desk directory
    #[arg(short = 'C', long = "desk-dir", global = true)]
    pub desk_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new desk in the current directory
    Init(InitArgs),
    /// Show ticket counts and the most recently created tickets (default)
    Dashboard,
    /// List tickets, most recently updated first
    List(ListArgs),
    /// Show a ticket with its comments and attachments
    Show(ShowArgs),
    /// Open a new ticket
    New(NewArgs),
    /// Change a ticket's status
    Status(StatusArgs),
    /// Add a comment to a ticket
    Comment(CommentArgs),
    /// Permanently delete a ticket
    Delete(DeleteArgs),
    /// Show ticket counts by status
    Stats,
    /// Show or update your profile
    Profile(ProfileArgs),
    /// Write all tickets and the profile to a JSON file
    Export(ExportArgs),
    /// Delete all tickets and reset the profile
    Clear(ClearArgs),
    /// View or prune the recovery log
    Recovery(RecoveryArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Reinitialize even if desk/desk.toml already exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ListArgs {
    /// Case-insensitive text to find in title, description, or id
    #[arg(short, long)]
    pub search: Option<String>,
    /// Only tickets with this status (open, in-progress, resolved, closed)
    #[arg(long)]
    pub status: Option<Status>,
    /// Only tickets with this priority (low, medium, high)
    #[arg(long)]
    pub priority: Option<Priority>,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Ticket id
    pub id: u64,
}

#[derive(Args)]
pub struct NewArgs {
    /// Ticket title
    pub title: String,
    /// technical, general, billing, account, other
    #[arg(long)]
    pub category: Category,
    /// low, medium, high
    #[arg(long)]
    pub priority: Priority,
    /// Longer description of the problem
    #[arg(short, long, default_value = "")]
    pub description: String,
    /// Record this file's name, size and type on the ticket (contents are not stored)
    #[arg(long)]
    pub attach: Option<PathBuf>,
    /// MIME type for --attach (default: guessed from the extension)
    #[arg(long, requires = "attach")]
    pub mime: Option<String>,
}

#[derive(Args)]
pub struct StatusArgs {
    /// Ticket id
    pub id: u64,
    /// New status (open, in-progress, resolved, closed)
    pub status: Status,
}

#[derive(Args)]
pub struct CommentArgs {
    /// Ticket id
    pub id: u64,
    /// Comment text
    pub text: String,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Ticket id
    pub id: u64,
    /// Skip confirmation prompt
    #[arg(long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct ProfileArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    /// it, hr, finance, marketing, sales, operations, other
    #[arg(long)]
    pub department: Option<Department>,
}

impl ProfileArgs {
    pub fn has_changes(&self) -> bool {
        self.name.is_some() || self.email.is_some() || self.phone.is_some() || self.department.is_some()
    }
}

#[derive(Args)]
pub struct ExportArgs {
    /// Directory to write into (default: [export] dir from desk.toml, else the desk root)
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct ClearArgs {
    /// Skip both confirmation prompts
    #[arg(long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct RecoveryArgs {
    /// Maximum number of entries to show
    #[arg(long, default_value = "10")]
    pub limit: usize,
    /// Remove entries older than 30 days
    #[arg(long)]
    pub prune: bool,
    /// With --prune, remove every entry
    #[arg(long, requires = "prune")]
    pub all: bool,
}
