use std::fs;
use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::io::desk_io::{CONFIG_FILE, DESK_DIR};

const DESK_TOML_TEMPLATE: &str = r##"# ticketdesk configuration
# Tickets live in tickets.json and your profile in profile.json, next to this file.
# When tickets.json is missing, three sample tickets are shown.

[storage]
# What to do when tickets.json or profile.json cannot be parsed:
#   "fallback" keeps the broken file's contents in .recovery.log and starts
#              from sample data / the default profile
#   "strict"   refuses to run until the file is fixed
on_malformed = "fallback"

[comments]
# Name recorded on comments you add.
author = "John Doe"
# Set to true to use the name from `td profile` instead.
author_from_profile = false

[dashboard]
# How many recently created tickets `td dashboard` shows.
recent_limit = 5

[export]
# Directory for `td export` files, relative to the directory containing desk/.
# dir = "exports"
"##;

pub fn cmd_init(args: InitArgs, start: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let desk_dir = start.join(DESK_DIR);
    let config_path = desk_dir.join(CONFIG_FILE);

    if config_path.exists() && !args.force {
        return Err(format!(
            "{} already exists (use --force to overwrite the config)",
            config_path.display()
        )
        .into());
    }

    fs::create_dir_all(&desk_dir)?;
    fs::write(&config_path, DESK_TOML_TEMPLATE)?;
    println!("initialized desk in {}", desk_dir.display());
    Ok(())
}
