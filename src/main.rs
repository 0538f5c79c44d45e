use clap::Parser;
use ticketdesk::cli::commands::Cli;
use ticketdesk::cli::handlers;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
