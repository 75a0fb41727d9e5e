mod cli;
mod db;
mod error;
mod fmt;
mod importer;
mod models;
mod settings;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings::load_settings().log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Commands::Init { data_dir, user } => cli::init::run(data_dir, user),
        Commands::Import {
            file,
            user,
            dry_run,
        } => cli::import::run(&file, user.as_deref(), dry_run),
        Commands::Transactions { user, limit } => cli::transactions::run(user.as_deref(), limit),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
