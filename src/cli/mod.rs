pub mod import;
pub mod init;
pub mod status;
pub mod transactions;

use clap::{Parser, Subcommand};
use rusqlite::Connection;

use crate::db::{get_connection, init_db};
use crate::error::{BugetError, Result};
use crate::settings::Settings;

/// Open the configured database, failing with a hint if `init` never ran.
pub(crate) fn open_db(settings: &Settings) -> Result<Connection> {
    let db_path = settings.db_path();
    if !db_path.exists() {
        return Err(BugetError::Settings(format!(
            "No database found at {}\nRun `buget init` to create one.",
            db_path.display()
        )));
    }
    let conn = get_connection(&db_path)?;
    init_db(&conn)?;
    Ok(conn)
}

#[derive(Parser)]
#[command(name = "buget", about = "Personal budget ledger with ING statement import.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and initialize the database.
    Init {
        /// Path for buget data (default: ~/Documents/buget)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Default user for imports
        #[arg(long)]
        user: Option<String>,
    },
    /// Import an ING statement CSV export.
    Import {
        /// Path to the CSV export
        file: String,
        /// User to import for (default: from settings)
        #[arg(long)]
        user: Option<String>,
        /// Parse and show the transactions without saving them
        #[arg(long = "dry-run")]
        dry_run: bool,
    },
    /// List stored transactions, newest first.
    Transactions {
        /// User whose transactions to list (default: from settings)
        #[arg(long)]
        user: Option<String>,
        /// Maximum number of rows
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Show settings and database statistics.
    Status,
}
