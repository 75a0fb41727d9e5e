use std::path::PathBuf;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::db::{ensure_user, persist_import};
use crate::error::Result;
use crate::fmt::signed_money;
use crate::importer::{check_file_type, import_file};
use crate::models::{ImportResult, UserId};
use crate::settings::load_settings;

/// Drafts parsed for preview are not attached to a stored user.
const PREVIEW_USER: UserId = 0;

pub fn run(file: &str, user: Option<&str>, dry_run: bool) -> Result<()> {
    check_file_type(file)?;
    let file_path = PathBuf::from(file);

    if dry_run {
        let result = import_file(&file_path, PREVIEW_USER)?;
        if report_empty(&result, file) {
            return Ok(());
        }
        print_drafts(&result);
        for w in &result.warnings {
            println!("  row {}: {}", w.row + 1, w.reason);
        }
        println!("Skipped rows: {}", result.skipped_count);
        println!("Dry run: {} (nothing saved)", result.summary());
        return Ok(());
    }

    let settings = load_settings();
    let username = settings.resolve_user(user)?;
    let mut conn = open_db(&settings)?;
    let user_id = ensure_user(&conn, &username)?;

    let result = import_file(&file_path, user_id)?;
    if report_empty(&result, file) {
        return Ok(());
    }
    let outcome = persist_import(&mut conn, &result)?;
    println!("{}", result.summary().to_string().green());
    let noun = if outcome.buckets == 1 { "category" } else { "categories" };
    println!("{} saved in {} {noun}.", outcome.inserted, outcome.buckets);
    if result.skipped_count > 0 {
        println!("Skipped rows: {}", result.skipped_count);
    }
    Ok(())
}

/// Print a notice and return true when there is nothing to import.
fn report_empty(result: &ImportResult, file: &str) -> bool {
    if !result.header_found() {
        println!(
            "{}",
            format!("No ING statement header found in {file}; nothing imported.").yellow()
        );
        return true;
    }
    if !result.warnings.is_empty() {
        println!("{} rows could not be read and were skipped.", result.warnings.len());
    }
    if result.drafts.is_empty() {
        println!(
            "{}",
            "Statement header found, but no valid transactions could be extracted.".yellow()
        );
        return true;
    }
    false
}

fn print_drafts(result: &ImportResult) {
    let mut table = Table::new();
    table.set_header(vec!["Date", "Type", "Amount", "Description"]);
    for d in &result.drafts {
        table.add_row(vec![
            Cell::new(d.date.format("%Y-%m-%d")),
            Cell::new(d.kind),
            Cell::new(signed_money(d.amount, d.kind)),
            Cell::new(&d.description),
        ]);
    }
    println!("{table}");
}
