pub mod batch;
pub mod classify;
pub mod layout;
pub mod locale;
pub mod rows;

use std::path::Path;

use tracing::info;

use crate::error::{BugetError, Result};
use crate::models::{ImportResult, UserId};
use classify::{classify_rows, ParseCursor};
use layout::{StatementLayout, ING_RO};

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Reject anything that is not a `.csv` upload before reading it.
pub fn check_file_type(file_name: &str) -> Result<()> {
    let is_csv = Path::new(file_name)
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if is_csv {
        Ok(())
    } else {
        Err(BugetError::UnsupportedFileType(file_name.to_string()))
    }
}

/// Parse an ING statement export into drafts for `user_id`. Never touches
/// the database.
pub fn parse_statement(bytes: &[u8], user_id: UserId) -> Result<ImportResult> {
    parse_with_layout(&ING_RO, bytes, user_id)
}

pub fn parse_with_layout(
    layout: &StatementLayout,
    bytes: &[u8],
    user_id: UserId,
) -> Result<ImportResult> {
    let rows = rows::tokenize(bytes)?;
    let Some(header_row) = layout.find_header(&rows) else {
        info!(rows = rows.len(), layout = layout.name, "no recognized header");
        return Ok(batch::no_header(rows.len()));
    };
    info!(header_row, layout = layout.name, "statement header found");

    let classified = classify_rows(layout, &rows, ParseCursor::after_header(header_row), user_id);
    let result = batch::assemble(classified, header_row, user_id);
    info!(
        drafts = result.drafts.len(),
        skipped = result.skipped_count,
        warnings = result.warnings.len(),
        "statement parsed"
    );
    Ok(result)
}

/// Entry point for callers that already hold the upload in memory.
pub fn import_upload(file_name: &str, bytes: &[u8], user_id: UserId) -> Result<ImportResult> {
    check_file_type(file_name)?;
    parse_statement(bytes, user_id)
}

pub fn import_file(file_path: &Path, user_id: UserId) -> Result<ImportResult> {
    let file_name = file_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    check_file_type(&file_name)?;
    let bytes = std::fs::read(file_path)?;
    import_upload(&file_name, &bytes, user_id)
}
