use super::classify::Classified;
use crate::models::{CategoryBucket, ImportResult, RowWarning, TransactionKind, UserId};

pub const NO_HEADER_WARNING: &str = "no recognized header";

/// Fallback bucket keys for the kinds that actually occur, income first.
pub fn buckets_for(classified: &Classified, user_id: UserId) -> Vec<CategoryBucket> {
    [TransactionKind::Income, TransactionKind::Expense]
        .into_iter()
        .filter(|kind| classified.drafts.iter().any(|d| d.kind == *kind))
        .map(|kind| CategoryBucket::fallback(user_id, kind))
        .collect()
}

pub fn assemble(classified: Classified, header_row: usize, user_id: UserId) -> ImportResult {
    let buckets = buckets_for(&classified, user_id);
    ImportResult {
        drafts: classified.drafts,
        skipped_count: classified.skipped_count,
        warnings: classified.warnings,
        header_row: Some(header_row),
        buckets,
    }
}

/// Result for a file in which no header row was found.
pub fn no_header(row_count: usize) -> ImportResult {
    ImportResult {
        drafts: Vec::new(),
        skipped_count: 0,
        warnings: vec![RowWarning {
            row: row_count,
            reason: NO_HEADER_WARNING.to_string(),
        }],
        header_row: None,
        buckets: Vec::new(),
    }
}
