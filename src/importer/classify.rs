use tracing::{debug, warn};

use super::layout::{starts_transaction, StatementLayout};
use super::locale::{decode_amount, decode_date};
use super::rows::Row;
use crate::models::{RowWarning, TransactionDraft, TransactionKind, UserId};

/// Position of the next row to classify. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ParseCursor(usize);

impl ParseCursor {
    /// Cursor on the first row after the header.
    pub fn after_header(header_row: usize) -> Self {
        Self::at(header_row + 1)
    }

    pub fn at(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }

    pub fn advance(self) -> Self {
        Self(self.0 + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Too few cells to be a data row.
    ShortRow,
    /// First cell is not a transaction date.
    NotTransactionStart,
    /// Date row with neither a debit nor a credit value (balance lines and
    /// the like).
    NoAmount,
    /// Debit or credit decoded to zero or less.
    NonPositiveAmount,
}

impl SkipReason {
    /// Skips that count towards `ImportResult::skipped_count`. Rows that
    /// never looked like transactions are not counted.
    pub fn is_counted(self) -> bool {
        matches!(self, Self::NoAmount | Self::NonPositiveAmount)
    }
}

/// What happened to one row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Draft(TransactionDraft),
    Skipped(SkipReason),
    Warning(String),
}

/// Everything the classifier produced, in row order.
#[derive(Debug, Default)]
pub struct Classified {
    pub drafts: Vec<TransactionDraft>,
    pub skipped_count: usize,
    pub warnings: Vec<RowWarning>,
}

/// Classify every row from `start` to the end of `rows`.
pub fn classify_rows(
    layout: &StatementLayout,
    rows: &[Row],
    start: ParseCursor,
    user_id: UserId,
) -> Classified {
    let mut out = Classified::default();
    let mut cursor = start;
    while cursor.index() < rows.len() {
        let (outcome, next) = step(layout, rows, cursor, user_id);
        match outcome {
            RowOutcome::Draft(draft) => out.drafts.push(draft),
            RowOutcome::Skipped(reason) => {
                if reason.is_counted() {
                    out.skipped_count += 1;
                }
            }
            RowOutcome::Warning(reason) => {
                out.skipped_count += 1;
                out.warnings.push(RowWarning {
                    row: cursor.index(),
                    reason,
                });
            }
        }
        debug_assert!(next > cursor);
        cursor = next;
    }
    out
}

/// Classify the row under `cursor` and return where to continue.
pub fn step(
    layout: &StatementLayout,
    rows: &[Row],
    cursor: ParseCursor,
    user_id: UserId,
) -> (RowOutcome, ParseCursor) {
    (classify_row(layout, rows, cursor.index(), user_id), cursor.advance())
}

pub fn classify_row(
    layout: &StatementLayout,
    rows: &[Row],
    idx: usize,
    user_id: UserId,
) -> RowOutcome {
    let row = &rows[idx];
    if !layout.has_enough_cells(row) {
        return RowOutcome::Skipped(SkipReason::ShortRow);
    }
    if !starts_transaction(row) {
        debug!(row = idx, "not a transaction row");
        return RowOutcome::Skipped(SkipReason::NotTransactionStart);
    }

    let date = match decode_date(&row[layout.date_col]) {
        Ok(d) => d,
        Err(e) => {
            warn!(row = idx, "skipping row: {e}");
            return RowOutcome::Warning(e.to_string());
        }
    };

    let debit = row[layout.debit_col].trim();
    let credit = row[layout.credit_col].trim();
    let (raw_amount, kind) = if !debit.is_empty() {
        (debit, TransactionKind::Expense)
    } else if !credit.is_empty() {
        (credit, TransactionKind::Income)
    } else {
        debug!(row = idx, "no debit or credit value");
        return RowOutcome::Skipped(SkipReason::NoAmount);
    };
    let amount = match decode_amount(raw_amount) {
        Ok(a) => a,
        Err(e) => {
            warn!(row = idx, "skipping row: {e}");
            return RowOutcome::Warning(e.to_string());
        }
    };
    if amount.is_sign_negative() || amount.is_zero() {
        debug!(row = idx, %amount, "amount is not positive");
        return RowOutcome::Skipped(SkipReason::NonPositiveAmount);
    }

    let details = row_details(layout, row);
    let extra = lookahead(layout, rows, idx);
    let description = match (details, extra) {
        (Some(d), Some(x)) => format!("{d} | {x}"),
        (Some(d), None) => d.to_string(),
        (None, Some(x)) => x.to_string(),
        (None, None) => String::new(),
    };

    debug!(row = idx, %date, %amount, %kind, "parsed transaction");
    RowOutcome::Draft(TransactionDraft {
        date,
        amount,
        kind,
        description,
        user_id,
    })
}

/// Details text found on the transaction row itself.
fn row_details<'a>(layout: &StatementLayout, row: &'a Row) -> Option<&'a str> {
    let details = row[layout.details_col].trim();
    if !details.is_empty() && details != layout.details_placeholder {
        return Some(details);
    }
    row.iter()
        .find(|cell| cell.to_lowercase().contains(layout.inline_details_marker))
        .map(|cell| cell.trim())
}

/// First marker-bearing cell in the rows after `idx`, stopping at the next
/// transaction row or the end of the window.
pub fn lookahead<'a>(layout: &StatementLayout, rows: &'a [Row], idx: usize) -> Option<&'a str> {
    let end = (idx + 1 + layout.lookahead_window).min(rows.len());
    for row in rows.get(idx + 1..end)? {
        if starts_transaction(row) {
            return None;
        }
        let hit = row.iter().map(|cell| cell.trim()).find(|cell| {
            let lower = cell.to_lowercase();
            layout.lookahead_markers.iter().any(|m| lower.contains(m))
        });
        if hit.is_some() {
            return hit;
        }
    }
    None
}
