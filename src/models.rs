use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;

pub type UserId = i64;

/// Name of the fallback category every imported transaction is filed under.
pub const IMPORT_BUCKET_NAME: &str = "Uncategorized (CSV Import)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    pub fn from_db(raw: &str) -> Option<Self> {
        match raw {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed, not-yet-persisted transaction. `amount` is always positive;
/// the direction lives in `kind`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub description: String,
    pub user_id: UserId,
}

/// Lookup key for the per-user, per-kind fallback category. The persistence
/// layer resolves it to a row id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CategoryBucket {
    pub user_id: UserId,
    pub name: &'static str,
    pub kind: TransactionKind,
}

impl CategoryBucket {
    pub fn fallback(user_id: UserId, kind: TransactionKind) -> Self {
        Self {
            user_id,
            name: IMPORT_BUCKET_NAME,
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowWarning {
    pub row: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportResult {
    pub drafts: Vec<TransactionDraft>,
    pub skipped_count: usize,
    pub warnings: Vec<RowWarning>,
    pub header_row: Option<usize>,
    pub buckets: Vec<CategoryBucket>,
}

impl ImportResult {
    pub fn header_found(&self) -> bool {
        self.header_row.is_some()
    }

    pub fn count(&self, kind: TransactionKind) -> usize {
        self.drafts.iter().filter(|d| d.kind == kind).count()
    }

    pub fn summary(&self) -> ImportSummary {
        ImportSummary {
            income: self.count(TransactionKind::Income),
            expense: self.count(TransactionKind::Expense),
            bucket_name: IMPORT_BUCKET_NAME,
        }
    }
}

/// Per-kind totals for the notice shown after an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub income: usize,
    pub expense: usize,
    pub bucket_name: &'static str,
}

impl ImportSummary {
    pub fn total(&self) -> usize {
        self.income + self.expense
    }
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.income > 0 {
            parts.push(format!("income: {}", self.income));
        }
        if self.expense > 0 {
            parts.push(format!("expense: {}", self.expense));
        }
        write!(
            f,
            "Imported {} transactions into \"{}\" ({})",
            self.total(),
            self.bucket_name,
            parts.join(", ")
        )
    }
}

/// A stored transaction, as read back for listing.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: i64,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub category_name: String,
}
