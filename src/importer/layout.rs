use std::sync::OnceLock;

use regex::Regex;

use super::rows::Row;

#[derive(Debug, Clone, Copy)]
pub enum Match {
    /// Cell, trimmed, equals the literal.
    Equals(&'static str),
    /// Cell contains the literal anywhere.
    Contains(&'static str),
}

/// One column constraint of a header signature.
#[derive(Debug, Clone, Copy)]
pub struct ColumnRule {
    pub column: usize,
    pub rule: Match,
}

impl ColumnRule {
    pub const fn equals(column: usize, literal: &'static str) -> Self {
        Self { column, rule: Match::Equals(literal) }
    }

    pub const fn contains(column: usize, literal: &'static str) -> Self {
        Self { column, rule: Match::Contains(literal) }
    }

    pub fn matches(&self, row: &Row) -> bool {
        let Some(cell) = row.get(self.column) else {
            return false;
        };
        match self.rule {
            Match::Equals(lit) => cell.trim() == lit,
            Match::Contains(lit) => cell.contains(lit),
        }
    }
}

/// Column positions and literals describing one bank export layout.
#[derive(Debug)]
pub struct StatementLayout {
    pub name: &'static str,
    /// Header and data rows need strictly more cells than this.
    pub min_cells_exclusive: usize,
    pub header: &'static [ColumnRule],
    pub date_col: usize,
    pub details_col: usize,
    pub debit_col: usize,
    pub credit_col: usize,
    /// Row-level details text that carries no information on its own.
    pub details_placeholder: &'static str,
    /// Lowercase marker for an inline details cell on the transaction row.
    pub inline_details_marker: &'static str,
    /// Lowercase markers looked for in the rows following a transaction.
    pub lookahead_markers: &'static [&'static str],
    pub lookahead_window: usize,
}

pub const ING_RO: StatementLayout = StatementLayout {
    name: "ING Romania",
    min_cells_exclusive: 8,
    header: &[
        ColumnRule::equals(1, "Data"),
        ColumnRule::contains(4, "Detalii tranzactie"),
        ColumnRule::contains(7, "Debit"),
        ColumnRule::contains(8, "Credit"),
    ],
    date_col: 0,
    details_col: 3,
    debit_col: 6,
    credit_col: 8,
    details_placeholder: "Incasare",
    inline_details_marker: "detalii:",
    lookahead_markers: &["terminal:", "beneficiar:", "ordonator:"],
    lookahead_window: 5,
};

impl StatementLayout {
    pub fn has_enough_cells(&self, row: &Row) -> bool {
        row.len() > self.min_cells_exclusive
    }

    pub fn is_header(&self, row: &Row) -> bool {
        self.has_enough_cells(row) && self.header.iter().all(|rule| rule.matches(row))
    }

    /// Index of the first row matching the header signature.
    pub fn find_header(&self, rows: &[Row]) -> Option<usize> {
        rows.iter().position(|row| self.is_header(row))
    }
}

fn transaction_start_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[0-9]{2} [A-Za-zăâîșțĂÂÎȘȚşţŞŢ]+ [0-9]{4}$").expect("static pattern")
    })
}

/// Whether a (trimmed) first cell looks like `01 ianuarie 2024`.
pub fn is_transaction_start(cell: &str) -> bool {
    transaction_start_re().is_match(cell)
}

/// Whether this row begins a new transaction, judged by its first cell only.
pub fn starts_transaction(row: &Row) -> bool {
    row.first().is_some_and(|cell| is_transaction_start(cell.trim()))
}
