use thiserror::Error;

#[derive(Error, Debug)]
pub enum BugetError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unsupported file type: {0} (expected a .csv export)")]
    UnsupportedFileType(String),

    #[error("Unreadable input: {0}")]
    UnreadableInput(String),

    #[error("Unknown user: {0}")]
    UnknownUser(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, BugetError>;

/// Row-scoped decode failures. These never abort an import; the classifier
/// turns them into warnings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid date '{input}': {reason}")]
    Date { input: String, reason: String },

    #[error("invalid amount '{input}': {reason}")]
    Amount { input: String, reason: String },
}

impl DecodeError {
    pub(crate) fn date(input: &str, reason: impl Into<String>) -> Self {
        Self::Date {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn amount(input: &str, reason: impl Into<String>) -> Self {
        Self::Amount {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
