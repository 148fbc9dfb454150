//! Domain error types.

/// Top-level error type for tradejournal.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid entry: {reason}")]
    EntryInvalid { reason: String },

    #[error("journal entry {id} not found")]
    EntryNotFound { id: i64 },

    #[error("user {username} not found")]
    UserNotFound { username: String },

    #[error("image store error: {reason}")]
    ImageStore { reason: String },

    #[error("pairs fetch error: {reason}")]
    PairsFetch { reason: String },

    #[error("csv error: {reason}")]
    Csv { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&JournalError> for std::process::ExitCode {
    fn from(err: &JournalError) -> Self {
        let code: u8 = match err {
            JournalError::Io(_) | JournalError::ImageStore { .. } => 1,
            JournalError::ConfigParse { .. }
            | JournalError::ConfigMissing { .. }
            | JournalError::ConfigInvalid { .. } => 2,
            JournalError::Database { .. }
            | JournalError::DatabaseQuery { .. }
            | JournalError::PairsFetch { .. } => 3,
            JournalError::EntryInvalid { .. } | JournalError::Csv { .. } => 4,
            JournalError::EntryNotFound { .. } | JournalError::UserNotFound { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
