use thiserror::Error;

use crate::models::IdentifierKind;

/// All errors that can occur in shelfmark-core.
#[derive(Debug, Error)]
pub enum ShelfmarkError {
    #[error("Book not found: {0}")]
    BookNotFound(i64),

    #[error("Invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("Identifier {kind} \"{value}\" already belongs to book {book_id}")]
    DuplicateIdentifier {
        kind: IdentifierKind,
        value: String,
        book_id: i64,
    },

    #[error("Book {book_id} already has an identifier of kind {kind}")]
    DuplicateTypeForBook { book_id: i64, kind: IdentifierKind },

    #[error("An identical book already exists: {0}")]
    DuplicateBook(i64),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Exit codes matching the CLI specification.
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    NotFound = 2,
    InvalidArgs = 3,
    NetworkError = 6,
    Conflict = 7,
    ConfirmRequired = 8,
}

impl ShelfmarkError {
    /// Process exit code a CLI should report for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::BookNotFound(_) => ExitCode::NotFound as i32,
            Self::Validation { .. } => ExitCode::InvalidArgs as i32,
            Self::DuplicateIdentifier { .. }
            | Self::DuplicateTypeForBook { .. }
            | Self::DuplicateBook(_) => ExitCode::Conflict as i32,
            _ => ExitCode::GeneralError as i32,
        }
    }
}

pub type Result<T> = std::result::Result<T, ShelfmarkError>;
