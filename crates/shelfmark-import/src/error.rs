use thiserror::Error;

use shelfmark_core::ShelfmarkError;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("fill in at least one keyword filter to import books")]
    EmptyQuery,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error from {0}: {1}")]
    Api(String, String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Catalog(#[from] ShelfmarkError),
}

impl ImportError {
    /// Process exit code a CLI should report for this error.
    pub fn exit_code(&self) -> i32 {
        use shelfmark_core::ExitCode;
        match self {
            Self::EmptyQuery => ExitCode::InvalidArgs as i32,
            Self::Http(_) | Self::Api(..) | Self::Parse(_) => ExitCode::NetworkError as i32,
            Self::Catalog(e) => e.exit_code(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;
