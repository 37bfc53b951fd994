pub mod catalog;
pub mod config;
pub mod dates;
pub mod error;
pub mod models;
pub mod storage;

pub use catalog::{Catalog, validate};
pub use config::AppConfig;
pub use dates::normalize_pub_date;
pub use error::{ExitCode, Result, ShelfmarkError};
pub use models::{Book, BookDraft, BookForm, Identifier, IdentifierKind, IdentifierSet};
pub use storage::{ConnectionPool, open_database, open_in_memory};
