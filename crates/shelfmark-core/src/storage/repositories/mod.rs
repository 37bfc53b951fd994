mod book_repository;
mod identifier_registry;

pub use book_repository::{BookRepository, SqliteBookRepository};
pub use identifier_registry::IdentifierRegistry;
