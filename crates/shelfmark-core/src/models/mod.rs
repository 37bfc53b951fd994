mod book;
mod identifier;

pub use book::{Book, BookDraft, BookForm, MAX_FIELD_LEN};
pub use identifier::{Identifier, IdentifierKind, IdentifierSet};
