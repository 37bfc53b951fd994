use std::path::Path;

use crate::dates::normalize_pub_date;
use crate::error::{Result, ShelfmarkError};
use crate::models::{
    Book, BookDraft, BookForm, Identifier, IdentifierKind, IdentifierSet, MAX_FIELD_LEN,
};
use crate::storage::repositories::{BookRepository, IdentifierRegistry, SqliteBookRepository};
use crate::storage::{ConnectionPool, open_database, open_in_memory};

/// The catalog service: field validation, the identifier uniqueness rules,
/// and the duplicate-book checks, on top of the SQLite store. Every write
/// runs inside one transaction, so a conflict detected halfway through
/// persists nothing.
pub struct Catalog {
    pool: ConnectionPool,
}

impl Catalog {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            pool: open_database(path)?,
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            pool: open_in_memory()?,
        })
    }

    // ── Manual entry ───────────────────────────────────────────────────

    /// Validate a manual submission and persist it with its identifiers.
    ///
    /// A submission carrying no identifier values is rejected when an
    /// existing book matches it field for field; there would be nothing to
    /// disambiguate the copies later.
    pub fn add_book(&self, form: &BookForm, idents: &IdentifierSet) -> Result<i64> {
        let draft = validate(form)?;
        let conn = self.pool.get_connection();
        let tx = conn.unchecked_transaction()?;

        let repo = SqliteBookRepository::new(&tx);
        let registry = IdentifierRegistry::new(&tx);

        if idents.is_empty() {
            if let Some(existing) = repo.find_exact(&draft)? {
                return Err(ShelfmarkError::DuplicateBook(existing));
            }
        } else {
            for (kind, value) in idents.entries() {
                registry.check_available(kind, value)?;
            }
        }

        let book_id = repo.insert(&draft)?;
        for (kind, value) in idents.entries() {
            registry.check_and_register(book_id, None, kind, value)?;
        }

        tx.commit()?;
        Ok(book_id)
    }

    /// Update a book and process the multi-kind identifier form: for each
    /// kind, an existing identifier is updated in place, a new value is
    /// inserted, and a blank slot is a no-op.
    pub fn edit_book(&self, id: i64, form: &BookForm, idents: &IdentifierSet) -> Result<()> {
        let draft = validate(form)?;
        let conn = self.pool.get_connection();
        let tx = conn.unchecked_transaction()?;

        let repo = SqliteBookRepository::new(&tx);
        let registry = IdentifierRegistry::new(&tx);

        if !repo.update(id, &draft)? {
            return Err(ShelfmarkError::BookNotFound(id));
        }

        for kind in IdentifierKind::ALL {
            if let Some(value) = idents.get(kind) {
                let existing = registry.kind_on_book(id, kind, None)?;
                registry.check_and_register(id, existing.map(|row| row.id), kind, value)?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Remove a book together with all of its identifiers. Identifier rows
    /// never outlive their book.
    pub fn delete_book(&self, id: i64) -> Result<()> {
        let conn = self.pool.get_connection();
        let tx = conn.unchecked_transaction()?;

        IdentifierRegistry::new(&tx).delete_for_book(id)?;
        if !SqliteBookRepository::new(&tx).delete(id)? {
            return Err(ShelfmarkError::BookNotFound(id));
        }

        tx.commit()?;
        Ok(())
    }

    // ── Read side ──────────────────────────────────────────────────────

    pub fn get_book(&self, id: i64) -> Result<Book> {
        let conn = self.pool.get_connection();
        SqliteBookRepository::new(&conn)
            .find_by_id(id)?
            .ok_or(ShelfmarkError::BookNotFound(id))
    }

    pub fn identifiers_of(&self, id: i64) -> Result<Vec<Identifier>> {
        let conn = self.pool.get_connection();
        IdentifierRegistry::new(&conn).for_book(id)
    }

    /// `"KIND: value"` strings for a book's identifiers, in row order.
    pub fn identifier_display(&self, id: i64) -> Result<Vec<String>> {
        Ok(self
            .identifiers_of(id)?
            .iter()
            .map(Identifier::display)
            .collect())
    }

    pub fn list_books(&self, limit: usize, offset: usize) -> Result<Vec<Book>> {
        let conn = self.pool.get_connection();
        SqliteBookRepository::new(&conn).list(limit, offset)
    }

    pub fn count_books(&self) -> Result<usize> {
        let conn = self.pool.get_connection();
        SqliteBookRepository::new(&conn).count()
    }

    pub fn search_books(&self, query: &str, limit: usize) -> Result<Vec<Book>> {
        let conn = self.pool.get_connection();
        SqliteBookRepository::new(&conn).search(query, limit)
    }

    // ── Import support ─────────────────────────────────────────────────

    /// Owner of a (kind, value) pair, if any — the reconciler's read-only
    /// pre-check.
    pub fn find_identifier_owner(
        &self,
        kind: IdentifierKind,
        value: &str,
    ) -> Result<Option<Identifier>> {
        let conn = self.pool.get_connection();
        IdentifierRegistry::new(&conn).find_by_kind_value(kind, value)
    }

    /// Exact full-tuple duplicate of an already-normalized draft, used for
    /// records with no identifiers.
    pub fn find_exact_duplicate(&self, draft: &BookDraft) -> Result<Option<i64>> {
        let conn = self.pool.get_connection();
        SqliteBookRepository::new(&conn).find_exact(draft)
    }

    /// Persist an already-normalized draft plus its identifiers in one
    /// transaction. The registry checks still apply.
    pub fn insert_with_identifiers(
        &self,
        draft: &BookDraft,
        idents: &[(IdentifierKind, String)],
    ) -> Result<i64> {
        let conn = self.pool.get_connection();
        let tx = conn.unchecked_transaction()?;

        let book_id = SqliteBookRepository::new(&tx).insert(draft)?;
        let registry = IdentifierRegistry::new(&tx);
        for (kind, value) in idents {
            registry.check_and_register(book_id, None, *kind, value)?;
        }

        tx.commit()?;
        Ok(book_id)
    }
}

// ─── Validation ──────────────────────────────────────────────────────────

fn required(field: &'static str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ShelfmarkError::Validation {
            field,
            message: "must not be empty".to_string(),
        });
    }
    if value.len() > MAX_FIELD_LEN {
        return Err(ShelfmarkError::Validation {
            field,
            message: format!("longer than {MAX_FIELD_LEN} characters"),
        });
    }
    Ok(value.to_string())
}

/// Check a manual submission field by field and normalize the publication
/// date. Nothing is persisted here.
pub fn validate(form: &BookForm) -> Result<BookDraft> {
    let authors = required("authors", &form.authors)?;
    let title = required("title", &form.title)?;

    let language = form.language.trim();
    if language.chars().count() != 2 {
        return Err(ShelfmarkError::Validation {
            field: "language",
            message: format!("\"{language}\" is not a 2-letter code"),
        });
    }

    let page_count = match form.page_count {
        None => None,
        Some(n) => Some(u32::try_from(n).map_err(|_| ShelfmarkError::Validation {
            field: "page_count",
            message: format!("{n} is not a non-negative integer"),
        })?),
    };

    let cover_url = match form.cover_url.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(addr) => {
            if addr.len() > MAX_FIELD_LEN {
                return Err(ShelfmarkError::Validation {
                    field: "cover_url",
                    message: format!("longer than {MAX_FIELD_LEN} characters"),
                });
            }
            url::Url::parse(addr).map_err(|e| ShelfmarkError::Validation {
                field: "cover_url",
                message: format!("not a valid URL: {e}"),
            })?;
            Some(addr.to_string())
        }
    };

    Ok(BookDraft {
        authors,
        title,
        pub_date: normalize_pub_date(&form.pub_date)?,
        page_count,
        language: language.to_string(),
        cover_url,
    })
}
