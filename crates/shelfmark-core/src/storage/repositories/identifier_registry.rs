use std::str::FromStr;

use rusqlite::{Connection, OptionalExtension, params};

use crate::error::{Result, ShelfmarkError};
use crate::models::{Identifier, IdentifierKind};

/// Uniqueness rules for identifier rows:
///
/// - a (kind, value) pair belongs to at most one book in the whole catalog;
/// - a book carries at most one identifier of each kind.
///
/// Checks here are indexed lookups run inside the caller's transaction, so
/// a conflicting write cannot interleave between check and register; the
/// unique indexes in the schema back them up.
pub struct IdentifierRegistry<'a> {
    conn: &'a Connection,
}

impl<'a> IdentifierRegistry<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn row_to_identifier(row: &rusqlite::Row) -> rusqlite::Result<Identifier> {
        let kind: String = row.get(2)?;
        Ok(Identifier {
            id: row.get(0)?,
            book_id: row.get(1)?,
            kind: IdentifierKind::from_str(&kind).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    2,
                    rusqlite::types::Type::Text,
                    e.into(),
                )
            })?,
            value: row.get(3)?,
        })
    }

    /// The owner of a (kind, value) pair anywhere in the catalog, if any.
    pub fn find_by_kind_value(
        &self,
        kind: IdentifierKind,
        value: &str,
    ) -> Result<Option<Identifier>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, book_id, kind, value FROM identifiers
             WHERE kind = ?1 AND value = ?2",
        )?;
        Ok(stmt
            .query_row(params![kind.as_str(), value], Self::row_to_identifier)
            .optional()?)
    }

    /// This book's identifier of the given kind, skipping `exclude_row`
    /// (the row being updated in place, when there is one).
    pub fn kind_on_book(
        &self,
        book_id: i64,
        kind: IdentifierKind,
        exclude_row: Option<i64>,
    ) -> Result<Option<Identifier>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, book_id, kind, value FROM identifiers
             WHERE book_id = ?1 AND kind = ?2 AND id IS NOT ?3",
        )?;
        Ok(stmt
            .query_row(
                params![book_id, kind.as_str(), exclude_row],
                Self::row_to_identifier,
            )
            .optional()?)
    }

    pub fn for_book(&self, book_id: i64) -> Result<Vec<Identifier>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, book_id, kind, value FROM identifiers
             WHERE book_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![book_id], Self::row_to_identifier)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Creation-path pre-check: the book does not exist yet, so any owner
    /// of this (kind, value) pair is a conflict.
    pub fn check_available(&self, kind: IdentifierKind, value: &str) -> Result<()> {
        match self.find_by_kind_value(kind, value)? {
            Some(existing) => Err(ShelfmarkError::DuplicateIdentifier {
                kind,
                value: value.to_string(),
                book_id: existing.book_id,
            }),
            None => Ok(()),
        }
    }

    /// Check both uniqueness rules for a candidate (kind, value) on
    /// `book_id`, then write it: an update of `row` when given, otherwise a
    /// fresh insert. Returns the written row's id.
    pub fn check_and_register(
        &self,
        book_id: i64,
        row: Option<i64>,
        kind: IdentifierKind,
        value: &str,
    ) -> Result<i64> {
        if let Some(existing) = self.find_by_kind_value(kind, value)? {
            if existing.book_id != book_id {
                return Err(ShelfmarkError::DuplicateIdentifier {
                    kind,
                    value: value.to_string(),
                    book_id: existing.book_id,
                });
            }
        }

        if self.kind_on_book(book_id, kind, row)?.is_some() {
            return Err(ShelfmarkError::DuplicateTypeForBook { book_id, kind });
        }

        match row {
            Some(row_id) => {
                self.conn.execute(
                    "UPDATE identifiers SET value = ?1 WHERE id = ?2",
                    params![value, row_id],
                )?;
                Ok(row_id)
            }
            None => {
                self.conn.execute(
                    "INSERT INTO identifiers (book_id, kind, value) VALUES (?1, ?2, ?3)",
                    params![book_id, kind.as_str(), value],
                )?;
                Ok(self.conn.last_insert_rowid())
            }
        }
    }

    pub fn delete_for_book(&self, book_id: i64) -> Result<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM identifiers WHERE book_id = ?1",
            params![book_id],
        )?;
        Ok(deleted)
    }
}
