use rusqlite::Connection;

use crate::error::Result;

pub fn apply_pragmas(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        ",
    )?;
    Ok(())
}

pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS books (
            id         INTEGER PRIMARY KEY,
            authors    TEXT NOT NULL,
            title      TEXT NOT NULL,
            pub_date   TEXT,
            page_count INTEGER,
            language   TEXT NOT NULL DEFAULT '',
            cover_url  TEXT,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS identifiers (
            id      INTEGER PRIMARY KEY,
            book_id INTEGER NOT NULL REFERENCES books(id) ON DELETE CASCADE,
            kind    TEXT NOT NULL CHECK(kind IN ('ISBN_10', 'ISBN_13', 'ISSN', 'OTHER')),
            value   TEXT NOT NULL
        );
        ",
    )?;
    Ok(())
}

/// The two unique indexes are the authoritative uniqueness guard: in-code
/// registry checks run first for friendly errors, but a write that slips
/// past them still cannot violate either invariant.
pub fn create_indexes(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE UNIQUE INDEX IF NOT EXISTS idx_identifiers_kind_value ON identifiers(kind, value);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_identifiers_book_kind  ON identifiers(book_id, kind);
        CREATE INDEX IF NOT EXISTS idx_identifiers_book ON identifiers(book_id);
        CREATE INDEX IF NOT EXISTS idx_books_title      ON books(title);
        ",
    )?;
    Ok(())
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    create_tables(conn)?;
    create_indexes(conn)?;
    Ok(())
}
