use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use crate::error::Result;
use crate::models::{Book, BookDraft};

/// Read/write access to book rows. Identifier rows live behind the
/// [`IdentifierRegistry`](super::IdentifierRegistry).
pub trait BookRepository {
    fn find_by_id(&self, id: i64) -> Result<Option<Book>>;
    fn insert(&self, draft: &BookDraft) -> Result<i64>;
    /// Returns false when no row with this id exists.
    fn update(&self, id: i64, draft: &BookDraft) -> Result<bool>;
    fn delete(&self, id: i64) -> Result<bool>;
    fn list(&self, limit: usize, offset: usize) -> Result<Vec<Book>>;
    fn count(&self) -> Result<usize>;
    /// Case-insensitive substring search over authors and title.
    fn search(&self, query: &str, limit: usize) -> Result<Vec<Book>>;
    /// Id of a book matching the draft on every field, if one exists.
    /// Backs the duplicate check for entries that carry no identifier.
    fn find_exact(&self, draft: &BookDraft) -> Result<Option<i64>>;
}

pub struct SqliteBookRepository<'a> {
    conn: &'a Connection,
}

const BOOK_COLUMNS: &str = "id, authors, title, pub_date, page_count, language, cover_url";

impl<'a> SqliteBookRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn row_to_book(row: &rusqlite::Row) -> rusqlite::Result<Book> {
        let pub_date: Option<String> = row.get(3)?;
        let page_count: Option<i64> = row.get(4)?;
        Ok(Book {
            id: row.get(0)?,
            authors: row.get(1)?,
            title: row.get(2)?,
            pub_date: pub_date.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
            page_count: page_count.and_then(|n| u32::try_from(n).ok()),
            language: row.get(5)?,
            cover_url: row.get(6)?,
        })
    }
}

impl BookRepository for SqliteBookRepository<'_> {
    fn find_by_id(&self, id: i64) -> Result<Option<Book>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ?1"))?;
        Ok(stmt
            .query_row(params![id], Self::row_to_book)
            .optional()?)
    }

    fn insert(&self, draft: &BookDraft) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO books (authors, title, pub_date, page_count, language, cover_url, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                draft.authors,
                draft.title,
                draft.pub_date.map(|d| d.to_string()),
                draft.page_count,
                draft.language,
                draft.cover_url,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update(&self, id: i64, draft: &BookDraft) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE books
             SET authors = ?1, title = ?2, pub_date = ?3, page_count = ?4,
                 language = ?5, cover_url = ?6, updated_at = ?7
             WHERE id = ?8",
            params![
                draft.authors,
                draft.title,
                draft.pub_date.map(|d| d.to_string()),
                draft.page_count,
                draft.language,
                draft.cover_url,
                Utc::now().to_rfc3339(),
                id,
            ],
        )?;
        Ok(changed > 0)
    }

    fn delete(&self, id: i64) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM books WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    fn list(&self, limit: usize, offset: usize) -> Result<Vec<Book>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BOOK_COLUMNS} FROM books ORDER BY id LIMIT ?1 OFFSET ?2"
        ))?;
        let rows = stmt
            .query_map(params![limit as i64, offset as i64], Self::row_to_book)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn search(&self, query: &str, limit: usize) -> Result<Vec<Book>> {
        let pattern = format!("%{}%", query.trim());
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BOOK_COLUMNS} FROM books
             WHERE title LIKE ?1 OR authors LIKE ?1
             ORDER BY id LIMIT ?2"
        ))?;
        let rows = stmt
            .query_map(params![pattern, limit as i64], Self::row_to_book)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn find_exact(&self, draft: &BookDraft) -> Result<Option<i64>> {
        // `IS` instead of `=` so absent optional fields compare equal.
        let mut stmt = self.conn.prepare(
            "SELECT id FROM books
             WHERE authors = ?1 AND title = ?2 AND pub_date IS ?3
               AND page_count IS ?4 AND language = ?5 AND cover_url IS ?6
             LIMIT 1",
        )?;
        Ok(stmt
            .query_row(
                params![
                    draft.authors,
                    draft.title,
                    draft.pub_date.map(|d| d.to_string()),
                    draft.page_count,
                    draft.language,
                    draft.cover_url,
                ],
                |row| row.get(0),
            )
            .optional()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{ConnectionPool, schema};

    fn pool() -> ConnectionPool {
        let pool = ConnectionPool::open_in_memory().unwrap();
        schema::init_schema(&pool.get_connection()).unwrap();
        pool
    }

    fn draft(title: &str) -> BookDraft {
        BookDraft {
            authors: "John Doe".to_string(),
            title: title.to_string(),
            pub_date: NaiveDate::from_ymd_opt(1990, 10, 20),
            page_count: Some(9),
            language: "en".to_string(),
            cover_url: None,
        }
    }

    #[test]
    fn insert_and_find_round_trip() {
        let pool = pool();
        let conn = pool.get_connection();
        let repo = SqliteBookRepository::new(&conn);

        let id = repo.insert(&draft("Life of John")).unwrap();
        let book = repo.find_by_id(id).unwrap().unwrap();
        assert_eq!(book.title, "Life of John");
        assert_eq!(book.pub_date, NaiveDate::from_ymd_opt(1990, 10, 20));
        assert_eq!(book.page_count, Some(9));
        assert!(repo.find_by_id(id + 1).unwrap().is_none());
    }

    #[test]
    fn update_rewrites_fields() {
        let pool = pool();
        let conn = pool.get_connection();
        let repo = SqliteBookRepository::new(&conn);

        let id = repo.insert(&draft("First")).unwrap();
        let mut changed = draft("Second");
        changed.page_count = None;
        assert!(repo.update(id, &changed).unwrap());

        let book = repo.find_by_id(id).unwrap().unwrap();
        assert_eq!(book.title, "Second");
        assert_eq!(book.page_count, None);
        assert!(!repo.update(id + 1, &changed).unwrap());
    }

    #[test]
    fn list_and_count() {
        let pool = pool();
        let conn = pool.get_connection();
        let repo = SqliteBookRepository::new(&conn);

        for i in 0..3 {
            repo.insert(&draft(&format!("Book {i}"))).unwrap();
        }
        assert_eq!(repo.count().unwrap(), 3);
        let page = repo.list(2, 1).unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].title, "Book 1");
    }

    #[test]
    fn search_matches_title_and_authors() {
        let pool = pool();
        let conn = pool.get_connection();
        let repo = SqliteBookRepository::new(&conn);

        repo.insert(&draft("Life of John")).unwrap();
        let mut other = draft("Unrelated");
        other.authors = "Jane Roe".to_string();
        repo.insert(&other).unwrap();

        assert_eq!(repo.search("life", 10).unwrap().len(), 1);
        assert_eq!(repo.search("roe", 10).unwrap().len(), 1);
        assert!(repo.search("missing", 10).unwrap().is_empty());
    }

    #[test]
    fn find_exact_requires_full_tuple_match() {
        let pool = pool();
        let conn = pool.get_connection();
        let repo = SqliteBookRepository::new(&conn);

        let id = repo.insert(&draft("Life of John")).unwrap();
        assert_eq!(repo.find_exact(&draft("Life of John")).unwrap(), Some(id));

        let mut near = draft("Life of John");
        near.page_count = Some(10);
        assert_eq!(repo.find_exact(&near).unwrap(), None);
    }

    #[test]
    fn find_exact_matches_absent_optionals() {
        let pool = pool();
        let conn = pool.get_connection();
        let repo = SqliteBookRepository::new(&conn);

        let mut bare = draft("Bare");
        bare.pub_date = None;
        bare.page_count = None;
        let id = repo.insert(&bare).unwrap();
        assert_eq!(repo.find_exact(&bare).unwrap(), Some(id));
    }
}
