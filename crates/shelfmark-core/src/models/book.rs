use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Upper bound for free-text fields (authors, title, identifier values,
/// cover address).
pub const MAX_FIELD_LEN: usize = 250;

/// A persisted catalog entry. The id is the SQLite rowid assigned at
/// creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    /// One free-text string; multiple names are comma-joined.
    pub authors: String,
    pub title: String,
    pub pub_date: Option<NaiveDate>,
    pub page_count: Option<u32>,
    /// Two-letter code as reported by the API ("en", "pl"); not checked
    /// against a real ISO list.
    pub language: String,
    pub cover_url: Option<String>,
}

/// A validated book ready to be written — everything a [`Book`] has except
/// the id. Produced by the catalog's form validation and by the import
/// reconciler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookDraft {
    pub authors: String,
    pub title: String,
    pub pub_date: Option<NaiveDate>,
    pub page_count: Option<u32>,
    pub language: String,
    pub cover_url: Option<String>,
}

/// Raw manual-entry submission, before validation. The publication date is
/// kept as the typed string so partial dates ("1990", "1990-10") can be
/// normalized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookForm {
    pub authors: String,
    pub title: String,
    #[serde(default)]
    pub pub_date: String,
    pub page_count: Option<i64>,
    pub language: String,
    pub cover_url: Option<String>,
}
