use serde::Serialize;
use tracing::{info, warn};

use shelfmark_core::{BookDraft, Catalog, IdentifierKind, normalize_pub_date};

use crate::error::Result;
use crate::google_books::RawVolume;

/// What happened to one raw volume during an import run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RecordOutcome {
    Imported {
        title: String,
    },
    /// The record carried no identifiers and an existing book matched it
    /// field for field.
    SkippedDuplicate {
        title: String,
        authors: String,
    },
    /// One of the record's identifiers already belongs to another book.
    Conflict {
        kind: IdentifierKind,
        value: String,
        book_id: i64,
    },
}

/// Per-record results of an import run, in API response order.
#[derive(Debug, Default, Serialize)]
pub struct ImportOutcome {
    pub records: Vec<RecordOutcome>,
    pub imported: usize,
    pub skipped: usize,
    /// True when an identifier conflict terminated the run early; records
    /// after the conflicting one were not processed.
    pub aborted: bool,
}

/// Walk the fetched volumes in order and insert, skip, or stop.
///
/// An identifier conflict anywhere aborts the remaining batch — the
/// conflict becomes the outcome's last record and everything imported
/// before it stays persisted. (Skipping just the conflicting record and
/// continuing would be the obvious relaxation, but it is not what the
/// import has historically done.)
pub fn reconcile(catalog: &Catalog, volumes: &[RawVolume]) -> Result<ImportOutcome> {
    let mut outcome = ImportOutcome::default();

    'volumes: for volume in volumes {
        for (kind, value) in &volume.identifiers {
            if let Some(owner) = catalog.find_identifier_owner(*kind, value)? {
                warn!(
                    kind = %kind,
                    value = %value,
                    book_id = owner.book_id,
                    "identifier conflict, aborting import run"
                );
                outcome.records.push(RecordOutcome::Conflict {
                    kind: *kind,
                    value: value.clone(),
                    book_id: owner.book_id,
                });
                outcome.aborted = true;
                break 'volumes;
            }
        }

        let draft = volume_to_draft(volume)?;

        if volume.identifiers.is_empty() {
            if let Some(existing) = catalog.find_exact_duplicate(&draft)? {
                info!(title = %draft.title, book_id = existing, "exact duplicate, skipping record");
                outcome.records.push(RecordOutcome::SkippedDuplicate {
                    title: draft.title,
                    authors: draft.authors,
                });
                outcome.skipped += 1;
                continue;
            }
        }

        catalog.insert_with_identifiers(&draft, &volume.identifiers)?;
        info!(title = %draft.title, "imported volume");
        outcome.records.push(RecordOutcome::Imported {
            title: draft.title,
        });
        outcome.imported += 1;
    }

    Ok(outcome)
}

/// Normalize a raw volume into a writable draft. The date goes through the
/// same normalizer as manual entry; an absent `publishedDate` is simply "no
/// date".
fn volume_to_draft(volume: &RawVolume) -> Result<BookDraft> {
    let pub_date = match volume.published_date.as_deref() {
        Some(raw) => normalize_pub_date(raw)?,
        None => None,
    };

    Ok(BookDraft {
        authors: volume.authors.join(", "),
        title: volume.title.clone(),
        pub_date,
        page_count: volume.page_count,
        language: volume.language.clone().unwrap_or_default(),
        cover_url: volume.cover_url.clone(),
    })
}
