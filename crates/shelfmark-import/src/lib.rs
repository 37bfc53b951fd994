pub mod error;
pub mod google_books;
pub mod reconcile;

pub use error::{ImportError, Result};
pub use google_books::{GoogleBooksClient, RawVolume, VolumeQuery};
pub use reconcile::{ImportOutcome, RecordOutcome, reconcile};
