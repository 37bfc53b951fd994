use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};

use shelfmark_core::{AppConfig, Book, BookForm, Catalog, ExitCode, IdentifierSet};
use shelfmark_import::{GoogleBooksClient, ImportError, RecordOutcome, VolumeQuery, reconcile};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "shelfmark",
    about = "Personal book catalog with Google Books import",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format (for scripts).
    /// Also enabled by setting SHELFMARK_JSON=1.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List books in the catalog.
    List {
        #[arg(long, default_value = "50")]
        limit: usize,
        #[arg(long, default_value = "0")]
        offset: usize,
    },

    /// Search books by a title/authors fragment.
    Search {
        query: String,
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Show one book with its identifiers.
    Show { id: i64 },

    /// Add a book manually.
    Add {
        #[arg(long)]
        authors: String,
        #[arg(long)]
        title: String,
        /// Publication date: YYYY, YYYY-MM or YYYY-MM-DD.
        #[arg(long, default_value = "")]
        pub_date: String,
        #[arg(long)]
        page_count: Option<i64>,
        /// 2-letter code, e.g. "en", "pl".
        #[arg(long)]
        language: String,
        #[arg(long)]
        cover_url: Option<String>,
        #[command(flatten)]
        idents: IdentifierArgs,
    },

    /// Edit a book; omitted fields keep their current value.
    Edit {
        id: i64,
        #[arg(long)]
        authors: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        pub_date: Option<String>,
        #[arg(long)]
        page_count: Option<i64>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        cover_url: Option<String>,
        #[command(flatten)]
        idents: IdentifierArgs,
    },

    /// Delete a book and all of its identifiers.
    Delete {
        id: i64,
        #[arg(long)]
        confirm: bool,
    },

    /// Import volumes from the Google Books API by keyword filters.
    Import {
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        isbn: Option<String>,
        #[arg(long)]
        lccn: Option<String>,
        #[arg(long)]
        oclc: Option<String>,
    },

    /// Show version information.
    Version,
}

/// One optional value per identifier kind; blank slots are no-ops.
#[derive(Debug, Default, clap::Args)]
struct IdentifierArgs {
    #[arg(long)]
    isbn_10: Option<String>,
    #[arg(long)]
    isbn_13: Option<String>,
    #[arg(long)]
    issn: Option<String>,
    #[arg(long)]
    other: Option<String>,
}

impl IdentifierArgs {
    fn into_set(self) -> IdentifierSet {
        IdentifierSet {
            isbn_10: self.isbn_10,
            isbn_13: self.isbn_13,
            issn: self.issn,
            other: self.other,
        }
    }
}

// ─── Main ────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let start = Instant::now();
    let cli = Cli::parse();

    let json_output = cli.json || std::env::var("SHELFMARK_JSON").as_deref() == Ok("1");

    let mut config = AppConfig::load().unwrap_or_default();
    if let Ok(db_path) = std::env::var("SHELFMARK_DB_PATH") {
        config.storage.database_path = db_path;
    }

    match cli.command {
        Commands::List { limit, offset } => {
            let catalog = open_catalog(&config)?;
            let books = or_exit(catalog.list_books(limit, offset), json_output);
            let dur = start.elapsed().as_millis();

            if json_output {
                let total = or_exit(catalog.count_books(), json_output);
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "items": books, "total": total, "limit": limit, "offset": offset },
                    "meta": { "duration_ms": dur }
                }))?;
            } else if books.is_empty() {
                println!("No books in the catalog. Use `shelfmark add` or `shelfmark import`.");
            } else {
                for book in &books {
                    print_book_line(book);
                }
            }
        }

        Commands::Search { query, limit } => {
            let catalog = open_catalog(&config)?;
            let books = or_exit(catalog.search_books(&query, limit), json_output);
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "items": books, "total": books.len(), "query": query },
                    "meta": { "duration_ms": dur }
                }))?;
            } else if books.is_empty() {
                println!("No results for: {query}");
            } else {
                println!("Found {} result(s):", books.len());
                for book in &books {
                    print_book_line(book);
                }
            }
        }

        Commands::Show { id } => {
            let catalog = open_catalog(&config)?;
            let book = or_exit(catalog.get_book(id), json_output);
            let display = or_exit(catalog.identifier_display(id), json_output);
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "book": book, "identifiers": display },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                println!("{} — {}", book.id, book.title);
                println!("  authors:    {}", book.authors);
                if let Some(date) = book.pub_date {
                    println!("  published:  {date}");
                }
                if let Some(pages) = book.page_count {
                    println!("  pages:      {pages}");
                }
                println!("  language:   {}", book.language);
                if let Some(cover) = &book.cover_url {
                    println!("  cover:      {cover}");
                }
                for line in &display {
                    println!("  identifier: {line}");
                }
            }
        }

        Commands::Add {
            authors,
            title,
            pub_date,
            page_count,
            language,
            cover_url,
            idents,
        } => {
            let catalog = open_catalog(&config)?;
            let form = BookForm {
                authors,
                title,
                pub_date,
                page_count,
                language,
                cover_url,
            };
            let id = or_exit(catalog.add_book(&form, &idents.into_set()), json_output);
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "id": id, "title": form.title },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                println!("Added: {} ({id})", form.title);
            }
        }

        Commands::Edit {
            id,
            authors,
            title,
            pub_date,
            page_count,
            language,
            cover_url,
            idents,
        } => {
            let catalog = open_catalog(&config)?;
            let current = or_exit(catalog.get_book(id), json_output);
            let form = BookForm {
                authors: authors.unwrap_or(current.authors),
                title: title.unwrap_or(current.title),
                pub_date: pub_date
                    .unwrap_or_else(|| current.pub_date.map(|d| d.to_string()).unwrap_or_default()),
                page_count: page_count.or(current.page_count.map(i64::from)),
                language: language.unwrap_or(current.language),
                cover_url: cover_url.or(current.cover_url),
            };
            or_exit(catalog.edit_book(id, &form, &idents.into_set()), json_output);
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "id": id, "title": form.title },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                println!("Updated: {} ({id})", form.title);
            }
        }

        Commands::Delete { id, confirm } => {
            if !confirm {
                eprintln!("Add --confirm to delete without prompt.");
                std::process::exit(ExitCode::ConfirmRequired as i32);
            }
            let catalog = open_catalog(&config)?;
            or_exit(catalog.delete_book(id), json_output);
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "deleted": id },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                println!("Deleted book: {id}");
            }
        }

        Commands::Import {
            author,
            title,
            isbn,
            lccn,
            oclc,
        } => {
            let catalog = open_catalog(&config)?;
            let query = VolumeQuery {
                author,
                title,
                isbn,
                lccn,
                oclc,
            };

            let runtime = tokio::runtime::Runtime::new()?;
            let outcome = runtime.block_on(async {
                let client = GoogleBooksClient::with_base_url(&config.metadata.base_url);
                let volumes = client.search(&query).await?;
                reconcile(&catalog, &volumes)
            });
            let outcome = match outcome {
                Ok(outcome) => outcome,
                Err(err) => fail_import(err, json_output),
            };
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": outcome,
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                for record in &outcome.records {
                    match record {
                        RecordOutcome::Imported { title } => println!("  Imported: {title}"),
                        RecordOutcome::SkippedDuplicate { title, authors } => {
                            println!("  Skipped duplicate: {title} ({authors})")
                        }
                        RecordOutcome::Conflict {
                            kind,
                            value,
                            book_id,
                        } => println!(
                            "  Conflict: {kind} {value} already belongs to book {book_id}"
                        ),
                    }
                }
                println!(
                    "Imported {} book(s), skipped {}{}.",
                    outcome.imported,
                    outcome.skipped,
                    if outcome.aborted {
                        " — run aborted on an identifier conflict"
                    } else {
                        ""
                    }
                );
            }
            if outcome.aborted {
                std::process::exit(ExitCode::Conflict as i32);
            }
        }

        Commands::Version => {
            let version = env!("CARGO_PKG_VERSION");
            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "version": version }
                }))?;
            } else {
                println!("shelfmark v{version}");
            }
        }
    }

    Ok(())
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}

fn print_book_line(book: &Book) {
    let year = book
        .pub_date
        .map(|d| d.format("%Y").to_string())
        .unwrap_or_default();
    println!(
        "{id:>4}  {title:<40}  {authors:<25}  {year}",
        id = book.id,
        title = book.title,
        authors = book.authors,
    );
}

fn open_catalog(config: &AppConfig) -> Result<Catalog> {
    let db_path = config.database_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(Catalog::open(&db_path)?)
}

fn or_exit<T>(result: shelfmark_core::Result<T>, json_output: bool) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            if json_output {
                let _ = print_json(&serde_json::json!({
                    "status": "error",
                    "message": err.to_string()
                }));
            } else {
                eprintln!("Error: {err}");
            }
            std::process::exit(err.exit_code());
        }
    }
}

fn fail_import(err: ImportError, json_output: bool) -> ! {
    if json_output {
        let _ = print_json(&serde_json::json!({
            "status": "error",
            "message": err.to_string()
        }));
    } else {
        eprintln!("Import failed: {err}");
    }
    std::process::exit(err.exit_code());
}
