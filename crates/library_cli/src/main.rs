//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `library_core` linkage and store bootstrap without a UI host.
//! - Print a deterministic catalog summary for quick local sanity checks.
//!
//! Usage: `library_cli [DB_PATH]`. Without a path an in-memory store is used.

use library_core::db::{open_db, open_db_in_memory};
use library_core::{Identity, LibraryService, LibraryView, SqliteCollectionStore};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("library_core ping={}", library_core::ping());
    println!("library_core version={}", library_core::core_version());

    match run(std::env::args().nth(1)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("library_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(db_path: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let conn = match db_path.as_deref() {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    let library = LibraryService::new(SqliteCollectionStore::new(&conn));
    library.initialize()?;

    if let LibraryView::Librarian(view) = library.view_for(&Identity::librarian("cli"))? {
        println!(
            "catalog={} checked_out={} overdue={} requests={}",
            view.catalog.len(),
            view.checked_out.len(),
            view.overdue.len(),
            view.requests.len()
        );
        for book in &view.catalog {
            println!("{} [{}] {} / {}", book.id, book.status, book.title, book.author);
        }
    }
    Ok(())
}
