//! FFI use-case API for UI-facing calls.
//!
//! # Responsibility
//! - Expose the library use-cases as flat, sync functions via FRB.
//! - Convert identities, ids and outcomes to plain strings and envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every call opens the store, seeds it if new, and closes it on return;
//!   the UI re-queries projections after each mutation.
//! - The caller's identity is passed explicitly on every call.

use library_core::db::open_db;
use library_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Book, BookRequest, BookTransition, Identity, LibraryService, LibraryView, RequestResolution,
    RequestTransition, Role, ServiceResult, SqliteCollectionStore, TransitionOutcome,
};
use log::warn;
use std::path::PathBuf;
use std::sync::OnceLock;
use uuid::Uuid;

const LIBRARY_DB_FILE_NAME: &str = "library.sqlite3";
static LIBRARY_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns an empty string on success and an error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Flat book row for UI tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookItem {
    pub book_id: String,
    pub title: String,
    pub author: String,
    pub isbn: String,
    /// `available|checked_out`.
    pub status: String,
    pub visible: bool,
    pub checked_out_by: Option<String>,
    pub due_date_epoch_ms: Option<i64>,
}

/// Flat request row for UI tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestItem {
    pub request_id: String,
    pub title: String,
    pub author: String,
    pub requested_by: String,
    pub date_epoch_ms: i64,
    /// `pending|approved|rejected`.
    pub status: String,
}

/// List envelope for book projections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookListResponse {
    pub ok: bool,
    pub items: Vec<BookItem>,
    pub message: String,
}

/// List envelope for request projections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestListResponse {
    pub ok: bool,
    pub items: Vec<RequestItem>,
    pub message: String,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether the mutation was applied.
    pub ok: bool,
    /// Id of the created or affected record.
    pub record_id: Option<String>,
    /// Due date after checkout or extension.
    pub due_date_epoch_ms: Option<i64>,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, record_id: String) -> Self {
        Self {
            ok: true,
            record_id: Some(record_id),
            due_date_epoch_ms: None,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            record_id: None,
            due_date_epoch_ms: None,
            message: message.into(),
        }
    }
}

impl BookListResponse {
    fn from_result(op: &str, result: Result<Vec<Book>, String>) -> Self {
        match result {
            Ok(books) => Self {
                ok: true,
                message: count_message(books.len()),
                items: books.into_iter().map(to_book_item).collect(),
            },
            Err(err) => Self {
                ok: false,
                items: Vec::new(),
                message: failure_message(op, err),
            },
        }
    }
}

impl RequestListResponse {
    fn from_result(op: &str, result: Result<Vec<BookRequest>, String>) -> Self {
        match result {
            Ok(requests) => Self {
                ok: true,
                message: count_message(requests.len()),
                items: requests.into_iter().map(to_request_item).collect(),
            },
            Err(err) => Self {
                ok: false,
                items: Vec::new(),
                message: failure_message(op, err),
            },
        }
    }
}

/// Adds a book to the catalog. Librarian only.
#[flutter_rust_bridge::frb(sync)]
pub fn library_add_book(
    actor_id: String,
    actor_role: String,
    title: String,
    author: String,
    isbn: String,
) -> ActionResponse {
    let result = with_library(&actor_id, &actor_role, |library, actor| {
        library.add_book(actor, &title, &author, &isbn)
    });
    match result {
        Ok(book) => ActionResponse::success("Book added.", book.id.to_string()),
        Err(err) => ActionResponse::failure(failure_message("library_add_book", err)),
    }
}

/// Removes a book. Librarian only; unknown ids report `ok=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn library_remove_book(
    actor_id: String,
    actor_role: String,
    book_id: String,
) -> ActionResponse {
    let result = parse_record_id(&book_id).and_then(|id| {
        with_library(&actor_id, &actor_role, |library, actor| {
            library.remove_book(actor, id)
        })
    });
    match result {
        Ok(true) => ActionResponse::success("Book removed.", book_id.trim().to_string()),
        Ok(false) => ActionResponse::failure("Book not found."),
        Err(err) => ActionResponse::failure(failure_message("library_remove_book", err)),
    }
}

/// Checks a book out to the caller.
#[flutter_rust_bridge::frb(sync)]
pub fn library_checkout_book(
    actor_id: String,
    actor_role: String,
    book_id: String,
) -> ActionResponse {
    book_transition(
        "library_checkout_book",
        "Book checked out.",
        &actor_id,
        &actor_role,
        &book_id,
        |library, actor, id| library.checkout_book(actor, id),
    )
}

/// Checks a book back in. Librarian only.
#[flutter_rust_bridge::frb(sync)]
pub fn library_checkin_book(
    actor_id: String,
    actor_role: String,
    book_id: String,
) -> ActionResponse {
    book_transition(
        "library_checkin_book",
        "Book checked in.",
        &actor_id,
        &actor_role,
        &book_id,
        |library, actor, id| library.checkin_book(actor, id),
    )
}

/// Extends a loan by one extension period; returns the new due date.
#[flutter_rust_bridge::frb(sync)]
pub fn library_request_extension(
    actor_id: String,
    actor_role: String,
    book_id: String,
) -> ActionResponse {
    book_transition(
        "library_request_extension",
        "Extension granted.",
        &actor_id,
        &actor_role,
        &book_id,
        |library, actor, id| library.request_extension(actor, id),
    )
}

/// Shows or hides a book from patron browse. Librarian only.
#[flutter_rust_bridge::frb(sync)]
pub fn library_set_book_visibility(
    actor_id: String,
    actor_role: String,
    book_id: String,
    visible: bool,
) -> ActionResponse {
    book_transition(
        "library_set_book_visibility",
        "Visibility updated.",
        &actor_id,
        &actor_role,
        &book_id,
        |library, actor, id| library.set_book_visibility(actor, id, visible),
    )
}

/// Searches by title or author within the caller's role scope.
#[flutter_rust_bridge::frb(sync)]
pub fn library_search_books(
    actor_id: String,
    actor_role: String,
    term: String,
) -> BookListResponse {
    let result = with_library(&actor_id, &actor_role, |library, actor| {
        library.search(actor, &term)
    });
    BookListResponse::from_result("library_search_books", result)
}

/// Visible books on the shelf.
#[flutter_rust_bridge::frb(sync)]
pub fn library_available_books(actor_id: String, actor_role: String) -> BookListResponse {
    let result = with_library(&actor_id, &actor_role, |library, _| {
        library.inventory().available_books()
    });
    BookListResponse::from_result("library_available_books", result)
}

/// Full catalog. Librarian only.
#[flutter_rust_bridge::frb(sync)]
pub fn library_catalog(actor_id: String, actor_role: String) -> BookListResponse {
    let result = with_library(&actor_id, &actor_role, |library, actor| {
        library.view_for(actor)
    })
    .and_then(|view| match view {
        LibraryView::Librarian(view) => Ok(view.catalog),
        LibraryView::Patron(_) => {
            Err("role `patron` is not allowed to list the catalog".to_string())
        }
    });
    BookListResponse::from_result("library_catalog", result)
}

/// Loans past their due date. Librarian only.
#[flutter_rust_bridge::frb(sync)]
pub fn library_overdue_books(actor_id: String, actor_role: String) -> BookListResponse {
    let result = with_library(&actor_id, &actor_role, |library, actor| {
        library.view_for(actor)
    })
    .and_then(|view| match view {
        LibraryView::Librarian(view) => Ok(view.overdue),
        LibraryView::Patron(_) => {
            Err("role `patron` is not allowed to review overdue loans".to_string())
        }
    });
    BookListResponse::from_result("library_overdue_books", result)
}

/// Loans visible to the caller: every loan for librarians, own loans for patrons.
#[flutter_rust_bridge::frb(sync)]
pub fn library_checked_out_books(actor_id: String, actor_role: String) -> BookListResponse {
    let result = with_library(&actor_id, &actor_role, |library, actor| {
        library.view_for(actor)
    })
    .map(|view| match view {
        LibraryView::Librarian(view) => view.checked_out,
        LibraryView::Patron(view) => view.checked_out,
    });
    BookListResponse::from_result("library_checked_out_books", result)
}

/// Files a request for a work the library may not hold.
#[flutter_rust_bridge::frb(sync)]
pub fn library_request_book(
    actor_id: String,
    actor_role: String,
    title: String,
    author: String,
) -> ActionResponse {
    let result = with_library(&actor_id, &actor_role, |library, actor| {
        library.request_book(actor, &title, &author)
    });
    match result {
        Ok(request) => ActionResponse::success("Request submitted.", request.id.to_string()),
        Err(err) => ActionResponse::failure(failure_message("library_request_book", err)),
    }
}

/// Requests visible to the caller: all for librarians, own for patrons.
#[flutter_rust_bridge::frb(sync)]
pub fn library_list_requests(actor_id: String, actor_role: String) -> RequestListResponse {
    let result = with_library(&actor_id, &actor_role, |library, actor| {
        library.view_for(actor)
    })
    .map(|view| match view {
        LibraryView::Librarian(view) => view.requests,
        LibraryView::Patron(view) => view.requests,
    });
    RequestListResponse::from_result("library_list_requests", result)
}

/// Approves (`approve=true`) or rejects a pending request. Librarian only.
#[flutter_rust_bridge::frb(sync)]
pub fn library_resolve_request(
    actor_id: String,
    actor_role: String,
    request_id: String,
    approve: bool,
) -> ActionResponse {
    let resolution = if approve {
        RequestResolution::Approve
    } else {
        RequestResolution::Reject
    };
    let result = parse_record_id(&request_id).and_then(|id| {
        with_library(&actor_id, &actor_role, |library, actor| {
            library.resolve_request(actor, id, resolution)
        })
    });
    match result {
        Ok(outcome) => request_transition_response(outcome),
        Err(err) => ActionResponse::failure(failure_message("library_resolve_request", err)),
    }
}

type FfiLibrary<'conn> = LibraryService<SqliteCollectionStore<'conn>>;

fn book_transition(
    op: &str,
    applied_message: &str,
    actor_id: &str,
    actor_role: &str,
    book_id: &str,
    f: impl FnOnce(&FfiLibrary<'_>, &Identity, Uuid) -> ServiceResult<BookTransition>,
) -> ActionResponse {
    let result = parse_record_id(book_id).and_then(|id| {
        with_library(actor_id, actor_role, |library, actor| f(library, actor, id))
    });
    match result {
        Ok(TransitionOutcome::Applied(book)) => ActionResponse {
            due_date_epoch_ms: book.due_date,
            ..ActionResponse::success(applied_message, book.id.to_string())
        },
        Ok(TransitionOutcome::NotFound) => ActionResponse::failure("Book not found."),
        Ok(TransitionOutcome::InvalidState(status)) => {
            ActionResponse::failure(format!("Book is {status}; action not allowed."))
        }
        Err(err) => ActionResponse::failure(failure_message(op, err)),
    }
}

fn request_transition_response(outcome: RequestTransition) -> ActionResponse {
    match outcome {
        TransitionOutcome::Applied(request) => ActionResponse::success(
            format!("Request {}.", request.status),
            request.id.to_string(),
        ),
        TransitionOutcome::NotFound => ActionResponse::failure("Request not found."),
        TransitionOutcome::InvalidState(status) => {
            ActionResponse::failure(format!("Request is already {status}."))
        }
    }
}

fn resolve_db_path() -> PathBuf {
    LIBRARY_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("LIBRARY_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(LIBRARY_DB_FILE_NAME)
        })
        .clone()
}

fn parse_actor(actor_id: &str, actor_role: &str) -> Result<Identity, String> {
    let id = actor_id.trim();
    if id.is_empty() {
        return Err("actor_id must not be blank".to_string());
    }
    let role = Role::parse(actor_role)
        .ok_or_else(|| format!("unknown role `{}`", actor_role.trim()))?;
    Ok(Identity::new(id, role))
}

fn parse_record_id(raw: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid record id `{}`", raw.trim()))
}

fn with_library<T>(
    actor_id: &str,
    actor_role: &str,
    f: impl FnOnce(&FfiLibrary<'_>, &Identity) -> ServiceResult<T>,
) -> Result<T, String> {
    let actor = parse_actor(actor_id, actor_role)?;
    let conn =
        open_db(resolve_db_path()).map_err(|err| format!("library DB open failed: {err}"))?;
    let library = LibraryService::new(SqliteCollectionStore::new(&conn));
    library
        .initialize()
        .map_err(|err| format!("library DB init failed: {err}"))?;
    f(&library, &actor).map_err(|err| err.to_string())
}

fn failure_message(op: &str, err: String) -> String {
    warn!("event=ffi_call module=ffi status=error op={op}");
    format!("{op} failed: {err}")
}

fn count_message(count: usize) -> String {
    if count == 0 {
        "No results.".to_string()
    } else {
        format!("Found {count} result(s).")
    }
}

fn to_book_item(book: Book) -> BookItem {
    BookItem {
        book_id: book.id.to_string(),
        status: book.status.as_str().to_string(),
        title: book.title,
        author: book.author,
        isbn: book.isbn,
        visible: book.visible,
        checked_out_by: book.checked_out_by,
        due_date_epoch_ms: book.due_date,
    }
}

fn to_request_item(request: BookRequest) -> RequestItem {
    RequestItem {
        request_id: request.id.to_string(),
        status: request.status.as_str().to_string(),
        title: request.title,
        author: request.author,
        requested_by: request.requested_by,
        date_epoch_ms: request.date,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, library_add_book, library_catalog, library_checkin_book,
        library_checked_out_books, library_checkout_book, library_list_requests,
        library_overdue_books, library_remove_book, library_request_book, library_request_extension,
        library_resolve_request, library_search_books, ping,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    const LIBRARIAN: &str = "librarian";
    const PATRON: &str = "patron";

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn unknown_role_is_rejected() {
        let response = library_add_book(
            "someone".to_string(),
            "admin".to_string(),
            "t".to_string(),
            "a".to_string(),
            "1".to_string(),
        );
        assert!(!response.ok);
        assert!(response.message.contains("unknown role"));
    }

    #[test]
    fn checkout_extend_checkin_flow() {
        let token = unique_token("ffi-flow");
        let patron = format!("{token}@x.com");
        let added = add_book(&token);

        let checkout = library_checkout_book(patron.clone(), PATRON.to_string(), added.clone());
        assert!(checkout.ok, "{}", checkout.message);
        let due = checkout.due_date_epoch_ms.expect("checkout sets due date");

        let twice = library_checkout_book("other".to_string(), PATRON.to_string(), added.clone());
        assert!(!twice.ok);

        let extended =
            library_request_extension(patron.clone(), PATRON.to_string(), added.clone());
        assert!(extended.ok, "{}", extended.message);
        assert_eq!(
            extended.due_date_epoch_ms,
            Some(due + 7 * library_core::DAY_MS)
        );

        let mine = library_checked_out_books(patron.clone(), PATRON.to_string());
        assert!(mine.ok);
        assert_eq!(mine.items.len(), 1);
        assert_eq!(mine.items[0].book_id, added);
        assert_eq!(mine.items[0].status, "checked_out");

        let denied = library_checkin_book(patron.clone(), PATRON.to_string(), added.clone());
        assert!(!denied.ok);

        let returned =
            library_checkin_book("staff".to_string(), LIBRARIAN.to_string(), added.clone());
        assert!(returned.ok, "{}", returned.message);

        let removed = library_remove_book("staff".to_string(), LIBRARIAN.to_string(), added);
        assert!(removed.ok, "{}", removed.message);
    }

    #[test]
    fn search_finds_added_book_for_patron() {
        let token = unique_token("ffi-search");
        let added = add_book(&token);

        let response = library_search_books(
            "reader".to_string(),
            PATRON.to_string(),
            token.to_uppercase(),
        );
        assert!(response.ok);
        assert!(response.items.iter().any(|item| item.book_id == added));

        library_remove_book("staff".to_string(), LIBRARIAN.to_string(), added);
    }

    #[test]
    fn patron_cannot_list_catalog() {
        let response = library_catalog("reader".to_string(), PATRON.to_string());
        assert!(!response.ok);
        assert!(response.items.is_empty());
    }

    #[test]
    fn overdue_review_is_librarian_only() {
        let denied = library_overdue_books("reader".to_string(), PATRON.to_string());
        assert!(!denied.ok);

        let allowed = library_overdue_books("staff".to_string(), LIBRARIAN.to_string());
        assert!(allowed.ok, "{}", allowed.message);
    }

    #[test]
    fn request_and_resolve_flow() {
        let patron = format!("{}@x.com", unique_token("ffi-request"));
        let created = library_request_book(
            patron.clone(),
            PATRON.to_string(),
            "Foo".to_string(),
            "Bar".to_string(),
        );
        assert!(created.ok, "{}", created.message);
        let request_id = created.record_id.expect("request id");

        let mine = library_list_requests(patron.clone(), PATRON.to_string());
        assert_eq!(mine.items.len(), 1);
        assert_eq!(mine.items[0].status, "pending");

        let approved = library_resolve_request(
            "staff".to_string(),
            LIBRARIAN.to_string(),
            request_id.clone(),
            true,
        );
        assert!(approved.ok, "{}", approved.message);

        let again = library_resolve_request(
            "staff".to_string(),
            LIBRARIAN.to_string(),
            request_id,
            false,
        );
        assert!(!again.ok);
    }

    #[test]
    fn malformed_id_is_reported() {
        let response =
            library_checkout_book("reader".to_string(), PATRON.to_string(), "nope".to_string());
        assert!(!response.ok);
        assert!(response.message.contains("invalid record id"));
    }

    fn add_book(token: &str) -> String {
        let response = library_add_book(
            "staff".to_string(),
            LIBRARIAN.to_string(),
            format!("Title {token}"),
            "Test Author".to_string(),
            "000".to_string(),
        );
        assert!(response.ok, "{}", response.message);
        response.record_id.expect("added book id")
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
