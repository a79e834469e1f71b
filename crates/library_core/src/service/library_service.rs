//! Identity-aware library facade.
//!
//! # Responsibility
//! - Gate inventory and request use-cases by caller role.
//! - Build the per-role view the presentation layer renders after each call.
//!
//! # Invariants
//! - Identity is always an explicit argument; there is no ambient user.
//! - Librarian-only operations refuse patron identities with `Forbidden`
//!   before touching the store.
//! - A patron may only extend a loan they hold.

use crate::config::{Clock, LoanPolicy, SystemClock};
use crate::model::book::{Book, BookId};
use crate::model::identity::Identity;
use crate::model::request::{BookRequest, RequestId, RequestResolution};
use crate::projection;
use crate::repo::collection_store::CollectionStore;
use crate::service::inventory_service::InventoryService;
use crate::service::request_service::RequestService;
use crate::service::{BookTransition, RequestTransition, ServiceError, ServiceResult};
use log::warn;

/// Everything a librarian screen shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibrarianView {
    /// Full catalog, including hidden and checked-out books.
    pub catalog: Vec<Book>,
    pub checked_out: Vec<Book>,
    pub overdue: Vec<Book>,
    pub requests: Vec<BookRequest>,
}

/// Everything a patron screen shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatronView {
    /// Visible books on the shelf.
    pub available: Vec<Book>,
    /// Loans held by this patron.
    pub checked_out: Vec<Book>,
    /// Requests filed by this patron.
    pub requests: Vec<BookRequest>,
}

/// Role-specific projection of the stored collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryView {
    Librarian(LibrarianView),
    Patron(PatronView),
}

/// Role-gated entry point over inventory and requests.
pub struct LibraryService<S: CollectionStore + Clone, C: Clock + Clone = SystemClock> {
    store: S,
    clock: C,
    inventory: InventoryService<S, C>,
    requests: RequestService<S, C>,
}

impl<S: CollectionStore + Clone> LibraryService<S> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock, LoanPolicy::default())
    }
}

impl<S: CollectionStore + Clone, C: Clock + Clone> LibraryService<S, C> {
    pub fn with_clock(store: S, clock: C, policy: LoanPolicy) -> Self {
        Self {
            inventory: InventoryService::with_clock(store.clone(), clock.clone(), policy),
            requests: RequestService::with_clock(store.clone(), clock.clone()),
            store,
            clock,
        }
    }

    /// Ungated inventory service for trusted callers.
    pub fn inventory(&self) -> &InventoryService<S, C> {
        &self.inventory
    }

    /// Ungated request service for trusted callers.
    pub fn requests(&self) -> &RequestService<S, C> {
        &self.requests
    }

    pub fn initialize(&self) -> ServiceResult<()> {
        self.inventory.initialize()
    }

    /// Builds the view for `actor` from one fresh load of each collection.
    pub fn view_for(&self, actor: &Identity) -> ServiceResult<LibraryView> {
        let books = self.store.get_books()?;
        let requests = self.store.get_requests()?;

        if actor.is_librarian() {
            return Ok(LibraryView::Librarian(LibrarianView {
                checked_out: projection::checked_out_books(&books),
                overdue: projection::overdue_books(&books, self.clock.now_ms()),
                catalog: books,
                requests,
            }));
        }

        let patron = actor.id.trim();
        Ok(LibraryView::Patron(PatronView {
            available: projection::available_books(&books),
            checked_out: projection::checked_out_books_for(&books, patron),
            requests: requests
                .into_iter()
                .filter(|request| request.requested_by == patron)
                .collect(),
        }))
    }

    pub fn add_book(
        &self,
        actor: &Identity,
        title: &str,
        author: &str,
        isbn: &str,
    ) -> ServiceResult<Book> {
        require_librarian(actor, "add books")?;
        self.inventory.add_book(title, author, isbn)
    }

    pub fn remove_book(&self, actor: &Identity, id: BookId) -> ServiceResult<bool> {
        require_librarian(actor, "remove books")?;
        self.inventory.remove_book(id)
    }

    /// Checks a book out to the caller.
    pub fn checkout_book(&self, actor: &Identity, id: BookId) -> ServiceResult<BookTransition> {
        self.inventory.checkout_book(id, &actor.id)
    }

    pub fn checkin_book(&self, actor: &Identity, id: BookId) -> ServiceResult<BookTransition> {
        require_librarian(actor, "check in books")?;
        self.inventory.checkin_book(id)
    }

    /// Extends a loan. Patrons may only extend their own loans.
    pub fn request_extension(
        &self,
        actor: &Identity,
        id: BookId,
    ) -> ServiceResult<BookTransition> {
        if !actor.is_librarian() {
            if let Some(book) = self.inventory.get_book(id)? {
                if book.is_checked_out() && !book.is_held_by(actor.id.trim()) {
                    warn!(
                        "event=book_extend module=library status=forbidden book_id={id} role={}",
                        actor.role
                    );
                    return Err(ServiceError::Forbidden {
                        operation: "extend another patron's loan",
                        role: actor.role,
                    });
                }
            }
        }
        self.inventory.request_extension(id)
    }

    pub fn set_book_visibility(
        &self,
        actor: &Identity,
        id: BookId,
        visible: bool,
    ) -> ServiceResult<BookTransition> {
        require_librarian(actor, "change book visibility")?;
        self.inventory.set_book_visibility(id, visible)
    }

    /// Librarians search every visible book; patrons only see the shelf.
    pub fn search(&self, actor: &Identity, term: &str) -> ServiceResult<Vec<Book>> {
        if actor.is_librarian() {
            self.inventory.search_books(term)
        } else {
            self.inventory.search_available_books(term)
        }
    }

    pub fn request_book(
        &self,
        actor: &Identity,
        title: &str,
        author: &str,
    ) -> ServiceResult<BookRequest> {
        self.requests.request_book(title, author, &actor.id)
    }

    /// Full request log for librarian review.
    pub fn list_requests(&self, actor: &Identity) -> ServiceResult<Vec<BookRequest>> {
        require_librarian(actor, "review all requests")?;
        self.requests.list_requests()
    }

    pub fn resolve_request(
        &self,
        actor: &Identity,
        id: RequestId,
        resolution: RequestResolution,
    ) -> ServiceResult<RequestTransition> {
        require_librarian(actor, "resolve requests")?;
        self.requests.resolve_request(id, resolution)
    }
}

fn require_librarian(actor: &Identity, operation: &'static str) -> ServiceResult<()> {
    if actor.is_librarian() {
        return Ok(());
    }
    warn!(
        "event=access_denied module=library status=forbidden role={} operation=\"{operation}\"",
        actor.role
    );
    Err(ServiceError::Forbidden {
        operation,
        role: actor.role,
    })
}
