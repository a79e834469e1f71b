//! Inventory use-case service.
//!
//! # Responsibility
//! - Add and remove catalog entries.
//! - Drive the `Available <-> CheckedOut` loan lifecycle and due dates.
//! - Serve read projections from a fresh collection load.
//!
//! # Invariants
//! - Every mutation is one atomic load/transform/store cycle.
//! - Rejected transitions (unknown id, wrong state) do not write.
//! - Check-in leaves `visible` unchanged.

use crate::config::{Clock, LoanPolicy, SystemClock};
use crate::model::book::{Book, BookId};
use crate::projection::{self, SearchScope};
use crate::repo::collection_store::{CollectionStore, Mutation};
use crate::service::{BookTransition, ServiceResult, TransitionOutcome};
use log::info;

/// Catalog and loan lifecycle service.
pub struct InventoryService<S: CollectionStore, C: Clock = SystemClock> {
    store: S,
    clock: C,
    policy: LoanPolicy,
}

impl<S: CollectionStore> InventoryService<S> {
    /// Creates a service with wall-clock time and the default loan policy.
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock, LoanPolicy::default())
    }
}

impl<S: CollectionStore, C: Clock> InventoryService<S, C> {
    pub fn with_clock(store: S, clock: C, policy: LoanPolicy) -> Self {
        Self {
            store,
            clock,
            policy,
        }
    }

    pub fn policy(&self) -> LoanPolicy {
        self.policy
    }

    /// Seeds default titles and an empty request log if the store is new.
    pub fn initialize(&self) -> ServiceResult<()> {
        self.store.initialize()?;
        Ok(())
    }

    /// Appends a new available, visible book.
    ///
    /// # Contract
    /// - Fields are trimmed; blank fields are rejected before persistence.
    /// - Duplicate ISBNs are allowed.
    pub fn add_book(&self, title: &str, author: &str, isbn: &str) -> ServiceResult<Book> {
        let book = Book::new(title.trim(), author.trim(), isbn.trim());
        book.validate()?;

        let created = book.clone();
        self.store.update_books(move |books| {
            books.push(book);
            Mutation::Commit(())
        })?;

        info!(
            "event=book_add module=inventory status=ok book_id={}",
            created.id
        );
        Ok(created)
    }

    /// Deletes a book by id. Returns `false` (and writes nothing) when absent.
    pub fn remove_book(&self, id: BookId) -> ServiceResult<bool> {
        let removed = self.store.update_books(|books| {
            match books.iter().position(|book| book.id == id) {
                Some(index) => {
                    books.remove(index);
                    Mutation::Commit(true)
                }
                None => Mutation::Discard(false),
            }
        })?;

        info!(
            "event=book_remove module=inventory status={} book_id={id}",
            if removed { "ok" } else { "not_found" }
        );
        Ok(removed)
    }

    /// Checks out an available book to `patron` for one loan period.
    ///
    /// The patron id is trimmed, matching how requests key their patron.
    pub fn checkout_book(&self, id: BookId, patron: &str) -> ServiceResult<BookTransition> {
        let due_date = self.policy.due_date_from(self.clock.now_ms());
        let patron = patron.trim().to_string();
        self.transition(id, "book_checkout", move |book| {
            book.check_out(patron, due_date)
        })
    }

    /// Returns a checked-out book to the shelf.
    pub fn checkin_book(&self, id: BookId) -> ServiceResult<BookTransition> {
        self.transition(id, "book_checkin", Book::check_in)
    }

    /// Pushes a checked-out book's due date back by one extension period.
    ///
    /// The applied record carries the new due date. Extensions are unlimited.
    pub fn request_extension(&self, id: BookId) -> ServiceResult<BookTransition> {
        let extension_ms = self.policy.extension_ms();
        self.transition(id, "book_extend", move |book| {
            book.extend_due_date(extension_ms).is_some()
        })
    }

    /// Shows or hides a book in patron-facing browse and search.
    pub fn set_book_visibility(&self, id: BookId, visible: bool) -> ServiceResult<BookTransition> {
        self.transition(id, "book_visibility", move |book| {
            book.visible = visible;
            true
        })
    }

    pub fn get_book(&self, id: BookId) -> ServiceResult<Option<Book>> {
        Ok(self
            .store
            .get_books()?
            .into_iter()
            .find(|book| book.id == id))
    }

    /// Full catalog in storage order.
    pub fn all_books(&self) -> ServiceResult<Vec<Book>> {
        Ok(self.store.get_books()?)
    }

    /// Visible books matching `term`, any loan state.
    pub fn search_books(&self, term: &str) -> ServiceResult<Vec<Book>> {
        self.search_in(term, SearchScope::Visible)
    }

    /// Visible, available books matching `term`.
    pub fn search_available_books(&self, term: &str) -> ServiceResult<Vec<Book>> {
        self.search_in(term, SearchScope::VisibleAvailable)
    }

    pub fn available_books(&self) -> ServiceResult<Vec<Book>> {
        Ok(projection::available_books(&self.store.get_books()?))
    }

    pub fn checked_out_books(&self) -> ServiceResult<Vec<Book>> {
        Ok(projection::checked_out_books(&self.store.get_books()?))
    }

    pub fn checked_out_books_for(&self, patron: &str) -> ServiceResult<Vec<Book>> {
        Ok(projection::checked_out_books_for(
            &self.store.get_books()?,
            patron.trim(),
        ))
    }

    /// Loans past due at the current clock time.
    pub fn overdue_books(&self) -> ServiceResult<Vec<Book>> {
        Ok(projection::overdue_books(
            &self.store.get_books()?,
            self.clock.now_ms(),
        ))
    }

    fn search_in(&self, term: &str, scope: SearchScope) -> ServiceResult<Vec<Book>> {
        let hits = projection::search(&self.store.get_books()?, term, scope);
        info!(
            "event=book_search module=inventory status=ok scope={scope:?} hits={}",
            hits.len()
        );
        Ok(hits)
    }

    fn transition<F>(&self, id: BookId, event: &'static str, apply: F) -> ServiceResult<BookTransition>
    where
        F: FnOnce(&mut Book) -> bool,
    {
        let outcome = self.store.update_books(|books| {
            let Some(book) = books.iter_mut().find(|book| book.id == id) else {
                return Mutation::Discard(TransitionOutcome::NotFound);
            };
            if apply(book) {
                Mutation::Commit(TransitionOutcome::Applied(book.clone()))
            } else {
                Mutation::Discard(TransitionOutcome::InvalidState(book.status))
            }
        })?;

        info!(
            "event={event} module=inventory status={} book_id={id}",
            outcome.label()
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::InventoryService;
    use crate::config::{FixedClock, LoanPolicy, DAY_MS};
    use crate::db::open_db_in_memory;
    use crate::model::book::BookStatus;
    use crate::repo::collection_store::{CollectionStore, SqliteCollectionStore};
    use crate::service::TransitionOutcome;

    #[test]
    fn custom_policy_controls_due_dates() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteCollectionStore::new(&conn);
        store.initialize().unwrap();
        let policy = LoanPolicy {
            loan_period_days: 3,
            extension_days: 1,
        };
        let service = InventoryService::with_clock(store, FixedClock(0), policy);
        let book = service.add_book("Dune", "Frank Herbert", "111").unwrap();

        let checked_out = service.checkout_book(book.id, "alice").unwrap();
        assert_eq!(checked_out.applied().unwrap().due_date, Some(3 * DAY_MS));

        let extended = service.request_extension(book.id).unwrap();
        assert_eq!(extended.applied().unwrap().due_date, Some(4 * DAY_MS));
    }

    #[test]
    fn rejected_checkout_reports_current_status() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteCollectionStore::new(&conn);
        let service = InventoryService::with_clock(store, FixedClock(0), LoanPolicy::default());
        let book = service.add_book("Dune", "Frank Herbert", "111").unwrap();

        service.checkout_book(book.id, "alice").unwrap();
        let second = service.checkout_book(book.id, "bob").unwrap();
        assert_eq!(second, TransitionOutcome::InvalidState(BookStatus::CheckedOut));
    }
}
