//! Core domain logic for the library checkout system.
//! This crate is the single source of truth for catalog and loan invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod projection;
pub mod repo;
pub mod service;

pub use config::{Clock, FixedClock, LoanPolicy, SystemClock, DAY_MS};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::book::{Book, BookId, BookStatus, BookValidationError};
pub use model::identity::{Identity, Role};
pub use model::request::{
    BookRequest, RequestId, RequestResolution, RequestStatus, RequestValidationError,
};
pub use projection::SearchScope;
pub use repo::collection_store::{
    default_books, CollectionStore, Mutation, SqliteCollectionStore, StoreError, StoreResult,
    BOOKS_KEY, REQUESTS_KEY,
};
pub use service::inventory_service::InventoryService;
pub use service::library_service::{LibrarianView, LibraryService, LibraryView, PatronView};
pub use service::request_service::RequestService;
pub use service::{
    BookTransition, RequestTransition, ServiceError, ServiceResult, TransitionOutcome,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
