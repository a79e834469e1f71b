//! Domain model for the library catalog and patron requests.
//!
//! # Responsibility
//! - Define canonical records persisted in the `books` and `requests`
//!   collections.
//! - Keep lifecycle transitions next to the data they guard.
//!
//! # Invariants
//! - Record ids are time-based UUIDs and are never reused.
//! - Loan fields on a book are set iff the book is checked out.

pub mod book;
pub mod identity;
pub mod request;
