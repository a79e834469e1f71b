//! Book domain model.
//!
//! # Responsibility
//! - Define the canonical catalog record and its two-state loan lifecycle.
//! - Provide transition helpers that keep loan fields consistent.
//!
//! # Invariants
//! - `id` is stable and never reused for another book.
//! - `checked_out_by` and `due_date` are both `None` iff `status == Available`.
//! - `title`, `author` and `isbn` are non-blank.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for catalog entries.
///
/// UUID v7 embeds a millisecond timestamp, so ids are time-ordered at creation.
pub type BookId = Uuid;

/// Loan state of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookStatus {
    /// On the shelf and eligible for checkout.
    Available,
    /// Held by a patron until check-in.
    #[serde(rename = "Checked Out")]
    CheckedOut,
}

impl BookStatus {
    /// Stable label used by logs and FFI envelopes.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::CheckedOut => "checked_out",
        }
    }
}

impl Display for BookStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub status: BookStatus,
    /// Governs inclusion in patron-facing browse/search, independent of status.
    pub visible: bool,
    /// Opaque patron identifier. Set only while checked out.
    #[serde(default)]
    pub checked_out_by: Option<String>,
    /// Unix epoch milliseconds. Set only while checked out.
    #[serde(default)]
    pub due_date: Option<i64>,
}

/// Invariant violations detected on a book record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookValidationError {
    BlankTitle,
    BlankAuthor,
    BlankIsbn,
    /// Loan fields disagree with `status`.
    InconsistentLoan {
        id: BookId,
        status: BookStatus,
    },
}

impl Display for BookValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "book title must not be blank"),
            Self::BlankAuthor => write!(f, "book author must not be blank"),
            Self::BlankIsbn => write!(f, "book isbn must not be blank"),
            Self::InconsistentLoan { id, status } => write!(
                f,
                "book {id} has loan fields inconsistent with status `{status}`"
            ),
        }
    }
}

impl Error for BookValidationError {}

impl Book {
    /// Creates an available, visible book with a fresh time-based id.
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: impl Into<String>,
    ) -> Self {
        Self::with_id(Uuid::now_v7(), title, author, isbn)
    }

    /// Creates an available, visible book with a caller-provided id.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(
        id: BookId,
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            author: author.into(),
            isbn: isbn.into(),
            status: BookStatus::Available,
            visible: true,
            checked_out_by: None,
            due_date: None,
        }
    }

    /// Checks required fields and loan-field consistency.
    pub fn validate(&self) -> Result<(), BookValidationError> {
        if self.title.trim().is_empty() {
            return Err(BookValidationError::BlankTitle);
        }
        if self.author.trim().is_empty() {
            return Err(BookValidationError::BlankAuthor);
        }
        if self.isbn.trim().is_empty() {
            return Err(BookValidationError::BlankIsbn);
        }

        let loan_consistent = match self.status {
            BookStatus::Available => self.checked_out_by.is_none() && self.due_date.is_none(),
            BookStatus::CheckedOut => self.checked_out_by.is_some() && self.due_date.is_some(),
        };
        if !loan_consistent {
            return Err(BookValidationError::InconsistentLoan {
                id: self.id,
                status: self.status,
            });
        }

        Ok(())
    }

    pub fn is_available(&self) -> bool {
        self.status == BookStatus::Available
    }

    pub fn is_checked_out(&self) -> bool {
        self.status == BookStatus::CheckedOut
    }

    /// Whether the book is held by `patron`.
    pub fn is_held_by(&self, patron: &str) -> bool {
        self.is_checked_out() && self.checked_out_by.as_deref() == Some(patron)
    }

    /// Whether the loan is past due at `now_ms`.
    pub fn is_overdue(&self, now_ms: i64) -> bool {
        self.is_checked_out() && self.due_date.is_some_and(|due| due < now_ms)
    }

    /// Moves `Available -> CheckedOut`. Returns `false` and leaves the record
    /// untouched for any other starting state.
    pub fn check_out(&mut self, patron: impl Into<String>, due_date: i64) -> bool {
        if !self.is_available() {
            return false;
        }
        self.status = BookStatus::CheckedOut;
        self.checked_out_by = Some(patron.into());
        self.due_date = Some(due_date);
        true
    }

    /// Moves `CheckedOut -> Available`, clearing loan fields. Visibility is
    /// not touched.
    pub fn check_in(&mut self) -> bool {
        if !self.is_checked_out() {
            return false;
        }
        self.status = BookStatus::Available;
        self.checked_out_by = None;
        self.due_date = None;
        true
    }

    /// Pushes the due date back by `by_ms` and returns the new due date.
    pub fn extend_due_date(&mut self, by_ms: i64) -> Option<i64> {
        if !self.is_checked_out() {
            return None;
        }
        let extended = self.due_date?.saturating_add(by_ms);
        self.due_date = Some(extended);
        Some(extended)
    }
}

#[cfg(test)]
mod tests {
    use super::{Book, BookStatus, BookValidationError};

    #[test]
    fn new_book_starts_available_and_visible() {
        let book = Book::new("Dune", "Frank Herbert", "111");
        assert_eq!(book.status, BookStatus::Available);
        assert!(book.visible);
        assert!(book.checked_out_by.is_none());
        assert!(book.due_date.is_none());
        book.validate().unwrap();
    }

    #[test]
    fn check_out_twice_is_rejected() {
        let mut book = Book::new("Dune", "Frank Herbert", "111");
        assert!(book.check_out("alice", 1_000));
        assert!(!book.check_out("bob", 2_000));
        assert_eq!(book.checked_out_by.as_deref(), Some("alice"));
        assert_eq!(book.due_date, Some(1_000));
    }

    #[test]
    fn check_in_clears_loan_fields_and_keeps_visibility() {
        let mut book = Book::new("Dune", "Frank Herbert", "111");
        book.visible = false;
        book.check_out("alice", 1_000);
        assert!(book.check_in());
        assert!(book.is_available());
        assert!(!book.visible);
        assert!(book.checked_out_by.is_none());
        assert!(book.due_date.is_none());
        assert!(!book.check_in());
    }

    #[test]
    fn extend_requires_checked_out() {
        let mut book = Book::new("Dune", "Frank Herbert", "111");
        assert_eq!(book.extend_due_date(7), None);
        book.check_out("alice", 100);
        assert_eq!(book.extend_due_date(7), Some(107));
        assert_eq!(book.due_date, Some(107));
    }

    #[test]
    fn validate_rejects_half_set_loan_fields() {
        let mut book = Book::new("Dune", "Frank Herbert", "111");
        book.checked_out_by = Some("alice".to_string());
        assert!(matches!(
            book.validate(),
            Err(BookValidationError::InconsistentLoan { .. })
        ));
    }

    #[test]
    fn validate_rejects_blank_fields() {
        assert_eq!(
            Book::new(" ", "a", "1").validate(),
            Err(BookValidationError::BlankTitle)
        );
        assert_eq!(
            Book::new("t", "", "1").validate(),
            Err(BookValidationError::BlankAuthor)
        );
        assert_eq!(
            Book::new("t", "a", "\t").validate(),
            Err(BookValidationError::BlankIsbn)
        );
    }

    #[test]
    fn serializes_with_camel_case_and_legacy_status_label() {
        let mut book = Book::new("Dune", "Frank Herbert", "111");
        book.check_out("alice", 42);
        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json["status"], "Checked Out");
        assert_eq!(json["checkedOutBy"], "alice");
        assert_eq!(json["dueDate"], 42);
    }

    #[test]
    fn missing_loan_fields_deserialize_as_none() {
        let raw = r#"{
            "id": "0190a1b2-c3d4-7e5f-8a9b-0c1d2e3f4a5b",
            "title": "The Great Gatsby",
            "author": "F. Scott Fitzgerald",
            "isbn": "9780743273565",
            "status": "Available",
            "visible": true
        }"#;
        let book: Book = serde_json::from_str(raw).unwrap();
        assert!(book.checked_out_by.is_none());
        assert!(book.due_date.is_none());
        book.validate().unwrap();
    }
}
