//! Pure read projections over a loaded book collection.
//!
//! # Responsibility
//! - Derive the lists each UI context renders, without touching storage.
//!
//! # Invariants
//! - Results preserve storage order.
//! - Inputs are never mutated.

use crate::model::book::Book;
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Which books a search may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchScope {
    /// Every visible book regardless of loan state.
    #[default]
    Visible,
    /// Visible books that are also on the shelf (patron browse).
    VisibleAvailable,
}

/// Trims, lowercases and collapses whitespace runs, so `"  the   great "`
/// normalizes to `"the great"`.
///
/// Applied to both the term and the searched fields.
pub fn normalize_search_term(term: &str) -> String {
    WHITESPACE_RE.replace_all(term.trim(), " ").to_lowercase()
}

/// Case-insensitive substring search on title or author.
///
/// A blank term matches every book in scope.
pub fn search(books: &[Book], term: &str, scope: SearchScope) -> Vec<Book> {
    let needle = normalize_search_term(term);
    books
        .iter()
        .filter(|book| book.visible)
        .filter(|book| scope == SearchScope::Visible || book.is_available())
        .filter(|book| needle.is_empty() || matches(book, &needle))
        .cloned()
        .collect()
}

fn matches(book: &Book, needle: &str) -> bool {
    normalize_search_term(&book.title).contains(needle)
        || normalize_search_term(&book.author).contains(needle)
}

/// Books a patron can browse and check out.
pub fn available_books(books: &[Book]) -> Vec<Book> {
    books
        .iter()
        .filter(|book| book.is_available() && book.visible)
        .cloned()
        .collect()
}

/// Every book currently on loan.
pub fn checked_out_books(books: &[Book]) -> Vec<Book> {
    books
        .iter()
        .filter(|book| book.is_checked_out())
        .cloned()
        .collect()
}

/// Books on loan to one patron.
pub fn checked_out_books_for(books: &[Book], patron: &str) -> Vec<Book> {
    books
        .iter()
        .filter(|book| book.is_held_by(patron))
        .cloned()
        .collect()
}

/// Loans whose due date has passed at `now_ms`.
pub fn overdue_books(books: &[Book], now_ms: i64) -> Vec<Book> {
    books
        .iter()
        .filter(|book| book.is_overdue(now_ms))
        .cloned()
        .collect()
}
