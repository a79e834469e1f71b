//! Collection store contracts and SQLite key-value implementation.
//!
//! # Responsibility
//! - Persist the `books` and `requests` collections as whole JSON documents.
//! - Offer an atomic load/transform/store cycle per collection.
//!
//! # Invariants
//! - Every write replaces the entire collection in one statement or
//!   transaction; partial writes are never observable.
//! - Update cycles hold the write lock from load to store.
//! - Missing or unparseable stored data reads as an empty collection.
//! - Parsed records are returned as stored; reads never drop or rewrite
//!   them, so `save_books(&get_books()?)` is a no-op.

use crate::db::DbError;
use crate::model::book::Book;
use crate::model::request::BookRequest;
use log::{debug, warn};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key of the book collection.
pub const BOOKS_KEY: &str = "books";
/// Storage key of the request collection.
pub const REQUESTS_KEY: &str = "requests";

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage-layer failure. Data corruption is not an error here.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    Serialization(serde_json::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "failed to serialize collection: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Result of a collection transform: whether to persist, plus a value for
/// the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation<T> {
    /// Write the transformed collection back.
    Commit(T),
    /// Leave the stored collection untouched.
    Discard(T),
}

impl<T> Mutation<T> {
    fn into_parts(self) -> (T, bool) {
        match self {
            Self::Commit(value) => (value, true),
            Self::Discard(value) => (value, false),
        }
    }
}

/// Full-collection persistence for books and requests.
pub trait CollectionStore {
    /// Seeds missing collections. Safe to call on every startup.
    fn initialize(&self) -> StoreResult<()>;
    fn get_books(&self) -> StoreResult<Vec<Book>>;
    fn save_books(&self, books: &[Book]) -> StoreResult<()>;
    fn get_requests(&self) -> StoreResult<Vec<BookRequest>>;
    fn save_requests(&self, requests: &[BookRequest]) -> StoreResult<()>;
    /// Loads, transforms and (on `Commit`) stores the book collection atomically.
    fn update_books<T, F>(&self, transform: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Vec<Book>) -> Mutation<T>;
    /// Loads, transforms and (on `Commit`) stores the request collection atomically.
    fn update_requests<T, F>(&self, transform: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Vec<BookRequest>) -> Mutation<T>;
}

/// Two titles written when a store is first initialized.
pub fn default_books() -> Vec<Book> {
    vec![
        Book::new("The Great Gatsby", "F. Scott Fitzgerald", "9780743273565"),
        Book::new("To Kill a Mockingbird", "Harper Lee", "9780061120084"),
    ]
}

/// SQLite-backed collection store over the `kv_store` table.
#[derive(Debug, Clone, Copy)]
pub struct SqliteCollectionStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCollectionStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Takes the write lock up front so concurrent writers on other
    /// connections queue behind the busy timeout instead of overwriting.
    fn begin_write(&self) -> rusqlite::Result<Transaction<'conn>> {
        Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
    }

    fn update_collection<R, T, F>(&self, key: &'static str, transform: F) -> StoreResult<T>
    where
        R: Serialize + DeserializeOwned,
        F: FnOnce(&mut Vec<R>) -> Mutation<T>,
    {
        let tx = self.begin_write()?;
        let mut records = decode_collection::<R>(key, read_raw(&tx, key)?);
        let (value, commit) = transform(&mut records).into_parts();
        if commit {
            write_raw(&tx, key, &encode_collection(&records)?)?;
            tx.commit()?;
            debug!(
                "event=collection_write module=repo status=ok key={key} records={}",
                records.len()
            );
        }
        Ok(value)
    }
}

impl CollectionStore for SqliteCollectionStore<'_> {
    fn initialize(&self) -> StoreResult<()> {
        let tx = self.begin_write()?;
        let mut seeded = Vec::new();

        if read_raw(&tx, BOOKS_KEY)?.is_none() {
            write_raw(&tx, BOOKS_KEY, &encode_collection(&default_books())?)?;
            seeded.push(BOOKS_KEY);
        }
        if read_raw(&tx, REQUESTS_KEY)?.is_none() {
            write_raw(&tx, REQUESTS_KEY, "[]")?;
            seeded.push(REQUESTS_KEY);
        }
        tx.commit()?;

        debug!(
            "event=store_initialize module=repo status=ok seeded={}",
            seeded.join(",")
        );
        Ok(())
    }

    fn get_books(&self) -> StoreResult<Vec<Book>> {
        Ok(decode_collection(BOOKS_KEY, read_raw(self.conn, BOOKS_KEY)?))
    }

    fn save_books(&self, books: &[Book]) -> StoreResult<()> {
        write_raw(self.conn, BOOKS_KEY, &encode_collection(books)?)?;
        Ok(())
    }

    fn get_requests(&self) -> StoreResult<Vec<BookRequest>> {
        Ok(decode_collection(
            REQUESTS_KEY,
            read_raw(self.conn, REQUESTS_KEY)?,
        ))
    }

    fn save_requests(&self, requests: &[BookRequest]) -> StoreResult<()> {
        write_raw(self.conn, REQUESTS_KEY, &encode_collection(requests)?)?;
        Ok(())
    }

    fn update_books<T, F>(&self, transform: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Vec<Book>) -> Mutation<T>,
    {
        self.update_collection(BOOKS_KEY, transform)
    }

    fn update_requests<T, F>(&self, transform: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Vec<BookRequest>) -> Mutation<T>,
    {
        self.update_collection(REQUESTS_KEY, transform)
    }
}

fn read_raw(conn: &Connection, key: &str) -> rusqlite::Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM kv_store WHERE key = ?1;",
        params![key],
        |row| row.get(0),
    )
    .optional()
}

fn write_raw(conn: &Connection, key: &str, value: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO kv_store (key, value, updated_at)
         VALUES (?1, ?2, strftime('%s', 'now') * 1000)
         ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = excluded.updated_at;",
        params![key, value],
    )?;
    Ok(())
}

fn encode_collection<R: Serialize>(records: &[R]) -> serde_json::Result<String> {
    serde_json::to_string(records)
}

fn decode_collection<R: DeserializeOwned>(key: &str, raw: Option<String>) -> Vec<R> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    match serde_json::from_str::<Vec<R>>(&raw) {
        Ok(records) => records,
        Err(err) => {
            warn!(
                "event=collection_read module=repo status=degraded key={key} error_code=corrupt_collection error={err}"
            );
            Vec::new()
        }
    }
}
