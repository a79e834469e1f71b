//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate collection-store cycles into use-case level APIs.
//! - Report lifecycle outcomes as values and reserve errors for storage,
//!   validation and authorization failures.
//!
//! # Invariants
//! - Rejected transitions never write to the store.

pub mod inventory_service;
pub mod library_service;
pub mod request_service;

use crate::model::book::{Book, BookStatus, BookValidationError};
use crate::model::identity::Role;
use crate::model::request::{BookRequest, RequestStatus, RequestValidationError};
use crate::repo::collection_store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service-level error.
#[derive(Debug)]
pub enum ServiceError {
    /// Book input failed validation before persistence.
    InvalidBook(BookValidationError),
    /// Request input failed validation before persistence.
    InvalidRequest(RequestValidationError),
    /// Caller role lacks privileges for the operation.
    Forbidden {
        operation: &'static str,
        role: Role,
    },
    /// Persistence-layer failure.
    Store(StoreError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBook(err) => write!(f, "{err}"),
            Self::InvalidRequest(err) => write!(f, "{err}"),
            Self::Forbidden { operation, role } => {
                write!(f, "role `{role}` is not allowed to {operation}")
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidBook(err) => Some(err),
            Self::InvalidRequest(err) => Some(err),
            Self::Forbidden { .. } => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<BookValidationError> for ServiceError {
    fn from(value: BookValidationError) -> Self {
        Self::InvalidBook(value)
    }
}

impl From<RequestValidationError> for ServiceError {
    fn from(value: RequestValidationError) -> Self {
        Self::InvalidRequest(value)
    }
}

/// Outcome of a guarded lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome<T, S> {
    /// Transition applied and persisted; carries the updated record.
    Applied(T),
    /// No record with the given id.
    NotFound,
    /// Record exists but its current state does not admit the transition.
    InvalidState(S),
}

pub type BookTransition = TransitionOutcome<Book, BookStatus>;
pub type RequestTransition = TransitionOutcome<BookRequest, RequestStatus>;

impl<T, S> TransitionOutcome<T, S> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    pub fn applied(&self) -> Option<&T> {
        match self {
            Self::Applied(record) => Some(record),
            _ => None,
        }
    }

    pub fn into_applied(self) -> Option<T> {
        match self {
            Self::Applied(record) => Some(record),
            _ => None,
        }
    }

    /// Stable label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Applied(_) => "applied",
            Self::NotFound => "not_found",
            Self::InvalidState(_) => "invalid_state",
        }
    }
}
