//! Patron book request model.
//!
//! # Invariants
//! - Requests are append-only; they are never deleted.
//! - `status` only leaves `Pending`, and only through librarian resolution.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RequestId = Uuid;

/// Review state of a patron request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl Display for RequestStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Librarian decision applied to a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestResolution {
    Approve,
    Reject,
}

impl RequestResolution {
    /// Terminal status produced by this decision.
    pub fn target_status(self) -> RequestStatus {
        match self {
            Self::Approve => RequestStatus::Approved,
            Self::Reject => RequestStatus::Rejected,
        }
    }
}

/// A patron's request for a work the library may not hold.
///
/// `title`/`author` are free text and are not matched against inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRequest {
    pub id: RequestId,
    pub title: String,
    pub author: String,
    pub requested_by: String,
    /// Unix epoch milliseconds at creation.
    pub date: i64,
    pub status: RequestStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestValidationError {
    BlankTitle,
    BlankAuthor,
    BlankRequester,
}

impl Display for RequestValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "request title must not be blank"),
            Self::BlankAuthor => write!(f, "request author must not be blank"),
            Self::BlankRequester => write!(f, "request must name a requesting patron"),
        }
    }
}

impl Error for RequestValidationError {}

impl BookRequest {
    /// Creates a pending request stamped at `date`.
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        requested_by: impl Into<String>,
        date: i64,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            title: title.into(),
            author: author.into(),
            requested_by: requested_by.into(),
            date,
            status: RequestStatus::Pending,
        }
    }

    pub fn validate(&self) -> Result<(), RequestValidationError> {
        if self.title.trim().is_empty() {
            return Err(RequestValidationError::BlankTitle);
        }
        if self.author.trim().is_empty() {
            return Err(RequestValidationError::BlankAuthor);
        }
        if self.requested_by.trim().is_empty() {
            return Err(RequestValidationError::BlankRequester);
        }
        Ok(())
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    /// Applies a librarian decision. Only pending requests can be resolved.
    pub fn resolve(&mut self, resolution: RequestResolution) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.status = resolution.target_status();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{BookRequest, RequestResolution, RequestStatus, RequestValidationError};

    #[test]
    fn new_request_is_pending() {
        let request = BookRequest::new("Foo", "Bar", "alice@x.com", 5);
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.date, 5);
        request.validate().unwrap();
    }

    #[test]
    fn resolve_only_from_pending() {
        let mut request = BookRequest::new("Foo", "Bar", "alice@x.com", 5);
        assert!(request.resolve(RequestResolution::Reject));
        assert_eq!(request.status, RequestStatus::Rejected);
        assert!(!request.resolve(RequestResolution::Approve));
        assert_eq!(request.status, RequestStatus::Rejected);
    }

    #[test]
    fn validate_requires_requester() {
        let request = BookRequest::new("Foo", "Bar", " ", 5);
        assert_eq!(
            request.validate(),
            Err(RequestValidationError::BlankRequester)
        );
    }

    #[test]
    fn serializes_requested_by_in_camel_case() {
        let request = BookRequest::new("Foo", "Bar", "alice@x.com", 5);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["requestedBy"], "alice@x.com");
        assert_eq!(json["status"], "Pending");
    }
}
