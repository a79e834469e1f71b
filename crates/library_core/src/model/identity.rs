//! Caller identity handed to the core by an external authentication layer.
//!
//! The core never verifies credentials; it trusts the identity it receives
//! and only uses the role for gating.

use std::fmt::{Display, Formatter};

/// Privilege level of a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Full inventory and request-review privileges.
    Librarian,
    /// Checkout privileges only.
    Patron,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Librarian => "librarian",
            Self::Patron => "patron",
        }
    }

    /// Parses a role label; `user` is accepted as a patron alias.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "librarian" => Some(Self::Librarian),
            "patron" | "user" => Some(Self::Patron),
            _ => None,
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Already-validated caller identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Opaque identifier, e.g. an email or numeric account id.
    pub id: String,
    pub role: Role,
}

impl Identity {
    /// Builds an identity; surrounding whitespace in `id` is dropped.
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        let id = id.into();
        Self {
            id: id.trim().to_string(),
            role,
        }
    }

    pub fn librarian(id: impl Into<String>) -> Self {
        Self::new(id, Role::Librarian)
    }

    pub fn patron(id: impl Into<String>) -> Self {
        Self::new(id, Role::Patron)
    }

    pub fn is_librarian(&self) -> bool {
        self.role == Role::Librarian
    }
}
