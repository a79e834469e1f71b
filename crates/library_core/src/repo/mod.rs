//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the full-collection persistence contract used by services.
//! - Isolate SQLite and JSON encoding details from business orchestration.
//!
//! # Invariants
//! - Services never cache collections across calls; every use-case reads,
//!   transforms and writes back the whole collection.

pub mod collection_store;
