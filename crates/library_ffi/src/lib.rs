//! Flutter-facing bindings for `library_core`.

pub mod api;
