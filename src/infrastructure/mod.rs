//! Infrastructure layer providing external service integrations.
//!
//! File-backed and in-memory submission storage, and the HTTP client the
//! terminal wizard uses to reach the server.

pub mod client;
pub mod persistence;

pub use client::*;
pub use persistence::*;
