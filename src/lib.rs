//! Intake - short qualification form for rental enquiries
//!
//! A prospective tenant opens a personal link, answers three choice
//! questions and writes a short reason. The answers are stored once per
//! link token; a second submission for the same token is refused.
//!
//! The crate contains both halves:
//!
//! - [`server`] serves the form bundle and the JSON API and owns the
//!   submission store
//! - the terminal client (`intake` binary) drives the same [`application::Wizard`]
//!   state machine against that API

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;
pub mod server;

pub use domain::*;
pub use application::*;
