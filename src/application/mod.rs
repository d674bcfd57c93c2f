//! Application layer driving the intake wizard.
//!
//! This module holds the wizard state machine, the terminal app state
//! wrapped around it, and the backend interface both talk through.

pub mod api;
pub mod state;
pub mod wizard;

pub use api::*;
pub use state::*;
pub use wizard::*;
