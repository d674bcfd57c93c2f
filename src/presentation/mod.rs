//! Presentation layer handling terminal UI and user input.
//!
//! Renders one screen per wizard phase with ratatui and maps crossterm
//! key events onto wizard actions.

pub mod input;
pub mod ui;

pub use input::*;
pub use ui::*;
