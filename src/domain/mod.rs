//! Domain layer: the question catalogue, submission records and the
//! registration rules that guard them.

pub mod errors;
pub mod link;
pub mod models;
pub mod questions;
pub mod services;

pub use errors::*;
pub use link::*;
pub use models::*;
pub use questions::*;
pub use services::*;
