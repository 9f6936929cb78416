//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod categories;
pub mod goals;
pub mod reports;
pub mod transactions;
pub mod users;
pub mod webhook;

// Re-export all handlers for use in router
pub use categories::*;
pub use goals::*;
pub use reports::*;
pub use transactions::*;
pub use users::*;
pub use webhook::*;
