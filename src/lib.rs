//! Checkout data-callback service
//! Validates wallet-supplied checkout data and emails order receipts

pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;

// Re-export main types for convenience
pub use application::services::{CheckoutService, JsonReply};
pub use domain::checkout::{CheckoutValidator, ValidationErrors, ValidationOutcome, ValidationPolicy};
pub use infrastructure::http::ApiServer;
