//! Domain layer - core business logic and entities

pub mod checkout;
pub mod receipt;
