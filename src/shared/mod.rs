//! Shared components - common errors and utilities

pub mod errors;
pub mod utils;
