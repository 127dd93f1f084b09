//! Application layer - use cases and CLI

pub mod commands;
pub mod services;
