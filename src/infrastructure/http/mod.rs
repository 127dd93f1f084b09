//! HTTP API

pub mod server;

pub use server::{ApiServer, ShutdownHandle, DATA_VALIDATION_PATH, HEALTH_PATH, SEND_RECEIPT_PATH};
