//! Infrastructure layer - HTTP server and external email provider

pub mod email;
pub mod http;
