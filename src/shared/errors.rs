//! Error handling for the application

use thiserror::Error;

/// Request decoding errors
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Malformed request body: {0}")]
    Malformed(String),

    #[error("Request body too large: more than {0} bytes")]
    BodyTooLarge(usize),

    #[error("Failed to read request body: {0}")]
    Read(String),
}

impl From<serde_json::Error> for RequestError {
    fn from(err: serde_json::Error) -> Self {
        RequestError::Malformed(err.to_string())
    }
}

/// Email delivery errors
#[derive(Error, Debug, Clone)]
pub enum EmailError {
    #[error("Email transport failed: {0}")]
    Transport(String),

    #[error("Email provider rejected the message ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Email error: {0}")]
    EmailError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<RequestError> for AppError {
    fn from(err: RequestError) -> Self {
        AppError::Unknown(err.to_string())
    }
}

impl From<EmailError> for AppError {
    fn from(err: EmailError) -> Self {
        AppError::EmailError(err.to_string())
    }
}
