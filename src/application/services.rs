//! Application services and use cases

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::domain::checkout::{
    CheckoutValidator, DataCallbackRequest, ValidationErrors, ValidationOutcome,
};
use crate::domain::receipt::{render_receipt, ReceiptRequest};
use crate::infrastructure::email::ReceiptMailer;
use crate::shared::errors::RequestError;

pub const SERVER_ERROR_MESSAGE: &str =
    "Server error occurred while validating data. Please try again.";

/// Status code and serialized JSON body of an API response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonReply {
    pub status: u16,
    pub body: String,
}

impl JsonReply {
    pub fn new<T: Serialize>(status: u16, body: &T) -> Self {
        match serde_json::to_string(body) {
            Ok(body) => Self { status, body },
            Err(e) => {
                error!(error = %e, "Failed to serialize response body");
                Self::server_error(SERVER_ERROR_MESSAGE)
            }
        }
    }

    pub fn ok<T: Serialize>(body: &T) -> Self {
        Self::new(200, body)
    }

    /// `{"errors": {"server": message}}`, distinct from validation errors
    pub fn server_error(message: &str) -> Self {
        Self::server_error_with_status(500, message)
    }

    pub fn server_error_with_status(status: u16, message: &str) -> Self {
        Self {
            status,
            body: json!({ "errors": { "server": message } }).to_string(),
        }
    }

    /// `{"error": message}`
    pub fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            body: json!({ "error": message }).to_string(),
        }
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap_or(serde_json::Value::Null)
    }
}

/// Validation-failure body; serialized directly to keep field order
#[derive(Serialize)]
struct ErrorsBody<'a> {
    errors: &'a ValidationErrors,
}

/// Checkout endpoints: data-callback validation and receipts
pub struct CheckoutService {
    validator: CheckoutValidator,
    mailer: Arc<dyn ReceiptMailer>,
    validation_error_status: u16,
}

impl CheckoutService {
    pub fn new(
        validator: CheckoutValidator,
        mailer: Arc<dyn ReceiptMailer>,
        validation_error_status: u16,
    ) -> Self {
        Self {
            validator,
            mailer,
            validation_error_status,
        }
    }

    pub fn validator(&self) -> &CheckoutValidator {
        &self.validator
    }

    /// `POST /api/data-validation`
    pub fn validate_data(&self, body: &[u8]) -> JsonReply {
        let request = match parse_callback(body) {
            Ok(request) => request,
            Err(e) => {
                error!(error = %e, "Error processing data validation");
                return JsonReply::server_error(SERVER_ERROR_MESSAGE);
            }
        };

        match self.validator.evaluate(request) {
            ValidationOutcome::Approved(echo) => {
                debug!("Checkout data approved");
                JsonReply::ok(&echo)
            }
            ValidationOutcome::Rejected(errors) => {
                let fields = errors.fields().map(|f| f.to_string()).collect::<Vec<_>>().join(",");
                debug!(fields = %fields, "Checkout data rejected");
                JsonReply::new(self.validation_error_status, &ErrorsBody { errors: &errors })
            }
        }
    }

    /// `POST /api/send-receipt`
    pub async fn send_receipt(&self, body: &[u8]) -> JsonReply {
        let request: ReceiptRequest = match serde_json::from_slice(body) {
            Ok(request) => request,
            Err(e) => {
                error!(error = %e, "Receipt email error");
                return JsonReply::error(500, "Internal server error");
            }
        };

        let order = match request.into_order() {
            Some(order) => order,
            None => return JsonReply::error(400, "Email is required"),
        };

        let receipt = render_receipt(&order, Utc::now().date_naive());
        match self.mailer.send(&receipt).await {
            Ok(email_id) => {
                info!(
                    order_number = %order.order_number,
                    mailer = self.mailer.name(),
                    email_id = %email_id,
                    "Receipt sent"
                );
                JsonReply::ok(&json!({
                    "success": true,
                    "emailId": email_id,
                    "orderNumber": order.order_number,
                }))
            }
            Err(e) => {
                error!(
                    order_number = %order.order_number,
                    mailer = self.mailer.name(),
                    error = %e,
                    "Email sending error"
                );
                JsonReply::error(500, "Failed to send email")
            }
        }
    }
}

fn parse_callback(body: &[u8]) -> Result<DataCallbackRequest, RequestError> {
    Ok(DataCallbackRequest::from_slice(body)?)
}
