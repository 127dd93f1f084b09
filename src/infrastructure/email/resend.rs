use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::ReceiptMailer;
use crate::domain::receipt::RenderedReceipt;
use crate::shared::errors::EmailError;

pub const DEFAULT_API_URL: &str = "https://api.resend.com";

/// Outgoing message for the Resend `/emails` endpoint
#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: String,
}

/// Resend transactional-email client
pub struct ResendMailer {
    http_client: Client,
    base_url: String,
    api_key: String,
    from: String,
}

impl ResendMailer {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        from: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, EmailError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EmailError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            from: from.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/emails", self.base_url)
    }

    fn payload<'a>(&'a self, receipt: &'a RenderedReceipt) -> SendEmailRequest<'a> {
        SendEmailRequest {
            from: &self.from,
            to: [receipt.to.as_str()],
            subject: &receipt.subject,
            html: &receipt.html,
            text: &receipt.text,
        }
    }
}

#[async_trait]
impl ReceiptMailer for ResendMailer {
    async fn send(&self, receipt: &RenderedReceipt) -> Result<String, EmailError> {
        debug!(to = %receipt.to, subject = %receipt.subject, "Sending receipt via Resend");

        let response = self
            .http_client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&self.payload(receipt))
            .send()
            .await
            .map_err(|e| EmailError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Resend rejected receipt");
            return Err(EmailError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: SendEmailResponse = response
            .json()
            .await
            .map_err(|e| EmailError::InvalidResponse(e.to_string()))?;
        Ok(body.id)
    }

    fn name(&self) -> &'static str {
        "resend"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt() -> RenderedReceipt {
        RenderedReceipt {
            to: "buyer@shop.io".to_string(),
            subject: "Order Confirmation #BSH-1-A - Base Shop".to_string(),
            html: "<p>hi</p>".to_string(),
            text: "hi".to_string(),
        }
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let mailer = ResendMailer::new(
            "https://api.resend.com/",
            "re_test",
            "Base Shop <noreply@baseshop.com>",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(mailer.endpoint(), "https://api.resend.com/emails");
        assert_eq!(mailer.name(), "resend");
    }

    #[test]
    fn test_payload_shape() {
        let mailer = ResendMailer::new(
            DEFAULT_API_URL,
            "re_test",
            "Base Shop <noreply@baseshop.com>",
            Duration::from_secs(5),
        )
        .unwrap();
        let receipt = receipt();
        let json = serde_json::to_value(mailer.payload(&receipt)).unwrap();
        assert_eq!(json["from"], "Base Shop <noreply@baseshop.com>");
        assert_eq!(json["to"], serde_json::json!(["buyer@shop.io"]));
        assert_eq!(json["subject"], "Order Confirmation #BSH-1-A - Base Shop");
        assert_eq!(json["html"], "<p>hi</p>");
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_transport_error() {
        let mailer = ResendMailer::new(
            "http://127.0.0.1:9",
            "re_test",
            "Base Shop <noreply@baseshop.com>",
            Duration::from_secs(2),
        )
        .unwrap();
        let err = mailer.send(&receipt()).await.unwrap_err();
        assert!(matches!(err, EmailError::Transport(_)));
    }
}
