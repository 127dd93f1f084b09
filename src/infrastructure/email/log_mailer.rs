use async_trait::async_trait;
use tracing::info;

use super::ReceiptMailer;
use crate::domain::receipt::RenderedReceipt;
use crate::shared::errors::EmailError;
use crate::shared::utils::generate_id;

/// Mailer that only logs receipts. Used when no provider key is configured.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

impl LogMailer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ReceiptMailer for LogMailer {
    async fn send(&self, receipt: &RenderedReceipt) -> Result<String, EmailError> {
        let id = format!("log-{}", generate_id());
        info!(
            email_id = %id,
            to = %receipt.to,
            subject = %receipt.subject,
            "Receipt not sent (log mailer)"
        );
        Ok(id)
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_mailer_returns_synthetic_id() {
        let receipt = RenderedReceipt {
            to: "a@b.io".to_string(),
            subject: "s".to_string(),
            html: String::new(),
            text: String::new(),
        };
        let id = LogMailer::new().send(&receipt).await.unwrap();
        assert!(id.starts_with("log-"));
        assert_eq!(id.len(), "log-".len() + 36);
    }
}
