//! Receipt delivery through a transactional-email provider

pub mod log_mailer;
pub mod resend;

use async_trait::async_trait;

use crate::domain::receipt::RenderedReceipt;
use crate::shared::errors::EmailError;

pub use log_mailer::LogMailer;
pub use resend::ResendMailer;

/// Base trait for receipt mailers
#[async_trait]
pub trait ReceiptMailer: Send + Sync {
    /// Deliver the receipt and return the provider's message id
    async fn send(&self, receipt: &RenderedReceipt) -> Result<String, EmailError>;

    /// Provider label for logs
    fn name(&self) -> &'static str;
}
