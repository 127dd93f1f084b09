// src/app.rs
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::application::services::{CheckoutService, JsonReply};
use crate::config::{Config, EmailCfg, MailerKind};
use crate::domain::checkout::{CheckoutValidator, ValidationPolicy};
use crate::infrastructure::email::{LogMailer, ReceiptMailer, ResendMailer};
use crate::infrastructure::http::ApiServer;

pub const API_KEY_ENV: &str = "RESEND_API_KEY";

#[derive(Debug, Clone)]
pub struct AppCfg {
    pub bind: String,
    pub workers: usize,
    pub max_body_bytes: usize,
    pub validation_error_status: u16,
    pub policy: ValidationPolicy,
    pub email: EmailCfg,
}

impl AppCfg {
    pub fn from_config(cfg: Config) -> Result<Self> {
        let policy = cfg.validation.resolve();
        policy.check()?;

        let mut email = cfg.email;
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                email.api_key = Some(key);
            }
        }

        Ok(Self {
            bind: cfg.server.bind,
            workers: cfg.server.workers,
            max_body_bytes: cfg.server.max_body_bytes,
            validation_error_status: cfg.server.validation_error_status,
            policy,
            email,
        })
    }

    pub fn validate(&self) -> Result<()> {
        check_validation_status(self.validation_error_status)?;
        if self.max_body_bytes == 0 {
            anyhow::bail!("max_body_bytes must be greater than zero");
        }
        self.policy.check()?;
        Ok(())
    }
}

/// Validation failures carry a JSON body, so only 200 or a 4xx status is allowed.
pub fn check_validation_status(status: u16) -> Result<()> {
    if status == 200 || (400..500).contains(&status) {
        return Ok(());
    }
    anyhow::bail!(
        "validation_error_status must be 200 or a 4xx status, got {}",
        status
    )
}

/// Pick the receipt mailer; falls back to logging when no API key is set.
pub fn build_mailer(email: &EmailCfg) -> Result<Arc<dyn ReceiptMailer>> {
    match (email.provider, email.api_key.as_deref()) {
        (MailerKind::Log, _) => Ok(Arc::new(LogMailer::new())),
        (MailerKind::Resend, Some(key)) if !key.trim().is_empty() => {
            let mailer = ResendMailer::new(
                email.api_url.clone(),
                key,
                email.from.clone(),
                Duration::from_secs(email.timeout_secs),
            )?;
            Ok(Arc::new(mailer))
        }
        (MailerKind::Resend, _) => {
            warn!("{} is not set, receipts will only be logged", API_KEY_ENV);
            Ok(Arc::new(LogMailer::new()))
        }
    }
}

pub fn build_service(app_cfg: &AppCfg) -> Result<CheckoutService> {
    let validator = CheckoutValidator::new(app_cfg.policy.clone());
    let mailer = build_mailer(&app_cfg.email)?;
    Ok(CheckoutService::new(
        validator,
        mailer,
        app_cfg.validation_error_status,
    ))
}

pub async fn run(app_cfg: AppCfg) -> Result<()> {
    app_cfg.validate()?;
    info!("Starting checkout data-callback service");
    info!(
        bind = %app_cfg.bind,
        workers = app_cfg.workers,
        validation_error_status = app_cfg.validation_error_status,
        "Configuration loaded"
    );

    let service = Arc::new(build_service(&app_cfg)?);
    let server = ApiServer::bind(
        &app_cfg.bind,
        service,
        tokio::runtime::Handle::current(),
        app_cfg.max_body_bytes,
    )?;
    match server.local_addr() {
        Some(addr) => info!(%addr, "Checkout API listening"),
        None => info!(bind = %app_cfg.bind, "Checkout API listening"),
    }

    let (shutdown, workers) = server.spawn_workers(app_cfg.workers)?;

    tokio::signal::ctrl_c()
        .await
        .context("listen for shutdown signal")?;
    info!("Shutdown requested, stopping workers");
    shutdown.shutdown();

    tokio::task::spawn_blocking(move || {
        for worker in workers {
            if worker.join().is_err() {
                error!("HTTP worker exited with a panic");
            }
        }
    })
    .await
    .context("join HTTP workers")?;

    info!("Checkout service stopped");
    Ok(())
}

/// Evaluate a data-callback payload from `path` the way the endpoint would.
pub fn check_payload<P: AsRef<Path>>(
    path: P,
    policy: ValidationPolicy,
    validation_error_status: u16,
) -> Result<JsonReply> {
    policy.check()?;
    check_validation_status(validation_error_status)?;
    let body = std::fs::read(path.as_ref())
        .with_context(|| format!("read {}", path.as_ref().display()))?;
    let service = CheckoutService::new(
        CheckoutValidator::new(policy),
        Arc::new(LogMailer::new()),
        validation_error_status,
    );
    Ok(service.validate_data(&body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_cfg() -> AppCfg {
        AppCfg {
            bind: "127.0.0.1:0".to_string(),
            workers: 1,
            max_body_bytes: 1024,
            validation_error_status: 400,
            policy: ValidationPolicy::standard(),
            email: EmailCfg::default(),
        }
    }

    #[test]
    fn test_validate_rejects_server_error_status() {
        let mut cfg = app_cfg();
        assert!(cfg.validate().is_ok());
        cfg.validation_error_status = 500;
        assert!(cfg.validate().is_err());
        cfg.validation_error_status = 99;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bodyless_statuses() {
        let mut cfg = app_cfg();
        for status in [204, 301, 304] {
            cfg.validation_error_status = status;
            assert!(cfg.validate().is_err(), "status {} accepted", status);
        }
        for status in [200, 400, 422, 499] {
            cfg.validation_error_status = status;
            assert!(cfg.validate().is_ok(), "status {} rejected", status);
        }
    }

    #[test]
    fn test_build_mailer_falls_back_to_log() {
        let email = EmailCfg {
            api_key: None,
            ..EmailCfg::default()
        };
        assert_eq!(build_mailer(&email).unwrap().name(), "log");

        let email = EmailCfg {
            api_key: Some("re_123".to_string()),
            ..EmailCfg::default()
        };
        assert_eq!(build_mailer(&email).unwrap().name(), "resend");

        let email = EmailCfg {
            provider: MailerKind::Log,
            api_key: Some("re_123".to_string()),
            ..EmailCfg::default()
        };
        assert_eq!(build_mailer(&email).unwrap().name(), "log");
    }

    #[test]
    fn test_check_payload() {
        let path = std::env::temp_dir().join(format!("checkout-payload-{}.json", crate::shared::utils::generate_id()));
        std::fs::write(&path, r#"{"requestedInfo":{"email":"x@tempmail.com"},"chainId":1}"#).unwrap();
        let reply = check_payload(&path, ValidationPolicy::standard(), 400).unwrap();
        let relaxed = check_payload(&path, ValidationPolicy::standard(), 200).unwrap();
        let refused = check_payload(&path, ValidationPolicy::standard(), 503);
        std::fs::remove_file(&path).ok();
        assert_eq!(reply.status, 400);
        assert_eq!(reply.json()["errors"]["email"], "Disposable email addresses are not allowed");
        assert_eq!(relaxed.status, 200);
        assert_eq!(relaxed.json(), reply.json());
        assert!(refused.is_err());
    }
}
