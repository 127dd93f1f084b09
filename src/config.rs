use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

use crate::domain::checkout::{PolicyPreset, ValidationPolicy};
use crate::infrastructure::email::resend::DEFAULT_API_URL;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerCfg {
    pub bind: String,
    pub workers: usize,
    pub max_body_bytes: usize,
    /// Status for validation failures; 400 or 200-with-errors
    pub validation_error_status: u16,
}

impl Default for ServerCfg {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            workers: 4,
            max_body_bytes: 64 * 1024,
            validation_error_status: 400,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailerKind {
    Resend,
    Log,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmailCfg {
    pub provider: MailerKind,
    pub api_url: String,
    pub api_key: Option<String>,
    pub from: String,
    pub timeout_secs: u64,
}

impl Default for EmailCfg {
    fn default() -> Self {
        Self {
            provider: MailerKind::Resend,
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            from: "Base Shop <noreply@baseshop.com>".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ValidationCfg {
    pub preset: PolicyPreset,
    /// Full policy; replaces the preset when present
    pub policy: Option<ValidationPolicy>,
}

impl ValidationCfg {
    pub fn resolve(&self) -> ValidationPolicy {
        match &self.policy {
            Some(policy) => policy.clone(),
            None => self.preset.policy(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerCfg,
    pub email: EmailCfg,
    pub validation: ValidationCfg,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path.as_ref())
            .with_context(|| format!("read {}", path.as_ref().display()))?;
        Self::from_toml(&s)
    }

    pub fn from_toml(s: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(s).context("parse Config.toml")?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::checkout::policy::LengthBounds;

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg = Config::from_toml("").unwrap();
        assert_eq!(cfg.server.bind, "127.0.0.1:3000");
        assert_eq!(cfg.server.validation_error_status, 400);
        assert_eq!(cfg.email.provider, MailerKind::Resend);
        assert_eq!(cfg.validation.resolve(), ValidationPolicy::standard());
    }

    #[test]
    fn test_full_config() {
        let cfg = Config::from_toml(
            r#"
            [server]
            bind = "0.0.0.0:8080"
            workers = 8
            validation_error_status = 200

            [email]
            provider = "log"
            from = "Shop <shop@shop.io>"

            [validation]
            preset = "shipping-only"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.bind, "0.0.0.0:8080");
        assert_eq!(cfg.server.workers, 8);
        assert_eq!(cfg.server.max_body_bytes, 64 * 1024);
        assert_eq!(cfg.server.validation_error_status, 200);
        assert_eq!(cfg.email.provider, MailerKind::Log);
        assert_eq!(cfg.email.timeout_secs, 10);
        assert_eq!(cfg.validation.preset, PolicyPreset::ShippingOnly);
        assert_eq!(cfg.validation.resolve(), ValidationPolicy::shipping_only());
    }

    #[test]
    fn test_policy_table_overrides_preset() {
        let cfg = Config::from_toml(
            r#"
            [validation]
            preset = "shipping-only"

            [validation.policy.address.postal_code]
            min = 4
            max = 9
            "#,
        )
        .unwrap();
        let policy = cfg.validation.resolve();
        assert_eq!(policy.address.postal_code, LengthBounds::new(4, 9));
        assert!(policy.address.address1.required);
    }

    #[test]
    fn test_unknown_preset_is_rejected() {
        assert!(Config::from_toml("[validation]\npreset = \"lenient\"").is_err());
    }
}
