//! Validation policy: thresholds and deny-lists injected into the validator

use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

use crate::shared::errors::AppError;

pub const BLOCKED_EMAIL_SUFFIXES: &[&str] = &["@example.com"];
pub const DISPOSABLE_EMAIL_DOMAINS: &[&str] = &["tempmail.com", "10minutemail.com", "guerrillamail.com"];
pub const POSTAL_CODE_MIN_LEN: usize = 3;
pub const POSTAL_CODE_MAX_LEN: usize = 10;
pub const RESTRICTED_COUNTRIES: &[&str] = &["XY", "ZZ"];
pub const RESTRICTED_CITIES: &[&str] = &["restricted"];
pub const ADDRESS1_MIN_LEN: usize = 5;
pub const CITY_MIN_LEN: usize = 2;
pub const STATE_MIN_LEN: usize = 2;
pub const PHONE_NUMBER_MIN_LEN: usize = 7;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Named rule sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyPreset {
    /// Every rule active
    #[default]
    Standard,
    /// Shipping restrictions only: blocked suffix, postal code 5-10,
    /// one restricted country, restricted city
    ShippingOnly,
}

impl PolicyPreset {
    pub fn policy(&self) -> ValidationPolicy {
        match self {
            PolicyPreset::Standard => ValidationPolicy::standard(),
            PolicyPreset::ShippingOnly => ValidationPolicy::shipping_only(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyPreset::Standard => "standard",
            PolicyPreset::ShippingOnly => "shipping-only",
        }
    }
}

impl FromStr for PolicyPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(PolicyPreset::Standard),
            "shipping-only" | "shipping_only" => Ok(PolicyPreset::ShippingOnly),
            other => Err(format!(
                "unknown policy preset '{}', expected 'standard' or 'shipping-only'",
                other
            )),
        }
    }
}

impl std::fmt::Display for PolicyPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive length range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthBounds {
    pub min: usize,
    pub max: usize,
}

impl LengthBounds {
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, len: usize) -> bool {
        len >= self.min && len <= self.max
    }
}

/// A text sub-field that may be mandatory with a minimum trimmed length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredText {
    pub required: bool,
    pub min_len: usize,
}

impl RequiredText {
    pub fn required(min_len: usize) -> Self {
        Self { required: true, min_len }
    }

    pub fn optional() -> Self {
        Self { required: false, min_len: 0 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailRules {
    /// Matched against the end of the lower-cased address
    pub blocked_suffixes: Vec<String>,
    /// Matched as `@<domain>` at the end of the lower-cased address
    pub disposable_domains: Vec<String>,
}

impl Default for EmailRules {
    fn default() -> Self {
        Self {
            blocked_suffixes: strings(BLOCKED_EMAIL_SUFFIXES),
            disposable_domains: strings(DISPOSABLE_EMAIL_DOMAINS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressRules {
    #[serde(deserialize_with = "postal_code_bounds")]
    pub postal_code: LengthBounds,
    pub restricted_countries: Vec<String>,
    pub restricted_cities: Vec<String>,
    #[serde(deserialize_with = "address1_text")]
    pub address1: RequiredText,
    #[serde(deserialize_with = "city_text")]
    pub city: RequiredText,
    #[serde(deserialize_with = "state_text")]
    pub state: RequiredText,
}

// Partial sub-tables keep the standard value for every omitted key
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct BoundsOverride {
    min: Option<usize>,
    max: Option<usize>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TextOverride {
    required: Option<bool>,
    min_len: Option<usize>,
}

impl TextOverride {
    fn apply(self, base: RequiredText) -> RequiredText {
        RequiredText {
            required: self.required.unwrap_or(base.required),
            min_len: self.min_len.unwrap_or(base.min_len),
        }
    }
}

fn postal_code_bounds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<LengthBounds, D::Error> {
    let patch = BoundsOverride::deserialize(deserializer)?;
    Ok(LengthBounds::new(
        patch.min.unwrap_or(POSTAL_CODE_MIN_LEN),
        patch.max.unwrap_or(POSTAL_CODE_MAX_LEN),
    ))
}

fn address1_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<RequiredText, D::Error> {
    Ok(TextOverride::deserialize(deserializer)?.apply(RequiredText::required(ADDRESS1_MIN_LEN)))
}

fn city_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<RequiredText, D::Error> {
    Ok(TextOverride::deserialize(deserializer)?.apply(RequiredText::required(CITY_MIN_LEN)))
}

fn state_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<RequiredText, D::Error> {
    Ok(TextOverride::deserialize(deserializer)?.apply(RequiredText::required(STATE_MIN_LEN)))
}

impl Default for AddressRules {
    fn default() -> Self {
        Self {
            postal_code: LengthBounds::new(POSTAL_CODE_MIN_LEN, POSTAL_CODE_MAX_LEN),
            restricted_countries: strings(RESTRICTED_COUNTRIES),
            restricted_cities: strings(RESTRICTED_CITIES),
            address1: RequiredText::required(ADDRESS1_MIN_LEN),
            city: RequiredText::required(CITY_MIN_LEN),
            state: RequiredText::required(STATE_MIN_LEN),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhoneRules {
    /// 0 disables the check
    pub number_min_len: usize,
}

impl Default for PhoneRules {
    fn default() -> Self {
        Self {
            number_min_len: PHONE_NUMBER_MIN_LEN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameRules {
    pub require_first_name: bool,
    pub require_family_name: bool,
}

impl Default for NameRules {
    fn default() -> Self {
        Self {
            require_first_name: true,
            require_family_name: true,
        }
    }
}

/// Complete rule configuration for [`super::CheckoutValidator`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationPolicy {
    pub email: EmailRules,
    pub address: AddressRules,
    pub phone: PhoneRules,
    pub name: NameRules,
}

impl ValidationPolicy {
    pub fn standard() -> Self {
        Self::default()
    }

    pub fn shipping_only() -> Self {
        Self {
            email: EmailRules {
                blocked_suffixes: strings(BLOCKED_EMAIL_SUFFIXES),
                disposable_domains: Vec::new(),
            },
            address: AddressRules {
                postal_code: LengthBounds::new(5, POSTAL_CODE_MAX_LEN),
                restricted_countries: strings(&["XY"]),
                restricted_cities: strings(RESTRICTED_CITIES),
                address1: RequiredText::optional(),
                city: RequiredText::optional(),
                state: RequiredText::optional(),
            },
            phone: PhoneRules { number_min_len: 0 },
            name: NameRules {
                require_first_name: false,
                require_family_name: false,
            },
        }
    }

    /// Reject configurations that cannot be applied consistently
    pub fn check(&self) -> Result<(), AppError> {
        let bounds = self.address.postal_code;
        if bounds.min > bounds.max {
            return Err(AppError::ConfigError(format!(
                "postal code bounds are inverted: min {} > max {}",
                bounds.min, bounds.max
            )));
        }

        let lists = [
            ("email.blocked_suffixes", &self.email.blocked_suffixes),
            ("email.disposable_domains", &self.email.disposable_domains),
            ("address.restricted_countries", &self.address.restricted_countries),
            ("address.restricted_cities", &self.address.restricted_cities),
        ];
        for (name, list) in lists {
            if list.iter().any(|entry| entry.trim().is_empty()) {
                return Err(AppError::ConfigError(format!(
                    "{} contains an empty entry",
                    name
                )));
            }
        }

        Ok(())
    }
}
