//! Checkout-data validator

use super::errors::{ErrorAccumulator, Field, ValidationErrors};
use super::policy::{RequiredText, ValidationPolicy};
use super::types::{
    DataCallbackRequest, Name, PhoneNumber, PhysicalAddress, RequestedInfo, TransactionIntentEcho,
};
use crate::shared::utils::char_len;

pub const MSG_EMAIL_BLOCKED: &str = "This email domain is not allowed for security reasons";
pub const MSG_EMAIL_DISPOSABLE: &str = "Disposable email addresses are not allowed";
pub const MSG_COUNTRY_RESTRICTED: &str = "We don't currently ship to this country";
pub const MSG_CITY_RESTRICTED: &str = "We don't ship to this city";
pub const MSG_CITY_REQUIRED: &str = "City is required";
pub const MSG_STATE_REQUIRED: &str = "State/Province is required";
pub const MSG_PHONE_TOO_SHORT: &str = "Phone number is too short";
pub const MSG_FIRST_NAME_REQUIRED: &str = "First name is required";
pub const MSG_FAMILY_NAME_REQUIRED: &str = "Last name is required";

/// Result of evaluating a data-callback request
#[derive(Debug, Clone)]
pub enum ValidationOutcome {
    /// Wallet may proceed; carries the intent to echo
    Approved(TransactionIntentEcho),
    /// Wallet should re-prompt the user
    Rejected(ValidationErrors),
}

impl ValidationOutcome {
    pub fn is_approved(&self) -> bool {
        matches!(self, ValidationOutcome::Approved(_))
    }
}

/// Stateless validator; safe to share between request workers
#[derive(Debug, Clone, Default)]
pub struct CheckoutValidator {
    policy: ValidationPolicy,
}

impl CheckoutValidator {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    /// Validate the requested info and either approve the intent echo or
    /// return the collected errors.
    pub fn evaluate(&self, request: DataCallbackRequest) -> ValidationOutcome {
        let (info, intent) = request.into_parts();
        match self.validate(&info) {
            Ok(()) => ValidationOutcome::Approved(TransactionIntentEcho { request: intent }),
            Err(errors) => ValidationOutcome::Rejected(errors),
        }
    }

    /// Run every rule against the fields that are present.
    pub fn validate(&self, info: &RequestedInfo) -> Result<(), ValidationErrors> {
        if info.is_empty() {
            return Ok(());
        }
        let mut acc = ErrorAccumulator::new();

        if let Some(email) = info.email.as_deref() {
            self.check_email(email, &mut acc);
        }
        if let Some(address) = &info.physical_address {
            self.check_address(address, &mut acc);
        }
        if let Some(phone) = &info.phone_number {
            self.check_phone(phone, &mut acc);
        }
        if let Some(name) = &info.name {
            self.check_name(name, &mut acc);
        }

        match acc.finish() {
            Some(errors) => Err(errors),
            None => Ok(()),
        }
    }

    fn check_email(&self, email: &str, acc: &mut ErrorAccumulator) {
        let rules = &self.policy.email;
        let email = email.trim().to_lowercase();

        if rules
            .blocked_suffixes
            .iter()
            .any(|suffix| email.ends_with(&suffix.to_lowercase()))
        {
            acc.reject(Field::Email, MSG_EMAIL_BLOCKED);
        }

        if rules
            .disposable_domains
            .iter()
            .any(|domain| email.ends_with(&format!("@{}", domain.to_lowercase())))
        {
            acc.reject(Field::Email, MSG_EMAIL_DISPOSABLE);
        }
    }

    fn check_address(&self, address: &PhysicalAddress, acc: &mut ErrorAccumulator) {
        let rules = &self.policy.address;
        let field = Field::PhysicalAddress;

        if let Some(postal_code) = address.postal_code.as_deref().filter(|p| !p.is_empty()) {
            if !rules.postal_code.contains(char_len(postal_code)) {
                acc.reject_sub(
                    field,
                    "postalCode",
                    format!(
                        "Postal code must be between {} and {} characters",
                        rules.postal_code.min, rules.postal_code.max
                    ),
                );
            }
        }

        if let Some(country) = address.country_code.as_deref() {
            if rules
                .restricted_countries
                .iter()
                .any(|c| c.eq_ignore_ascii_case(country.trim()))
            {
                acc.reject_sub(field, "countryCode", MSG_COUNTRY_RESTRICTED);
            }
        }

        if let Some(city) = address.city.as_deref() {
            let city = city.to_lowercase();
            if rules.restricted_cities.iter().any(|c| c.to_lowercase() == city) {
                acc.reject_sub(field, "city", MSG_CITY_RESTRICTED);
            }
        }

        if missing_text(address.address1.as_deref(), rules.address1) {
            acc.reject_sub(
                field,
                "address1",
                format!(
                    "Street address is required and must be at least {} characters",
                    rules.address1.min_len
                ),
            );
        }
        if missing_text(address.city.as_deref(), rules.city) {
            acc.reject_sub(field, "city", MSG_CITY_REQUIRED);
        }
        if missing_text(address.state.as_deref(), rules.state) {
            acc.reject_sub(field, "state", MSG_STATE_REQUIRED);
        }
    }

    fn check_phone(&self, phone: &PhoneNumber, acc: &mut ErrorAccumulator) {
        let min_len = self.policy.phone.number_min_len;
        if let Some(number) = phone.number.as_deref().filter(|n| !n.is_empty()) {
            if char_len(number) < min_len {
                acc.reject_sub(Field::PhoneNumber, "number", MSG_PHONE_TOO_SHORT);
            }
        }
    }

    fn check_name(&self, name: &Name, acc: &mut ErrorAccumulator) {
        let rules = &self.policy.name;
        if rules.require_first_name && is_blank(name.first_name.as_deref()) {
            acc.reject_sub(Field::Name, "firstName", MSG_FIRST_NAME_REQUIRED);
        }
        if rules.require_family_name && is_blank(name.family_name.as_deref()) {
            acc.reject_sub(Field::Name, "familyName", MSG_FAMILY_NAME_REQUIRED);
        }
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

fn missing_text(value: Option<&str>, rule: RequiredText) -> bool {
    if !rule.required {
        return false;
    }
    match value {
        None => true,
        Some(v) => char_len(v.trim()) < rule.min_len,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::checkout::policy::LengthBounds;
    use crate::domain::checkout::FieldError;

    fn validator() -> CheckoutValidator {
        CheckoutValidator::new(ValidationPolicy::standard())
    }

    fn valid_address() -> PhysicalAddress {
        PhysicalAddress {
            address1: Some("1 Main Street".to_string()),
            address2: None,
            city: Some("New York".to_string()),
            state: Some("NY".to_string()),
            postal_code: Some("10001".to_string()),
            country_code: Some("US".to_string()),
        }
    }

    fn with_address(address: PhysicalAddress) -> RequestedInfo {
        RequestedInfo {
            physical_address: Some(address),
            ..Default::default()
        }
    }

    fn with_email(email: &str) -> RequestedInfo {
        RequestedInfo {
            email: Some(email.to_string()),
            ..Default::default()
        }
    }

    fn address_error(errors: &ValidationErrors, sub: &str) -> Option<String> {
        errors
            .get(Field::PhysicalAddress)
            .and_then(|e| e.sub_field(sub))
            .map(str::to_string)
    }

    #[test]
    fn test_empty_info_passes() {
        assert!(validator().validate(&RequestedInfo::default()).is_ok());
    }

    #[test]
    fn test_blocked_email_suffix() {
        let errors = validator().validate(&with_email("a@example.com")).unwrap_err();
        assert_eq!(errors.fields().count(), 1);
        assert_eq!(
            errors.get(Field::Email),
            Some(&FieldError::Message(MSG_EMAIL_BLOCKED.to_string()))
        );

        let errors = validator().validate(&with_email("Alice@EXAMPLE.com")).unwrap_err();
        assert!(errors.contains(Field::Email));
    }

    #[test]
    fn test_unrelated_emails_pass() {
        for email in ["a@example.org", "a@myexample.company", "example.com@gmail.com", "a@b.io"] {
            assert!(validator().validate(&with_email(email)).is_ok(), "{}", email);
        }
    }

    #[test]
    fn test_disposable_email() {
        let errors = validator().validate(&with_email("x@tempmail.com")).unwrap_err();
        assert_eq!(
            errors.get(Field::Email).and_then(|e| e.message()),
            Some(MSG_EMAIL_DISPOSABLE)
        );
        assert!(validator().validate(&with_email("x@nottempmail.com")).is_ok());
    }

    #[test]
    fn test_disposable_check_disabled_in_shipping_only() {
        let v = CheckoutValidator::new(ValidationPolicy::shipping_only());
        assert!(v.validate(&with_email("x@tempmail.com")).is_ok());
    }

    #[test]
    fn test_valid_address_passes() {
        assert!(validator().validate(&with_address(valid_address())).is_ok());
    }

    #[test]
    fn test_postal_code_bounds() {
        let v = validator();
        let LengthBounds { min, max } = v.policy().address.postal_code;
        for len in [min, min + 1, max - 1, max] {
            let mut address = valid_address();
            address.postal_code = Some("9".repeat(len));
            assert!(v.validate(&with_address(address)).is_ok(), "len {}", len);
        }
        for len in [min - 1, max + 1, max + 5] {
            let mut address = valid_address();
            address.postal_code = Some("9".repeat(len));
            let errors = v.validate(&with_address(address)).unwrap_err();
            assert!(address_error(&errors, "postalCode").is_some(), "len {}", len);
            assert!(address_error(&errors, "city").is_none());
        }
    }

    #[test]
    fn test_empty_postal_code_is_not_checked() {
        let mut address = valid_address();
        address.postal_code = Some(String::new());
        assert!(validator().validate(&with_address(address)).is_ok());
    }

    #[test]
    fn test_restricted_country() {
        let mut address = valid_address();
        address.country_code = Some("zz".to_string());
        let errors = validator().validate(&with_address(address)).unwrap_err();
        assert_eq!(
            address_error(&errors, "countryCode").as_deref(),
            Some(MSG_COUNTRY_RESTRICTED)
        );
    }

    #[test]
    fn test_restricted_city_is_case_insensitive() {
        let mut address = valid_address();
        address.city = Some("ReStRiCtEd".to_string());
        let errors = validator().validate(&with_address(address)).unwrap_err();
        assert_eq!(address_error(&errors, "city").as_deref(), Some(MSG_CITY_RESTRICTED));
        assert_eq!(errors.get(Field::PhysicalAddress).map(|e| match e {
            FieldError::Nested(entries) => entries.len(),
            FieldError::Message(_) => 0,
        }), Some(1));
    }

    #[test]
    fn test_short_street_address_only_flags_address1() {
        let mut address = valid_address();
        address.address1 = Some("1 St".to_string());
        address.city = Some("NY".to_string());
        address.postal_code = Some("12345".to_string());
        let errors = validator().validate(&with_address(address)).unwrap_err();

        assert!(address_error(&errors, "address1").is_some());
        for sibling in ["city", "state", "postalCode", "countryCode"] {
            assert!(address_error(&errors, sibling).is_none(), "{}", sibling);
        }
        assert!(!errors.contains(Field::Email));
    }

    #[test]
    fn test_missing_required_address_fields() {
        let address = PhysicalAddress {
            city: Some("  ".to_string()),
            state: Some("N".to_string()),
            ..Default::default()
        };
        let errors = validator().validate(&with_address(address)).unwrap_err();
        assert!(address_error(&errors, "address1").is_some());
        assert_eq!(address_error(&errors, "city").as_deref(), Some(MSG_CITY_REQUIRED));
        assert_eq!(address_error(&errors, "state").as_deref(), Some(MSG_STATE_REQUIRED));
        assert!(address_error(&errors, "postalCode").is_none());
    }

    #[test]
    fn test_shipping_only_skips_required_fields() {
        let v = CheckoutValidator::new(ValidationPolicy::shipping_only());
        assert!(v.validate(&with_address(PhysicalAddress::default())).is_ok());

        let address = PhysicalAddress {
            postal_code: Some("1234".to_string()),
            ..Default::default()
        };
        let errors = v.validate(&with_address(address)).unwrap_err();
        assert!(address_error(&errors, "postalCode").is_some());
    }

    #[test]
    fn test_phone_number_length() {
        let v = validator();
        let short = RequestedInfo {
            phone_number: Some(PhoneNumber {
                country: Some("US".to_string()),
                number: Some("12345".to_string()),
            }),
            ..Default::default()
        };
        let errors = v.validate(&short).unwrap_err();
        assert_eq!(
            errors.get(Field::PhoneNumber).and_then(|e| e.sub_field("number")),
            Some(MSG_PHONE_TOO_SHORT)
        );

        let ok = RequestedInfo {
            phone_number: Some(PhoneNumber {
                country: Some("US".to_string()),
                number: Some("5551234".to_string()),
            }),
            ..Default::default()
        };
        assert!(v.validate(&ok).is_ok());

        // An empty phone object produces no empty `phoneNumber` branch
        let empty = RequestedInfo {
            phone_number: Some(PhoneNumber::default()),
            ..Default::default()
        };
        assert!(v.validate(&empty).is_ok());
    }

    #[test]
    fn test_blank_first_name() {
        let info = RequestedInfo {
            name: Some(Name {
                first_name: Some(String::new()),
                family_name: Some("Doe".to_string()),
            }),
            ..Default::default()
        };
        let errors = validator().validate(&info).unwrap_err();
        let name = errors.get(Field::Name).unwrap();
        assert_eq!(name.sub_field("firstName"), Some(MSG_FIRST_NAME_REQUIRED));
        assert_eq!(name.sub_field("familyName"), None);
    }

    #[test]
    fn test_all_violations_are_accumulated() {
        let info = RequestedInfo {
            email: Some("bob@example.com".to_string()),
            physical_address: Some(PhysicalAddress {
                country_code: Some("XY".to_string()),
                ..Default::default()
            }),
            phone_number: Some(PhoneNumber {
                country: None,
                number: Some("1".to_string()),
            }),
            name: Some(Name::default()),
        };
        let errors = validator().validate(&info).unwrap_err();
        assert_eq!(errors.fields().count(), 4);
        assert_eq!(errors.get(Field::Name).and_then(|e| e.sub_field("familyName")), Some(MSG_FAMILY_NAME_REQUIRED));
        assert!(address_error(&errors, "countryCode").is_some());
        assert!(address_error(&errors, "address1").is_some());
    }

    #[test]
    fn test_evaluate_approves_with_intent() {
        let body = br#"{"requestedInfo":{},"calls":[{"to":"0xabc","data":"0x01"}],"chainId":84532}"#;
        let outcome = validator().evaluate(DataCallbackRequest::from_slice(body).unwrap());
        match outcome {
            ValidationOutcome::Approved(echo) => {
                assert_eq!(echo.request.calls.unwrap().get(), r#"[{"to":"0xabc","data":"0x01"}]"#);
                assert_eq!(echo.request.chain_id.unwrap().get(), "84532");
                assert!(echo.request.version.is_none());
            }
            ValidationOutcome::Rejected(errors) => panic!("unexpected errors: {:?}", errors),
        }
    }

    #[test]
    fn test_evaluate_rejects() {
        let body = br#"{"requestedInfo":{"email":"a@example.com"},"chainId":1}"#;
        let outcome = validator().evaluate(DataCallbackRequest::from_slice(body).unwrap());
        assert!(!outcome.is_approved());
    }
}
