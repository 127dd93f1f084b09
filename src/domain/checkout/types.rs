//! Wire types of the data-callback request and its approval echo

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::value::RawValue;

/// Personal data the wallet user consented to share
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestedInfo {
    pub email: Option<String>,
    pub physical_address: Option<PhysicalAddress>,
    pub phone_number: Option<PhoneNumber>,
    pub name: Option<Name>,
}

impl RequestedInfo {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.physical_address.is_none()
            && self.phone_number.is_none()
            && self.name.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalAddress {
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneNumber {
    pub country: Option<String>,
    pub number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Name {
    pub first_name: Option<String>,
    pub family_name: Option<String>,
}

/// Transaction intent supplied by the wallet.
///
/// Every member is kept as the raw JSON text it arrived as, so the echo is
/// byte-for-byte what the wallet sent. A member that was present (even as
/// `null`) is echoed; a member that was absent stays absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionIntent {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub calls: Option<Box<RawValue>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<Box<RawValue>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub version: Option<Box<RawValue>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Box<RawValue>>,
}

// `Option<Box<RawValue>>` would swallow an explicit `null`; capture it instead.
fn present<'de, D>(deserializer: D) -> Result<Option<Box<RawValue>>, D::Error>
where
    D: Deserializer<'de>,
{
    Box::<RawValue>::deserialize(deserializer).map(Some)
}

/// Body of `POST /api/data-validation`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataCallbackRequest {
    #[serde(default)]
    pub requested_info: Option<RequestedInfo>,
    #[serde(default, deserialize_with = "present")]
    pub calls: Option<Box<RawValue>>,
    #[serde(default, deserialize_with = "present")]
    pub chain_id: Option<Box<RawValue>>,
    #[serde(default, deserialize_with = "present")]
    pub version: Option<Box<RawValue>>,
    #[serde(default, deserialize_with = "present")]
    pub capabilities: Option<Box<RawValue>>,
}

impl DataCallbackRequest {
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    /// Split into the data to validate and the intent to echo.
    /// A missing or `null` `requestedInfo` means nothing was requested.
    pub fn into_parts(self) -> (RequestedInfo, TransactionIntent) {
        let intent = TransactionIntent {
            calls: self.calls,
            chain_id: self.chain_id,
            version: self.version,
            capabilities: self.capabilities,
        };
        (self.requested_info.unwrap_or_default(), intent)
    }
}

/// Success body: `{ "request": { calls, chainId, version|capabilities } }`
#[derive(Debug, Clone, Serialize)]
pub struct TransactionIntentEcho {
    pub request: TransactionIntent,
}
