//! Order data carried by the receipt endpoint

use chrono::Utc;
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::shared::utils::{random_base36, to_base36};

pub const ORDER_NUMBER_PREFIX: &str = "BSH";

/// Catalog product as sent by the storefront
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// USDC per unit; the storefront sends it as a decimal string
    #[serde(deserialize_with = "price_from_string_or_number")]
    pub price: f64,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    pub fn line_total(&self) -> f64 {
        self.product.price * self.quantity as f64
    }
}

/// Body of `POST /api/send-receipt`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub wallet_address: Option<String>,
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub total: f64,
    pub order_number: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

impl ReceiptRequest {
    /// Turn the request into an order, generating an order number when the
    /// storefront did not send one. `None` when there is no recipient.
    pub fn into_order(self) -> Option<ReceiptOrder> {
        let email = self.email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty())?;
        let order_number = self
            .order_number
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(generate_order_number);

        Some(ReceiptOrder {
            email,
            name: self.name.filter(|n| !n.trim().is_empty()),
            wallet_address: self.wallet_address,
            items: self.items,
            total: self.total,
            order_number,
            address: self.address,
            phone: self.phone,
        })
    }
}

/// A confirmed order ready to be rendered into a receipt
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptOrder {
    pub email: String,
    pub name: Option<String>,
    pub wallet_address: Option<String>,
    pub items: Vec<CartItem>,
    pub total: f64,
    pub order_number: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// `BSH-<base36 millis>-<6 random base36>`, upper-cased
pub fn generate_order_number() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    format!(
        "{}-{}-{}",
        ORDER_NUMBER_PREFIX,
        to_base36(millis),
        random_base36(6)
    )
    .to_uppercase()
}

fn price_from_string_or_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Price {
        Number(f64),
        Text(String),
    }

    match Price::deserialize(deserializer)? {
        Price::Number(n) => Ok(n),
        Price::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("invalid price '{}'", s))),
    }
}
