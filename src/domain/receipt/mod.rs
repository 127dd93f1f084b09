//! Order receipts

pub mod order;
pub mod template;

pub use order::{generate_order_number, CartItem, Product, ReceiptOrder, ReceiptRequest};
pub use template::{render_receipt, RenderedReceipt};
