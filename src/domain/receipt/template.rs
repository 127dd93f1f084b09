//! Receipt email rendering

use chrono::NaiveDate;

use super::order::ReceiptOrder;
use crate::shared::utils::format_amount;

pub const SHOP_NAME: &str = "Base Shop";
const DEFAULT_CUSTOMER_NAME: &str = "Valued Customer";
const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

/// Rendered message handed to a mailer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReceipt {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

pub fn subject_for(order_number: &str) -> String {
    format!("Order Confirmation #{} - {}", order_number, SHOP_NAME)
}

/// Render the receipt for `order`, dated `date`.
pub fn render_receipt(order: &ReceiptOrder, date: NaiveDate) -> RenderedReceipt {
    RenderedReceipt {
        to: order.email.clone(),
        subject: subject_for(&order.order_number),
        html: render_html(order, date),
        text: render_text(order, date),
    }
}

fn customer_name(order: &ReceiptOrder) -> &str {
    order.name.as_deref().unwrap_or(DEFAULT_CUSTOMER_NAME)
}

fn render_html(order: &ReceiptOrder, date: NaiveDate) -> String {
    let mut items = String::new();
    for item in &order.items {
        let product = &item.product;
        items.push_str(&format!(
            concat!(
                "<tr>",
                "<td style=\"padding:8px 0;width:72px\"><img src=\"{image}\" width=\"60\" height=\"60\" alt=\"{title}\" /></td>",
                "<td style=\"padding:8px 0\"><strong>{title}</strong><br />{description}",
                "<br /><small>Quantity: {quantity} &times; {price} USDC</small></td>",
                "<td style=\"padding:8px 0;text-align:right\">{line_total} USDC</td>",
                "</tr>"
            ),
            image = escape_html(product.image.as_deref().unwrap_or(PLACEHOLDER_IMAGE)),
            title = escape_html(&product.title),
            description = escape_html(product.description.as_deref().unwrap_or("")),
            quantity = item.quantity,
            price = product.price,
            line_total = format_amount(item.line_total(), 3),
        ));
    }

    let mut customer = format!(
        "<p><strong>Email:</strong> {}</p>",
        escape_html(&order.email)
    );
    if let Some(wallet) = &order.wallet_address {
        customer.push_str(&format!(
            "<p><strong>Wallet Address:</strong> {}</p>",
            escape_html(wallet)
        ));
    }
    if let Some(address) = &order.address {
        customer.push_str(&format!(
            "<p><strong>Shipping Address:</strong> {}</p>",
            escape_html(address)
        ));
    }
    if let Some(phone) = &order.phone {
        customer.push_str(&format!(
            "<p><strong>Phone:</strong> {}</p>",
            escape_html(phone)
        ));
    }

    format!(
        concat!(
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\" /></head>",
            "<body style=\"background-color:#f6f9fc;font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif\">",
            "<div style=\"display:none\">Your {shop} order #{number} has been confirmed!</div>",
            "<div style=\"max-width:600px;margin:0 auto;background:#ffffff\">",
            "<div style=\"padding:32px 24px;background-color:#1e40af;color:#ffffff\">",
            "<h1>{shop}</h1><p>Smart Wallet E-commerce</p></div>",
            "<div style=\"padding:24px\">",
            "<h2>Order Confirmation</h2>",
            "<p>Hi {customer_name},</p>",
            "<p>Thank you for your order! Your payment has been successfully processed using your Smart Wallet. ",
            "Here are the details of your purchase:</p>",
            "<p><strong>Order Number:</strong> #{number}<br />",
            "<strong>Payment Method:</strong> USDC (Smart Wallet)<br />",
            "<strong>Order Date:</strong> {date}<br />",
            "<strong>Total Amount:</strong> {total} USDC</p>",
            "<h3>Items Ordered</h3><table style=\"width:100%\">{items}</table><hr />",
            "<p style=\"text-align:right\"><strong>Total: {total} USDC</strong><br />&asymp; ${usd} USD</p>",
            "<h3>Customer Information</h3>{customer}",
            "<p>Thank you for shopping with {shop}! If you have any questions about your order, ",
            "please don't hesitate to contact our support team.</p>",
            "</div></div></body></html>"
        ),
        shop = SHOP_NAME,
        number = escape_html(&order.order_number),
        customer_name = escape_html(customer_name(order)),
        date = date.format("%Y-%m-%d"),
        total = format_amount(order.total, 3),
        usd = format_amount(order.total, 2),
        items = items,
        customer = customer,
    )
}

fn render_text(order: &ReceiptOrder, date: NaiveDate) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} - Order Confirmation\n\n", SHOP_NAME));
    out.push_str(&format!("Hi {},\n\n", customer_name(order)));
    out.push_str("Thank you for your order! Your payment has been successfully processed using your Smart Wallet.\n\n");
    out.push_str(&format!("Order Number: #{}\n", order.order_number));
    out.push_str("Payment Method: USDC (Smart Wallet)\n");
    out.push_str(&format!("Order Date: {}\n\n", date.format("%Y-%m-%d")));

    out.push_str("Items Ordered:\n");
    for item in &order.items {
        out.push_str(&format!(
            "  - {} | Quantity: {} x {} USDC | {} USDC\n",
            item.product.title,
            item.quantity,
            item.product.price,
            format_amount(item.line_total(), 3)
        ));
    }
    out.push_str(&format!(
        "\nTotal: {} USDC (~ ${} USD)\n\n",
        format_amount(order.total, 3),
        format_amount(order.total, 2)
    ));

    out.push_str(&format!("Email: {}\n", order.email));
    if let Some(wallet) = &order.wallet_address {
        out.push_str(&format!("Wallet Address: {}\n", wallet));
    }
    if let Some(address) = &order.address {
        out.push_str(&format!("Shipping Address: {}\n", address));
    }
    if let Some(phone) = &order.phone {
        out.push_str(&format!("Phone: {}\n", phone));
    }
    out
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
