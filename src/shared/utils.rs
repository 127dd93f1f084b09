//! Utility functions and helpers

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Format an unsigned integer in lowercase base 36
pub fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Random lowercase base-36 string of `len` characters
pub fn random_base36(len: usize) -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| BASE36_DIGITS[rng.gen_range(0..36)] as char)
        .collect()
}

/// Generate unique ID
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Format an amount with a fixed number of decimals
pub fn format_amount(amount: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, amount)
}

/// Number of Unicode scalar values in `s`
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}
