//! Identifier generation for cafes and employees.

use rand::Rng;
use std::sync::Arc;
use uuid::Uuid;

pub const EMPLOYEE_ID_PREFIX: &str = "UI";
pub const EMPLOYEE_ID_SUFFIX_LEN: usize = 7;

const EMPLOYEE_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Produces candidate identifiers. Uniqueness is left to the storage layer.
pub type IdGenerator = Arc<dyn Fn() -> String + Send + Sync>;

/// Lowercase hyphenated v4 UUID.
pub fn generate_cafe_id() -> String {
    Uuid::new_v4().to_string()
}

/// `UI` followed by seven uppercase letters or digits.
pub fn generate_employee_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..EMPLOYEE_ID_SUFFIX_LEN)
        .map(|_| EMPLOYEE_ID_ALPHABET[rng.gen_range(0..EMPLOYEE_ID_ALPHABET.len())] as char)
        .collect();
    format!("{EMPLOYEE_ID_PREFIX}{suffix}")
}

pub fn cafe_id_generator() -> IdGenerator {
    Arc::new(generate_cafe_id)
}

pub fn employee_id_generator() -> IdGenerator {
    Arc::new(generate_employee_id)
}
