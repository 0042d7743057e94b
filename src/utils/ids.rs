//! Identifier and token generation
//!
//! Instance identifiers are the 32-character simple form of a v4 UUID, so
//! collisions across controllers are not a practical concern. Access tokens
//! and passcodes are random alphanumeric strings of a fixed length.

use uuid::Uuid;

/// Length of instance identifiers, access tokens, and passcodes.
pub const INSTANCE_ID_LENGTH: usize = 32;

const TOKEN_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a fresh 32-character instance identifier.
pub fn generate_instance_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Generate a random alphanumeric string of the given length.
pub fn random_alphanumeric(length: usize) -> String {
    (0..length)
        .map(|_| TOKEN_ALPHABET[fastrand::usize(..TOKEN_ALPHABET.len())] as char)
        .collect()
}

/// Generate a 32-character access token.
pub fn generate_access_token() -> String {
    random_alphanumeric(INSTANCE_ID_LENGTH)
}
