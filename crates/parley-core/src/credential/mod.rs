//! Credential storage abstractions for Parley.
//!
//! Defines the `CredentialStore` port that the infrastructure layer
//! implements (keychain, environment), plus a priority chain and an
//! in-memory store.

pub mod chain;
pub mod memory;
pub mod store;

/// Storage key under which the generation API credential is kept.
pub const CREDENTIAL_KEY: &str = "gemini_api_key";

/// Mask a credential, showing only the last 4 characters.
///
/// - "AIzaSyabcdefghijklmnop" -> "****mnop"
/// - "abc" -> "****"
pub fn mask_credential(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 4 {
        "****".to_string()
    } else {
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("****{tail}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_credential_long() {
        assert_eq!(mask_credential("AIzaSyabcdefghijklmnop"), "****mnop");
    }

    #[test]
    fn test_mask_credential_short() {
        assert_eq!(mask_credential("abc"), "****");
        assert_eq!(mask_credential("abcd"), "****");
        assert_eq!(mask_credential(""), "****");
    }

    #[test]
    fn test_mask_credential_five_chars() {
        assert_eq!(mask_credential("abcde"), "****bcde");
    }
}
