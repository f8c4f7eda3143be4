//! Credential resolution.
//!
//! The API key comes from the environment only. Resolution happens before
//! any terminal setup so a missing key aborts startup with a plain message
//! and no API call is ever attempted.

use std::env;

use crate::error::ChatError;

/// Environment variable carrying the OpenRouter API key.
pub const API_KEY_VAR: &str = "OPENROUTER_API_KEY";

pub fn resolve_api_key() -> Result<String, ChatError> {
    api_key_from(env::var(API_KEY_VAR).ok())
}

fn api_key_from(value: Option<String>) -> Result<String, ChatError> {
    match value {
        Some(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(ChatError::missing_credential(API_KEY_VAR)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn present_key_resolves() {
        assert_eq!(
            api_key_from(Some("sk-or-v1-abc".to_string())).unwrap(),
            "sk-or-v1-abc"
        );
    }

    #[test]
    fn absent_key_is_missing_credential() {
        let err = api_key_from(None).unwrap_err();
        assert!(matches!(err, ChatError::MissingCredential { .. }));
    }

    #[test]
    fn blank_key_is_missing_credential() {
        let err = api_key_from(Some("   ".to_string())).unwrap_err();
        assert!(matches!(err, ChatError::MissingCredential { .. }));
    }
}
