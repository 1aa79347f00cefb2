//! OAuth token response payload.

use serde::{Deserialize, Serialize};

/// Decoded token payload from a grant response or a redirect fragment.
///
/// Every field is optional: refresh responses omit `refresh_token`, and the
/// implicit grant delivers only what the fragment carries. Sensitive fields
/// are redacted in `Debug` output to prevent accidental exposure in logs.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct TokenPayload {
    /// Access token.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Refresh token, when the grant issues one.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Instance URL to direct subsequent API calls at.
    #[serde(default)]
    pub instance_url: Option<String>,
    /// Identity URL ending in `/id/{org}/{user}`.
    #[serde(default)]
    pub id: Option<String>,
    /// Token type (usually "Bearer").
    #[serde(default)]
    pub token_type: Option<String>,
    /// Scopes granted.
    #[serde(default)]
    pub scope: Option<String>,
    /// Signature for verification.
    #[serde(default)]
    pub signature: Option<String>,
    /// Issued-at timestamp.
    #[serde(default)]
    pub issued_at: Option<String>,
    /// Remaining response fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl std::fmt::Debug for TokenPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPayload")
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("instance_url", &self.instance_url)
            .field("id", &self.id)
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .field("signature", &self.signature.as_ref().map(|_| "[REDACTED]"))
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

impl TokenPayload {
    /// Decode a token payload from a parsed JSON body. Non-object values
    /// yield an empty payload.
    pub fn from_value(value: &serde_json::Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }

    /// Build a token payload from decoded `key=value` pairs (the redirect
    /// fragment of the implicit grant).
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: serde_json::Map<String, serde_json::Value> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), serde_json::Value::String(v.into())))
            .collect();
        Self::from_value(&serde_json::Value::Object(map))
    }

    /// Extract the user identifier: the text after `/id/` in the identity
    /// URL.
    pub fn user_id(&self) -> Option<String> {
        let id = self.id.as_deref()?;
        let pos = id.find("/id/")?;
        Some(id[pos + "/id/".len()..].to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_value() {
        let value = serde_json::json!({
            "access_token": "T1",
            "instance_url": "https://na1.salesforce.com",
            "id": "https://login.salesforce.com/id/00Dxx/005xx",
            "issued_at": "1278448832702",
            "signature": "sig"
        });
        let token = TokenPayload::from_value(&value);
        assert_eq!(token.access_token.as_deref(), Some("T1"));
        assert_eq!(token.instance_url.as_deref(), Some("https://na1.salesforce.com"));
        assert!(token.refresh_token.is_none());
        assert_eq!(token.user_id().as_deref(), Some("00Dxx/005xx"));
    }

    #[test]
    fn test_from_pairs() {
        let token = TokenPayload::from_pairs(vec![
            ("access_token", "T2"),
            ("instance_url", "https://na2.salesforce.com"),
            ("issued_at", "123"),
        ]);
        assert_eq!(token.access_token.as_deref(), Some("T2"));
        assert_eq!(token.issued_at.as_deref(), Some("123"));
    }

    #[test]
    fn test_user_id_requires_id_marker() {
        let token = TokenPayload {
            id: Some("https://example.com/user/005xx".to_string()),
            ..TokenPayload::default()
        };
        assert!(token.user_id().is_none());

        let token = TokenPayload::default();
        assert!(token.user_id().is_none());
    }

    #[test]
    fn test_non_object_value_is_empty_payload() {
        let token = TokenPayload::from_value(&serde_json::json!("nope"));
        assert!(token.access_token.is_none());
        assert!(token.extra.is_empty());
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let token = TokenPayload {
            access_token: Some("secret_access".to_string()),
            refresh_token: Some("secret_refresh".to_string()),
            ..TokenPayload::default()
        };
        let debug_output = format!("{:?}", token);
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("secret_access"));
        assert!(!debug_output.contains("secret_refresh"));
    }
}
