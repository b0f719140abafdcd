/// JWT Claims structure
///
/// Typed payload shared by access and refresh tokens. Decoding is strict:
/// a token missing any of these fields, or carrying an unknown `type`,
/// fails to decode instead of yielding a partially filled claim set.

use serde::{Deserialize, Serialize};

use crate::auth::Role;

/// Token-kind discriminator, serialized as `"access"` / `"refresh"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Access => write!(f, "access"),
            TokenKind::Refresh => write!(f, "refresh"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Opaque user identifier
    pub user_id: String,
    /// Present on access tokens only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    pub iss: String,
    /// Random nonce; two tokens issued in the same second still differ
    pub jti: String,
}

impl Claims {
    /// Create new claims expiring `expiry_seconds` from now
    pub fn new(
        user_id: &str,
        role: Option<Role>,
        kind: TokenKind,
        expiry_seconds: i64,
        issuer: &str,
        jti: String,
    ) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            user_id: user_id.to_string(),
            role,
            kind,
            exp: now + expiry_seconds,
            iat: now,
            iss: issuer.to_string(),
            jti,
        }
    }
}
