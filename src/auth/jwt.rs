/// JWT Token Generation and Validation
///
/// Access and refresh tokens are both HS256 JWTs signed with the single
/// process-wide secret from `JwtSettings`. Nothing about a token is stored
/// server side except the digest of a user's current refresh token.

use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::{Claims, TokenKind};
use crate::auth::refresh_token::generate_token_id;
use crate::auth::Role;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError, ConfigError};

/// Freshly issued access + refresh token
#[derive(Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Generate a new access token (`type = "access"`) carrying identity and role
///
/// # Errors
/// - `Config` if no signing secret is configured
/// - `Internal` if encoding fails
pub fn generate_access_token(
    user_id: &str,
    role: Role,
    config: &JwtSettings,
) -> Result<String, AppError> {
    let claims = Claims::new(
        user_id,
        Some(role),
        TokenKind::Access,
        config.access_token_expiry,
        &config.issuer,
        generate_token_id(),
    );
    sign(&claims, config)
}

/// Generate a new refresh token (`type = "refresh"`); carries no role
pub fn generate_refresh_token(user_id: &str, config: &JwtSettings) -> Result<String, AppError> {
    let claims = Claims::new(
        user_id,
        None,
        TokenKind::Refresh,
        config.refresh_token_expiry,
        &config.issuer,
        generate_token_id(),
    );
    sign(&claims, config)
}

pub fn generate_token_pair(
    user_id: &str,
    role: Role,
    config: &JwtSettings,
) -> Result<TokenPair, AppError> {
    Ok(TokenPair {
        access_token: generate_access_token(user_id, role, config)?,
        refresh_token: generate_refresh_token(user_id, config)?,
    })
}

fn sign(claims: &Claims, config: &JwtSettings) -> Result<String, AppError> {
    if config.secret.is_empty() {
        return Err(ConfigError::MissingRequired("JWT_SECRET".to_string()).into());
    }

    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Verify signature, expiry and issuer of a token of either kind
///
/// # Errors
/// - `TokenExpired` for a correctly signed token past its `exp`
/// - `TokenInvalid` for anything else (bad signature, malformed, wrong issuer)
pub fn validate_token(token: &str, config: &JwtSettings) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_issuer(&[&config.issuer]);
    validation.set_required_spec_claims(&["exp", "iss"]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => {
            tracing::debug!(error = %e, "JWT validation error");
            AuthError::TokenInvalid
        }
    })
}

/// Validate a token that must be an access token with a role
pub fn validate_access_token(token: &str, config: &JwtSettings) -> Result<Claims, AuthError> {
    let claims = validate_token(token, config)?;
    if claims.kind != TokenKind::Access || claims.role.is_none() {
        tracing::debug!(kind = %claims.kind, "Token rejected as access token");
        return Err(AuthError::TokenInvalid);
    }
    Ok(claims)
}

/// Validate a token that must be a refresh token
pub fn validate_refresh_token(token: &str, config: &JwtSettings) -> Result<Claims, AuthError> {
    let claims = validate_token(token, config)?;
    if claims.kind != TokenKind::Refresh {
        tracing::debug!(kind = %claims.kind, "Token rejected as refresh token");
        return Err(AuthError::TokenInvalid);
    }
    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_test_config() -> JwtSettings {
        JwtSettings {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            issuer: "test".to_string(),
            access_token_expiry: 3600,
            refresh_token_expiry: 604800,
        }
    }

    fn encode_with(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_token_pair_round_trip() {
        let config = get_test_config();
        let pair = generate_token_pair("user-1", Role::Admin, &config).unwrap();

        let access = validate_token(&pair.access_token, &config).unwrap();
        assert_eq!(access.user_id, "user-1");
        assert_eq!(access.role, Some(Role::Admin));
        assert_eq!(access.kind, TokenKind::Access);
        assert_eq!(access.exp - access.iat, 3600);

        let refresh = validate_token(&pair.refresh_token, &config).unwrap();
        assert_eq!(refresh.user_id, "user-1");
        assert_eq!(refresh.role, None);
        assert_eq!(refresh.kind, TokenKind::Refresh);
        assert_eq!(refresh.exp - refresh.iat, 604800);
    }

    #[test]
    fn test_tokens_issued_back_to_back_differ() {
        let config = get_test_config();
        let first = generate_refresh_token("user-1", &config).unwrap();
        let second = generate_refresh_token("user-1", &config).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_invalid_token() {
        let config = get_test_config();
        assert_eq!(
            validate_token("invalid.token.here", &config),
            Err(AuthError::TokenInvalid)
        );
    }

    #[test]
    fn test_tampered_token() {
        let config = get_test_config();
        let token = generate_access_token("user-1", Role::User, &config).unwrap();

        let tampered = format!("{}X", token);
        assert_eq!(validate_token(&tampered, &config), Err(AuthError::TokenInvalid));
    }

    #[test]
    fn test_wrong_secret() {
        let config = get_test_config();
        let claims = Claims::new("user-1", Some(Role::User), TokenKind::Access, 60, "test", "n".into());
        let token = encode_with(&claims, "some-other-secret");

        assert_eq!(validate_token(&token, &config), Err(AuthError::TokenInvalid));
    }

    #[test]
    fn test_expired_token_is_distinguishable() {
        let config = get_test_config();
        let claims = Claims::new("user-1", Some(Role::User), TokenKind::Access, -30, "test", "n".into());
        let token = encode_with(&claims, &config.secret);

        assert_eq!(validate_token(&token, &config), Err(AuthError::TokenExpired));
    }

    #[test]
    fn test_wrong_issuer() {
        let mut config = get_test_config();
        let token = generate_access_token("user-1", Role::User, &config).unwrap();

        config.issuer = "wrong-issuer".to_string();
        assert_eq!(validate_token(&token, &config), Err(AuthError::TokenInvalid));
    }

    #[test]
    fn test_kind_mismatch_is_rejected() {
        let config = get_test_config();
        let pair = generate_token_pair("user-1", Role::User, &config).unwrap();

        assert_eq!(
            validate_access_token(&pair.refresh_token, &config),
            Err(AuthError::TokenInvalid)
        );
        assert_eq!(
            validate_refresh_token(&pair.access_token, &config),
            Err(AuthError::TokenInvalid)
        );
        assert!(validate_access_token(&pair.access_token, &config).is_ok());
        assert!(validate_refresh_token(&pair.refresh_token, &config).is_ok());
    }

    #[test]
    fn test_access_token_without_role_is_rejected() {
        let config = get_test_config();
        let claims = Claims::new("user-1", None, TokenKind::Access, 60, "test", "n".into());
        let token = encode_with(&claims, &config.secret);

        assert_eq!(validate_access_token(&token, &config), Err(AuthError::TokenInvalid));
    }

    #[test]
    fn test_missing_secret_is_a_configuration_error() {
        let mut config = get_test_config();
        config.secret = String::new();

        let result = generate_access_token("user-1", Role::User, &config);
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
