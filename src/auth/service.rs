/// Account flows
///
/// `AuthService` owns the credential store handle and the JWT settings and
/// implements registration, sign-in, refresh-token rotation and logout.
/// Every store call runs under the configured deadline.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use crate::auth::jwt::{generate_refresh_token, generate_token_pair, validate_refresh_token, TokenPair};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::refresh_token::{hash_token, matches_stored};
use crate::auth::Role;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError, ErrorContext, StoreError};
use crate::models::{User, UserUpdate};
use crate::store::{with_deadline, CredentialStore};
use crate::validators::{is_valid_email, is_valid_name, is_valid_password};

/// Result of a successful registration
pub struct Registration {
    /// Stored record with `password_hash` cleared
    pub user: User,
    /// Plaintext of the refresh token whose digest was stored
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    jwt: JwtSettings,
    store_timeout: Duration,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>, jwt: JwtSettings, store_timeout: Duration) -> Self {
        Self {
            store,
            jwt,
            store_timeout,
        }
    }

    pub fn jwt_settings(&self) -> &JwtSettings {
        &self.jwt
    }

    async fn call<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        with_deadline(self.store_timeout, op).await
    }

    /// Create an account and issue its first refresh token.
    ///
    /// # Errors
    /// - `Validation` for a malformed name, email or password
    /// - `DuplicateEmail` if the email is taken, whether caught by the
    ///   pre-check or by the store's unique constraint
    /// - `Hashing`, `Store` on infrastructure failure
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Option<Role>,
    ) -> Result<Registration, AppError> {
        let context = ErrorContext::new("user_registration");
        self.register_inner(name, email, password, role)
            .await
            .map_err(|e| {
                context.log_error(&e);
                e
            })
            .map(|registration| {
                tracing::info!(
                    request_id = %context.request_id,
                    user_id = %registration.user.user_id,
                    role = %registration.user.role,
                    "User registered"
                );
                registration
            })
    }

    async fn register_inner(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Option<Role>,
    ) -> Result<Registration, AppError> {
        let name = is_valid_name(name)?;
        let email = is_valid_email(email)?;
        is_valid_password(password)?;

        if self.call(self.store.exists_by_email(&email)).await? {
            return Err(AuthError::DuplicateEmail.into());
        }

        let password_hash = hash_password(password)?;
        let user_id = Uuid::new_v4().simple().to_string();
        let refresh_token = generate_refresh_token(&user_id, &self.jwt)?;
        let now = Utc::now();

        let mut user = User {
            user_id,
            name,
            email,
            password_hash,
            role: role.unwrap_or_default(),
            refresh_token_hash: Some(hash_token(&refresh_token)),
            created_at: now,
            updated_at: now,
        };

        match self.call(self.store.insert(&user)).await {
            Ok(()) => {}
            // Lost a race with a concurrent registration for the same email
            Err(StoreError::UniqueViolation(_)) => return Err(AuthError::DuplicateEmail.into()),
            Err(e) => return Err(e.into()),
        }

        user.password_hash.clear();
        Ok(Registration {
            user,
            refresh_token,
        })
    }

    /// Verify credentials and start a new session, replacing any previous one.
    ///
    /// Unknown email and wrong password both yield `InvalidCredentials`.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<TokenPair, AppError> {
        let context = ErrorContext::new("user_login");
        self.authenticate_inner(email, password)
            .await
            .map_err(|e| {
                context.log_error(&e);
                e
            })
            .map(|(user_id, tokens)| {
                tracing::info!(
                    request_id = %context.request_id,
                    user_id = %user_id,
                    "User signed in"
                );
                tokens
            })
    }

    async fn authenticate_inner(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(String, TokenPair), AppError> {
        let user = self
            .call(self.store.find_by_email(email.trim()))
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials.into());
        }

        let tokens = generate_token_pair(&user.user_id, user.role, &self.jwt)?;
        let update = UserUpdate::set_refresh_token(hash_token(&tokens.refresh_token));

        let matched = self
            .call(self.store.update_fields(&user.user_id, &update))
            .await?;
        if matched == 0 {
            // Account vanished between lookup and write
            return Err(AuthError::InvalidCredentials.into());
        }

        Ok((user.user_id, tokens))
    }

    /// Exchange the current refresh token for a new pair (rotation).
    ///
    /// # Errors
    /// - `TokenInvalid` / `TokenExpired` from validation, unchanged
    /// - `Unauthorized` if the user is gone or the token is not the one
    ///   currently stored (superseded by a later rotation, or logged out)
    pub async fn refresh(&self, presented: &str) -> Result<TokenPair, AppError> {
        let context = ErrorContext::new("token_refresh");

        let claims = validate_refresh_token(presented, &self.jwt)?;
        let context = context.with_user_id(claims.user_id.clone());

        let user = self
            .call(self.store.find_by_identifier(&claims.user_id))
            .await?
            .ok_or(AuthError::Unauthorized)?;

        if !matches_stored(user.refresh_token_hash.as_deref(), presented) {
            tracing::warn!(
                request_id = %context.request_id,
                user_id = %user.user_id,
                "Refresh token does not match the stored one (reused or revoked)"
            );
            return Err(AuthError::Unauthorized.into());
        }

        let tokens = generate_token_pair(&user.user_id, user.role, &self.jwt)?;
        let update = UserUpdate::set_refresh_token(hash_token(&tokens.refresh_token))
            .if_current(hash_token(presented));

        let matched = self
            .call(self.store.update_fields(&user.user_id, &update))
            .await?;
        if matched == 0 {
            // A concurrent refresh or logout won the swap
            tracing::warn!(
                request_id = %context.request_id,
                user_id = %user.user_id,
                "Refresh token rotated concurrently"
            );
            return Err(AuthError::Unauthorized.into());
        }

        tracing::info!(
            request_id = %context.request_id,
            user_id = %user.user_id,
            "Tokens refreshed"
        );
        Ok(tokens)
    }

    /// Clear the stored refresh token. Idempotent.
    pub async fn revoke(&self, user_id: &str) -> Result<(), AppError> {
        let matched = self
            .call(self.store.update_fields(user_id, &UserUpdate::clear_refresh_token()))
            .await?;

        tracing::info!(user_id = %user_id, matched = matched, "Session revoked");
        Ok(())
    }

    pub async fn find_user(&self, user_id: &str) -> Result<User, AppError> {
        let mut user = self
            .call(self.store.find_by_identifier(user_id))
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))?;
        user.password_hash.clear();
        Ok(user)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let users = self.call(self.store.list()).await?;
        Ok(users
            .into_iter()
            .map(|mut user| {
                user.password_hash.clear();
                user
            })
            .collect())
    }
}
