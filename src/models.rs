/// Stored documents: users (owned by the credential store) and restaurants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::Role;

/// User record as persisted by a `CredentialStore`
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// Assigned once at registration, never changes
    pub user_id: String,
    pub name: String,
    /// Unique across users, compared case-sensitively
    pub email: String,
    /// bcrypt hash; cleared before a record leaves the auth flows
    pub password_hash: String,
    pub role: Role,
    /// SHA-256 digest of the single live refresh token, `None` when logged out
    pub refresh_token_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fieldset for `CredentialStore::update_fields`
///
/// The only mutation after registration is the refresh-token slot; it is
/// always written together with `updated_at`. With `expected_refresh_token_hash`
/// set, the update only matches while the slot still holds that digest, which
/// turns a rotation into a single compare-and-swap.
#[derive(Debug, Clone, PartialEq)]
pub struct UserUpdate {
    /// `None` clears the slot
    pub refresh_token_hash: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub expected_refresh_token_hash: Option<String>,
}

impl UserUpdate {
    pub fn set_refresh_token(hash: String) -> Self {
        Self {
            refresh_token_hash: Some(hash),
            updated_at: Utc::now(),
            expected_refresh_token_hash: None,
        }
    }

    pub fn clear_refresh_token() -> Self {
        Self {
            refresh_token_hash: None,
            updated_at: Utc::now(),
            expected_refresh_token_hash: None,
        }
    }

    pub fn if_current(mut self, expected_hash: String) -> Self {
        self.expected_refresh_token_hash = Some(expected_hash);
        self
    }

    /// Does `current` satisfy the precondition?
    pub fn precondition_holds(&self, current: Option<&str>) -> bool {
        match &self.expected_refresh_token_hash {
            Some(expected) => current == Some(expected.as_str()),
            None => true,
        }
    }
}

/// Public view of a user: no password hash, no refresh token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserResponse {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Restaurant {
    pub restaurant_id: String,
    pub name: String,
    pub address: String,
    pub email: String,
    pub cuisine: String,
}

/// Client-supplied restaurant fields (create and full update)
#[derive(Debug, Clone, Deserialize)]
pub struct RestaurantInput {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub cuisine: String,
}

impl RestaurantInput {
    pub fn into_restaurant(self, restaurant_id: String) -> Restaurant {
        Restaurant {
            restaurant_id,
            name: self.name,
            address: self.address,
            email: self.email,
            cuisine: self.cuisine,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_response_hides_secrets() {
        let now = Utc::now();
        let user = User {
            user_id: "u1".to_string(),
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
            password_hash: "$2b$12$abc".to_string(),
            role: Role::User,
            refresh_token_hash: Some("digest".to_string()),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert_eq!(json["role"], "user");
        assert!(json.get("password_hash").is_none());
        assert!(json.get("refresh_token_hash").is_none());
    }

    #[test]
    fn test_update_precondition() {
        let unconditional = UserUpdate::clear_refresh_token();
        assert!(unconditional.precondition_holds(None));
        assert!(unconditional.precondition_holds(Some("anything")));

        let conditional = UserUpdate::set_refresh_token("new".to_string()).if_current("old".to_string());
        assert!(conditional.precondition_holds(Some("old")));
        assert!(!conditional.precondition_holds(Some("newer")));
        assert!(!conditional.precondition_holds(None));
    }
}
