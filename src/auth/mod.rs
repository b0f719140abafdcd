/// Authentication module
///
/// Password hashing, JWT issuance/validation, refresh-token bookkeeping
/// and the account flows (register, authenticate, refresh, revoke).

mod claims;
mod jwt;
mod password;
mod refresh_token;
mod service;

pub use claims::{Claims, TokenKind};
pub use jwt::{
    generate_access_token, generate_refresh_token, generate_token_pair, validate_access_token,
    validate_refresh_token, validate_token, TokenPair,
};
pub use password::{hash_password, verify_password};
pub use refresh_token::{generate_token_id, hash_token, matches_stored};
pub use service::{AuthService, Registration};

use serde::{Deserialize, Serialize};

/// User roles; `Admin` gates privileged operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Admin satisfies every requirement; user only satisfies user.
    pub fn satisfies(&self, required: Role) -> bool {
        self.is_admin() || *self == required
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_defaults_to_user() {
        assert_eq!(Role::default(), Role::User);
    }

    #[test]
    fn test_role_wire_format() {
        assert_eq!(serde_json::to_value(Role::Admin).unwrap(), "admin");
        assert_eq!(serde_json::from_str::<Role>("\"user\"").unwrap(), Role::User);
        assert!(serde_json::from_str::<Role>("\"root\"").is_err());
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
    }

    #[test]
    fn test_role_satisfies() {
        assert!(Role::Admin.satisfies(Role::Admin));
        assert!(Role::Admin.satisfies(Role::User));
        assert!(Role::User.satisfies(Role::User));
        assert!(!Role::User.satisfies(Role::Admin));
    }
}
