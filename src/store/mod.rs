/// Storage collaborators
///
/// The auth flows and the restaurant handlers only see these traits. The
/// Postgres implementations are used by the binary; the in-memory ones back
/// the test suite. Both enforce email uniqueness at write time, so a
/// registration race is caught by the store rather than only by the
/// `exists_by_email` pre-check.

mod memory;
mod postgres;

pub use memory::{InMemoryCredentialStore, InMemoryRestaurantStore};
pub use postgres::{connect_pool, run_migrations, PgCredentialStore, PgRestaurantStore};

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{Restaurant, User, UserUpdate};

/// User registry keyed by `user_id`, with a unique `email`
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError>;

    /// Fails with `UniqueViolation` if the email or id is already taken
    async fn insert(&self, user: &User) -> Result<(), StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_identifier(&self, user_id: &str) -> Result<Option<User>, StoreError>;

    /// Apply `update` to a single user; returns the number of matched records
    async fn update_fields(&self, user_id: &str, update: &UserUpdate) -> Result<u64, StoreError>;

    async fn list(&self) -> Result<Vec<User>, StoreError>;
}

/// Restaurant documents keyed by `restaurant_id`
#[async_trait]
pub trait RestaurantStore: Send + Sync {
    async fn insert(&self, restaurant: &Restaurant) -> Result<(), StoreError>;

    async fn list(&self) -> Result<Vec<Restaurant>, StoreError>;

    async fn find(&self, restaurant_id: &str) -> Result<Option<Restaurant>, StoreError>;

    /// Overwrite every field; returns the number of matched records
    async fn update(&self, restaurant: &Restaurant) -> Result<u64, StoreError>;

    /// Returns the number of deleted records
    async fn delete(&self, restaurant_id: &str) -> Result<u64, StoreError>;
}

/// Run a store call under a deadline, failing with `StoreError::Timeout`
/// instead of waiting indefinitely.
pub async fn with_deadline<T, F>(deadline: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(deadline, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::error!(deadline_ms = deadline.as_millis() as u64, "Store call exceeded deadline");
            Err(StoreError::Timeout)
        }
    }
}
