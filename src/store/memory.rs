use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::models::{Restaurant, User, UserUpdate};
use crate::store::{CredentialStore, RestaurantStore};

#[derive(Default)]
struct Users {
    by_id: HashMap<String, User>,
    // email -> user_id
    email_index: HashMap<String, String>,
}

/// In-memory user registry with the same uniqueness rules as the SQL schema
#[derive(Default)]
pub struct InMemoryCredentialStore {
    users: RwLock<Users>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError> {
        Ok(self.users.read().await.email_index.contains_key(email))
    }

    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.write().await;

        if users.email_index.contains_key(&user.email) {
            return Err(StoreError::UniqueViolation("users_email_key".to_string()));
        }
        if users.by_id.contains_key(&user.user_id) {
            return Err(StoreError::UniqueViolation("users_pkey".to_string()));
        }

        users
            .email_index
            .insert(user.email.clone(), user.user_id.clone());
        users.by_id.insert(user.user_id.clone(), user.clone());

        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users
            .email_index
            .get(email)
            .and_then(|id| users.by_id.get(id))
            .cloned())
    }

    async fn find_by_identifier(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.by_id.get(user_id).cloned())
    }

    async fn update_fields(&self, user_id: &str, update: &UserUpdate) -> Result<u64, StoreError> {
        let mut users = self.users.write().await;

        match users.by_id.get_mut(user_id) {
            Some(user) if update.precondition_holds(user.refresh_token_hash.as_deref()) => {
                user.refresh_token_hash = update.refresh_token_hash.clone();
                user.updated_at = update.updated_at;
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let users = self.users.read().await;
        let mut all: Vec<User> = users.by_id.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(all)
    }
}

#[derive(Default)]
pub struct InMemoryRestaurantStore {
    restaurants: RwLock<HashMap<String, Restaurant>>,
}

impl InMemoryRestaurantStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RestaurantStore for InMemoryRestaurantStore {
    async fn insert(&self, restaurant: &Restaurant) -> Result<(), StoreError> {
        let mut restaurants = self.restaurants.write().await;
        if restaurants.contains_key(&restaurant.restaurant_id) {
            return Err(StoreError::UniqueViolation("restaurants_pkey".to_string()));
        }
        restaurants.insert(restaurant.restaurant_id.clone(), restaurant.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Restaurant>, StoreError> {
        let mut all: Vec<Restaurant> = self.restaurants.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn find(&self, restaurant_id: &str) -> Result<Option<Restaurant>, StoreError> {
        Ok(self.restaurants.read().await.get(restaurant_id).cloned())
    }

    async fn update(&self, restaurant: &Restaurant) -> Result<u64, StoreError> {
        let mut restaurants = self.restaurants.write().await;
        match restaurants.get_mut(&restaurant.restaurant_id) {
            Some(existing) => {
                *existing = restaurant.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, restaurant_id: &str) -> Result<u64, StoreError> {
        Ok(self
            .restaurants
            .write()
            .await
            .remove(restaurant_id)
            .map_or(0, |_| 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use chrono::Utc;

    fn user(id: &str, email: &str) -> User {
        let now = Utc::now();
        User {
            user_id: id.to_string(),
            name: "Ann".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: Role::User,
            refresh_token_hash: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let store = InMemoryCredentialStore::new();
        store.insert(&user("u1", "ann@x.com")).await.unwrap();

        assert!(store.exists_by_email("ann@x.com").await.unwrap());
        assert!(!store.exists_by_email("ANN@x.com").await.unwrap());
        assert_eq!(
            store.find_by_email("ann@x.com").await.unwrap().unwrap().user_id,
            "u1"
        );
        assert!(store.find_by_identifier("u1").await.unwrap().is_some());
        assert!(store.find_by_identifier("u2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_email_uniqueness_is_enforced_on_insert() {
        let store = InMemoryCredentialStore::new();
        store.insert(&user("u1", "ann@x.com")).await.unwrap();

        let result = store.insert(&user("u2", "ann@x.com")).await;
        assert!(matches!(result, Err(StoreError::UniqueViolation(_))));
        assert!(store.find_by_identifier("u2").await.unwrap().is_none());
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_fields_reports_matched_count() {
        let store = InMemoryCredentialStore::new();
        store.insert(&user("u1", "ann@x.com")).await.unwrap();

        let update = UserUpdate::set_refresh_token("digest".to_string());
        assert_eq!(store.update_fields("u1", &update).await.unwrap(), 1);
        assert_eq!(store.update_fields("missing", &update).await.unwrap(), 0);

        let stored = store.find_by_identifier("u1").await.unwrap().unwrap();
        assert_eq!(stored.refresh_token_hash.as_deref(), Some("digest"));

        let stale = UserUpdate::set_refresh_token("next".to_string()).if_current("old".to_string());
        assert_eq!(store.update_fields("u1", &stale).await.unwrap(), 0);

        let fresh = UserUpdate::set_refresh_token("next".to_string()).if_current("digest".to_string());
        assert_eq!(store.update_fields("u1", &fresh).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_restaurant_crud() {
        let store = InMemoryRestaurantStore::new();
        let mut r = Restaurant {
            restaurant_id: "r1".to_string(),
            name: "Noodle Bar".to_string(),
            address: "1 Main St".to_string(),
            email: "hi@noodle.bar".to_string(),
            cuisine: "ramen".to_string(),
        };

        store.insert(&r).await.unwrap();
        r.cuisine = "udon".to_string();
        assert_eq!(store.update(&r).await.unwrap(), 1);
        assert_eq!(store.find("r1").await.unwrap().unwrap().cuisine, "udon");
        assert_eq!(store.delete("r1").await.unwrap(), 1);
        assert_eq!(store.delete("r1").await.unwrap(), 0);
        assert!(store.list().await.unwrap().is_empty());
    }
}
