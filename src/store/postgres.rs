use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::configuration::DatabaseSettings;
use crate::error::StoreError;
use crate::models::{Restaurant, User, UserUpdate};
use crate::store::{CredentialStore, RestaurantStore};

/// Open the connection pool once at startup
pub async fn connect_pool(settings: &DatabaseSettings) -> Result<PgPool, StoreError> {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.timeout())
        .connect(&settings.url)
        .await
        .map_err(StoreError::from)
}

/// Apply the SQL migrations in `migrations/` (creates the unique email index)
pub async fn run_migrations(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| StoreError::Query(format!("migration failed: {}", e)))
}

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: String,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    refresh_token_hash: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row.role.parse().map_err(StoreError::Query)?;
        Ok(User {
            user_id: row.user_id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role,
            refresh_token_hash: row.refresh_token_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const USER_COLUMNS: &str =
    "user_id, name, email, password_hash, role, refresh_token_hash, created_at, updated_at";

#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_by(&self, column: &str, value: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE {} = $1",
            USER_COLUMNS, column
        ))
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (user_id, name, email, password_hash, role, refresh_token_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&user.user_id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.refresh_token_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.fetch_one_by("email", email).await
    }

    async fn find_by_identifier(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        self.fetch_one_by("user_id", user_id).await
    }

    async fn update_fields(&self, user_id: &str, update: &UserUpdate) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET refresh_token_hash = $1, updated_at = $2
            WHERE user_id = $3 AND ($4::TEXT IS NULL OR refresh_token_hash = $4)
            "#,
        )
        .bind(&update.refresh_token_hash)
        .bind(update.updated_at)
        .bind(user_id)
        .bind(&update.expected_refresh_token_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users ORDER BY created_at",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }
}

#[derive(sqlx::FromRow)]
struct RestaurantRow {
    restaurant_id: String,
    name: String,
    address: String,
    email: String,
    cuisine: String,
}

impl From<RestaurantRow> for Restaurant {
    fn from(row: RestaurantRow) -> Self {
        Restaurant {
            restaurant_id: row.restaurant_id,
            name: row.name,
            address: row.address,
            email: row.email,
            cuisine: row.cuisine,
        }
    }
}

#[derive(Clone)]
pub struct PgRestaurantStore {
    pool: PgPool,
}

impl PgRestaurantStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RestaurantStore for PgRestaurantStore {
    async fn insert(&self, restaurant: &Restaurant) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO restaurants (restaurant_id, name, address, email, cuisine)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&restaurant.restaurant_id)
        .bind(&restaurant.name)
        .bind(&restaurant.address)
        .bind(&restaurant.email)
        .bind(&restaurant.cuisine)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list(&self) -> Result<Vec<Restaurant>, StoreError> {
        let rows = sqlx::query_as::<_, RestaurantRow>(
            "SELECT restaurant_id, name, address, email, cuisine FROM restaurants ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Restaurant::from).collect())
    }

    async fn find(&self, restaurant_id: &str) -> Result<Option<Restaurant>, StoreError> {
        let row = sqlx::query_as::<_, RestaurantRow>(
            "SELECT restaurant_id, name, address, email, cuisine FROM restaurants WHERE restaurant_id = $1",
        )
        .bind(restaurant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Restaurant::from))
    }

    async fn update(&self, restaurant: &Restaurant) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE restaurants
            SET name = $1, address = $2, email = $3, cuisine = $4
            WHERE restaurant_id = $5
            "#,
        )
        .bind(&restaurant.name)
        .bind(&restaurant.address)
        .bind(&restaurant.email)
        .bind(&restaurant.cuisine)
        .bind(&restaurant.restaurant_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, restaurant_id: &str) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM restaurants WHERE restaurant_id = $1")
            .bind(restaurant_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
