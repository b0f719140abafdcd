use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use restaurant_api::auth::{generate_access_token, AuthService, Role};
use restaurant_api::configuration::JwtSettings;
use restaurant_api::routes::CookieSettings;
use restaurant_api::startup::run;
use restaurant_api::store::{InMemoryCredentialStore, InMemoryRestaurantStore};
use serde_json::{json, Value};

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub access_token: String,
}

fn jwt_settings() -> JwtSettings {
    JwtSettings {
        secret: "restaurant-test-secret-at-least-32-chars".to_string(),
        issuer: "restaurant-api".to_string(),
        access_token_expiry: 3600,
        refresh_token_expiry: 604800,
    }
}

fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let auth = AuthService::new(
        Arc::new(InMemoryCredentialStore::new()),
        jwt_settings(),
        Duration::from_secs(5),
    );
    let server = run(
        listener,
        auth,
        Arc::new(InMemoryRestaurantStore::new()),
        CookieSettings { secure: false },
    )
    .expect("Failed to bind address");
    let _ = tokio::spawn(server);

    // The gate only checks the token, so a signed token is enough here
    let access_token = generate_access_token("tester", Role::User, &jwt_settings())
        .expect("Failed to sign token");

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
        access_token,
    }
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

#[tokio::test]
async fn restaurants_require_authentication() {
    let app = spawn_app();

    let list = app.client.get(app.url("/restaurants")).send().await.unwrap();
    assert_eq!(401, list.status().as_u16());

    let create = app
        .client
        .post(app.url("/restaurants"))
        .json(&json!({ "name": "Noodle Bar" }))
        .send()
        .await
        .unwrap();
    assert_eq!(401, create.status().as_u16());
}

#[tokio::test]
async fn restaurant_crud_round_trip() {
    let app = spawn_app();

    let created = app
        .client
        .post(app.url("/restaurants"))
        .header(AUTHORIZATION, app.bearer())
        .json(&json!({
            "name": "Noodle Bar",
            "address": "1 Main St",
            "email": "hello@noodle.bar",
            "cuisine": "thai"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(201, created.status().as_u16());
    let restaurant: Value = created.json().await.unwrap();
    let id = restaurant["restaurant_id"].as_str().unwrap().to_string();
    assert_eq!(restaurant["name"], "Noodle Bar");

    let listed: Vec<Value> = app
        .client
        .get(app.url("/restaurants"))
        .header(AUTHORIZATION, app.bearer())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);

    let updated = app
        .client
        .put(app.url(&format!("/restaurants/{}", id)))
        .header(AUTHORIZATION, app.bearer())
        .json(&json!({ "name": "Noodle House", "cuisine": "thai" }))
        .send()
        .await
        .unwrap();
    assert_eq!(200, updated.status().as_u16());

    let fetched: Value = app
        .client
        .get(app.url(&format!("/restaurants/{}", id)))
        .header(AUTHORIZATION, app.bearer())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["name"], "Noodle House");

    let deleted = app
        .client
        .delete(app.url(&format!("/restaurants/{}", id)))
        .header(AUTHORIZATION, app.bearer())
        .send()
        .await
        .unwrap();
    assert_eq!(204, deleted.status().as_u16());

    let gone = app
        .client
        .get(app.url(&format!("/restaurants/{}", id)))
        .header(AUTHORIZATION, app.bearer())
        .send()
        .await
        .unwrap();
    assert_eq!(404, gone.status().as_u16());
}

#[tokio::test]
async fn unknown_restaurant_returns_404() {
    let app = spawn_app();

    let update = app
        .client
        .put(app.url("/restaurants/missing"))
        .header(AUTHORIZATION, app.bearer())
        .json(&json!({ "name": "Ghost Kitchen" }))
        .send()
        .await
        .unwrap();
    assert_eq!(404, update.status().as_u16());

    let delete = app
        .client
        .delete(app.url("/restaurants/missing"))
        .header(AUTHORIZATION, app.bearer())
        .send()
        .await
        .unwrap();
    assert_eq!(404, delete.status().as_u16());
}

#[tokio::test]
async fn invalid_restaurant_is_rejected() {
    let app = spawn_app();

    let response = app
        .client
        .post(app.url("/restaurants"))
        .header(AUTHORIZATION, app.bearer())
        .json(&json!({ "name": "", "email": "nope" }))
        .send()
        .await
        .unwrap();
    assert_eq!(400, response.status().as_u16());
}
