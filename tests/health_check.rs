//! Integration tests for the public health endpoint

use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use restaurant_api::auth::AuthService;
use restaurant_api::configuration::JwtSettings;
use restaurant_api::routes::CookieSettings;
use restaurant_api::startup::run;
use restaurant_api::store::{InMemoryCredentialStore, InMemoryRestaurantStore};

fn spawn_app() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let jwt = JwtSettings {
        secret: "health-check-secret-at-least-32-chars".to_string(),
        issuer: "restaurant-api".to_string(),
        access_token_expiry: 3600,
        refresh_token_expiry: 604800,
    };
    let auth = AuthService::new(
        Arc::new(InMemoryCredentialStore::new()),
        jwt,
        Duration::from_secs(5),
    );
    let server = run(
        listener,
        auth,
        Arc::new(InMemoryRestaurantStore::new()),
        CookieSettings { secure: false },
    )
    .expect("Failed to create server");

    let _ = tokio::spawn(async move {
        let _ = server.await;
    });

    format!("http://127.0.0.1:{}", port)
}

#[tokio::test]
async fn health_check_works() {
    let addr = spawn_app();

    let response = reqwest::Client::new()
        .get(&format!("{}/health_check", addr))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    assert_eq!(Some(0), response.content_length());
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let addr = spawn_app();

    let response = reqwest::Client::new()
        .get(&format!("{}/nope", addr))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(404, response.status().as_u16());
}
