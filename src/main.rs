use std::net::TcpListener;
use std::sync::Arc;

use restaurant_api::auth::AuthService;
use restaurant_api::configuration::get_configuration;
use restaurant_api::routes::CookieSettings;
use restaurant_api::startup::run;
use restaurant_api::store::{connect_pool, run_migrations, PgCredentialStore, PgRestaurantStore};
use restaurant_api::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    tracing::info!("Starting application");

    // Missing secret or database URL is fatal before anything is bound
    let configuration = match get_configuration() {
        Ok(config) => {
            tracing::info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    tracing::info!("Attempting to connect to database");
    let pool = connect_pool(&configuration.database).await.map_err(|e| {
        tracing::error!("Failed to create connection pool: {}", e);
        std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "Database connection error",
        )
    })?;

    run_migrations(&pool).await.map_err(|e| {
        tracing::error!("Failed to run migrations: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, "Database migration error")
    })?;
    tracing::info!("Database ready");

    let auth_service = AuthService::new(
        Arc::new(PgCredentialStore::new(pool.clone())),
        configuration.jwt.clone(),
        configuration.database.timeout(),
    );
    let restaurants = Arc::new(PgRestaurantStore::new(pool));
    let cookies = CookieSettings {
        secure: configuration.application.cookie_secure,
    };

    let address = configuration.application.address();
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    run(listener, auth_service, restaurants, cookies)?.await
}
