#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::Arc;

use chirpy::configuration::{get_configuration, AuthSettings, DatabaseSettings};
use chirpy::startup::run;
use chirpy::store::{
    ChirpRepository, InMemoryChirpStore, InMemoryRefreshTokenStore, InMemoryUserStore,
    PgChirpStore, PgRefreshTokenStore, PgUserStore, RefreshTokenRepository, UserRepository,
};
use serde_json::Value;
use sqlx::{Connection, Executor, PgConnection, PgPool};

pub const TEST_SECRET: &str = "test-secret-key-at-least-32-characters-long";
pub const TEST_API_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    /// Set when the app runs on a fresh Postgres database
    pub db_pool: Option<PgPool>,
}

pub fn auth_settings() -> AuthSettings {
    AuthSettings {
        secret: TEST_SECRET.to_string(),
        access_token_expiry: 3600,
        refresh_token_expiry: 60 * 24 * 3600,
        api_key: TEST_API_KEY.to_string(),
    }
}

fn launch(
    users: Arc<dyn UserRepository>,
    refresh_tokens: Arc<dyn RefreshTokenRepository>,
    chirps: Arc<dyn ChirpRepository>,
    db_pool: Option<PgPool>,
) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let server = run(listener, auth_settings(), users, refresh_tokens, chirps)
        .expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
        db_pool,
    }
}

/// App backed by in-memory stores
pub fn spawn_app() -> TestApp {
    launch(
        Arc::new(InMemoryUserStore::new()),
        Arc::new(InMemoryRefreshTokenStore::new()),
        Arc::new(InMemoryChirpStore::new()),
        None,
    )
}

/// App backed by Postgres, on a freshly migrated database of its own
pub async fn spawn_app_with_postgres() -> TestApp {
    let pool = test_database().await;

    launch(
        Arc::new(PgUserStore::new(pool.clone())),
        Arc::new(PgRefreshTokenStore::new(pool.clone())),
        Arc::new(PgChirpStore::new(pool.clone())),
        Some(pool),
    )
}

/// Create and migrate a uniquely named database from `configuration.yaml`
pub async fn test_database() -> PgPool {
    let mut configuration = get_configuration().expect("Failed to read configuration.");
    configuration.database.database_name = uuid::Uuid::new_v4().to_string();
    configure_database(&configuration.database).await
}

pub async fn configure_database(config: &DatabaseSettings) -> PgPool {
    // Create database
    let mut connection = PgConnection::connect(&config.connection_string_without_db())
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(&*format!(r#"CREATE DATABASE "{}";"#, config.database_name))
        .await
        .expect("Failed to create database.");
    // Migrate database
    let connection_pool = PgPool::connect(&config.connection_string())
        .await
        .expect("Failed to connect to Postgres.");
    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database.");
    connection_pool
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn create_user(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/users"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/login"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Register and log in, returning the login body
    pub async fn signed_in_user(&self, email: &str, password: &str) -> Value {
        self.create_user(email, password).await;
        self.login(email, password)
            .await
            .json()
            .await
            .expect("Failed to parse login response")
    }

    pub async fn post_with_bearer(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn create_chirp(&self, token: &str, body: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/chirps"))
            .bearer_auth(token)
            .json(&serde_json::json!({ "body": body }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn delete_chirp(&self, token: &str, chirp_id: &str) -> reqwest::Response {
        self.client
            .delete(self.url(&format!("/api/chirps/{}", chirp_id)))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request.")
    }
}
