mod config;
mod db;
mod routes;
mod services;
mod state;
mod views;

use std::sync::Arc;

use services::auth_client::AuthClient;
use services::directory::PgDirectory;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = config::Config::from_env().expect("invalid configuration");

    let pool = db::init_pool(&config.database_url, config.run_migrations)
        .await
        .expect("database init failed");
    let directory = Arc::new(PgDirectory::new(pool));

    let auth = Arc::new(AuthClient::new(&config.auth).expect("auth client init failed"));
    tracing::info!(auth_url = %config.auth.base_url, "auth client initialized");

    let state = state::AppState::new(auth, directory.clone(), directory, config.gate.clone());

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("failed to bind");

    tracing::info!(port = config.port, "gatehouse listening");
    axum::serve(listener, app).await.expect("server failed");
}
