mod config;
mod db;
mod routes;
mod services;
mod state;

use services::session::SessionStore;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cfg = config::AppConfig::from_env().expect("invalid configuration");

    let pool = db::init_pool(&cfg.database_url, cfg.db_max_connections)
        .await
        .expect("database init failed");
    let sessions = SessionStore::new(cfg.session_ttl);
    let state = state::AppState::new(pool, sessions, cfg.cookie_secure);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", cfg.port))
        .await
        .expect("failed to bind");

    tracing::info!(port = cfg.port, session_ttl_secs = cfg.session_ttl.as_secs(), "blogapp listening");
    axum::serve(listener, app).await.expect("server failed");
}
