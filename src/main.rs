use wayfarer_api::config;
use wayfarer_api::database::{schema, DatabaseManager};
use wayfarer_api::handlers;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("starting Wayfarer API in {:?} mode", config.environment);

    // Verify the schema up front when storage is reachable; the health
    // endpoint reports degraded state otherwise.
    match DatabaseManager::pool().await {
        Ok(pool) => {
            if let Err(e) = schema::ensure(&pool).await {
                tracing::warn!("schema bootstrap failed: {}", e);
            }
        }
        Err(e) => tracing::warn!("database not reachable at startup: {}", e),
    }

    let app = handlers::app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("WAYFARER_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 Wayfarer API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
