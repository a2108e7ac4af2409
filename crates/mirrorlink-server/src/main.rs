use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{Router, middleware, routing::get};
use jsonwebtoken::DecodingKey;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use mirrorlink_api::links;
use mirrorlink_api::middleware::require_auth;
use mirrorlink_api::state::{AppState, AppStateInner};
use mirrorlink_hooks::github::GitHubGateway;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mirrorlink=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("MIRRORLINK_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("MIRRORLINK_DB_PATH").unwrap_or_else(|_| "mirrorlink.db".into());
    let host = std::env::var("MIRRORLINK_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("MIRRORLINK_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;
    let github_token = std::env::var("MIRRORLINK_GITHUB_TOKEN")
        .map_err(|_| anyhow::anyhow!("MIRRORLINK_GITHUB_TOKEN must be set"))?;
    let github_api = std::env::var("MIRRORLINK_GITHUB_API_URL")
        .unwrap_or_else(|_| "https://api.github.com".into());
    let callback_url = std::env::var("MIRRORLINK_CALLBACK_URL")
        .map_err(|_| anyhow::anyhow!("MIRRORLINK_CALLBACK_URL must be set"))?;

    // Init database
    let db = mirrorlink_db::Database::open(&PathBuf::from(&db_path))?;

    // Shared state
    let gateway = Arc::new(GitHubGateway::new(github_api, github_token, callback_url));
    let state: AppState = Arc::new(AppStateInner {
        db,
        gateway,
        auth_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
    });

    // Routes
    let app = Router::new()
        .route("/links", get(links::index).post(links::create))
        .route(
            "/links/{link_id}",
            get(links::show).put(links::update).delete(links::destroy),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("mirrorlink listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
