use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use fanfund_api::auth::AppStateInner;
use fanfund_auth::token::TokenCodec;

const DEFAULT_JWT_SECRET: &str = "dev-secret";
const DEFAULT_ADMIN_PASSWORD: &str = "admin";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "fanfund=debug,fanfund_api=debug,fanfund_db=debug,tower_http=debug".into()
            }),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("FANFUND_JWT_SECRET").unwrap_or_else(|_| DEFAULT_JWT_SECRET.into());
    if jwt_secret == DEFAULT_JWT_SECRET {
        warn!("FANFUND_JWT_SECRET not set; using the development secret");
    }
    let admin_password =
        std::env::var("FANFUND_ADMIN_PASSWORD").unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.into());
    if admin_password == DEFAULT_ADMIN_PASSWORD {
        warn!("FANFUND_ADMIN_PASSWORD not set; using the development password");
    }
    let db_path = std::env::var("FANFUND_DB_PATH").unwrap_or_else(|_| "fanfund.db".into());
    let host = std::env::var("FANFUND_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("FANFUND_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;
    let token_ttl_seconds: i64 = std::env::var("FANFUND_TOKEN_TTL_SECS")
        .unwrap_or_else(|_| "86400".into())
        .parse()?;

    // Init database
    let db = fanfund_db::Database::open(&PathBuf::from(&db_path))?;

    // Shared state
    let state = Arc::new(AppStateInner {
        db,
        tokens: TokenCodec::new(jwt_secret),
        admin_password,
        token_ttl_seconds,
    });

    let app = fanfund_api::router::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Fanfund server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
