//! API Server Entry Point
//!
//! Reads configuration, picks the stores and mail transport, and serves the
//! assembled router. Uses `anyhow` for startup errors only; request-level
//! errors render through `kernel::error::AppError` inside the crates.

mod app;
mod config;


use std::net::SocketAddr;
use std::sync::Arc;

use auth::application::RandomCodeGenerator;
use auth::{AuthConfig, MemoryIdentityStore, PgIdentityRepository};
use axum::{
    Router, http,
    http::{Method, header},
};
use content::{MemoryContentStore, PgContentRepository};
use platform::mail::{LogMailer, SmtpConfig, SmtpMailer};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::{AppMailer, build_router};
use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,auth=info,content=info,platform=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let server = ServerConfig::from_env()?;
    let auth_config = AuthConfig::from_env(config::token_secret()?);
    tracing::info!(config = ?auth_config, "Auth configuration loaded");

    // Mail transport
    let mailer = match SmtpConfig::from_env() {
        Some(smtp) => {
            tracing::info!(host = %smtp.smtp_host, port = smtp.smtp_port, "Using SMTP mailer");
            AppMailer::Smtp(SmtpMailer::new(smtp)?)
        }
        None => {
            tracing::warn!("SMTP_HOST not set, confirmation mails are only logged");
            AppMailer::Log(LogMailer)
        }
    };

    let codes = Arc::new(RandomCodeGenerator::new(auth_config.code_length));

    let api = match &server.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(server.database_max_connections)
                .connect(database_url)
                .await?;

            tracing::info!("Connected to database");

            // Run migrations
            sqlx::migrate!("../../../database/migrations")
                .run(&pool)
                .await?;

            tracing::info!("Migrations completed");

            // Startup cleanup: remove expired confirmation codes
            // Errors here should not prevent server startup
            let identities = PgIdentityRepository::new(pool.clone());
            if let Err(e) = identities
                .cleanup_expired_codes(auth_config.code_ttl_chrono())
                .await
            {
                tracing::warn!(
                    error = %e,
                    "Confirmation code cleanup failed, continuing anyway"
                );
            }

            build_router(
                identities,
                mailer,
                PgContentRepository::new(pool),
                codes,
                auth_config,
            )
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory stores");
            let identities = MemoryIdentityStore::new();
            let content = MemoryContentStore::new(identities.clone());
            build_router(identities, mailer, content, codes, auth_config)
        }
    };

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = server
        .frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]));

    // Build router
    let app = Router::new()
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    tracing::info!("Listening on {}", server.bind_addr);

    let listener = TcpListener::bind(server.bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
