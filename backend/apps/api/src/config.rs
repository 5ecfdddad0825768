//! Server Configuration
//!
//! Process-level settings read once at startup. Auth tunables live in
//! [`auth::AuthConfig`].

use std::env;
use std::net::SocketAddr;

use anyhow::Context;
use base64::Engine;
use base64::engine::general_purpose;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:31113";
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub frontend_origins: Vec<String>,
    /// `None` selects the in-memory stores
    pub database_url: Option<String>,
    pub database_max_connections: u32,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR must be a socket address")?;

        let frontend_origins = env::var("FRONTEND_ORIGINS")
            .unwrap_or_else(|_| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let database_max_connections = match env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(raw) => raw
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            bind_addr,
            frontend_origins,
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            database_max_connections,
        })
    }
}

/// Token signing key from `TOKEN_SECRET` (standard base64)
///
/// Debug builds fall back to a random key, so tokens die with the process.
pub fn token_secret() -> anyhow::Result<Vec<u8>> {
    match env::var("TOKEN_SECRET") {
        Ok(encoded) => {
            let secret = general_purpose::STANDARD
                .decode(encoded.trim())
                .context("TOKEN_SECRET must be base64")?;
            anyhow::ensure!(secret.len() >= 32, "TOKEN_SECRET must decode to at least 32 bytes");
            Ok(secret)
        }
        Err(_) if cfg!(debug_assertions) => {
            tracing::warn!("TOKEN_SECRET not set, using a random key");
            Ok(platform::crypto::random_bytes(32))
        }
        Err(_) => anyhow::bail!("TOKEN_SECRET must be set in production"),
    }
}
