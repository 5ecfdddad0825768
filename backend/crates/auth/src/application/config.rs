//! Application Configuration
//!
//! Configuration for the Auth application layer. Passed explicitly into the
//! use cases; nothing here is global.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use platform::mail::OutgoingMail;

/// Upper bound for every TTL read from the environment (100 years)
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 3600);

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// HS256 signing key for access tokens
    pub token_secret: Vec<u8>,
    /// Access token lifetime
    pub token_ttl: Duration,
    /// Length of generated confirmation codes
    pub code_length: usize,
    /// Codes older than this never validate
    pub code_ttl: Duration,
    /// Delete the code on a successful exchange
    pub single_use_codes: bool,
    /// Render `UnknownUser` exactly like `InvalidCode`
    pub conceal_token_failures: bool,
    /// Subject line of the confirmation mail
    pub mail_subject: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: vec![0u8; 32],
            token_ttl: Duration::from_secs(24 * 3600), // 1 day
            code_length: 6,
            code_ttl: Duration::from_secs(24 * 3600), // 1 day
            single_use_codes: false,
            conceal_token_failures: false,
            mail_subject: "Confirmation code".to_string(),
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_secret", &"[REDACTED]")
            .field("token_ttl", &self.token_ttl)
            .field("code_length", &self.code_length)
            .field("code_ttl", &self.code_ttl)
            .field("single_use_codes", &self.single_use_codes)
            .field("conceal_token_failures", &self.conceal_token_failures)
            .field("mail_subject", &self.mail_subject)
            .finish()
    }
}

impl AuthConfig {
    /// Create config with a random token secret
    pub fn with_random_secret() -> Self {
        Self {
            token_secret: platform::crypto::random_bytes(32),
            ..Default::default()
        }
    }

    /// Create config for development
    pub fn development() -> Self {
        Self::with_random_secret()
    }

    /// Load the tunables from environment variables.
    ///
    /// The signing key is supplied by the caller, which owns the decision of
    /// where secrets come from.
    ///
    /// | Variable                     | Default             |
    /// |------------------------------|---------------------|
    /// | `TOKEN_TTL_SECS`             | `86400`             |
    /// | `CONFIRMATION_CODE_LENGTH`   | `6`                 |
    /// | `CONFIRMATION_CODE_TTL_SECS` | `86400`             |
    /// | `SINGLE_USE_CODES`           | `false`             |
    /// | `CONCEAL_TOKEN_FAILURES`     | `false`             |
    /// | `MAIL_SUBJECT`               | `Confirmation code` |
    pub fn from_env(token_secret: Vec<u8>) -> Self {
        let defaults = Self::default();
        Self {
            token_secret,
            token_ttl: ttl_from_env("TOKEN_TTL_SECS", defaults.token_ttl),
            code_length: env_or("CONFIRMATION_CODE_LENGTH", defaults.code_length).max(1),
            code_ttl: ttl_from_env("CONFIRMATION_CODE_TTL_SECS", defaults.code_ttl),
            single_use_codes: env_or("SINGLE_USE_CODES", defaults.single_use_codes),
            conceal_token_failures: env_or("CONCEAL_TOKEN_FAILURES", defaults.conceal_token_failures),
            mail_subject: std::env::var("MAIL_SUBJECT").unwrap_or(defaults.mail_subject),
        }
    }

    /// Code TTL as a chrono duration for timestamp arithmetic
    pub fn code_ttl_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.code_ttl.min(MAX_TTL)).unwrap_or(chrono::Duration::MAX)
    }

    /// Compose the confirmation mail for `email`
    pub fn confirmation_mail(&self, email: &str, code: &str) -> OutgoingMail {
        OutgoingMail {
            to: email.to_string(),
            subject: self.mail_subject.clone(),
            body: format!("Your confirmation code: {}", code),
        }
    }
}

fn ttl_from_env(key: &str, default: Duration) -> Duration {
    let ttl = Duration::from_secs(env_or(key, default.as_secs()));
    if ttl > MAX_TTL {
        tracing::warn!(key, secs = ttl.as_secs(), "Clamping TTL to 100 years");
        return MAX_TTL;
    }
    ttl
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Ignoring unparsable configuration value");
            default
        }),
        Err(_) => default,
    }
}
