use std::{net::SocketAddr, time::Duration};

use marketdeck_market_data::{Interval, Lookback};

use crate::auth::decode_secret_key;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub auth: Option<AuthConfig>,
    pub ingestion: IngestionConfig,
}

#[derive(Clone)]
pub struct AuthConfig {
    pub admin_email: String,
    pub password_hash: String,
    pub jwt_secret: Vec<u8>,
    pub access_token_ttl: Duration,
}

/// Settings for the scheduled ingestion pipeline.
#[derive(Clone)]
pub struct IngestionConfig {
    pub enabled: bool,
    /// Minutes between batch runs; always at least 1.
    pub interval_minutes: u64,
    pub interval: Interval,
    pub lookback: Lookback,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("MD_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .expect("Invalid MD_LISTEN_ADDR");
        let db_path = std::env::var("MD_DB_PATH").unwrap_or_else(|_| "./db/marketdeck.db".into());
        let cors_allow = std::env::var("MD_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = std::env::var("MD_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".into())
            .parse()
            .unwrap_or(30000);

        // Auth is enabled when a password hash is configured; the JWT secret
        // is then mandatory.
        let auth = std::env::var("MD_AUTH_PASSWORD_HASH")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|password_hash| {
                let raw_secret =
                    std::env::var("MD_JWT_SECRET").expect("MD_JWT_SECRET must be set when MD_AUTH_PASSWORD_HASH is configured");
                let jwt_secret = decode_secret_key(&raw_secret).expect("Invalid MD_JWT_SECRET");
                let ttl_secs: u64 = std::env::var("MD_TOKEN_TTL_SECS")
                    .unwrap_or_else(|_| "1800".into())
                    .parse()
                    .unwrap_or(1800);
                AuthConfig {
                    admin_email: std::env::var("MD_ADMIN_EMAIL")
                        .unwrap_or_else(|_| "admin@marketdeck.local".into()),
                    password_hash,
                    jwt_secret,
                    access_token_ttl: Duration::from_secs(ttl_secs),
                }
            });

        let ingestion = IngestionConfig {
            enabled: std::env::var("MD_INGESTION_ENABLED")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            interval_minutes: std::env::var("MD_INGESTION_INTERVAL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5)
                .max(1),
            interval: std::env::var("MD_INGESTION_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(Interval::Daily),
            lookback: std::env::var("MD_INGESTION_RANGE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(Lookback::OneDay),
        };

        Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            auth,
            ingestion,
        }
    }
}
