// src/config.rs

use std::env;
use std::net::SocketAddr;

use axum::http::HeaderValue;
use dotenvy::dotenv;

use crate::analytics::ranking::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000,http://localhost:5173";

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. Without one the service runs on the in-memory store.
    pub database_url: Option<String>,
    pub rust_log: String,
    pub bind_addr: SocketAddr,
    pub log_dir: String,
    pub default_page_limit: usize,
    pub cors_origins: Vec<HeaderValue>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            rust_log: "info".to_string(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            log_dir: "logs".to_string(),
            default_page_limit: DEFAULT_PAGE_LIMIT,
            cors_origins: parse_origins(DEFAULT_CORS_ORIGINS),
        }
    }
}

fn parse_origins(raw: &str) -> Vec<HeaderValue> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect()
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").ok().filter(|v| !v.is_empty());

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| format!("BIND_ADDR is not a socket address: {}", e))?;

        let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());

        let default_page_limit = match env::var("DEFAULT_PAGE_LIMIT") {
            Ok(v) => v
                .parse::<usize>()
                .map_err(|e| format!("DEFAULT_PAGE_LIMIT must be a number: {}", e))?
                .clamp(1, MAX_PAGE_LIMIT),
            Err(_) => DEFAULT_PAGE_LIMIT,
        };

        let cors_origins = parse_origins(
            &env::var("CORS_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.to_string()),
        );

        Ok(Self {
            database_url,
            rust_log,
            bind_addr,
            log_dir,
            default_page_limit,
            cors_origins,
        })
    }
}
