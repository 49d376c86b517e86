use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expire_days: i64,
    pub environment: String,
    pub frontend_url: Option<String>,
    pub allowed_origins: Vec<String>,
    pub zalo_app_id: Option<String>,
    pub zalo_app_secret: Option<String>,
    pub api_rate_limit: u32,
    pub auth_rate_limit: u32,
    pub lead_rate_limit: u32,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Origins the Zalo Mini App webview is known to serve from. Extra entries
/// come from ALLOWED_ORIGINS and FRONTEND_URL.
const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:2999",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:2999",
    "https://zaloapp.com",
    "https://zalo.me",
    "https://*.zaloapp.com",
    "https://*.zalo.me",
    "https://h5.zdn.vn",
    "https://*.zdn.vn",
    "https://h5.zadn.vn",
    "https://*.zadn.vn",
    "https://zmp.zalo.me",
    "https://*.zmp.zalo.me",
];

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let frontend_url = env::var("FRONTEND_URL").ok();

        let mut allowed_origins: Vec<String> = DEFAULT_ALLOWED_ORIGINS
            .iter()
            .map(|s| s.to_string())
            .collect();
        if let Ok(extra) = env::var("ALLOWED_ORIGINS") {
            allowed_origins.extend(
                extra
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty()),
            );
        }
        if let Some(url) = &frontend_url {
            allowed_origins.push(url.clone());
        }

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            jwt_secret: get_env("JWT_SECRET")?,
            jwt_expire_days: get_env_or_parse("JWT_EXPIRE_DAYS", 7)?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            frontend_url,
            allowed_origins,
            zalo_app_id: env::var("ZALO_APP_ID").ok(),
            zalo_app_secret: env::var("ZALO_APP_SECRET").ok(),
            api_rate_limit: get_env_or_parse("API_RATE_LIMIT", 200)?,
            auth_rate_limit: get_env_or_parse("AUTH_RATE_LIMIT", 10)?,
            lead_rate_limit: get_env_or_parse("LEAD_RATE_LIMIT", 5)?,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_or_parse<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
