use std::env;
use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
const DEFAULT_DIRECTORY_CACHE_TTL_SECS: u64 = 300;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: SocketAddr,
    pub cors_origin: String,
    pub directory_cache_ttl: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL must be set".to_string())?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| "JWT_SECRET must be set".to_string())?;

        if jwt_secret.trim().is_empty() {
            return Err("JWT_SECRET must not be empty".to_string());
        }

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| format!("BIND_ADDR is not a valid socket address: {}", e))?;

        let cors_origin = env::var("CORS_ORIGIN").unwrap_or_else(|_| DEFAULT_CORS_ORIGIN.to_string());

        let ttl_secs = match env::var("DIRECTORY_CACHE_TTL_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|e| format!("DIRECTORY_CACHE_TTL_SECS must be a whole number of seconds: {}", e))?,
            Err(_) => DEFAULT_DIRECTORY_CACHE_TTL_SECS,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr,
            cors_origin,
            directory_cache_ttl: Duration::from_secs(ttl_secs),
        })
    }

    /// Configuration for tests and tools that never touch the network
    pub fn for_tests(jwt_secret: &str) -> Self {
        Self {
            database_url: String::new(),
            jwt_secret: jwt_secret.to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
            directory_cache_ttl: Duration::from_secs(DEFAULT_DIRECTORY_CACHE_TTL_SECS),
        }
    }
}
