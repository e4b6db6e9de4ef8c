use serde::Deserialize;

const DEFAULT_DATABASE_URL: &str = "sqlite://pixel_planets.db?mode=rwc";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub server: ServerConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.into());
        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);
        let server = ServerConfig {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: match std::env::var("APP_PORT") {
                Ok(v) => v.parse()?,
                Err(_) => 8000,
            },
        };
        Ok(Self {
            database_url,
            max_connections,
            server,
        })
    }

    /// Single-connection in-memory database; every pooled connection to
    /// `sqlite::memory:` would otherwise see its own empty database.
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".into(),
            max_connections: 1,
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: 0,
            },
        }
    }
}
