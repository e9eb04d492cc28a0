//! HTTP server configuration

use std::env;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Deployment environment reported by the health endpoints
    pub environment: String,
}

impl ServerConfig {
    /// Create a new ServerConfig from environment variables
    ///
    /// # Environment Variables
    /// - `API_HOST`: Interface to bind (default: "0.0.0.0")
    /// - `API_PORT`: Port to listen on (default: 3000)
    /// - `APP_ENV`: Environment name (default: "development")
    pub fn from_env() -> Self {
        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .unwrap_or(3000);

        let environment = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        Self {
            host,
            port,
            environment,
        }
    }

    /// Address to bind the listener to
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
