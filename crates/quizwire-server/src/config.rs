//! Server configuration from environment variables.

use std::env;

const DEFAULT_WS_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8081";

/// Listen addresses for the two server surfaces.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// WebSocket listener carrying the quiz protocol.
    pub ws_addr: String,
    /// HTTP listener serving the health probe.
    pub http_addr: String,
}

impl ServerConfig {
    /// Reads `QUIZWIRE_WS_ADDR` and `QUIZWIRE_HTTP_ADDR`, falling back
    /// to the defaults when unset.
    pub fn from_env() -> Self {
        Self {
            ws_addr: env::var("QUIZWIRE_WS_ADDR").unwrap_or_else(|_| DEFAULT_WS_ADDR.into()),
            http_addr: env::var("QUIZWIRE_HTTP_ADDR").unwrap_or_else(|_| DEFAULT_HTTP_ADDR.into()),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ws_addr: DEFAULT_WS_ADDR.into(),
            http_addr: DEFAULT_HTTP_ADDR.into(),
        }
    }
}
