//! Server Configuration

const DEFAULT_PORT: &str = "3000";

/// Listener settings
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. `0.0.0.0:3000`
    pub bind_addr: String,
}

impl ServerConfig {
    /// `BIND_ADDR` wins; otherwise all interfaces on `PORT` (default 3000)
    pub fn from_env() -> Self {
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| {
            let port = std::env::var("PORT").unwrap_or_else(|_| DEFAULT_PORT.into());
            format!("0.0.0.0:{port}")
        });

        Self { bind_addr }
    }
}
