use std::net::SocketAddr;

use crate::render;

/// Runtime configuration, read from the environment once at startup.
///
/// A missing token is tolerated here so the server can still answer
/// with an explicit per-request error instead of refusing to boot.
#[derive(Debug, Clone)]
pub struct Config {
    pub token: Option<String>,
    pub render_base_url: String,
    pub bind_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        Config {
            token: std::env::var("BROWSERLESS_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
            render_base_url: std::env::var("BROWSERLESS_URL")
                .unwrap_or_else(|_| render::DEFAULT_BASE_URL.to_string()),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], port)),
        }
    }
}
