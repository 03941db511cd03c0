//! Environment configuration

use std::net::SocketAddr;

use anyhow::Context;

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Public origin of the staff UI, used for waiver QR links
    /// (e.g. `https://pos.healthharmony.example`).
    pub public_base_url: String,
    /// Document store API origin (e.g. `https://<project>.api.store.example`).
    pub store_base_url: String,
    pub store_dataset: String,
    /// Write token for the store; read-only deployments may omit it.
    pub store_token: Option<String>,
    /// Shared secret for the admin panel. Not a real auth boundary.
    pub admin_user: String,
    pub admin_password: String,
}

impl AppConfig {
    /// Load configuration from the environment (`.env` honoured in dev).
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let bind_addr = std::env::var("BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()
            .context("BIND_ADDR is not a valid socket address")?;

        let store_base_url =
            std::env::var("STORE_BASE_URL").context("STORE_BASE_URL is required")?;
        let store_dataset = std::env::var("STORE_DATASET").unwrap_or_else(|_| "production".to_string());
        let store_token = std::env::var("STORE_TOKEN").ok().filter(|token| !token.is_empty());

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://{bind_addr}"))
            .trim_end_matches('/')
            .to_string();

        let admin_user = std::env::var("ADMIN_USER").unwrap_or_else(|_| "admin".to_string());
        let admin_password =
            std::env::var("ADMIN_PASSWORD").context("ADMIN_PASSWORD is required")?;

        Ok(Self {
            bind_addr,
            public_base_url,
            store_base_url,
            store_dataset,
            store_token,
            admin_user,
            admin_password,
        })
    }

    /// URL of the waiver signing page for a ticket, encoded into receipt QR
    /// codes.
    pub fn waiver_url(&self, ticket_id: &str) -> String {
        format!("{}/ticket/{}", self.public_base_url, ticket_id)
    }
}
