use std::path::PathBuf;

/// Storefront configuration, read from the environment (and `.env`).
#[derive(Clone, Debug)]
pub struct Config {
    /// HTTP listen port
    pub port: u16,
    /// JSON catalog seeding the in-memory backend
    pub catalog_path: PathBuf,
    /// Products per listing page
    pub page_size: usize,
    /// Public storefront origin, used in back-in-stock links
    pub base_url: String,
    /// Hosted checkout page; checkout ids are appended to it
    pub checkout_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8083);
        let base_url = std::env::var("BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{port}"));
        Self {
            port,
            catalog_path: std::env::var("CATALOG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("catalog.json")),
            page_size: std::env::var("PAGE_SIZE")
                .ok()
                .and_then(|p| p.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(12),
            checkout_url: std::env::var("CHECKOUT_URL")
                .unwrap_or_else(|_| format!("{}/checkout", base_url.trim_end_matches('/'))),
            base_url,
        }
    }
}
