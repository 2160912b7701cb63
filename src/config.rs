//! Environment configuration.

use anyhow::{Context, Result};

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Destination phone in international format without `+`, e.g.
    /// `5219516111552`. Used to build the checkout deep link.
    pub whatsapp_phone: String,
    pub media: MediaConfig,
}

#[derive(Clone, Debug)]
pub struct MediaConfig {
    pub cloud_name: String,
    pub upload_preset: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?,
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            whatsapp_phone: std::env::var("WHATSAPP_PHONE")
                .context("WHATSAPP_PHONE is not set")?,
            media: MediaConfig {
                cloud_name: std::env::var("MEDIA_CLOUD_NAME").unwrap_or_default(),
                upload_preset: std::env::var("MEDIA_UPLOAD_PRESET").unwrap_or_default(),
            },
        })
    }
}
