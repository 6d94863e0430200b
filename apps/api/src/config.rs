use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Result};

use crate::generation::{default_cloud_config, CloudConfig};
use crate::render::Rgb;

/// Application configuration loaded from environment variables.
/// Every variable is optional; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Font file used for glyph outlines. Takes precedence over `font_family`.
    pub font_path: Option<PathBuf>,
    /// Family name looked up in the system font database.
    pub font_family: Option<String>,
    pub width: u32,
    pub height: u32,
    pub background: Rgb,
}

impl Default for Config {
    fn default() -> Self {
        let cloud = default_cloud_config();
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            font_path: None,
            font_family: None,
            width: cloud.width,
            height: cloud.height,
            background: cloud.background,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        Ok(Config {
            port: env_or("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            font_path: optional_env("WORDCLOUD_FONT_PATH").map(PathBuf::from),
            font_family: optional_env("WORDCLOUD_FONT_FAMILY"),
            width: env_or("WORDCLOUD_WIDTH", defaults.width)?,
            height: env_or("WORDCLOUD_HEIGHT", defaults.height)?,
            background: env_or("WORDCLOUD_BACKGROUND", defaults.background)?,
        })
    }

    /// Generation defaults for requests that do not override them.
    pub fn cloud_defaults(&self) -> CloudConfig {
        CloudConfig {
            width: self.width,
            height: self.height,
            background: self.background,
            ..default_cloud_config()
        }
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match optional_env(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| anyhow!("Environment variable '{key}' has an invalid value '{raw}': {e}"))
}
