use std::collections::HashMap;
use std::fs;

use anyhow::{Context, Result};
use url::Url;

#[derive(Debug, PartialEq, Eq)]
pub struct Settings {
    pub device_url: String,
    pub poll_period_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            device_url: "http://192.168.4.1".into(),
            poll_period_seconds: 10,
        }
    }
}

/// Defaults, then `panel.toml`, then environment, then CLI flags.
pub fn load_settings(
    cli_device_url: Option<String>,
    cli_poll_period: Option<u64>,
) -> Result<Settings> {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("panel.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("device_url") {
                settings.device_url = v.clone();
            }
            if let Some(v) = file_cfg.get("poll_period_seconds") {
                if let Ok(parsed) = v.parse::<u64>() {
                    settings.poll_period_seconds = parsed;
                }
            }
        }
    }

    if let Ok(v) = std::env::var("DEVICE_URL") {
        settings.device_url = v;
    }
    if let Ok(v) = std::env::var("APP__DEVICE_URL") {
        settings.device_url = v;
    }

    if let Ok(v) = std::env::var("APP__POLL_PERIOD_SECONDS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.poll_period_seconds = parsed;
        }
    }

    if let Some(v) = cli_device_url {
        settings.device_url = v;
    }
    if let Some(v) = cli_poll_period {
        settings.poll_period_seconds = v;
    }

    settings.device_url = normalize_device_url(&settings.device_url)?;
    if settings.poll_period_seconds == 0 {
        settings.poll_period_seconds = Settings::default().poll_period_seconds;
    }

    Ok(settings)
}

fn normalize_device_url(raw: &str) -> Result<String> {
    let raw = raw.trim();
    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    };
    Url::parse(&with_scheme).with_context(|| format!("invalid device url '{raw}'"))?;
    Ok(with_scheme.trim_end_matches('/').to_string())
}
