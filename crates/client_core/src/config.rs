use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context};
use url::Url;

pub const DEFAULT_API_URL: &str = "https://cinema-phi-eight.vercel.app/api/cinema";
pub const SETTINGS_FILE: &str = "cinema.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_url: String,
    pub request_timeout_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            request_timeout_secs: 15,
        }
    }
}

impl ClientSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// Defaults, then `cinema.toml` in the working directory, then the environment.
pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

pub(crate) fn load_settings_from(
    file: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(file) {
        match raw.parse::<toml::Table>() {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.get("api_url").and_then(|v| v.as_str()) {
                    settings.api_url = v.to_string();
                }
                match file_cfg.get("request_timeout_secs") {
                    Some(toml::Value::Integer(v)) => {
                        if let Ok(parsed) = u64::try_from(*v) {
                            settings.request_timeout_secs = parsed;
                        }
                    }
                    Some(toml::Value::String(v)) => {
                        if let Ok(parsed) = v.parse::<u64>() {
                            settings.request_timeout_secs = parsed;
                        }
                    }
                    _ => {}
                }
            }
            Err(error) => {
                tracing::warn!(path = %file.display(), %error, "ignoring unreadable settings file");
            }
        }
    }

    if let Some(v) = env("CINEMA_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = env("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }

    settings
}

pub fn parse_api_url(raw_api_url: &str) -> anyhow::Result<Url> {
    let trimmed = raw_api_url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        bail!("cinema api url is empty");
    }

    let url = Url::parse(trimmed)
        .with_context(|| format!("invalid cinema api url '{raw_api_url}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!(
            "cinema api url '{raw_api_url}' must use http or https, not '{}'",
            url.scheme()
        );
    }
    if url.cannot_be_a_base() {
        bail!("cinema api url '{raw_api_url}' cannot be used as a resource base");
    }

    Ok(url)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
