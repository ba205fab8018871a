use std::{fs, path::Path, time::Duration};

use anyhow::{anyhow, Context};
use serde::Deserialize;
use tracing::warn;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "vault.toml";
pub const DEFAULT_CATALOG_URL: &str = "https://api.discogs.com";
pub const DEFAULT_PRICE_CURRENCY: &str = "JPY";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub store_url: Option<String>,
    pub catalog_base_url: String,
    pub catalog_token: Option<String>,
    pub price_currency: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_url: None,
            catalog_base_url: DEFAULT_CATALOG_URL.into(),
            catalog_token: None,
            price_currency: DEFAULT_PRICE_CURRENCY.into(),
            request_timeout_secs: 30,
            user_agent: concat!("vinyl-vault/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl Settings {
    pub fn store_endpoint(&self) -> anyhow::Result<Url> {
        let raw = self
            .store_url
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| anyhow!("no store endpoint configured (set VAULT_STORE_URL)"))?;
        Url::parse(raw).with_context(|| format!("invalid store endpoint '{raw}'"))
    }

    pub fn catalog_endpoint(&self) -> anyhow::Result<Url> {
        let raw = self.catalog_base_url.trim();
        Url::parse(raw).with_context(|| format!("invalid catalog url '{raw}'"))
    }

    /// Token for the catalog service; blank values count as missing.
    pub fn catalog_token(&self) -> Option<&str> {
        self.catalog_token
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(DEFAULT_CONFIG_FILE))
}

pub fn load_settings_from(path: &Path) -> Settings {
    let mut settings = read_settings_file(path);
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn read_settings_file(path: &Path) -> Settings {
    let Ok(raw) = fs::read_to_string(path) else {
        return Settings::default();
    };
    match toml::from_str::<Settings>(&raw) {
        Ok(file_cfg) => file_cfg,
        Err(err) => {
            warn!(path = %path.display(), "ignoring unreadable config file: {err}");
            Settings::default()
        }
    }
}

fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    let first = |keys: &[&str]| keys.iter().find_map(|key| lookup(*key));

    if let Some(v) = first(&["APP__STORE_URL", "VAULT_STORE_URL"]) {
        settings.store_url = Some(v);
    }
    if let Some(v) = first(&["APP__CATALOG_URL", "VAULT_CATALOG_URL"]) {
        settings.catalog_base_url = v;
    }
    if let Some(v) = first(&["APP__CATALOG_TOKEN", "DISCOGS_API_TOKEN"]) {
        settings.catalog_token = Some(v);
    }
    if let Some(v) = first(&["APP__PRICE_CURRENCY", "VAULT_PRICE_CURRENCY"]) {
        settings.price_currency = v.trim().to_ascii_uppercase();
    }
    if let Some(v) = first(&["APP__TIMEOUT_SECS", "VAULT_TIMEOUT_SECS"]) {
        match v.trim().parse::<u64>() {
            Ok(parsed) => settings.request_timeout_secs = parsed,
            Err(_) => warn!(value = %v, "ignoring non-numeric timeout override"),
        }
    }
}
