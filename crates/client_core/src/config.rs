use std::{fs, path::Path, time::Duration};

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use url::Url;

use crate::{
    notification::DEFAULT_NOTIFICATION_TTL, store::BulkDeletePolicy, view::SortScope,
    view::DEFAULT_PAGE_SIZE,
};

pub const DEFAULT_CONFIG_FILE: &str = "client.toml";
const ENV_PREFIX: &str = "PRODUCTS_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub server_url: String,
    pub page_size: usize,
    pub notification_ttl: Duration,
    pub request_timeout: Duration,
    pub bulk_delete_policy: BulkDeletePolicy,
    pub sort_scope: SortScope,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".into(),
            page_size: DEFAULT_PAGE_SIZE,
            notification_ttl: DEFAULT_NOTIFICATION_TTL,
            request_timeout: Duration::from_secs(10),
            bulk_delete_policy: BulkDeletePolicy::Lenient,
            sort_scope: SortScope::Page,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    server_url: Option<String>,
    page_size: Option<usize>,
    notification_ttl_ms: Option<u64>,
    request_timeout_ms: Option<u64>,
    bulk_delete_policy: Option<String>,
    sort_scope: Option<String>,
}

/// Defaults, then the TOML file, then `PRODUCTS_*` environment variables.
///
/// An explicit `config_path` must exist; the default `client.toml` is
/// optional.
pub fn load_settings(config_path: Option<&Path>) -> Result<ClientSettings> {
    let mut settings = ClientSettings::default();

    match config_path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?;
            apply_file_overrides(&mut settings, &raw)
                .with_context(|| format!("invalid config file '{}'", path.display()))?;
        }
        None => {
            if let Ok(raw) = fs::read_to_string(DEFAULT_CONFIG_FILE) {
                apply_file_overrides(&mut settings, &raw)
                    .with_context(|| format!("invalid config file '{DEFAULT_CONFIG_FILE}'"))?;
            }
        }
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok())?;
    settings.server_url = validate_server_url(&settings.server_url)?;
    Ok(settings)
}

fn apply_file_overrides(settings: &mut ClientSettings, raw: &str) -> Result<()> {
    let file: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file.server_url {
        settings.server_url = v;
    }
    if let Some(v) = file.page_size {
        settings.page_size = v;
    }
    if let Some(v) = file.notification_ttl_ms {
        settings.notification_ttl = Duration::from_millis(v);
    }
    if let Some(v) = file.request_timeout_ms {
        settings.request_timeout = Duration::from_millis(v);
    }
    if let Some(v) = file.bulk_delete_policy {
        settings.bulk_delete_policy = parse_bulk_delete_policy(&v)?;
    }
    if let Some(v) = file.sort_scope {
        settings.sort_scope = parse_sort_scope(&v)?;
    }
    if settings.page_size == 0 {
        bail!("page_size must be at least 1");
    }
    Ok(())
}

fn apply_env_overrides(
    settings: &mut ClientSettings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

    if let Some(v) = var("SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = var("PAGE_SIZE") {
        settings.page_size = parse_number(&v, "PAGE_SIZE")?;
        if settings.page_size == 0 {
            bail!("{ENV_PREFIX}PAGE_SIZE must be at least 1");
        }
    }
    if let Some(v) = var("NOTIFICATION_TTL_MS") {
        settings.notification_ttl = Duration::from_millis(parse_number(&v, "NOTIFICATION_TTL_MS")?);
    }
    if let Some(v) = var("REQUEST_TIMEOUT_MS") {
        settings.request_timeout = Duration::from_millis(parse_number(&v, "REQUEST_TIMEOUT_MS")?);
    }
    if let Some(v) = var("BULK_DELETE_POLICY") {
        settings.bulk_delete_policy = parse_bulk_delete_policy(&v)?;
    }
    if let Some(v) = var("SORT_SCOPE") {
        settings.sort_scope = parse_sort_scope(&v)?;
    }
    Ok(())
}

fn parse_number<T: std::str::FromStr>(raw: &str, name: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| anyhow!("{ENV_PREFIX}{name} must be a non-negative integer, got '{raw}'"))
}

fn parse_bulk_delete_policy(raw: &str) -> Result<BulkDeletePolicy> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "lenient" => Ok(BulkDeletePolicy::Lenient),
        "strict" => Ok(BulkDeletePolicy::Strict),
        other => bail!("unknown bulk_delete_policy '{other}' (expected 'lenient' or 'strict')"),
    }
}

fn parse_sort_scope(raw: &str) -> Result<SortScope> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "page" => Ok(SortScope::Page),
        "collection" => Ok(SortScope::Collection),
        other => bail!("unknown sort_scope '{other}' (expected 'page' or 'collection')"),
    }
}

/// Checks that the server URL is an absolute http(s) URL and strips any
/// trailing slash so routes can be appended directly.
pub fn validate_server_url(raw: &str) -> Result<String> {
    let raw = raw.trim();
    let url = Url::parse(raw).with_context(|| format!("invalid server url '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("server url '{raw}' must use http or https");
    }
    if url.host_str().is_none() {
        bail!("server url '{raw}' has no host");
    }
    Ok(raw.trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
