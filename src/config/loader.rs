//! Load settings: `.env`, optional JSON file, then environment overrides.

use crate::config::{validate_settings, Settings, TokenConfig};
use crate::error::ConfigError;
use std::path::Path;

/// Environment variable naming an optional JSON settings file.
pub const SETTINGS_PATH_VAR: &str = "LABELGATE_SETTINGS";

/// Load settings for the process. Call once at startup; the result is immutable afterwards.
pub fn load_settings() -> Result<Settings, ConfigError> {
    dotenvy::dotenv().ok();
    let base = match std::env::var(SETTINGS_PATH_VAR) {
        Ok(path) if !path.trim().is_empty() => load_settings_file(Path::new(&path))?,
        _ => Settings::default(),
    };
    let settings = apply_overrides(base, |key| std::env::var(key).ok())?;
    validate_settings(&settings)?;
    tracing::info!(
        api_prefix = %settings.api_prefix,
        ui_url = %settings.ui_url,
        format_override = %settings.url_format_override,
        tokens = settings.auth.tokens.len(),
        "settings loaded"
    );
    Ok(settings)
}

pub fn load_settings_file(path: &Path) -> Result<Settings, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&raw).map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))
}

/// Apply environment-style overrides. `lookup` returns the raw value for a variable name.
pub fn apply_overrides<F>(mut settings: Settings, lookup: F) -> Result<Settings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(v) = get("BIND_ADDRESS") {
        settings.bind_address = v;
    }
    if let Some(v) = get("API_PREFIX") {
        settings.api_prefix = v;
    }
    if let Some(v) = get("UI_URL") {
        settings.ui_url = v;
    }
    if let Some(v) = get("URL_FORMAT_OVERRIDE") {
        settings.url_format_override = v;
    }
    if let Some(v) = get("SCHEMA_AUTH_REQUIRED") {
        settings.schema.auth_required = parse_bool("SCHEMA_AUTH_REQUIRED", &v)?;
    }
    if let Some(v) = get("SCHEMA_PUBLIC") {
        settings.schema.public = parse_bool("SCHEMA_PUBLIC", &v)?;
    }
    if let Some(v) = get("SCHEMA_CACHE_TIMEOUT") {
        settings.schema.cache_timeout = v
            .parse()
            .map_err(|_| ConfigError::Load(format!("SCHEMA_CACHE_TIMEOUT: not a number: {}", v)))?;
    }
    if let Some(v) = get("SCHEMA_SERVER_URL") {
        settings.schema.server_url = Some(v);
    }
    if let Some(v) = get("LOGIN_URL") {
        settings.auth.login_url = Some(v);
    }
    if let Some(v) = get("API_TOKENS") {
        settings.auth.tokens = parse_tokens(&v)?;
    }
    Ok(settings)
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Load(format!("{}: expected a boolean, got {}", key, value))),
    }
}

/// `user:token[:staff]` entries, comma-separated.
fn parse_tokens(value: &str) -> Result<Vec<TokenConfig>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|entry| {
            let mut parts = entry.splitn(3, ':');
            let username = parts.next().unwrap_or_default().trim();
            let token = parts
                .next()
                .map(str::trim)
                .ok_or_else(|| ConfigError::Load(format!("API_TOKENS: missing token for '{}'", username)))?;
            let is_staff = match parts.next().map(str::trim) {
                None => false,
                Some("staff") => true,
                Some(other) => {
                    return Err(ConfigError::Load(format!(
                        "API_TOKENS: unknown flag '{}' for '{}'",
                        other, username
                    )))
                }
            };
            Ok(TokenConfig {
                username: username.to_string(),
                token: token.to_string(),
                is_staff,
            })
        })
        .collect()
}
