//! Settings validation: URL shapes, parameter names, token uniqueness.

use crate::config::Settings;
use crate::error::ConfigError;
use regex::Regex;
use std::collections::HashSet;

const PARAM_NAME_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*$";

/// Absolute http(s) URL or an absolute path on this host.
fn is_redirect_target(value: &str) -> bool {
    if value.starts_with('/') {
        return !value.starts_with("//");
    }
    url::Url::parse(value)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

pub fn validate_settings(settings: &Settings) -> Result<(), ConfigError> {
    if !is_redirect_target(&settings.ui_url) {
        return Err(ConfigError::Validation(format!(
            "ui_url must be an http(s) URL or an absolute path, got '{}'",
            settings.ui_url
        )));
    }

    if let Some(login_url) = &settings.auth.login_url {
        if !is_redirect_target(login_url) {
            return Err(ConfigError::Validation(format!(
                "auth.login_url must be an http(s) URL or an absolute path, got '{}'",
                login_url
            )));
        }
    }

    let param_name = Regex::new(PARAM_NAME_PATTERN)
        .map_err(|_| ConfigError::Validation("invalid parameter name pattern".into()))?;
    if !param_name.is_match(&settings.url_format_override) {
        return Err(ConfigError::Validation(format!(
            "url_format_override is not a valid parameter name: '{}'",
            settings.url_format_override
        )));
    }

    // `/` would put the API index on top of the root redirect.
    let prefix = settings.api_prefix.as_str();
    if !prefix.starts_with('/') || prefix.ends_with('/') {
        return Err(ConfigError::InvalidPrefix(prefix.to_string()));
    }

    if settings.auth.cookie_name.trim().is_empty() {
        return Err(ConfigError::Validation("auth.cookie_name must not be empty".into()));
    }

    let mut seen = HashSet::new();
    for t in &settings.auth.tokens {
        if t.token.trim().is_empty() || t.username.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "token for '{}' has an empty username or key",
                t.username
            )));
        }
        if !seen.insert(t.token.as_str()) {
            return Err(ConfigError::Validation(format!(
                "token for '{}' is already assigned",
                t.username
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenConfig;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_settings(&Settings::default()).is_ok());
    }

    #[test]
    fn relative_ui_path_is_accepted() {
        let settings = Settings {
            ui_url: "/ui/".into(),
            ..Settings::default()
        };
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn rejects_non_http_ui_url() {
        for bad in ["ftp://example.com", "example.com", "//evil.example"] {
            let settings = Settings {
                ui_url: bad.into(),
                ..Settings::default()
            };
            assert!(
                matches!(validate_settings(&settings), Err(ConfigError::Validation(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_bad_override_key() {
        let settings = Settings {
            url_format_override: "sch eme".into(),
            ..Settings::default()
        };
        assert!(matches!(validate_settings(&settings), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn rejects_trailing_slash_prefix() {
        for prefix in ["/api/", "/", "api"] {
            let settings = Settings {
                api_prefix: prefix.into(),
                ..Settings::default()
            };
            assert!(matches!(validate_settings(&settings), Err(ConfigError::InvalidPrefix(_))));
        }
    }

    #[test]
    fn rejects_shared_token() {
        let mut settings = Settings::default();
        settings.auth.tokens = vec![
            TokenConfig { username: "a".into(), token: "k".into(), is_staff: false },
            TokenConfig { username: "b".into(), token: "k".into(), is_staff: false },
        ];
        assert!(matches!(validate_settings(&settings), Err(ConfigError::Validation(_))));
    }
}
