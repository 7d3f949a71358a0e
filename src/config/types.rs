//! Settings types. Every field has a default so partial JSON files and bare environments load.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bind_address: String,
    /// Base path every API route is mounted under (no trailing slash).
    pub api_prefix: String,
    /// Redirect target for requests to `/`.
    pub ui_url: String,
    /// Query parameter name the schema renderer inspects to choose an output format.
    pub url_format_override: String,
    pub max_body_bytes: usize,
    pub schema: SchemaSettings,
    pub auth: AuthSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            api_prefix: "/api".to_string(),
            ui_url: "http://localhost:3000".to_string(),
            url_format_override: "scheme".to_string(),
            max_body_bytes: 1024 * 1024,
            schema: SchemaSettings::default(),
            auth: AuthSettings::default(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaSettings {
    pub title: String,
    pub version: String,
    pub description: String,
    pub terms_of_service: Option<String>,
    pub contact_email: Option<String>,
    pub license: Option<String>,
    /// Documentation paths reject anonymous callers when true.
    pub auth_required: bool,
    /// When false the document is built per request and filtered by what the caller may see.
    pub public: bool,
    /// Seconds sent in `Cache-Control: max-age` on documentation responses.
    pub cache_timeout: u64,
    pub server_url: Option<String>,
}

impl Default for SchemaSettings {
    fn default() -> Self {
        Self {
            title: "Annotation REST API".to_string(),
            version: "v1".to_string(),
            description: "REST API for the annotation server".to_string(),
            terms_of_service: None,
            contact_email: None,
            license: Some("MIT License".to_string()),
            auth_required: true,
            public: true,
            cache_timeout: 0,
            server_url: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Anonymous documentation requests are redirected here when set; otherwise they get 401.
    pub login_url: Option<String>,
    pub cookie_name: String,
    pub tokens: Vec<TokenConfig>,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            login_url: None,
            cookie_name: "token".to_string(),
            tokens: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    pub username: String,
    pub token: String,
    #[serde(default)]
    pub is_staff: bool,
}
