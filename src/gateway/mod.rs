//! Schema gateway: authentication gate and `format` aliasing in front of the schema renderer.
//!
//! ```text
//! GET {base}/swagger.json | swagger.yaml | swagger/ | docs/
//!     → require_login   (anonymous → 401 or login redirect)
//!     → map_format_alias (format=X copied to the override key)
//!     → SchemaRenderer   (document or viewer page, Cache-Control applied)
//! GET {base}/swagger/:file
//!     → Swagger UI dist asset (no document content, not gated)
//! ```

pub mod document;
pub mod middleware;
pub mod pages;
pub mod query;
pub mod renderer;

pub use middleware::{map_format_alias, require_login};
pub use query::{alias_format_param, FORMAT_PARAM};
pub use renderer::{negotiate, DocVariant, OpenApiRenderer, RenderRequest, SchemaFormat, SchemaRenderer};

use crate::auth::Caller;
use crate::config::Settings;
use crate::error::AppError;
use crate::routes::{join_path, RouteEntry};
use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, Uri},
    middleware::from_fn_with_state,
    response::Response,
    routing::{get, MethodRouter},
    Extension,
};
use std::sync::Arc;
use utoipa_swagger_ui::Config;

/// Raw document suffixes served at `{base}/swagger{suffix}`.
pub const RAW_SUFFIXES: &[&str] = &[".json", ".yaml"];

#[derive(Clone)]
pub struct SchemaGateway {
    settings: Arc<Settings>,
    renderer: Arc<dyn SchemaRenderer>,
}

#[derive(Clone)]
struct Endpoint {
    gateway: SchemaGateway,
    variant: DocVariant,
    suffix: Option<&'static str>,
}

async fn serve_schema(
    State(endpoint): State<Endpoint>,
    caller: Option<Extension<Caller>>,
    uri: Uri,
) -> Result<Response, AppError> {
    let request = RenderRequest {
        variant: endpoint.variant,
        suffix: endpoint.suffix.map(str::to_string),
        path: uri.path().to_string(),
        query: query::query_pairs(uri.query()),
        caller: caller.map(|Extension(c)| c),
    };
    let mut response = endpoint.gateway.renderer.render(request).await?;
    let cache_control = format!("max-age={}", endpoint.gateway.settings.schema.cache_timeout);
    if let Ok(value) = HeaderValue::from_str(&cache_control) {
        response.headers_mut().insert(header::CACHE_CONTROL, value);
    }
    Ok(response)
}

async fn serve_swagger_asset(
    State(config): State<Arc<Config<'static>>>,
    Path(file): Path<String>,
) -> Result<Response, AppError> {
    pages::swagger_file(&file, config)
}

impl SchemaGateway {
    pub fn new(settings: Arc<Settings>, renderer: Arc<dyn SchemaRenderer>) -> Self {
        Self { settings, renderer }
    }

    fn entry(&self, pattern: String, name: &str, variant: DocVariant, suffix: Option<&'static str>) -> RouteEntry {
        let endpoint = Endpoint {
            gateway: self.clone(),
            variant,
            suffix,
        };
        let mut handler: MethodRouter = get(serve_schema)
            .with_state(endpoint)
            .layer(from_fn_with_state(self.settings.clone(), map_format_alias));
        if self.settings.schema.auth_required {
            handler = handler.layer(from_fn_with_state(self.settings.clone(), require_login));
        }
        RouteEntry::new(pattern, handler).named(name).hidden()
    }

    /// Documentation entries under `base`: one per raw suffix, the Swagger UI with its assets, and Redoc.
    pub fn routes(&self, base: &str) -> Vec<RouteEntry> {
        let mut entries: Vec<RouteEntry> = RAW_SUFFIXES
            .iter()
            .map(|suffix| {
                self.entry(
                    join_path(base, &format!("swagger{}", suffix)),
                    &format!("schema-{}", suffix.trim_start_matches('.')),
                    DocVariant::Raw,
                    Some(*suffix),
                )
            })
            .collect();
        let swagger_path = join_path(base, "swagger/");
        entries.push(self.entry(swagger_path.clone(), "schema-swagger-ui", DocVariant::Swagger, None));
        entries.push(
            RouteEntry::new(
                join_path(base, "swagger/:file"),
                get(serve_swagger_asset).with_state(pages::swagger_config(&swagger_path)),
            )
            .named("schema-swagger-ui-asset")
            .hidden(),
        );
        entries.push(self.entry(join_path(base, "docs/"), "schema-redoc", DocVariant::Redoc, None));
        entries
    }
}
