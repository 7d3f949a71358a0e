//! Schema renderers: format negotiation and the utoipa-backed default renderer.

use crate::auth::Caller;
use crate::config::Settings;
use crate::error::AppError;
use crate::gateway::document::build_document;
use crate::gateway::pages::{redoc_page, swagger_config, swagger_file, SWAGGER_INDEX};
use crate::routes::RouteMeta;
use async_trait::async_trait;
use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use utoipa::openapi::OpenApi;

/// Which documentation endpoint received the request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocVariant {
    /// Machine-readable document keyed by a path suffix.
    Raw,
    /// Interactive Swagger UI.
    Swagger,
    /// Static-style Redoc viewer.
    Redoc,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchemaFormat {
    Json,
    Yaml,
    SwaggerUi,
    Redoc,
}

/// Input to a renderer, after authentication and parameter normalization.
#[derive(Clone, Debug)]
pub struct RenderRequest {
    pub variant: DocVariant,
    /// Path suffix such as `.json`, for the raw variant.
    pub suffix: Option<String>,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub caller: Option<Caller>,
}

impl RenderRequest {
    /// Last value of a query parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[async_trait]
pub trait SchemaRenderer: Send + Sync + 'static {
    async fn render(&self, request: RenderRequest) -> Result<Response, AppError>;
}

/// Path suffix first, then the requested format, then the variant's default.
pub fn negotiate(
    variant: DocVariant,
    suffix: Option<&str>,
    requested: Option<&str>,
) -> Result<SchemaFormat, AppError> {
    if let Some(suffix) = suffix {
        return match suffix.trim_start_matches('.') {
            "json" => Ok(SchemaFormat::Json),
            "yaml" => Ok(SchemaFormat::Yaml),
            other => Err(AppError::NotFound(format!("schema format '{}'", other))),
        };
    }
    match (requested, variant) {
        (None, DocVariant::Raw) => Ok(SchemaFormat::Json),
        (None, DocVariant::Swagger) => Ok(SchemaFormat::SwaggerUi),
        (None, DocVariant::Redoc) => Ok(SchemaFormat::Redoc),
        (Some("json" | "openapi"), _) => Ok(SchemaFormat::Json),
        (Some("yaml"), _) => Ok(SchemaFormat::Yaml),
        (Some("swagger"), DocVariant::Swagger) => Ok(SchemaFormat::SwaggerUi),
        (Some("redoc"), DocVariant::Redoc) => Ok(SchemaFormat::Redoc),
        (Some(other), _) => Err(AppError::NotFound(format!("schema format '{}'", other))),
    }
}

/// Renders the route table's document as JSON, YAML or a viewer page.
pub struct OpenApiRenderer {
    settings: Arc<Settings>,
    routes: Vec<RouteMeta>,
    shared: Option<Arc<OpenApi>>,
}

impl OpenApiRenderer {
    /// A public schema is built once here; otherwise per request for the caller.
    pub fn new(settings: Arc<Settings>, routes: Vec<RouteMeta>) -> Self {
        let shared = settings
            .schema
            .public
            .then(|| Arc::new(build_document(&settings.schema, &routes, None)));
        Self {
            settings,
            routes,
            shared,
        }
    }

    pub fn document_for(&self, caller: Option<&Caller>) -> Arc<OpenApi> {
        match &self.shared {
            Some(doc) => doc.clone(),
            None => Arc::new(build_document(&self.settings.schema, &self.routes, Some(caller))),
        }
    }
}

#[async_trait]
impl SchemaRenderer for OpenApiRenderer {
    async fn render(&self, request: RenderRequest) -> Result<Response, AppError> {
        let format = negotiate(
            request.variant,
            request.suffix.as_deref(),
            request.param(&self.settings.url_format_override),
        )?;
        let response = match format {
            SchemaFormat::Json => {
                let body = self
                    .document_for(request.caller.as_ref())
                    .to_pretty_json()
                    .map_err(|e| AppError::Internal(e.to_string()))?;
                ([(header::CONTENT_TYPE, "application/json")], body).into_response()
            }
            SchemaFormat::Yaml => {
                let body = self
                    .document_for(request.caller.as_ref())
                    .to_yaml()
                    .map_err(|e| AppError::Internal(e.to_string()))?;
                ([(header::CONTENT_TYPE, "application/yaml")], body).into_response()
            }
            SchemaFormat::SwaggerUi => swagger_file(SWAGGER_INDEX, swagger_config(&request.path))?,
            SchemaFormat::Redoc => redoc_page(&self.document_for(request.caller.as_ref())),
        };
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_wins_over_query() {
        assert_eq!(negotiate(DocVariant::Raw, Some(".yaml"), Some("json")).unwrap(), SchemaFormat::Yaml);
        assert_eq!(negotiate(DocVariant::Raw, Some(".json"), None).unwrap(), SchemaFormat::Json);
        assert!(matches!(negotiate(DocVariant::Raw, Some(".xml"), None), Err(AppError::NotFound(_))));
    }

    #[test]
    fn viewers_default_to_their_page() {
        assert_eq!(negotiate(DocVariant::Swagger, None, None).unwrap(), SchemaFormat::SwaggerUi);
        assert_eq!(negotiate(DocVariant::Redoc, None, None).unwrap(), SchemaFormat::Redoc);
        assert_eq!(negotiate(DocVariant::Raw, None, None).unwrap(), SchemaFormat::Json);
    }

    #[test]
    fn openapi_selects_json_on_any_variant() {
        for variant in [DocVariant::Raw, DocVariant::Swagger, DocVariant::Redoc] {
            assert_eq!(negotiate(variant, None, Some("openapi")).unwrap(), SchemaFormat::Json);
        }
    }

    #[test]
    fn viewer_formats_are_variant_specific() {
        assert!(negotiate(DocVariant::Redoc, None, Some("swagger")).is_err());
        assert!(negotiate(DocVariant::Swagger, None, Some("redoc")).is_err());
        assert!(negotiate(DocVariant::Swagger, None, Some("csv")).is_err());
    }
}
