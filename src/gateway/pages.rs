//! Viewer pages. Swagger UI is served from the bundled `utoipa-swagger-ui` dist and fetches the
//! document from its own path with `?format=openapi`; Redoc embeds the caller's document.

use crate::error::AppError;
use axum::{
    http::header,
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;
use utoipa::openapi::OpenApi;
use utoipa_redoc::Redoc;
use utoipa_swagger_ui::Config;

/// File the Swagger UI dist answers with for the page itself.
pub const SWAGGER_INDEX: &str = "index.html";

/// Document URL a viewer mounted at `ui_path` loads.
pub fn spec_url(ui_path: &str) -> String {
    format!("{}?format=openapi", ui_path)
}

pub fn swagger_config(ui_path: &str) -> Arc<Config<'static>> {
    Arc::new(Config::new([spec_url(ui_path)]))
}

/// One file of the Swagger UI dist; `swagger-initializer.js` carries `config`.
pub fn swagger_file(file: &str, config: Arc<Config<'static>>) -> Result<Response, AppError> {
    match utoipa_swagger_ui::serve(file, config) {
        Ok(Some(asset)) => Ok((
            [(header::CONTENT_TYPE, asset.content_type)],
            asset.bytes.into_owned(),
        )
            .into_response()),
        Ok(None) => Err(AppError::NotFound(format!("swagger ui asset '{}'", file))),
        Err(e) => Err(AppError::Internal(format!("swagger ui: {}", e))),
    }
}

pub fn redoc_page(document: &OpenApi) -> Response {
    Html(Redoc::new(document.clone()).to_html()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use utoipa::openapi::{InfoBuilder, OpenApiBuilder};

    async fn text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn initializer_points_at_the_viewer_path() {
        let response = swagger_file("swagger-initializer.js", swagger_config("/api/swagger/")).unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(text(response).await.contains("/api/swagger/?format=openapi"));
    }

    #[tokio::test]
    async fn index_is_html() {
        let response = swagger_file(SWAGGER_INDEX, swagger_config("/api/swagger/")).unwrap();
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
        assert!(content_type.starts_with("text/html"));
    }

    #[test]
    fn unknown_asset_is_not_found() {
        let result = swagger_file("nope.txt", swagger_config("/api/swagger/"));
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn redoc_embeds_the_document() {
        let doc = OpenApiBuilder::new()
            .info(InfoBuilder::new().title("Labelling API").version("v1").build())
            .build();
        let html = text(redoc_page(&doc)).await;
        assert!(html.contains("Labelling API"));
        assert!(html.to_lowercase().contains("redoc"));
    }
}
