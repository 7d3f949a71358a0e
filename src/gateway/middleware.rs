//! Interceptors applied in front of the schema renderer, outermost first:
//! `require_login`, then `map_format_alias`.

use crate::auth::Caller;
use crate::config::{AuthSettings, Settings};
use crate::error::AppError;
use crate::gateway::query::alias_format_param;
use axum::{
    body::Body,
    extract::State,
    http::{header, uri::PathAndQuery, Request, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use url::form_urlencoded;

/// Login redirect carrying the original path and query as `next`.
pub fn login_location(login_url: &str, uri: &Uri) -> String {
    let next = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    let encoded: String = form_urlencoded::Serializer::new(String::new())
        .append_pair("next", next)
        .finish();
    let separator = if login_url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", login_url, separator, encoded)
}

/// Anonymous caller: redirect to the login page when one is configured, 401 otherwise.
pub fn unauthenticated(auth: &AuthSettings, uri: &Uri) -> Response {
    match &auth.login_url {
        Some(login_url) => (
            StatusCode::FOUND,
            [(header::LOCATION, login_location(login_url, uri))],
        )
            .into_response(),
        None => AppError::Unauthorized.into_response(),
    }
}

pub async fn require_login(
    State(settings): State<Arc<Settings>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.extensions().get::<Caller>().is_some() {
        return next.run(request).await;
    }
    tracing::warn!(path = %request.uri().path(), "anonymous request for API documentation rejected");
    unauthenticated(&settings.auth, request.uri())
}

fn with_query(uri: &Uri, query: &str) -> Result<Uri, AppError> {
    let path_and_query = PathAndQuery::try_from(format!("{}?{}", uri.path(), query))
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(path_and_query);
    Uri::from_parts(parts).map_err(|e| AppError::BadRequest(e.to_string()))
}

pub async fn map_format_alias(
    State(settings): State<Arc<Settings>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let rewritten = request
        .uri()
        .query()
        .and_then(|q| alias_format_param(q, &settings.url_format_override));
    if let Some(query) = rewritten {
        tracing::debug!(
            path = %request.uri().path(),
            alias = %settings.url_format_override,
            "mapped format parameter"
        );
        let uri = with_query(request.uri(), &query)?;
        *request.uri_mut() = uri;
    }
    Ok(next.run(request).await)
}
