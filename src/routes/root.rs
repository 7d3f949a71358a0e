//! Entry points: `/` redirects to the UI, `{base}/` lists the registered resources.

use crate::routes::table::{join_path, RouteEntry};
use axum::{
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json,
};
use std::sync::Arc;

/// Redirect target for `/`: the UI URL plus the request's query string, if any.
pub fn ui_location(ui_url: &str, query: Option<&str>) -> String {
    match query.filter(|q| !q.is_empty()) {
        Some(q) => format!("{}?{}", ui_url, q),
        None => ui_url.to_string(),
    }
}

async fn redirect_to_ui(State(ui_url): State<Arc<str>>, uri: Uri) -> Response {
    let location = ui_location(&ui_url, uri.query());
    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response()
}

pub fn root_redirect_entry(ui_url: &str) -> RouteEntry {
    let ui_url: Arc<str> = Arc::from(ui_url);
    RouteEntry::new("/", get(redirect_to_ui).with_state(ui_url)).hidden()
}

/// `scheme://host` from forwarding headers, or `None` when the request carries no host.
fn origin(headers: &HeaderMap) -> Option<String> {
    let host = headers.get(header::HOST).and_then(|v| v.to_str().ok())?;
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    Some(format!("{}://{}", scheme, host))
}

async fn api_root(
    State(index): State<Arc<Vec<(String, String)>>>,
    headers: HeaderMap,
) -> Json<serde_json::Map<String, serde_json::Value>> {
    let origin = origin(&headers).unwrap_or_default();
    let listing = index
        .iter()
        .map(|(basename, path)| (basename.clone(), serde_json::Value::String(format!("{}{}", origin, path))))
        .collect();
    Json(listing)
}

/// `{base}/` listing every resource basename with the URL of its collection.
pub fn api_root_entry(base: &str, index: Vec<(String, String)>) -> RouteEntry {
    RouteEntry::new(join_path(base, ""), get(api_root).with_state(Arc::new(index)))
        .named("api-root")
        .operation(Method::GET, "api_root")
        .tagged("api")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_keeps_query_string() {
        assert_eq!(ui_location("http://ui.local", Some("x=1&y=2")), "http://ui.local?x=1&y=2");
        assert_eq!(ui_location("http://ui.local", Some("")), "http://ui.local");
        assert_eq!(ui_location("http://ui.local", None), "http://ui.local");
    }

    #[test]
    fn origin_prefers_forwarded_scheme() {
        let mut headers = HeaderMap::new();
        assert_eq!(origin(&headers), None);
        headers.insert(header::HOST, "example.com".parse().unwrap());
        assert_eq!(origin(&headers).as_deref(), Some("http://example.com"));
        headers.insert("x-forwarded-proto", "https".parse().unwrap());
        assert_eq!(origin(&headers).as_deref(), Some("https://example.com"));
    }
}
