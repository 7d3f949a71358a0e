//! Extract the organization context from a request (`X-Organization` header or `org` query parameter).

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::request::Parts,
};

/// Header carrying the organization slug.
pub const ORGANIZATION_HEADER: &str = "X-Organization";

/// Query parameter used when the header is absent.
pub const ORGANIZATION_QUERY_PARAM: &str = "org";

/// Optional organization slug. The header wins over the query parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Organization(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for Organization
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let from_header = parts
            .headers
            .get(ORGANIZATION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        if from_header.is_some() {
            return Ok(Organization(from_header));
        }
        let from_query = parts.uri.query().and_then(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .find(|(k, _)| k == ORGANIZATION_QUERY_PARAM)
                .map(|(_, v)| v.trim().to_string())
                .filter(|s| !s.is_empty())
        });
        Ok(Organization(from_query))
    }
}
