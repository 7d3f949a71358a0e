//! Caller identity: the authenticator seam and the middleware that attaches a `Caller` to requests.

use crate::config::AuthSettings;
use async_trait::async_trait;
use axum::{
    body::Body,
    extract::State,
    http::{header, request::Parts, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Authenticated user attached to request extensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caller {
    pub username: String,
    pub is_staff: bool,
}

/// Resolves the caller for a request. `None` means anonymous.
#[async_trait]
pub trait Authenticator: Send + Sync + 'static {
    async fn authenticate(&self, parts: &Parts) -> Option<Caller>;
}

/// Fixed set of API keys from settings, presented as `Authorization: Token <key>`,
/// `Authorization: Bearer <key>` or a cookie.
#[derive(Clone, Debug, Default)]
pub struct StaticTokenAuthenticator {
    by_token: HashMap<String, Caller>,
    cookie_name: String,
}

impl StaticTokenAuthenticator {
    pub fn from_settings(settings: &AuthSettings) -> Self {
        let by_token = settings
            .tokens
            .iter()
            .map(|t| {
                (
                    t.token.clone(),
                    Caller {
                        username: t.username.clone(),
                        is_staff: t.is_staff,
                    },
                )
            })
            .collect();
        Self {
            by_token,
            cookie_name: settings.cookie_name.clone(),
        }
    }

    fn credential<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        if let Some(value) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
            let value = value.trim();
            return value
                .strip_prefix("Token ")
                .or_else(|| value.strip_prefix("Bearer "))
                .map(str::trim)
                .filter(|s| !s.is_empty());
        }
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.cookie_name)
            .map(|(_, value)| value.trim())
            .filter(|s| !s.is_empty())
    }
}

#[async_trait]
impl Authenticator for StaticTokenAuthenticator {
    async fn authenticate(&self, parts: &Parts) -> Option<Caller> {
        let key = self.credential(&parts.headers)?;
        let caller = self.by_token.get(key).cloned();
        if caller.is_none() {
            tracing::debug!(path = %parts.uri.path(), "unknown api key, treating request as anonymous");
        }
        caller
    }
}

/// App-wide middleware: runs the authenticator and stores the `Caller` extension when it succeeds.
pub async fn authenticate(
    State(authenticator): State<Arc<dyn Authenticator>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();
    if let Some(caller) = authenticator.authenticate(&parts).await {
        parts.extensions.insert(caller);
    }
    next.run(Request::from_parts(parts, body)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenConfig;

    fn authenticator() -> StaticTokenAuthenticator {
        StaticTokenAuthenticator::from_settings(&AuthSettings {
            login_url: None,
            cookie_name: "token".into(),
            tokens: vec![TokenConfig {
                username: "alice".into(),
                token: "k1".into(),
                is_staff: true,
            }],
        })
    }

    fn parts(name: header::HeaderName, value: &str) -> Parts {
        let (parts, _) = Request::builder()
            .uri("/api/docs/")
            .header(name, value)
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    #[tokio::test]
    async fn accepts_token_and_bearer_schemes() {
        let auth = authenticator();
        for value in ["Token k1", "Bearer k1"] {
            let caller = auth.authenticate(&parts(header::AUTHORIZATION, value)).await;
            assert_eq!(caller.map(|c| c.username), Some("alice".to_string()), "{value}");
        }
    }

    #[tokio::test]
    async fn accepts_cookie() {
        let auth = authenticator();
        let caller = auth
            .authenticate(&parts(header::COOKIE, "csrftoken=x; token=k1"))
            .await;
        assert!(caller.is_some_and(|c| c.is_staff));
    }

    #[tokio::test]
    async fn unknown_or_malformed_credentials_are_anonymous() {
        let auth = authenticator();
        for value in ["Token nope", "Basic k1", "Token "] {
            assert!(auth.authenticate(&parts(header::AUTHORIZATION, value)).await.is_none(), "{value}");
        }
    }
}
