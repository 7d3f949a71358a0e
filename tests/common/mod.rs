//! Shared fixtures for the router integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use labelgate::config::TokenConfig;
use labelgate::{
    Action, AppError, FrontDoor, RenderRequest, ResourceHandlerSet, ResourceRequest, RouteTable, SchemaRenderer,
    Settings,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const ALICE_TOKEN: &str = "alice-key";
pub const BOB_TOKEN: &str = "bob-key";

/// Default settings plus two API keys: `alice` (staff) and `bob`.
pub fn settings() -> Settings {
    let mut settings = Settings::default();
    settings.ui_url = "http://ui.test".to_string();
    settings.auth.tokens = vec![
        TokenConfig {
            username: "alice".into(),
            token: ALICE_TOKEN.into(),
            is_staff: true,
        },
        TokenConfig {
            username: "bob".into(),
            token: BOB_TOKEN.into(),
            is_staff: false,
        },
    ];
    settings
}

/// Handler-set that answers with its own name, so tests can tell which collaborator was hit.
pub struct Stub {
    pub name: &'static str,
    pub actions: &'static [Action],
    pub staff_only: bool,
}

impl Stub {
    pub fn new(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            actions: Action::ALL,
            staff_only: false,
        })
    }

    pub fn list_only(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            actions: &[Action::List],
            staff_only: false,
        })
    }

    pub fn staff_only(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            actions: Action::ALL,
            staff_only: true,
        })
    }
}

#[async_trait]
impl ResourceHandlerSet for Stub {
    fn actions(&self) -> &'static [Action] {
        self.actions
    }

    fn visible_to(&self, caller: Option<&labelgate::Caller>) -> bool {
        !self.staff_only || caller.map(|c| c.is_staff).unwrap_or(false)
    }

    async fn list(&self, req: ResourceRequest) -> Result<Vec<Value>, AppError> {
        Ok(vec![json!({
            "handler": self.name,
            "organization": req.organization,
        })])
    }

    async fn create(&self, req: ResourceRequest) -> Result<Value, AppError> {
        let mut object = req.body_object()?.clone();
        object.insert("handler".into(), json!(self.name));
        Ok(Value::Object(object))
    }

    async fn retrieve(&self, id: String, _req: ResourceRequest) -> Result<Value, AppError> {
        Ok(json!({ "handler": self.name, "id": id }))
    }
}

/// Renderer that records what reached it and answers 200.
#[derive(Default)]
pub struct CapturingRenderer {
    pub seen: Mutex<Vec<RenderRequest>>,
}

impl CapturingRenderer {
    pub fn last(&self) -> Option<RenderRequest> {
        self.seen.lock().ok().and_then(|seen| seen.last().cloned())
    }
}

#[async_trait]
impl SchemaRenderer for CapturingRenderer {
    async fn render(&self, request: RenderRequest) -> Result<Response, AppError> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(request);
        }
        Ok(StatusCode::OK.into_response())
    }
}

pub fn app(settings: Settings, table: RouteTable) -> Router {
    FrontDoor::new(Arc::new(settings)).into_router(table).unwrap()
}

pub fn app_with_renderer(settings: Settings, table: RouteTable, renderer: Arc<CapturingRenderer>) -> Router {
    FrontDoor::new(Arc::new(settings))
        .with_renderer(renderer)
        .into_router(table)
        .unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> Response {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Token {}", token));
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}
