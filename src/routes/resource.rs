//! Resource handler-sets: the collaborator contract and the collection/detail routes generated for each.

use crate::auth::Caller;
use crate::error::AppError;
use crate::extractors::Organization;
use crate::response::ResourceReply;
use crate::routes::table::{join_path, ResourceRegistration, RouteEntry, Visibility};
use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request, State},
    http::Method,
    routing::MethodRouter,
};
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    List,
    Create,
    Retrieve,
    Update,
    PartialUpdate,
    Destroy,
}

impl Action {
    pub const ALL: &'static [Action] = &[
        Action::List,
        Action::Create,
        Action::Retrieve,
        Action::Update,
        Action::PartialUpdate,
        Action::Destroy,
    ];

    pub const READ_ONLY: &'static [Action] = &[Action::List, Action::Retrieve];

    pub fn method(self) -> Method {
        match self {
            Action::List | Action::Retrieve => Method::GET,
            Action::Create => Method::POST,
            Action::Update => Method::PUT,
            Action::PartialUpdate => Method::PATCH,
            Action::Destroy => Method::DELETE,
        }
    }

    /// Suffix of the operation id: `projects_list`, `projects_read`, ...
    pub fn operation_suffix(self) -> &'static str {
        match self {
            Action::List => "list",
            Action::Create => "create",
            Action::Retrieve => "read",
            Action::Update => "update",
            Action::PartialUpdate => "partial_update",
            Action::Destroy => "delete",
        }
    }

    fn is_detail(self) -> bool {
        !matches!(self, Action::List | Action::Create)
    }
}

/// What every action receives: who is calling, in which organization, with which query and body.
#[derive(Clone, Debug, Default)]
pub struct ResourceRequest {
    pub caller: Option<Caller>,
    pub organization: Option<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ResourceRequest {
    /// Last value of a query parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn body_object(&self) -> Result<&serde_json::Map<String, Value>, AppError> {
        match &self.body {
            Some(Value::Object(m)) => Ok(m),
            Some(_) => Err(AppError::BadRequest("body must be a JSON object".into())),
            None => Err(AppError::BadRequest("request body is required".into())),
        }
    }
}

#[async_trait]
impl<S> FromRequest<S> for ResourceRequest
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();
        let caller = parts.extensions.get::<Caller>().cloned();
        let Organization(organization) = Organization::from_request_parts(&mut parts, state)
            .await
            .unwrap_or(Organization(None));
        let query = parts
            .uri
            .query()
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();
        let bytes = Bytes::from_request(Request::from_parts(parts, body), state)
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            None
        } else {
            Some(
                serde_json::from_slice(&bytes)
                    .map_err(|e| AppError::BadRequest(format!("invalid JSON body: {}", e)))?,
            )
        };
        Ok(ResourceRequest {
            caller,
            organization,
            query,
            body,
        })
    }
}

fn not_allowed(action: Action) -> AppError {
    AppError::MethodNotAllowed(action.operation_suffix().to_string())
}

/// Collaborator that owns one resource prefix. Only actions listed in `actions` are routed.
#[async_trait]
pub trait ResourceHandlerSet: Send + Sync + 'static {
    fn actions(&self) -> &'static [Action] {
        Action::ALL
    }

    /// Consulted when the schema is not public.
    fn visible_to(&self, _caller: Option<&Caller>) -> bool {
        true
    }

    async fn list(&self, _req: ResourceRequest) -> Result<Vec<Value>, AppError> {
        Err(not_allowed(Action::List))
    }

    async fn create(&self, _req: ResourceRequest) -> Result<Value, AppError> {
        Err(not_allowed(Action::Create))
    }

    async fn retrieve(&self, _id: String, _req: ResourceRequest) -> Result<Value, AppError> {
        Err(not_allowed(Action::Retrieve))
    }

    async fn update(&self, _id: String, _req: ResourceRequest) -> Result<Value, AppError> {
        Err(not_allowed(Action::Update))
    }

    async fn partial_update(&self, _id: String, _req: ResourceRequest) -> Result<Value, AppError> {
        Err(not_allowed(Action::PartialUpdate))
    }

    async fn destroy(&self, _id: String, _req: ResourceRequest) -> Result<(), AppError> {
        Err(not_allowed(Action::Destroy))
    }
}

type Handlers = Arc<dyn ResourceHandlerSet>;

async fn list(State(h): State<Handlers>, req: ResourceRequest) -> Result<ResourceReply, AppError> {
    h.list(req).await.map(ResourceReply::Many)
}

async fn create(State(h): State<Handlers>, req: ResourceRequest) -> Result<ResourceReply, AppError> {
    h.create(req).await.map(ResourceReply::Created)
}

async fn retrieve(
    State(h): State<Handlers>,
    Path(id): Path<String>,
    req: ResourceRequest,
) -> Result<ResourceReply, AppError> {
    h.retrieve(id, req).await.map(ResourceReply::One)
}

async fn update(
    State(h): State<Handlers>,
    Path(id): Path<String>,
    req: ResourceRequest,
) -> Result<ResourceReply, AppError> {
    h.update(id, req).await.map(ResourceReply::One)
}

async fn partial_update(
    State(h): State<Handlers>,
    Path(id): Path<String>,
    req: ResourceRequest,
) -> Result<ResourceReply, AppError> {
    h.partial_update(id, req).await.map(ResourceReply::One)
}

async fn destroy(
    State(h): State<Handlers>,
    Path(id): Path<String>,
    req: ResourceRequest,
) -> Result<ResourceReply, AppError> {
    h.destroy(id, req).await.map(|_| ResourceReply::Deleted)
}

/// Collection route `{base}/{prefix}` and detail route `{base}/{prefix}/:id` for one registration.
pub fn resource_routes(base: &str, reg: &ResourceRegistration) -> Vec<RouteEntry> {
    let actions = reg.handlers.actions();
    let tag = reg.prefix.split('/').next().unwrap_or(&reg.prefix).to_string();
    let visibility_source = reg.handlers.clone();
    let visibility: Visibility =
        Arc::new(move |caller: Option<&Caller>| visibility_source.visible_to(caller));

    let mut collection: MethodRouter<Handlers> = MethodRouter::new();
    let mut detail: MethodRouter<Handlers> = MethodRouter::new();
    for action in actions {
        match action {
            Action::List => collection = collection.get(list),
            Action::Create => collection = collection.post(create),
            Action::Retrieve => detail = detail.get(retrieve),
            Action::Update => detail = detail.put(update),
            Action::PartialUpdate => detail = detail.patch(partial_update),
            Action::Destroy => detail = detail.delete(destroy),
        }
    }

    let collection_path = join_path(base, &reg.prefix);
    let mut entries = Vec::new();
    for (is_detail, router, pattern, suffix) in [
        (false, collection, collection_path.clone(), "list"),
        (true, detail, format!("{}/:id", collection_path), "detail"),
    ] {
        let declared: Vec<Action> = actions.iter().copied().filter(|a| a.is_detail() == is_detail).collect();
        if declared.is_empty() {
            continue;
        }
        let mut entry = RouteEntry::new(pattern, router.with_state(reg.handlers.clone()))
            .named(format!("{}-{}", reg.basename, suffix))
            .tagged(tag.clone())
            .visible_when(visibility.clone());
        for action in declared {
            entry = entry.operation(
                action.method(),
                format!("{}_{}", reg.basename.replace('-', "_"), action.operation_suffix()),
            );
        }
        entries.push(entry);
    }
    entries
}
