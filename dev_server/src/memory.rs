//! In-memory stand-ins for resource collaborators.

use async_trait::async_trait;
use labelgate::{Action, AppError, ResourceHandlerSet, ResourceRequest};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// JSON objects keyed by a sequential integer id.
pub struct MemoryCollection {
    name: &'static str,
    rows: RwLock<BTreeMap<u64, Value>>,
}

impl MemoryCollection {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            rows: RwLock::new(BTreeMap::new()),
        }
    }

    fn parse_id(&self, id: &str) -> Result<u64, AppError> {
        id.parse()
            .map_err(|_| AppError::BadRequest(format!("{}: invalid id '{}'", self.name, id)))
    }

    fn missing(&self, id: u64) -> AppError {
        AppError::NotFound(format!("{} {}", self.name, id))
    }

    fn poisoned(&self) -> AppError {
        AppError::Internal(format!("{}: store lock poisoned", self.name))
    }
}

#[async_trait]
impl ResourceHandlerSet for MemoryCollection {
    async fn list(&self, req: ResourceRequest) -> Result<Vec<Value>, AppError> {
        let rows = self.rows.read().map_err(|_| self.poisoned())?;
        Ok(rows
            .values()
            .filter(|row| match &req.organization {
                Some(org) => row.get("organization").and_then(Value::as_str) == Some(org.as_str()),
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn create(&self, req: ResourceRequest) -> Result<Value, AppError> {
        let mut object = req.body_object()?.clone();
        let mut rows = self.rows.write().map_err(|_| self.poisoned())?;
        let id = rows.keys().next_back().map(|last| last + 1).unwrap_or(1);
        object.insert("id".into(), Value::from(id));
        if let Some(org) = req.organization {
            object.entry("organization").or_insert(Value::String(org));
        }
        if let Some(caller) = req.caller {
            object.entry("owner").or_insert(Value::String(caller.username));
        }
        let row = Value::Object(object);
        rows.insert(id, row.clone());
        Ok(row)
    }

    async fn retrieve(&self, id: String, _req: ResourceRequest) -> Result<Value, AppError> {
        let id = self.parse_id(&id)?;
        let rows = self.rows.read().map_err(|_| self.poisoned())?;
        rows.get(&id).cloned().ok_or_else(|| self.missing(id))
    }

    async fn update(&self, id: String, req: ResourceRequest) -> Result<Value, AppError> {
        let id = self.parse_id(&id)?;
        let mut object = req.body_object()?.clone();
        object.insert("id".into(), Value::from(id));
        let mut rows = self.rows.write().map_err(|_| self.poisoned())?;
        let row = rows.get_mut(&id).ok_or_else(|| self.missing(id))?;
        *row = Value::Object(object);
        Ok(row.clone())
    }

    async fn partial_update(&self, id: String, req: ResourceRequest) -> Result<Value, AppError> {
        let id = self.parse_id(&id)?;
        let patch = req.body_object()?.clone();
        let mut rows = self.rows.write().map_err(|_| self.poisoned())?;
        let row = rows.get_mut(&id).ok_or_else(|| self.missing(id))?;
        if let Value::Object(existing) = row {
            for (k, v) in patch.into_iter().filter(|(k, _)| k != "id") {
                existing.insert(k, v);
            }
        }
        Ok(row.clone())
    }

    async fn destroy(&self, id: String, _req: ResourceRequest) -> Result<(), AppError> {
        let id = self.parse_id(&id)?;
        let mut rows = self.rows.write().map_err(|_| self.poisoned())?;
        rows.remove(&id).map(|_| ()).ok_or_else(|| self.missing(id))
    }
}

/// List-only collaborator returning a fixed payload.
pub struct FixedListing {
    items: Vec<Value>,
    staff_only: bool,
}

impl FixedListing {
    pub fn new(items: Vec<Value>) -> Self {
        Self {
            items,
            staff_only: false,
        }
    }

    pub fn staff_only(mut self) -> Self {
        self.staff_only = true;
        self
    }
}

#[async_trait]
impl ResourceHandlerSet for FixedListing {
    fn actions(&self) -> &'static [Action] {
        &[Action::List]
    }

    fn visible_to(&self, caller: Option<&labelgate::Caller>) -> bool {
        !self.staff_only || caller.map(|c| c.is_staff).unwrap_or(false)
    }

    async fn list(&self, _req: ResourceRequest) -> Result<Vec<Value>, AppError> {
        Ok(self.items.clone())
    }
}
