//! Route table: entries contributed by resources and sub-tables, composed once at startup.
//! Collisions are detected on the route shape (parameter names erased) and fail the build.

use crate::auth::Caller;
use crate::error::ConfigError;
use crate::routes::resource::{resource_routes, ResourceHandlerSet};
use crate::routes::root::api_root_entry;
use axum::{http::Method, routing::MethodRouter, Router};
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

const PREFIX_PATTERN: &str = r"^[A-Za-z0-9_-]+(/[A-Za-z0-9_-]+)*$";

/// Decides whether an entry appears in a non-public schema for the given caller.
pub type Visibility = Arc<dyn Fn(Option<&Caller>) -> bool + Send + Sync>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Operation {
    pub method: Method,
    pub id: String,
}

/// Everything about an entry except its handler; this is what the schema document is built from.
#[derive(Clone)]
pub struct RouteMeta {
    pub pattern: String,
    pub name: Option<String>,
    pub operations: Vec<Operation>,
    pub tag: Option<String>,
    pub in_schema: bool,
    visibility: Option<Visibility>,
}

impl RouteMeta {
    pub fn is_visible_to(&self, caller: Option<&Caller>) -> bool {
        self.visibility.as_ref().map(|f| f(caller)).unwrap_or(true)
    }
}

impl fmt::Debug for RouteMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteMeta")
            .field("pattern", &self.pattern)
            .field("name", &self.name)
            .field("operations", &self.operations)
            .field("tag", &self.tag)
            .field("in_schema", &self.in_schema)
            .finish()
    }
}

#[derive(Clone)]
pub struct RouteEntry {
    meta: RouteMeta,
    handler: MethodRouter,
}

impl RouteEntry {
    pub fn new(pattern: impl Into<String>, handler: MethodRouter) -> Self {
        Self {
            meta: RouteMeta {
                pattern: pattern.into(),
                name: None,
                operations: Vec::new(),
                tag: None,
                in_schema: true,
                visibility: None,
            },
            handler,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.meta.name = Some(name.into());
        self
    }

    /// Declare an operation for the schema document. The handler must serve `method`.
    pub fn operation(mut self, method: Method, id: impl Into<String>) -> Self {
        self.meta.operations.push(Operation { method, id: id.into() });
        self
    }

    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.meta.tag = Some(tag.into());
        self
    }

    /// Keep the entry out of the schema document.
    pub fn hidden(mut self) -> Self {
        self.meta.in_schema = false;
        self
    }

    pub fn visible_when(mut self, visibility: Visibility) -> Self {
        self.meta.visibility = Some(visibility);
        self
    }

    pub fn pattern(&self) -> &str {
        &self.meta.pattern
    }

    pub fn name(&self) -> Option<&str> {
        self.meta.name.as_deref()
    }

    pub fn meta(&self) -> &RouteMeta {
        &self.meta
    }

    fn mounted_at(mut self, base: &str) -> Self {
        self.meta.pattern = join_path(base, &self.meta.pattern);
        self
    }
}

/// A route table owned by an external collaborator, mounted verbatim under the base path.
pub trait RouteProvider {
    fn name(&self) -> &str;
    fn routes(&self) -> Vec<RouteEntry>;
}

pub struct SubTable {
    pub owner: String,
    pub entries: Vec<RouteEntry>,
}

pub struct ResourceRegistration {
    pub prefix: String,
    pub handlers: Arc<dyn ResourceHandlerSet>,
    pub basename: String,
}

/// Join a base path and a relative pattern with exactly one slash between them.
/// An empty relative pattern yields the base with a trailing slash.
pub fn join_path(base: &str, relative: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), relative.trim_start_matches('/'))
}

/// Pattern with parameter names erased: `/api/tasks/:id` and `/api/tasks/:pk` share a shape.
pub fn route_shape(pattern: &str) -> String {
    pattern
        .split('/')
        .map(|seg| match seg.chars().next() {
            Some(':') => ":",
            Some('*') => "*",
            _ => seg,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn is_dynamic(segment: &str) -> bool {
    segment.starts_with(':') || segment.starts_with('*')
}

/// Immutable, collision-free set of entries.
#[derive(Clone, Default)]
pub struct RouteTable {
    base: String,
    entries: Vec<RouteEntry>,
    owners: Vec<String>,
    by_shape: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
    /// Dynamic segment (`:name` or `*name`) claimed below a parent shape; the router accepts one per position.
    params: HashMap<String, (String, usize)>,
    /// Parent shapes ending in a catch-all; nothing else may sit below them.
    catch_alls: HashMap<String, usize>,
    /// Parent shapes with at least one entry continuing below them.
    branches: HashMap<String, usize>,
}

impl RouteTable {
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &RouteEntry> {
        self.entries.iter()
    }

    pub fn metas(&self) -> Vec<RouteMeta> {
        self.entries.iter().map(|e| e.meta.clone()).collect()
    }

    /// True when some entry has the same shape as `pattern`.
    pub fn contains(&self, pattern: &str) -> bool {
        self.by_shape.contains_key(&route_shape(pattern))
    }

    /// Pattern registered under `name`.
    pub fn reverse(&self, name: &str) -> Option<&str> {
        self.by_name.get(name).map(|&i| self.entries[i].pattern())
    }

    /// Owner that contributed the entry matching `pattern`'s shape.
    pub fn owner_of(&self, pattern: &str) -> Option<&str> {
        self.by_shape
            .get(&route_shape(pattern))
            .map(|&i| self.owners[i].as_str())
    }

    /// New table with `entries` added; patterns must already be absolute.
    pub fn extend(mut self, owner: &str, entries: Vec<RouteEntry>) -> Result<Self, ConfigError> {
        for entry in entries {
            self.push(owner, entry)?;
        }
        Ok(self)
    }

    fn push(&mut self, owner: &str, entry: RouteEntry) -> Result<(), ConfigError> {
        let index = self.entries.len();
        let shape = route_shape(entry.pattern());
        let conflict = |existing: usize| ConfigError::RouteConflict {
            pattern: entry.pattern().to_string(),
            first: self.owners[existing].clone(),
            second: owner.to_string(),
        };
        if let Some(&existing) = self.by_shape.get(&shape) {
            return Err(conflict(existing));
        }
        if let Some(name) = entry.name() {
            if self.by_name.contains_key(name) {
                return Err(ConfigError::DuplicateRouteName(name.to_string()));
            }
        }

        let segments: Vec<&str> = entry.pattern().split('/').collect();
        let mut claimed = Vec::new();
        for (i, seg) in segments.iter().enumerate().skip(1) {
            let parent = route_shape(&segments[..i].join("/"));
            if let Some(&existing) = self.catch_alls.get(&parent) {
                return Err(conflict(existing));
            }
            if !is_dynamic(seg) {
                continue;
            }
            if seg.starts_with('*') {
                if let Some(&existing) = self.branches.get(&parent) {
                    return Err(conflict(existing));
                }
            }
            let slot = format!("{}/:", parent);
            match self.params.get(&slot) {
                Some((existing_name, existing)) if existing_name.as_str() != *seg => {
                    return Err(conflict(*existing));
                }
                Some(_) => {}
                None => claimed.push((slot, seg.to_string())),
            }
        }

        for (slot, name) in claimed {
            self.params.insert(slot, (name, index));
        }
        for i in 1..segments.len() {
            let parent = route_shape(&segments[..i].join("/"));
            if segments[i].starts_with('*') {
                self.catch_alls.insert(parent.clone(), index);
            }
            self.branches.entry(parent).or_insert(index);
        }
        self.by_shape.insert(shape, index);
        if let Some(name) = entry.name() {
            self.by_name.insert(name.to_string(), index);
        }
        self.owners.push(owner.to_string());
        self.entries.push(entry);
        Ok(())
    }

    /// Hand the entries to the HTTP framework. `push` has rejected every overlap the router refuses.
    pub fn into_router(self) -> Router {
        self.entries
            .into_iter()
            .fold(Router::new(), |router, entry| router.route(&entry.meta.pattern, entry.handler))
    }
}

pub struct RouteTableBuilder {
    base: String,
    includes: Vec<SubTable>,
    registrations: Vec<ResourceRegistration>,
}

impl RouteTableBuilder {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            includes: Vec::new(),
            registrations: Vec::new(),
        }
    }

    /// Mount an externally owned table; its relative patterns land under the base path.
    pub fn include(mut self, owner: impl Into<String>, entries: Vec<RouteEntry>) -> Self {
        self.includes.push(SubTable {
            owner: owner.into(),
            entries,
        });
        self
    }

    pub fn include_provider(self, provider: &dyn RouteProvider) -> Self {
        let owner = provider.name().to_string();
        self.include(owner, provider.routes())
    }

    pub fn register(self, prefix: impl Into<String>, handlers: Arc<dyn ResourceHandlerSet>) -> Self {
        let prefix = prefix.into();
        let basename = prefix.replace('/', "-");
        self.register_with_basename(prefix, handlers, basename)
    }

    pub fn register_with_basename(
        mut self,
        prefix: impl Into<String>,
        handlers: Arc<dyn ResourceHandlerSet>,
        basename: impl Into<String>,
    ) -> Self {
        self.registrations.push(ResourceRegistration {
            prefix: prefix.into(),
            handlers,
            basename: basename.into(),
        });
        self
    }

    pub fn build(self) -> Result<RouteTable, ConfigError> {
        let base = self.base.trim_end_matches('/').to_string();
        if !base.is_empty() && (!base.starts_with('/') || route_shape(&base) != base) {
            return Err(ConfigError::InvalidPrefix(self.base));
        }

        let prefix_re = Regex::new(PREFIX_PATTERN)
            .map_err(|_| ConfigError::Validation("invalid prefix pattern".into()))?;
        let mut seen: HashMap<&str, &str> = HashMap::new();
        for reg in &self.registrations {
            if !prefix_re.is_match(&reg.prefix) {
                return Err(ConfigError::InvalidPrefix(reg.prefix.clone()));
            }
            if let Some(first) = seen.insert(reg.prefix.as_str(), reg.basename.as_str()) {
                return Err(ConfigError::RouteConflict {
                    pattern: join_path(&base, &reg.prefix),
                    first: format!("resource '{}'", first),
                    second: format!("resource '{}'", reg.basename),
                });
            }
        }

        let mut table = RouteTable {
            base: base.clone(),
            ..RouteTable::default()
        };

        for sub in self.includes {
            let count = sub.entries.len();
            let entries = sub.entries.into_iter().map(|e| e.mounted_at(&base)).collect();
            table = table.extend(&sub.owner, entries)?;
            tracing::debug!(owner = %sub.owner, entries = count, "sub-table included");
        }

        let index: Vec<(String, String)> = self
            .registrations
            .iter()
            .map(|reg| (reg.basename.clone(), join_path(&base, &reg.prefix)))
            .collect();
        table = table.extend("api root", vec![api_root_entry(&base, index)])?;

        for reg in &self.registrations {
            let owner = format!("resource '{}'", reg.basename);
            table = table.extend(&owner, resource_routes(&base, reg))?;
        }

        tracing::info!(
            base = %base,
            resources = self.registrations.len(),
            entries = table.len(),
            "route table composed"
        );
        Ok(table)
    }
}
