//! Stand-in sub-tables for identity/access and organizations.

use crate::memory::MemoryCollection;
use axum::{http::Method, routing::get, routing::post, Json};
use labelgate::routes::resource::resource_routes;
use labelgate::routes::table::ResourceRegistration;
use labelgate::{RouteEntry, RouteProvider};
use serde_json::json;
use std::sync::Arc;

pub struct Iam;

impl RouteProvider for Iam {
    fn name(&self) -> &str {
        "iam"
    }

    fn routes(&self) -> Vec<RouteEntry> {
        vec![
            RouteEntry::new("auth/rules", get(|| async { Json(json!({ "rules": [] })) }))
                .named("rules")
                .operation(Method::GET, "auth_rules")
                .tagged("auth"),
            RouteEntry::new("auth/logout", post(|| async { Json(json!({ "detail": "Successfully logged out." })) }))
                .named("rest_logout")
                .operation(Method::POST, "auth_logout")
                .tagged("auth"),
        ]
    }
}

pub struct Organizations;

impl RouteProvider for Organizations {
    fn name(&self) -> &str {
        "organizations"
    }

    /// Relative patterns; the builder mounts them under the API base.
    fn routes(&self) -> Vec<RouteEntry> {
        ["organizations", "memberships", "invitations"]
            .into_iter()
            .flat_map(|prefix| {
                let reg = ResourceRegistration {
                    prefix: prefix.to_string(),
                    handlers: Arc::new(MemoryCollection::new(prefix)),
                    basename: prefix.to_string(),
                };
                resource_routes("", &reg)
            })
            .collect()
    }
}
