//! Local server: the labelgate front door over in-memory collaborators.
//!
//! Run from repo root: `cargo run -p labelgate-dev-server`

mod collaborators;
mod memory;

use collaborators::{Iam, Organizations};
use labelgate::{load_settings, FrontDoor, RouteTableBuilder};
use memory::{FixedListing, MemoryCollection};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;

const COLLECTIONS: [&str; 7] = ["projects", "tasks", "jobs", "users", "issues", "comments", "cloudstorages"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    labelgate::telemetry::init("labelgate=info,labelgate_dev_server=info,tower_http=info");
    let settings = Arc::new(load_settings()?);

    let about = json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "description": settings.schema.title,
    });

    let mut builder = RouteTableBuilder::new(settings.api_prefix.clone())
        .include_provider(&Iam)
        .include_provider(&Organizations);
    for name in COLLECTIONS {
        builder = builder.register(name, Arc::new(MemoryCollection::new(name)));
    }
    let table = builder
        .register("server", Arc::new(FixedListing::new(vec![about])))
        .register(
            "restrictions",
            Arc::new(FixedListing::new(vec![json!({ "terms_of_use": settings.ui_url })])),
        )
        .register_with_basename(
            "predict",
            Arc::new(FixedListing::new(Vec::new()).staff_only()),
            "predict",
        )
        .build()?;

    let app = FrontDoor::new(settings.clone()).into_router(table)?;
    let listener = TcpListener::bind(&settings.bind_address).await?;
    tracing::info!("labelgate dev server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
