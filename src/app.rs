//! Final assembly: the composed table plus documentation and entry-point routes, wrapped in the
//! app-wide middleware stack.

use crate::auth::{authenticate, Authenticator, StaticTokenAuthenticator};
use crate::config::Settings;
use crate::error::ConfigError;
use crate::gateway::{OpenApiRenderer, SchemaGateway, SchemaRenderer};
use crate::routes::{root_redirect_entry, RouteTable};
use axum::{middleware::from_fn_with_state, Router};
use std::sync::Arc;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

pub struct FrontDoor {
    settings: Arc<Settings>,
    authenticator: Arc<dyn Authenticator>,
    renderer: Option<Arc<dyn SchemaRenderer>>,
}

impl FrontDoor {
    /// Uses the API keys from `settings` and the utoipa renderer unless replaced.
    pub fn new(settings: Arc<Settings>) -> Self {
        let authenticator = Arc::new(StaticTokenAuthenticator::from_settings(&settings.auth));
        Self {
            settings,
            authenticator,
            renderer: None,
        }
    }

    pub fn with_authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = authenticator;
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn SchemaRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Add documentation and root routes to `table` and produce the router.
    /// Fails when any of them collides with an entry already in the table.
    pub fn into_router(self, table: RouteTable) -> Result<Router, ConfigError> {
        let renderer: Arc<dyn SchemaRenderer> = match self.renderer {
            Some(renderer) => renderer,
            None => Arc::new(OpenApiRenderer::new(self.settings.clone(), table.metas())),
        };
        let gateway = SchemaGateway::new(self.settings.clone(), renderer);
        let docs = gateway.routes(table.base());
        let table = table
            .extend("documentation", docs)?
            .extend("entry point", vec![root_redirect_entry(&self.settings.ui_url)])?;
        tracing::info!(entries = table.len(), "router ready");

        Ok(table
            .into_router()
            .layer(from_fn_with_state(self.authenticator, authenticate))
            .layer(RequestBodyLimitLayer::new(self.settings.max_body_bytes))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid)))
    }
}
