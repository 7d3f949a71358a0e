//! labelgate: routing and API documentation front door for an annotation server.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod gateway;
pub mod response;
pub mod routes;
pub mod telemetry;

pub use app::FrontDoor;
pub use auth::{Authenticator, Caller, StaticTokenAuthenticator};
pub use config::{load_settings, Settings};
pub use error::{AppError, ConfigError};
pub use gateway::{OpenApiRenderer, RenderRequest, SchemaGateway, SchemaRenderer};
pub use response::ResourceReply;
pub use routes::{
    Action, ResourceHandlerSet, ResourceRequest, RouteEntry, RouteProvider, RouteTable, RouteTableBuilder,
};
