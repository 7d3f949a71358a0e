//! Route composition: resource handler-sets, externally owned sub-tables and the entry points.

pub mod resource;
pub mod root;
pub mod table;

pub use resource::{Action, ResourceHandlerSet, ResourceRequest};
pub use root::root_redirect_entry;
pub use table::{
    join_path, route_shape, Operation, RouteEntry, RouteMeta, RouteProvider, RouteTable,
    RouteTableBuilder, Visibility,
};
