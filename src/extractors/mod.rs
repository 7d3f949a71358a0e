pub mod organization;

pub use organization::{Organization, ORGANIZATION_HEADER, ORGANIZATION_QUERY_PARAM};
