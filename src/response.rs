//! Response envelopes for resource handler-set replies.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
pub struct SuccessOne<T> {
    pub data: T,
}

#[derive(Serialize)]
pub struct SuccessMany<T> {
    pub data: Vec<T>,
    pub meta: MetaCount,
}

#[derive(Serialize)]
pub struct MetaCount {
    pub count: u64,
}

/// What a resource action produced; the envelope and status follow from the variant.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceReply {
    Many(Vec<Value>),
    Created(Value),
    One(Value),
    Deleted,
}

impl IntoResponse for ResourceReply {
    fn into_response(self) -> Response {
        match self {
            ResourceReply::Many(data) => {
                let count = data.len() as u64;
                (
                    StatusCode::OK,
                    Json(SuccessMany {
                        data,
                        meta: MetaCount { count },
                    }),
                )
                    .into_response()
            }
            ResourceReply::Created(data) => (StatusCode::CREATED, Json(SuccessOne { data })).into_response(),
            ResourceReply::One(data) => (StatusCode::OK, Json(SuccessOne { data })).into_response(),
            ResourceReply::Deleted => StatusCode::NO_CONTENT.into_response(),
        }
    }
}
