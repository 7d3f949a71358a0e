//! OpenAPI document assembled from the composed route table.

use crate::auth::Caller;
use crate::config::SchemaSettings;
use crate::routes::RouteMeta;
use axum::http::Method;
use std::collections::BTreeMap;
use utoipa::openapi::{
    path::{Operation, OperationBuilder, ParameterBuilder, ParameterIn, PathItem},
    schema::{ObjectBuilder, Schema, Type},
    ContactBuilder, InfoBuilder, LicenseBuilder, OpenApi, OpenApiBuilder, PathsBuilder, RefOr,
    Required, ResponseBuilder, ServerBuilder,
};

/// `/api/tasks/:id` becomes `/api/tasks/{id}`; returns the path and its parameter names.
pub fn openapi_path(pattern: &str) -> (String, Vec<String>) {
    let mut params = Vec::new();
    let path = pattern
        .split('/')
        .map(|seg| match seg.strip_prefix(':').or_else(|| seg.strip_prefix('*')) {
            Some(name) => {
                params.push(name.to_string());
                format!("{{{}}}", name)
            }
            None => seg.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/");
    (path, params)
}

fn success_status(method: &Method) -> &'static str {
    match *method {
        Method::POST => "201",
        Method::DELETE => "204",
        _ => "200",
    }
}

fn build_operation(id: &str, method: &Method, tag: Option<&String>, params: &[String]) -> Operation {
    let mut builder = OperationBuilder::new()
        .operation_id(Some(id))
        .response(
            success_status(method),
            ResponseBuilder::new().description("Successful response").build(),
        );
    if let Some(tag) = tag {
        builder = builder.tags(Some(vec![tag.clone()]));
    }
    for name in params {
        let schema: RefOr<Schema> = RefOr::T(Schema::Object(ObjectBuilder::new().schema_type(Type::String).build()));
        builder = builder.parameter(
            ParameterBuilder::new()
                .name(name)
                .parameter_in(ParameterIn::Path)
                .required(Required::True)
                .schema(Some(schema))
                .build(),
        );
    }
    builder.build()
}

fn attach(item: &mut PathItem, method: &Method, operation: Operation) {
    match *method {
        Method::GET => item.get = Some(operation),
        Method::POST => item.post = Some(operation),
        Method::PUT => item.put = Some(operation),
        Method::PATCH => item.patch = Some(operation),
        Method::DELETE => item.delete = Some(operation),
        Method::HEAD => item.head = Some(operation),
        Method::OPTIONS => item.options = Some(operation),
        Method::TRACE => item.trace = Some(operation),
        _ => {}
    }
}

/// Build the document. With `caller_filter` set, entries the caller may not see are left out.
pub fn build_document(
    schema: &SchemaSettings,
    routes: &[RouteMeta],
    caller_filter: Option<Option<&Caller>>,
) -> OpenApi {
    let info = InfoBuilder::new()
        .title(schema.title.clone())
        .version(schema.version.clone())
        .description(Some(schema.description.clone()))
        .terms_of_service(schema.terms_of_service.clone())
        .contact(
            schema
                .contact_email
                .as_ref()
                .map(|email| ContactBuilder::new().email(Some(email.clone())).build()),
        )
        .license(
            schema
                .license
                .as_ref()
                .map(|name| LicenseBuilder::new().name(name.clone()).build()),
        )
        .build();

    let mut items: BTreeMap<String, PathItem> = BTreeMap::new();
    for route in routes.iter().filter(|r| r.in_schema) {
        if let Some(caller) = caller_filter {
            if !route.is_visible_to(caller) {
                continue;
            }
        }
        let (path, params) = openapi_path(&route.pattern);
        let item = items.entry(path).or_default();
        for op in &route.operations {
            attach(item, &op.method, build_operation(&op.id, &op.method, route.tag.as_ref(), &params));
        }
    }

    let paths = items
        .into_iter()
        .fold(PathsBuilder::new(), |paths, (path, item)| paths.path(path, item))
        .build();

    let mut builder = OpenApiBuilder::new().info(info).paths(paths);
    if let Some(url) = &schema.server_url {
        builder = builder.servers(Some(vec![ServerBuilder::new().url(url.clone()).build()]));
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::RouteEntry;
    use axum::routing::get;

    fn meta(pattern: &str, ops: &[(Method, &str)]) -> RouteMeta {
        let mut entry = RouteEntry::new(pattern, get(|| async { "" }));
        for (method, id) in ops {
            entry = entry.operation(method.clone(), *id);
        }
        entry.meta().clone()
    }

    #[test]
    fn converts_parameters() {
        assert_eq!(
            openapi_path("/api/tasks/:id/data"),
            ("/api/tasks/{id}/data".to_string(), vec!["id".to_string()])
        );
        assert_eq!(openapi_path("/api/tasks"), ("/api/tasks".to_string(), vec![]));
    }

    #[test]
    fn document_lists_operations() {
        let routes = vec![
            meta("/api/tasks", &[(Method::GET, "tasks_list"), (Method::POST, "tasks_create")]),
            meta("/api/tasks/:id", &[(Method::DELETE, "tasks_delete")]),
        ];
        let doc = build_document(&SchemaSettings::default(), &routes, None);
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["info"]["title"], "Annotation REST API");
        assert_eq!(json["paths"]["/api/tasks"]["get"]["operationId"], "tasks_list");
        assert_eq!(json["paths"]["/api/tasks"]["post"]["operationId"], "tasks_create");
        let delete = &json["paths"]["/api/tasks/{id}"]["delete"];
        assert_eq!(delete["operationId"], "tasks_delete");
        assert_eq!(delete["parameters"][0]["name"], "id");
        assert_eq!(delete["parameters"][0]["in"], "path");
        assert!(delete["responses"]["204"].is_object());
    }

    #[test]
    fn hidden_entries_are_skipped() {
        let hidden = RouteEntry::new("/", get(|| async { "" }))
            .operation(Method::GET, "root")
            .hidden()
            .meta()
            .clone();
        let doc = build_document(&SchemaSettings::default(), &[hidden], None);
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json["paths"].as_object().map(|p| p.is_empty()).unwrap_or(true));
    }
}
