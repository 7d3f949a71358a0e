mod common;

use axum::http::{header, StatusCode};
use common::*;
use labelgate::RouteTableBuilder;

fn router() -> axum::Router {
    let table = RouteTableBuilder::new("/api")
        .register("projects", Stub::new("projects"))
        .build()
        .unwrap();
    app(settings(), table)
}

#[tokio::test]
async fn root_redirects_permanently_to_the_ui() {
    let res = get(&router(), "/", None).await;
    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(res.headers()[header::LOCATION], "http://ui.test");
}

#[tokio::test]
async fn root_redirect_keeps_the_query_string() {
    let res = get(&router(), "/?x=1&next=%2Ftasks", Some(ALICE_TOKEN)).await;
    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(res.headers()[header::LOCATION], "http://ui.test?x=1&next=%2Ftasks");
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let res = get(&router(), "/", None).await;
    assert!(res.headers().contains_key("x-request-id"));
}

#[test]
fn root_is_not_part_of_the_api_table() {
    let table = RouteTableBuilder::new("/api").build().unwrap();
    assert!(!table.contains("/"));
    assert!(table.contains("/api/"));
}
