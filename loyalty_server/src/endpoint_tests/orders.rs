use actix_web::{http::StatusCode, test, test::TestRequest, App};
use log::*;
use loyalty_engine::{
    db_types::{OrderStatusType, Points},
    test_utils::ScriptedOracle,
};
use serde_json::Value;

use super::helpers::{as_user, read_response, TestBackend, VALID_ORDER};

#[actix_web::test]
async fn health_check() {
    let backend = TestBackend::new(ScriptedOracle::default()).await;
    let app = test::init_service(App::new().configure(backend.configure())).await;
    let res = test::call_service(&app, TestRequest::get().uri("/health").to_request()).await;
    assert!(res.status().is_success());
    backend.tear_down().await;
}

#[actix_web::test]
async fn requests_without_a_user_are_unauthorized() {
    let backend = TestBackend::with_accounts(ScriptedOracle::default(), &[1]).await;
    let app = test::init_service(App::new().configure(backend.configure())).await;

    let req = TestRequest::post().uri("/api/user/orders").set_payload(VALID_ORDER).to_request();
    let (status, body) = read_response(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"error":"Authentication Error. The X-User-Id header is missing."}"#);

    let req = TestRequest::get().uri("/api/user/balance").insert_header(("X-User-Id", "bob")).to_request();
    let (status, body) = read_response(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("not a valid user id"), "was: {body}");
    assert_eq!(backend.oracle.calls(), 0);
    backend.tear_down().await;
}

#[actix_web::test]
async fn submit_order_lifecycle() {
    let oracle = ScriptedOracle::default().then_status(OrderStatusType::Processing).then_processed(Points::from_points(500));
    let backend = TestBackend::with_accounts(oracle, &[1, 2]).await;
    let app = test::init_service(App::new().configure(backend.configure())).await;

    let req = as_user(TestRequest::post().uri("/api/user/orders"), 1).set_payload(VALID_ORDER).to_request();
    let (status, body) = read_response(test::call_service(&app, req).await).await;
    info!("Response body: {body}");
    assert_eq!(status, StatusCode::ACCEPTED);
    let order: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(order["number"], VALID_ORDER);
    assert_eq!(order["status"], "NEW");

    let req = as_user(TestRequest::post().uri("/api/user/orders"), 1).set_payload(VALID_ORDER).to_request();
    let (status, _) = read_response(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::OK);

    let req = as_user(TestRequest::post().uri("/api/user/orders"), 2).set_payload(VALID_ORDER).to_request();
    let (status, body) = read_response(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("another user"), "was: {body}");

    backend.reconciler.drain().await;

    let req = as_user(TestRequest::get().uri("/api/user/orders"), 1).to_request();
    let (status, body) = read_response(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::OK);
    let orders: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(orders.as_array().map(Vec::len), Some(1));
    assert_eq!(orders[0]["status"], "PROCESSED");
    assert_eq!(orders[0]["accrual"], 500.0);

    let req = as_user(TestRequest::get().uri("/api/user/orders"), 2).to_request();
    let (status, body) = read_response(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());

    let req = as_user(TestRequest::get().uri("/api/user/balance"), 1).to_request();
    let (status, body) = read_response(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"current":500.0,"withdrawn":0.0}"#);
    assert_eq!(backend.oracle.calls(), 2);
    backend.tear_down().await;
}

#[actix_web::test]
async fn malformed_order_numbers_are_unprocessable() {
    let backend = TestBackend::with_accounts(ScriptedOracle::default(), &[1]).await;
    let app = test::init_service(App::new().configure(backend.configure())).await;
    for payload in ["1234567812345678", "", "12ab", "7992 7398 713"] {
        let req = as_user(TestRequest::post().uri("/api/user/orders"), 1).set_payload(payload).to_request();
        let (status, body) = read_response(test::call_service(&app, req).await).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{payload}: {body}");
    }
    let req = as_user(TestRequest::get().uri("/api/user/orders"), 1).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_eq!(backend.oracle.calls(), 0);
    backend.tear_down().await;
}

#[actix_web::test]
async fn orders_need_an_account() {
    let backend = TestBackend::new(ScriptedOracle::default()).await;
    let app = test::init_service(App::new().configure(backend.configure())).await;
    let req = as_user(TestRequest::post().uri("/api/user/orders"), 42).set_payload(VALID_ORDER).to_request();
    let (status, body) = read_response(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "was: {body}");
    backend.tear_down().await;
}
