use actix_web::{http::StatusCode, test, test::TestRequest, App};
use loyalty_engine::test_utils::ScriptedOracle;
use serde_json::{json, Value};

use super::helpers::{as_user, read_response, TestBackend};

#[actix_web::test]
async fn withdraw_within_balance() {
    let backend = TestBackend::with_accounts(ScriptedOracle::default(), &[1]).await;
    backend.credit(1, "79927398713", 300).await;
    let app = test::init_service(App::new().configure(backend.configure())).await;

    let req = as_user(TestRequest::post().uri("/api/user/balance/withdraw"), 1)
        .set_json(json!({"order": "2377225624", "sum": 500}))
        .to_request();
    let (status, body) = read_response(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED, "was: {body}");

    let req = as_user(TestRequest::get().uri("/api/user/withdrawals"), 1).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let req = as_user(TestRequest::post().uri("/api/user/balance/withdraw"), 1)
        .set_json(json!({"order": "2377225624", "sum": 200}))
        .to_request();
    let (status, body) = read_response(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"current":100.0,"withdrawn":200.0}"#);

    let req = as_user(TestRequest::get().uri("/api/user/withdrawals"), 1).to_request();
    let (status, body) = read_response(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::OK);
    let withdrawals: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(withdrawals.as_array().map(Vec::len), Some(1));
    assert_eq!(withdrawals[0]["order"], "2377225624");
    assert_eq!(withdrawals[0]["sum"], 200.0);
    assert!(withdrawals[0]["processed_at"].is_string());
    backend.tear_down().await;
}

#[actix_web::test]
async fn bad_withdrawal_requests() {
    let backend = TestBackend::with_accounts(ScriptedOracle::default(), &[1]).await;
    backend.credit(1, "79927398713", 300).await;
    let app = test::init_service(App::new().configure(backend.configure())).await;

    let req = as_user(TestRequest::post().uri("/api/user/balance/withdraw"), 1)
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let (status, body) = read_response(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.starts_with(r#"{"error":"Payload deserialization error."#), "was: {body}");

    for payload in [json!({"order": "2377225624", "sum": 0}), json!({"order": "  ", "sum": 10})] {
        let req =
            as_user(TestRequest::post().uri("/api/user/balance/withdraw"), 1).set_json(payload.clone()).to_request();
        let (status, body) = read_response(test::call_service(&app, req).await).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{payload}: {body}");
    }

    let req = as_user(TestRequest::get().uri("/api/user/balance"), 1).to_request();
    let (_, body) = read_response(test::call_service(&app, req).await).await;
    assert_eq!(body, r#"{"current":300.0,"withdrawn":0.0}"#);
    backend.tear_down().await;
}

#[actix_web::test]
async fn unknown_users_have_no_balance() {
    let backend = TestBackend::new(ScriptedOracle::default()).await;
    let app = test::init_service(App::new().configure(backend.configure())).await;
    let req = as_user(TestRequest::get().uri("/api/user/balance"), 7).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let req = as_user(TestRequest::post().uri("/api/user/balance/withdraw"), 7)
        .set_json(json!({"order": "2377225624", "sum": 1}))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    backend.tear_down().await;
}
