use std::time::Duration;

use chrono::{TimeZone, Utc};
use coupon_core::{DispatchRequest, RecipientRecord};
use coupon_engine::{ApiSettings, DispatchApi, FailureKind, ReqwestApi};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> ReqwestApi {
    ReqwestApi::new(ApiSettings {
        base_url: server.uri(),
        ..ApiSettings::default()
    })
    .expect("client")
}

fn sample_request() -> DispatchRequest {
    DispatchRequest {
        client_name: "Acme".to_string(),
        sales_manager: "Kim".to_string(),
        client_requester: "Park".to_string(),
        requester_email: "park@acme.example".to_string(),
        event_name: "Launch".to_string(),
        dispatch_datetime: Utc.with_ymd_and_hms(2026, 11, 2, 1, 30, 0).unwrap(),
        product_id: 7,
        mms_title: "Your coupon".to_string(),
        mms_content: "Enjoy".to_string(),
        sender_phone: "16683551".to_string(),
        recipients: vec![
            RecipientRecord {
                phone_number: "01012345678".to_string(),
            },
            RecipientRecord {
                phone_number: "0161234567".to_string(),
            },
        ],
    }
}

#[tokio::test]
async fn products_are_listed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 7, "name": "Americano (R)", "expiry": "30 days", "price": "4500", "location": null},
            {"id": 9, "name": "Cake"}
        ])))
        .mount(&server)
        .await;

    let products = api_for(&server).fetch_products().await.expect("products");
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].name, "Americano (R)");
    assert_eq!(products[0].price.as_deref(), Some("4500"));
    assert_eq!(products[1].id, 9);
    assert_eq!(products[1].expiry, None);
}

#[tokio::test]
async fn product_list_failure_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = api_for(&server).fetch_products().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(503));
    assert_eq!(err.detail, None);
    assert_eq!(err.user_message(), "An unknown error occurred.");
}

#[tokio::test]
async fn dispatch_posts_json_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/dispatches"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "client_name": "Acme",
            "sales_manager": "Kim",
            "client_requester": "Park",
            "requester_email": "park@acme.example",
            "event_name": "Launch",
            "dispatch_datetime": "2026-11-02T01:30:00Z",
            "product_id": 7,
            "mms_title": "Your coupon",
            "mms_content": "Enjoy",
            "sender_phone": "16683551",
            "recipients": [
                {"phone_number": "01012345678"},
                {"phone_number": "0161234567"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 41,
            "quantity": 2,
            "event_name": "Launch",
            "client_name": "Acme"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let receipt = api_for(&server)
        .create_dispatch(&sample_request())
        .await
        .expect("receipt");
    assert_eq!(receipt.id, 41);
    assert_eq!(receipt.quantity, 2);
    assert_eq!(receipt.event_name.as_deref(), Some("Launch"));
}

#[tokio::test]
async fn dispatch_failure_carries_server_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/dispatches"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"detail": "Unknown product 7"})),
        )
        .mount(&server)
        .await;

    let err = api_for(&server)
        .create_dispatch(&sample_request())
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(422));
    assert_eq!(err.user_message(), "Unknown product 7");
}

#[tokio::test]
async fn slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let api = ReqwestApi::new(ApiSettings {
        base_url: server.uri(),
        request_timeout: Duration::from_millis(50),
        ..ApiSettings::default()
    })
    .expect("client");
    let err = api.fetch_products().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn malformed_success_body_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = api_for(&server).fetch_products().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidBody);
}
