// server/tests/api_tests.rs

mod common;

use actix_web::{http::StatusCode, test, web, App};
use bookwell::domain::{NewOrder, OrderStatus, PaymentStatus};
use bookwell_app::web::configure_app_routes;
use chrono::NaiveDate;
use serde_json::{json, Value as JsonValue};
use serial_test::serial;
use std::sync::atomic::Ordering;

use common::{setup_tracing, TestApp};

macro_rules! app {
  ($ctx:expr) => {
    test::init_service(
      App::new()
        .app_data(web::Data::new($ctx.state.clone()))
        .configure(configure_app_routes),
    )
    .await
  };
}

#[actix_web::test]
#[serial]
async fn health_reports_ok() {
  setup_tracing();
  let ctx = TestApp::new();
  let app = app!(ctx);

  let resp = test::call_service(&app, test::TestRequest::get().uri("/api/v1/health").to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: JsonValue = test::read_body_json(resp).await;
  assert_eq!(body["status"], "ok");
}

#[actix_web::test]
#[serial]
async fn order_creation_validates_against_the_service() {
  setup_tracing();
  let ctx = TestApp::new();
  let app = app!(ctx);

  let missing_count = test::TestRequest::post()
    .uri("/api/v1/orders")
    .set_json(json!({
      "customerId": ctx.customer.id,
      "serviceId": ctx.rooms.id,
      "date": "2026-12-01"
    }))
    .to_request();
  let resp = test::call_service(&app, missing_count).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: JsonValue = test::read_body_json(resp).await;
  assert_eq!(body["success"], false);

  let unknown_customer = test::TestRequest::post()
    .uri("/api/v1/orders")
    .set_json(json!({
      "customerId": uuid::Uuid::new_v4(),
      "serviceId": ctx.hall.id,
      "date": "2026-12-01"
    }))
    .to_request();
  let resp = test::call_service(&app, unknown_customer).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);

  let valid = test::TestRequest::post()
    .uri("/api/v1/orders")
    .set_json(json!({
      "customerId": ctx.customer.id,
      "serviceId": ctx.rooms.id,
      "date": "2026-12-01",
      "dateCount": 3
    }))
    .to_request();
  let resp = test::call_service(&app, valid).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let body: JsonValue = test::read_body_json(resp).await;
  assert_eq!(body["success"], true);
  assert_eq!(body["data"]["status"], "pending");

  let order_id = body["data"]["id"].as_str().expect("order id").to_string();
  let resp = test::call_service(
    &app,
    test::TestRequest::get().uri(&format!("/api/v1/orders/{}", order_id)).to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
}

/// Seeds a pending order for the fixed-price hall.
async fn create_hall_order(ctx: &TestApp) -> String {
  let order = ctx
    .state
    .stores
    .orders
    .insert(NewOrder {
      customer_id: ctx.customer.id,
      service_id: ctx.hall.id,
      package_id: None,
      description: None,
      attached_file_path: None,
      date: NaiveDate::from_ymd_opt(2026, 12, 5),
      date_count: None,
    })
    .await
    .expect("order insert");
  order.id.to_string()
}

#[actix_web::test]
#[serial]
async fn payment_round_trip_through_webhook_creates_reservation_once() {
  setup_tracing();
  let ctx = TestApp::new();
  let app = app!(ctx);
  let order_id = create_hall_order(&ctx).await;

  let resp = test::call_service(
    &app,
    test::TestRequest::post()
      .uri("/api/v1/payments/initiate")
      .set_json(json!({ "orderId": order_id, "amount": 500, "phoneNumber": "0911223344" }))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: JsonValue = test::read_body_json(resp).await;
  let reference = body["data"]["reference"].as_str().expect("reference").to_string();
  assert!(body["data"]["redirectUrl"].as_str().unwrap_or_default().ends_with(&reference));

  let webhook = json!({ "txnId": "T-1", "Status": "COMPLETED", "thirdPartyId": reference, "amount": 500 });
  for expected in ["applied", "duplicate"] {
    let resp = test::call_service(
      &app,
      test::TestRequest::post()
        .uri("/api/v1/webhooks/santimpay")
        .set_json(&webhook)
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let ack: JsonValue = test::read_body_json(resp).await;
    assert_eq!(ack["handled"], true);
    assert_eq!(ack["outcome"], expected);
    assert_eq!(ack["status"], "completed");
  }

  assert_eq!(ctx.store.reservations().len(), 1);
  let order = ctx
    .store
    .order(order_id.parse().expect("uuid"))
    .expect("order exists");
  assert_eq!(order.status, OrderStatus::Paid);

  let resp = test::call_service(
    &app,
    test::TestRequest::get()
      .uri(&format!("/api/v1/orders/{}/reservation", order_id))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);

  let resp = test::call_service(
    &app,
    test::TestRequest::get()
      .uri(&format!("/api/v1/payments/verify/{}", reference))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: JsonValue = test::read_body_json(resp).await;
  assert_eq!(body["data"]["status"], "completed");
}

#[actix_web::test]
#[serial]
async fn gateway_failure_maps_to_bad_gateway_without_a_payment_row() {
  setup_tracing();
  let ctx = TestApp::new();
  let app = app!(ctx);
  let order_id = create_hall_order(&ctx).await;
  ctx.gateway.fail_initiate.store(true, Ordering::SeqCst);

  let resp = test::call_service(
    &app,
    test::TestRequest::post()
      .uri("/api/v1/payments/initiate")
      .set_json(json!({ "orderId": order_id, "amount": 500 }))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
  assert!(ctx.store.payments().is_empty());
}

#[actix_web::test]
#[serial]
async fn paid_order_rejects_a_second_payment_with_conflict() {
  setup_tracing();
  let ctx = TestApp::new();
  let app = app!(ctx);
  let order_id = create_hall_order(&ctx).await;
  let initiate = json!({ "orderId": order_id, "amount": 500 });

  let resp = test::call_service(
    &app,
    test::TestRequest::post()
      .uri("/api/v1/payments/initiate")
      .set_json(&initiate)
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: JsonValue = test::read_body_json(resp).await;
  let reference = body["data"]["reference"].as_str().expect("reference").to_string();

  let resp = test::call_service(
    &app,
    test::TestRequest::post()
      .uri("/api/v1/webhooks/santimpay")
      .set_json(json!({ "txnId": "T-9", "Status": "COMPLETED", "thirdPartyId": reference, "amount": "" }))
      .to_request(),
  )
  .await;
  let ack: JsonValue = test::read_body_json(resp).await;
  assert_eq!(ack["outcome"], "applied");
  assert_eq!(ctx.store.payments()[0].metadata["invalidAmount"], "");

  let resp = test::call_service(
    &app,
    test::TestRequest::post()
      .uri("/api/v1/payments/initiate")
      .set_json(&initiate)
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);
  assert_eq!(ctx.store.payments().len(), 1);
  assert_eq!(ctx.gateway.initiate_calls.load(Ordering::SeqCst), 1);
}

#[actix_web::test]
#[serial]
async fn webhooks_are_acknowledged_even_when_not_applied() {
  setup_tracing();
  let ctx = TestApp::new();
  let app = app!(ctx);

  let resp = test::call_service(
    &app,
    test::TestRequest::post()
      .uri("/api/v1/webhooks/santimpay")
      .set_json(json!({ "Status": "COMPLETED", "thirdPartyId": "PAY-unknown" }))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  let ack: JsonValue = test::read_body_json(resp).await;
  assert_eq!(ack["handled"], true);
  assert_eq!(ack["outcome"], "unknown_reference");

  let resp = test::call_service(
    &app,
    test::TestRequest::post()
      .uri("/api/v1/webhooks/santimpay")
      .insert_header(("content-type", "application/json"))
      .set_payload("not json")
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  let ack: JsonValue = test::read_body_json(resp).await;
  assert_eq!(ack["handled"], false);

  let resp = test::call_service(
    &app,
    test::TestRequest::post()
      .uri("/api/v1/webhooks/other")
      .set_json(json!({ "thirdPartyId": "PAY-x" }))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
#[serial]
async fn refresh_settles_from_provider_and_unknown_reference_is_not_found() {
  setup_tracing();
  let ctx = TestApp::new();
  let app = app!(ctx);
  let order_id = create_hall_order(&ctx).await;

  let resp = test::call_service(
    &app,
    test::TestRequest::post()
      .uri("/api/v1/payments/initiate")
      .set_json(json!({ "orderId": order_id, "amount": "500" }))
      .to_request(),
  )
  .await;
  let body: JsonValue = test::read_body_json(resp).await;
  let reference = body["data"]["reference"].as_str().expect("reference").to_string();

  let resp = test::call_service(
    &app,
    test::TestRequest::post()
      .uri(&format!("/api/v1/payments/{}/refresh", reference))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  let payments = ctx.store.payments();
  assert_eq!(payments[0].status, PaymentStatus::Completed);
  assert_eq!(ctx.store.reservations().len(), 1);

  let resp = test::call_service(
    &app,
    test::TestRequest::get().uri("/api/v1/payments/verify/PAY-missing").to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
#[serial]
async fn appointment_status_changes_follow_the_transition_table() {
  setup_tracing();
  let ctx = TestApp::new();
  let app = app!(ctx);

  let resp = test::call_service(
    &app,
    test::TestRequest::post()
      .uri("/api/v1/appointments")
      .set_json(json!({
        "customerId": ctx.customer.id,
        "dateTime": "2026-12-10T06:30:00Z",
        "hospitalName": "St. Paul Hospital"
      }))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let body: JsonValue = test::read_body_json(resp).await;
  let appointment_id = body["data"]["id"].as_str().expect("id").to_string();
  assert_eq!(ctx.sms.sent.lock().len(), 1);

  let status_uri = format!("/api/v1/appointments/{}/status", appointment_id);
  let resp = test::call_service(
    &app,
    test::TestRequest::patch()
      .uri(&status_uri)
      .set_json(json!({ "status": "completed" }))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);

  let resp = test::call_service(
    &app,
    test::TestRequest::patch()
      .uri(&status_uri)
      .set_json(json!({ "status": "confirmed" }))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: JsonValue = test::read_body_json(resp).await;
  assert_eq!(body["data"]["status"], "confirmed");
  assert_eq!(ctx.sms.sent.lock().len(), 2);

  let resp = test::call_service(
    &app,
    test::TestRequest::get()
      .uri(&format!("/api/v1/appointments/{}", uuid::Uuid::new_v4()))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
