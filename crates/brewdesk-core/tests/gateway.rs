mod common;

use std::sync::Arc;
use std::time::Duration;

use brewdesk_core::api::error::{
    BAD_REQUEST_MESSAGE, NETWORK_ERROR_MESSAGE, SESSION_EXPIRED_MESSAGE, TIMEOUT_MESSAGE,
    UNEXPECTED_ERROR_MESSAGE,
};
use brewdesk_core::auth::{AuthState, Authenticator, LoginError, SessionEvent};
use brewdesk_core::models::{AdminProfile, OrderStatus, ProductInput};
use brewdesk_core::notify::{Notification, NotificationKind};
use brewdesk_core::{ApiError, GatewayConfig};
use common::{dead_address, Backend, Harness, Route};

const ORDERS_JSON: &str = r#"[
    {"id": 1, "order_number": "ORD-001", "customer_name": "Sok Dara", "phone_number": "012111222",
     "total_amount": 5.5, "status": "pending", "payment_status": "paid", "created_at": "2024-05-01T09:00:00",
     "items": [{"product_name": "Iced Latte", "quantity": 2, "price": 2.75}]}
]"#;

fn profile(name: &str) -> AdminProfile {
    AdminProfile {
        full_name: Some(name.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn login_stores_token_and_profile() {
    let backend = Backend::start(vec![Route::new(
        "POST",
        "/api/v1/admin/login",
        200,
        r#"{"access_token": "abc", "admin": {"full_name": "A"}}"#,
    )])
    .await;
    let harness = Harness::new(&backend.url());
    let auth = Authenticator::new(harness.api.clone(), harness.observer.clone());

    let admin = auth.login("admin@x.com", "secret").await.expect("login");

    assert_eq!(admin.full_name.as_deref(), Some("A"));
    assert_eq!(harness.session.current_token().as_deref(), Some("abc"));
    assert!(harness.session.is_authenticated());
    assert_eq!(auth.state(), AuthState::Authenticated(admin.clone()));
    assert_eq!(harness.observer.events(), vec![SessionEvent::LoggedIn(admin)]);

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(body["email"], "admin@x.com");
    assert_eq!(body["password"], "secret");
    assert_eq!(requests[0].headers["content-type"], "application/json");
    assert_eq!(requests[0].headers["accept"], "application/json");
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn login_rejection_leaves_session_untouched() {
    let backend = Backend::start(vec![Route::new(
        "POST",
        "/api/v1/admin/login",
        401,
        r#"{"detail": "Incorrect email or password"}"#,
    )])
    .await;
    let mut harness = Harness::new(&backend.url());
    harness.session.save("existing", &profile("Old"));
    let auth = Authenticator::new(harness.api.clone(), harness.observer.clone());

    let err = auth.login("admin@x.com", "wrong").await.unwrap_err();

    assert!(matches!(err, LoginError::InvalidCredentials));
    assert_eq!(err.to_string(), "Invalid email or password.");
    assert_eq!(harness.session.current_token().as_deref(), Some("existing"));
    assert_eq!(auth.state(), AuthState::Authenticated(profile("Old")));
    assert!(harness.observer.events().is_empty());
    assert!(harness.drain().is_empty());
}

#[tokio::test]
async fn login_without_token_is_invalid_response() {
    let backend = Backend::start(vec![Route::new(
        "POST",
        "/api/v1/admin/login",
        200,
        r#"{"admin": {"full_name": "A"}}"#,
    )])
    .await;
    let harness = Harness::new(&backend.url());
    let auth = Authenticator::new(harness.api.clone(), harness.observer.clone());

    let err = auth.login("admin@x.com", "secret").await.unwrap_err();

    assert!(matches!(err, LoginError::InvalidResponse));
    assert!(!harness.session.is_authenticated());
    assert_eq!(auth.state(), AuthState::Anonymous);
}

#[tokio::test]
async fn login_bad_request_reports_detail() {
    let backend = Backend::start(vec![Route::new(
        "POST",
        "/api/v1/admin/login",
        400,
        r#"{"detail": "Account is inactive"}"#,
    )])
    .await;
    let mut harness = Harness::new(&backend.url());
    let auth = Authenticator::new(harness.api.clone(), harness.observer.clone());

    let err = auth.login("admin@x.com", "secret").await.unwrap_err();

    assert_eq!(err.to_string(), "Account is inactive");
    assert_eq!(harness.drain(), vec![Notification::error("Account is inactive")]);
}

#[tokio::test]
async fn login_unreachable_backend() {
    let harness = Harness::new(&dead_address().await);
    let auth = Authenticator::new(harness.api.clone(), harness.observer.clone());

    let err = auth.login("admin@x.com", "secret").await.unwrap_err();

    assert!(matches!(err, LoginError::Unreachable));
    assert!(!harness.session.is_authenticated());
}

#[tokio::test]
async fn requests_carry_bearer_token() {
    let backend = Backend::start(vec![Route::new("GET", "/api/v1/admin/orders/", 200, ORDERS_JSON)]).await;
    let harness = Harness::new(&backend.url());
    harness.session.save("abc", &profile("A"));

    let orders = harness.api.orders().await.expect("orders");

    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].status, OrderStatus::Pending);
    assert_eq!(backend.requests()[0].headers["authorization"], "Bearer abc");
}

#[tokio::test]
async fn unauthorized_response_ends_session() {
    let backend = Backend::start(vec![Route::new(
        "GET",
        "/api/v1/admin/orders/",
        401,
        r#"{"detail": "Could not validate credentials"}"#,
    )])
    .await;
    let mut harness = Harness::new(&backend.url());
    harness.session.save("abc", &profile("A"));
    let auth = Authenticator::new(harness.api.clone(), harness.observer.clone());
    assert!(auth.state().is_authenticated());

    let err = auth.api().orders().await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized));
    assert!(!harness.session.is_authenticated());
    assert!(harness.session.current_profile().is_none());
    assert_eq!(auth.state(), AuthState::Anonymous);
    assert_eq!(harness.observer.events(), vec![SessionEvent::Expired]);
    assert_eq!(harness.drain(), vec![Notification::error(SESSION_EXPIRED_MESSAGE)]);
}

#[tokio::test]
async fn unauthorized_clears_session_for_any_request() {
    let backend = Backend::start(vec![
        Route::new("GET", "/api/v1/admin/dashboard/stats", 401, "{}"),
        Route::new("DELETE", "/api/v1/admin/products/3", 401, ""),
        Route::new("PUT", "/api/v1/admin/orders/7", 401, ""),
    ])
    .await;
    let harness = Harness::new(&backend.url());

    harness.session.save("abc", &profile("A"));
    assert!(harness.api.dashboard_stats().await.is_err());
    assert!(!harness.session.is_authenticated());

    harness.session.save("abc", &profile("A"));
    assert!(harness.api.delete_product(3).await.is_err());
    assert!(!harness.session.is_authenticated());

    harness.session.save("abc", &profile("A"));
    assert!(harness
        .api
        .update_order_status(7, OrderStatus::Preparing)
        .await
        .is_err());
    assert!(!harness.session.is_authenticated());
}

#[tokio::test]
async fn bad_request_notifies_server_detail() {
    let backend = Backend::start(vec![
        Route::new("POST", "/api/v1/admin/products/", 400, r#"{"detail": "X"}"#),
        Route::new("PUT", "/api/v1/admin/products/1", 400, r#"{"error": "nope"}"#),
    ])
    .await;
    let mut harness = Harness::new(&backend.url());
    let input = ProductInput::new("Latte", 2.5);

    let err = harness.api.create_product(&input).await.unwrap_err();
    assert!(matches!(err, ApiError::BadRequest { detail: Some(ref d) } if d == "X"));
    assert_eq!(harness.drain(), vec![Notification::error("X")]);

    harness.api.update_product(1, &input).await.unwrap_err();
    assert_eq!(harness.drain(), vec![Notification::error(BAD_REQUEST_MESSAGE)]);
}

#[tokio::test]
async fn not_found_names_the_path() {
    let backend = Backend::start(vec![]).await;
    let mut harness = Harness::new(&backend.url());

    let err = harness.api.order(99).await.unwrap_err();

    assert!(matches!(err, ApiError::NotFound { .. }));
    assert_eq!(
        harness.drain(),
        vec![Notification::error("Endpoint not found: /api/v1/admin/orders/99")]
    );
}

#[tokio::test]
async fn server_error_and_forbidden_notify() {
    let backend = Backend::start(vec![
        Route::new("GET", "/api/v1/admin/products/", 500, "Internal Server Error"),
        Route::new("GET", "/api/v1/admin/dashboard/stats", 403, r#"{"detail": "Forbidden"}"#),
    ])
    .await;
    let mut harness = Harness::new(&backend.url());
    harness.session.save("abc", &profile("A"));

    assert!(matches!(
        harness.api.products().await.unwrap_err(),
        ApiError::ServerError(_)
    ));
    assert!(matches!(
        harness.api.dashboard_stats().await.unwrap_err(),
        ApiError::Forbidden(_)
    ));

    let messages: Vec<String> = harness.drain().into_iter().map(|n| n.message).collect();
    assert_eq!(
        messages,
        vec![
            "Server error. Please try again later.".to_string(),
            "Access denied. You do not have permission.".to_string(),
        ]
    );
    // Neither ends the session
    assert!(harness.session.is_authenticated());
}

#[tokio::test]
async fn other_statuses_pass_through_silently() {
    let backend = Backend::start(vec![Route::new(
        "PUT",
        "/api/v1/admin/orders/4",
        409,
        r#"{"detail": "Order already completed"}"#,
    )])
    .await;
    let mut harness = Harness::new(&backend.url());

    let err = harness
        .api
        .update_order_status(4, OrderStatus::Completed)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Status { status, .. } if status.as_u16() == 409));
    assert!(harness.drain().is_empty());
}

#[tokio::test]
async fn network_drop_notifies_once_without_touching_session() {
    let mut harness = Harness::new(&dead_address().await);
    harness.session.save("abc", &profile("A"));

    let err = harness.api.orders().await.unwrap_err();

    assert!(matches!(err, ApiError::Network(_)));
    let notes = harness.drain();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].kind, NotificationKind::Error);
    assert_eq!(notes[0].message, NETWORK_ERROR_MESSAGE);
    assert_eq!(harness.session.current_token().as_deref(), Some("abc"));
    assert_eq!(harness.session.current_profile(), Some(profile("A")));
    assert!(harness.observer.events().is_empty());
}

#[tokio::test]
async fn slow_backend_times_out() {
    let backend = Backend::start(vec![Route::new("GET", "/health", 200, r#"{"status":"ok"}"#)
        .delayed(Duration::from_secs(3))])
    .await;
    let mut harness = Harness::with_config(
        GatewayConfig::new(backend.url()).with_timeout(Duration::from_millis(200)),
    );

    let err = harness.api.health().await.unwrap_err();

    assert!(matches!(err, ApiError::Timeout));
    assert_eq!(harness.drain(), vec![Notification::error(TIMEOUT_MESSAGE)]);
}

#[tokio::test]
async fn undecodable_success_body_is_reported() {
    let backend = Backend::start(vec![Route::new("GET", "/api/v1/admin/products/", 200, "<html>")]).await;
    let mut harness = Harness::new(&backend.url());

    let err = harness.api.products().await.unwrap_err();

    assert!(matches!(err, ApiError::InvalidResponse(_)));
    assert_eq!(harness.drain(), vec![Notification::error(UNEXPECTED_ERROR_MESSAGE)]);
}

#[tokio::test]
async fn dashboard_fetches_stats_and_recent_orders() {
    let backend = Backend::start(vec![
        Route::new(
            "GET",
            "/api/v1/admin/dashboard/stats",
            200,
            r#"{"total_orders": 10, "total_revenue": 120.5, "pending_orders": 2}"#,
        ),
        Route::new("GET", "/api/v1/admin/orders?limit=5", 200, ORDERS_JSON),
    ])
    .await;
    let mut harness = Harness::new(&backend.url());

    let dashboard = harness.api.dashboard().await.expect("dashboard");

    assert_eq!(dashboard.stats.total_orders, 10);
    assert_eq!(dashboard.stats.total_revenue, 120.5);
    assert_eq!(dashboard.recent_orders.len(), 1);
    assert_eq!(backend.requests().len(), 2);
    assert!(harness.drain().is_empty());
}

#[tokio::test]
async fn product_crud_round() {
    let product = r#"{"id": 3, "name": "Latte", "price": 2.5, "category": "Latte", "is_available": true, "stock": 100}"#;
    let backend = Backend::start(vec![
        Route::new("POST", "/api/v1/admin/products/", 201, product),
        Route::new("GET", "/api/v1/admin/products/3", 200, product),
        Route::new("DELETE", "/api/v1/admin/products/3", 204, ""),
    ])
    .await;
    let harness = Harness::new(&backend.url());
    harness.session.save("abc", &profile("A"));

    let mut input = ProductInput::new("Latte", 2.5);
    input.category = "Latte".to_string();
    let created = harness
        .api
        .create_product(&input)
        .await
        .expect("create")
        .expect("created record");
    assert_eq!(created.id, 3);

    let fetched = harness.api.product(3).await.expect("fetch");
    assert_eq!(fetched, created);

    harness.api.delete_product(3).await.expect("delete");

    let requests = backend.requests();
    let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(body["name"], "Latte");
    assert_eq!(body["stock"], 100);
    assert_eq!(body["is_available"], true);
    assert_eq!(requests[2].method, "DELETE");
}

#[tokio::test]
async fn order_status_update_sends_status_body() {
    let updated = r#"{"id": 7, "order_number": "ORD-007", "status": "preparing"}"#;
    let backend = Backend::start(vec![Route::new("PUT", "/api/v1/admin/orders/7", 200, updated)]).await;
    let harness = Harness::new(&backend.url());

    let order = harness
        .api
        .update_order_status(7, OrderStatus::Preparing)
        .await
        .expect("update")
        .expect("updated record");

    assert_eq!(order.status, OrderStatus::Preparing);
    assert_eq!(backend.requests()[0].body, r#"{"status":"preparing"}"#);
}

#[tokio::test]
async fn connection_check_reports_status() {
    let backend = Backend::start(vec![Route::new("GET", "/health", 200, r#"{"status": "healthy"}"#)]).await;
    let harness = Harness::new(&backend.url());
    assert!(harness.api.test_connection().await.is_connected());

    let harness = Harness::new(&dead_address().await);
    assert!(!harness.api.test_connection().await.is_connected());
}

#[tokio::test]
async fn expiry_seen_from_login_view_is_silent() {
    let backend = Backend::start(vec![Route::new("GET", "/api/v1/admin/orders/", 401, "{}")]).await;
    let mut harness = Harness::new(&backend.url());
    let observer = Arc::new(common::RecordingObserver {
        on_login: true,
        ..Default::default()
    });
    let api = harness.api.clone().with_observer(observer.clone());
    harness.session.save("abc", &profile("A"));

    api.orders().await.unwrap_err();

    assert!(!harness.session.is_authenticated());
    assert!(observer.events().is_empty());
    assert!(harness.drain().is_empty());
}

#[tokio::test]
async fn acknowledged_writes_succeed_without_a_record() {
    let backend = Backend::start(vec![
        Route::new("PUT", "/api/v1/admin/orders/7", 200, r#"{"message": "Order status updated"}"#),
        Route::new("POST", "/api/v1/admin/products/", 201, r#"{"message": "created"}"#),
        Route::new("PUT", "/api/v1/admin/products/3", 200, ""),
    ])
    .await;
    let mut harness = Harness::new(&backend.url());
    harness.session.save("abc", &profile("A"));

    let order = harness
        .api
        .update_order_status(7, OrderStatus::Preparing)
        .await
        .expect("status update accepted");
    assert!(order.is_none());

    let input = ProductInput::new("Latte", 2.5);
    assert!(harness.api.create_product(&input).await.expect("create").is_none());
    assert!(harness.api.update_product(3, &input).await.expect("update").is_none());

    assert_eq!(backend.requests().len(), 3);
    assert!(harness.drain().is_empty());
    assert!(harness.session.is_authenticated());
}

#[tokio::test]
async fn order_list_tolerates_missing_status() {
    let backend = Backend::start(vec![Route::new(
        "GET",
        "/api/v1/admin/orders/",
        200,
        r#"[{"id": 1, "order_number": "ORD-1"}, {"id": 2, "order_number": "ORD-2", "status": "completed"}]"#,
    )])
    .await;
    let mut harness = Harness::new(&backend.url());

    let orders = harness.api.orders().await.expect("orders");

    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].status, OrderStatus::Unknown(String::new()));
    assert_eq!(orders[1].status, OrderStatus::Completed);
    assert!(harness.drain().is_empty());
}

#[tokio::test]
async fn concurrent_rejections_report_expiry_once() {
    let backend = Backend::start(vec![
        Route::new("GET", "/api/v1/admin/dashboard/stats", 401, "{}"),
        Route::new("GET", "/api/v1/admin/orders?limit=5", 401, "{}"),
    ])
    .await;
    let mut harness = Harness::new(&backend.url());
    harness.session.save("abc", &profile("A"));

    assert!(matches!(
        harness.api.dashboard().await.unwrap_err(),
        ApiError::Unauthorized
    ));
    // try_join may drop the second request once the first fails
    let _ = harness.api.recent_orders(5).await;

    assert!(!harness.session.is_authenticated());
    assert_eq!(harness.observer.events(), vec![SessionEvent::Expired]);
    assert_eq!(harness.drain(), vec![Notification::error(SESSION_EXPIRED_MESSAGE)]);
}
