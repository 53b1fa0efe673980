use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::post;
use listing_smoke::{ApiErrorKind, ApiRequest, Client, submit_listing};
use tokio::net::TcpListener;
use tokio::time::sleep;

#[tokio::test]
async fn e2e_created_listing_roundtrip() {
    let server = TestServer::start(Router::new().route("/api/listings", post(created_handler))).await;
    let client = Client::new();

    let report = submit_listing(&client, &server.url("/api/listings"))
        .await
        .expect("listing should be accepted");

    assert!(report.accepted());
    let rendered = report.to_string();
    assert!(rendered.starts_with("Status: 201\n"));
    assert!(rendered.contains("✅ Success!"));
    assert!(rendered.contains(r#""id""#));
}

#[tokio::test]
async fn e2e_oversized_payload_rejection_is_reported() {
    let server = TestServer::start(Router::new().route("/api/listings", post(reject_handler))).await;
    let client = Client::new();

    let report = submit_listing(&client, &server.url("/api/listings"))
        .await
        .expect("rejection with a json body should still produce a report");

    assert!(!report.accepted());
    let rendered = report.to_string();
    assert!(rendered.starts_with("Status: 400\n"));
    assert!(rendered.contains("❌ Error:"));
    assert!(rendered.contains("payload too large"));
}

#[tokio::test]
async fn e2e_unreachable_endpoint_fails_with_connect_error() {
    // Bind to grab a free port, then drop the listener so nothing answers.
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe listener");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let client = Client::new();
    let err = submit_listing(&client, &format!("http://{}/api/listings", addr))
        .await
        .expect_err("nothing is listening, the request should fail");

    assert_eq!(err.kind(), ApiErrorKind::Connect);
}

#[tokio::test]
async fn e2e_stalled_endpoint_times_out() {
    let server = TestServer::start(Router::new().route("/api/listings", post(stall_handler))).await;
    let client = Client::new();

    let err = client
        .execute(
            ApiRequest::post(server.url("/api/listings"))
                .with_timeout(Duration::from_millis(200)),
        )
        .await
        .expect_err("stalled handler should trip the request deadline");

    assert_eq!(err.kind(), ApiErrorKind::Timeout);
}

struct TestServer {
    base_url: String,
    task: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn start(app: Router) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");
        let base_url = format!("http://{}", addr);

        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { base_url, task }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn created_handler(body: String) -> (StatusCode, &'static str) {
    if body.contains("data:image/png;base64,") {
        (
            StatusCode::CREATED,
            r#"{"id":"4f6b2d1c","title":"Test Large Image","status":"ACTIVE"}"#,
        )
    } else {
        (StatusCode::BAD_REQUEST, r#"{"error":"imageUrl missing"}"#)
    }
}

async fn reject_handler() -> (StatusCode, &'static str) {
    (StatusCode::BAD_REQUEST, r#"{"error":"payload too large"}"#)
}

async fn stall_handler() -> (StatusCode, &'static str) {
    sleep(Duration::from_secs(2)).await;
    (StatusCode::OK, r#"{"ok":true}"#)
}
