//! Session sharing and concurrency tests
//!
//! Concurrent calls on one client (and its clones) must get distinct ids,
//! and a response that arrives late must not roll back the session cookie.

mod common;

use async_trait::async_trait;
use common::{client_with, login_response, mock_result, MockTransport};
use futures::future::join_all;
use odoo_jrpc_client::{CallOptions, HttpRequest, HttpResponse, HttpTransport, OdooClient};
use odoo_jrpc_core::Result;
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Notify;

fn request_id(request: &HttpRequest) -> u64 {
    let body: Value = serde_json::from_str(&request.body).unwrap();
    body["id"].as_u64().unwrap()
}

#[tokio::test]
async fn test_concurrent_calls_get_unique_ids() {
    let transport = MockTransport::with_handler(|request| {
        if request.url.ends_with("/web/session/authenticate") {
            Ok(login_response(7, Some("abc")))
        } else {
            Ok(HttpResponse::json_body(&mock_result(request_id(request), json!(true))))
        }
    });
    let client = client_with(&transport);
    client.login("admin", "secret").await.unwrap();

    let args = [json!([1])];
    let kwargs = Map::new();
    let calls = (0..10)
        .map(|_| client.call("res.partner", "read", &args, &kwargs, CallOptions::default()));
    let results = join_all(calls).await;
    assert!(results.iter().all(|r| r.is_ok()));

    let ids: BTreeSet<u64> = transport.requests().iter().skip(1).map(request_id).collect();
    assert_eq!(ids, (2..=11).collect::<BTreeSet<u64>>());
    assert_eq!(client.last_request_id().await, 11);
}

#[tokio::test]
async fn test_clones_share_session() {
    let transport = MockTransport::scripted(vec![
        login_response(7, Some("shared")),
        HttpResponse::json_body(&mock_result(2, json!(3))),
    ]);
    let client = client_with(&transport);
    let clone = client.clone();

    client.login("admin", "secret").await.unwrap();
    assert!(clone.is_authenticated().await);

    clone
        .call("res.partner", "search_count", &[json!([])], &Map::new(), CallOptions::default())
        .await
        .unwrap();
    assert_eq!(transport.requests()[1].header("cookie"), Some("session_id=shared"));
    assert_eq!(client.last_request_id().await, 2);
}

/// Holds the response to request 2 until request 3 has been answered
struct ReorderingTransport {
    released: Notify,
}

#[async_trait]
impl HttpTransport for ReorderingTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let id = request_id(&request);
        match id {
            1 => Ok(login_response(7, Some("login"))),
            2 => {
                self.released.notified().await;
                Ok(HttpResponse::json_body(&mock_result(id, json!(true)))
                    .with_header("Set-Cookie", "session_id=old; Path=/"))
            }
            _ => {
                self.released.notify_one();
                Ok(HttpResponse::json_body(&mock_result(id, json!(true)))
                    .with_header("Set-Cookie", "session_id=new; Path=/"))
            }
        }
    }
}

#[tokio::test]
async fn test_late_response_does_not_overwrite_newer_cookie() {
    let transport = Arc::new(ReorderingTransport {
        released: Notify::new(),
    });
    let client: OdooClient = OdooClient::builder("http://odoo.test", "testdb")
        .transport(transport)
        .build()
        .unwrap();
    client.login("admin", "secret").await.unwrap();

    let slow_client = client.clone();
    let slow = tokio::spawn(async move {
        slow_client
            .call("res.partner", "read", &[json!([1])], &Map::new(), CallOptions::default())
            .await
    });

    // Wait until the slow call has taken id 2 before issuing the next one.
    while client.last_request_id().await < 2 {
        tokio::task::yield_now().await;
    }

    client
        .call("res.partner", "read", &[json!([2])], &Map::new(), CallOptions::default())
        .await
        .unwrap();
    slow.await.unwrap().unwrap();

    assert_eq!(client.session_cookie().await.as_deref(), Some("session_id=new"));
}

/// Holds the login response until a later call has answered with its own
/// cookie
struct HeldLoginTransport {
    released: Notify,
    sent: std::sync::Mutex<Vec<HttpRequest>>,
}

#[async_trait]
impl HttpTransport for HeldLoginTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let id = request_id(&request);
        self.sent.lock().unwrap().push(request);
        match id {
            1 => {
                self.released.notified().await;
                Ok(login_response(7, Some("user")))
            }
            2 => {
                self.released.notify_one();
                Ok(HttpResponse::json_body(&mock_result(id, json!(true)))
                    .with_header("Set-Cookie", "session_id=anonymous; Path=/"))
            }
            _ => Ok(HttpResponse::json_body(&mock_result(id, json!([])))),
        }
    }
}

#[tokio::test]
async fn test_login_cookie_survives_overlapping_call() {
    let transport = Arc::new(HeldLoginTransport {
        released: Notify::new(),
        sent: std::sync::Mutex::new(Vec::new()),
    });
    let client = OdooClient::builder("http://odoo.test", "testdb")
        .transport(transport.clone())
        .build()
        .unwrap();

    let login_client = client.clone();
    let login = tokio::spawn(async move { login_client.login("admin", "secret").await });

    while client.last_request_id().await < 1 {
        tokio::task::yield_now().await;
    }

    client
        .rpc_call("/web/webclient/version_info", json!({}))
        .await
        .unwrap();
    let user = login.await.unwrap().unwrap();
    assert_eq!(user.uid, 7);
    assert_eq!(client.session_cookie().await.as_deref(), Some("session_id=user"));

    client
        .call("res.partner", "search", &[json!([])], &Map::new(), CallOptions::default())
        .await
        .unwrap();
    let sent = transport.sent.lock().unwrap();
    assert_eq!(sent[2].header("cookie"), Some("session_id=user"));
}
