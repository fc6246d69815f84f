//! Common test utilities for odoo-jrpc-client integration tests
//!
//! Provides a recording mock transport and response helpers so the client
//! can be exercised without an Odoo server.
#![allow(dead_code)]

use async_trait::async_trait;
use odoo_jrpc_client::{HttpRequest, HttpResponse, HttpTransport, OdooClient};
use odoo_jrpc_core::Result;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

type Handler = Box<dyn Fn(&HttpRequest) -> Result<HttpResponse> + Send + Sync>;

/// Mock transport that records every request and answers through a handler
pub struct MockTransport {
    handler: Handler,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    /// Answer every request with the same JSON body
    pub fn replying(body: Value) -> Arc<Self> {
        Self::with_handler(move |_| Ok(HttpResponse::json_body(&body)))
    }

    /// Answer requests with a custom handler
    pub fn with_handler<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse> + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Answer requests in order from a fixed list
    pub fn scripted(responses: Vec<HttpResponse>) -> Arc<Self> {
        let queue = Mutex::new(responses);
        Self::with_handler(move |_| {
            let mut queue = queue.lock().unwrap();
            assert!(!queue.is_empty(), "mock transport ran out of responses");
            Ok(queue.remove(0))
        })
    }

    /// Every request sent so far
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests sent so far
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// JSON body of the n-th request
    pub fn body(&self, n: usize) -> Value {
        serde_json::from_str(&self.requests.lock().unwrap()[n].body).unwrap()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let response = (self.handler)(&request);
        self.requests.lock().unwrap().push(request);
        response
    }
}

/// Build a client wired to the given mock
pub fn client_with(transport: &Arc<MockTransport>) -> OdooClient {
    OdooClient::builder("http://odoo.test", "testdb")
        .transport(transport.clone())
        .build()
        .unwrap()
}

/// Helper to create a JSON-RPC success response
pub fn mock_result(id: u64, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result
    })
}

/// Helper to create an Odoo-style JSON-RPC error response
pub fn mock_odoo_error(id: u64, name: &str, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": 200,
            "message": "Odoo Server Error",
            "data": {
                "name": name,
                "message": message,
                "debug": format!("Traceback (most recent call last):\n{}: {}", name, message)
            }
        }
    })
}

/// Authenticate result for a user with the given uid
pub fn session_info(uid: i64, tz: &str) -> Value {
    json!({
        "uid": uid,
        "partner_id": uid + 100,
        "session_id": format!("sid-{}", uid),
        "company_id": 1,
        "name": format!("User {}", uid),
        "username": format!("user{}", uid),
        "is_admin": uid == 2,
        "is_superuser": false,
        "user_context": {"lang": "en_US", "tz": tz, "uid": uid}
    })
}

/// Successful login response, optionally setting a session cookie
pub fn login_response(uid: i64, cookie: Option<&str>) -> HttpResponse {
    let response = HttpResponse::json_body(&mock_result(1, session_info(uid, "UTC")));
    match cookie {
        Some(value) => response.with_header(
            "Set-Cookie",
            format!("session_id={}; Path=/; HttpOnly", value),
        ),
        None => response,
    }
}

/// Login response for rejected credentials on servers that return no error
pub fn rejected_login_response() -> HttpResponse {
    HttpResponse::json_body(&mock_result(
        1,
        json!({"uid": false, "session_id": "", "user_context": {}}),
    ))
}
