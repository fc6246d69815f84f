//! Odoo JSON-RPC client
//!
//! [`OdooClient`] performs one HTTP round trip per call:
//!
//! 1. **Envelope**: `{"jsonrpc": "2.0", "id": n, "method": "call", "params": ...}`
//! 2. **Send**: POST to `host + path` with JSON headers and the stored
//!    session cookie, if any
//! 3. **Capture**: keep the `session_id` segment of any `Set-Cookie`
//! 4. **Decode**: JSON body, normalized and classified by the core codec
//!
//! On top of that round trip sit [`OdooClient::login`] and
//! [`OdooClient::call`].
//!
//! # Cloning
//!
//! `OdooClient` is cheap to clone. Clones share the transport and the session,
//! so logging in through one clone authenticates all of them.

use crate::metrics::ClientMetrics;
use crate::session::SessionState;
use crate::transport::{HttpRequest, HttpTransport};
use crate::user::LoggedUser;
use odoo_jrpc_core::{
    codec, find_session_cookie, AuthenticationFailure, Error, JsonRpcRequest, Result,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Instant;

/// Session authentication controller
pub const AUTHENTICATE_PATH: &str = "/web/session/authenticate";

/// Generic model method controller
pub const CALL_KW_PATH: &str = "/web/dataset/call_kw";

/// Log target for raw request/response traffic
pub const HTTP_LOG_TARGET: &str = "odoo_jrpc::http";

/// Per-call options for [`OdooClient::call`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallOptions {
    /// Inject the session's user context as `kwargs.context` (default true)
    pub include_context: bool,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            include_context: true,
        }
    }
}

impl CallOptions {
    /// Options that leave `kwargs` exactly as given
    pub fn without_context() -> Self {
        Self {
            include_context: false,
        }
    }
}

/// Outcome of one round trip, before any session state is touched
struct Exchange {
    request_id: u64,
    session_cookie: Option<String>,
    outcome: Result<Value>,
}

/// Odoo JSON-RPC client over HTTP
#[derive(Clone)]
pub struct OdooClient {
    pub(crate) host: String,
    pub(crate) db: String,
    pub(crate) transport: Arc<dyn HttpTransport>,
    pub(crate) session: SessionState,
    pub(crate) metrics: Option<Arc<ClientMetrics>>,
}

impl std::fmt::Debug for OdooClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OdooClient")
            .field("host", &self.host)
            .field("db", &self.db)
            .finish_non_exhaustive()
    }
}

impl OdooClient {
    /// Create a builder for the given server root and database
    pub fn builder(host: impl Into<String>, db: impl Into<String>) -> crate::ClientBuilder {
        crate::ClientBuilder::new(host, db)
    }

    /// Server root every path is appended to
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Database name sent on login
    pub fn db(&self) -> &str {
        &self.db
    }

    /// The logged-in user, if any
    pub async fn logged_user(&self) -> Option<LoggedUser> {
        self.session.logged_user().await
    }

    /// Whether a login has succeeded on this client
    pub async fn is_authenticated(&self) -> bool {
        self.session.logged_user().await.is_some()
    }

    /// The stored `session_id=<value>` cookie, if the server sent one
    pub async fn session_cookie(&self) -> Option<String> {
        self.session.session_cookie().await
    }

    /// Id of the most recent outgoing envelope (0 before the first call)
    pub async fn last_request_id(&self) -> u64 {
        self.session.last_request_id().await
    }

    /// Perform one JSON-RPC round trip against `path`
    ///
    /// Any session cookie in the response is stored, whatever the outcome.
    /// Use this for controllers not covered by [`login`](Self::login) and
    /// [`call`](Self::call).
    ///
    /// # Errors
    ///
    /// - [`Error::Transport`] if the transport rejects the request
    /// - [`Error::Remote`] if the server reports an error
    /// - [`Error::Protocol`] if the response is not usable JSON-RPC
    /// - [`Error::Serialization`] if `params` cannot be serialized
    pub async fn rpc_call<P: serde::Serialize>(&self, path: &str, params: P) -> Result<Value> {
        let params = serde_json::to_value(params)?;
        let exchange = self.exchange(path, params).await;

        if let Some(cookie) = exchange.session_cookie {
            if !self.session.store_cookie(exchange.request_id, cookie).await {
                tracing::debug!(
                    id = exchange.request_id,
                    "Ignoring session cookie from stale response"
                );
            }
        }

        exchange.outcome
    }

    #[tracing::instrument(skip(self, params), fields(path = %path, id = tracing::field::Empty))]
    async fn exchange(&self, path: &str, params: Value) -> Exchange {
        let start = Instant::now();
        let (request_id, cookie) = self.session.begin_request().await;
        tracing::Span::current().record("id", request_id);

        let mut exchange = Exchange {
            request_id,
            session_cookie: None,
            outcome: Ok(Value::Null),
        };

        let body = match codec::encode_request(&JsonRpcRequest::call(request_id, params)) {
            Ok(body) => body,
            Err(e) => {
                exchange.outcome = Err(e);
                return exchange;
            }
        };

        let mut request = HttpRequest::post(format!("{}{}", self.host, path), body)
            .with_header("Content-Type", "application/json")
            .with_header("Accept", "application/json");
        if let Some(cookie) = cookie {
            request = request.with_header("Cookie", cookie);
        }

        tracing::debug!(target: HTTP_LOG_TARGET, url = %request.url, id = request_id, "POST");

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "Transport failed");
                self.record(path, start, Err(&e));
                exchange.outcome = Err(e);
                return exchange;
            }
        };

        exchange.session_cookie = response
            .header_all("set-cookie")
            .find_map(|value| find_session_cookie(Some(value)));

        tracing::debug!(
            target: HTTP_LOG_TARGET,
            status = response.status,
            bytes = response.body.len(),
            new_session = exchange.session_cookie.is_some(),
            "Response received"
        );

        exchange.outcome = codec::decode_response(&response.body).map_err(|e| match e {
            Error::Protocol(msg) if !response.is_success() => {
                Error::Protocol(format!("HTTP status {}: {}", response.status, msg))
            }
            other => other,
        });

        match &exchange.outcome {
            Ok(_) => self.record(path, start, Ok(())),
            Err(e) => {
                tracing::warn!(error = %e, kind = e.kind(), "Call failed");
                self.record(path, start, Err(e));
            }
        }

        exchange
    }

    fn record(&self, path: &str, start: Instant, outcome: std::result::Result<(), &Error>) {
        if let Some(ref m) = self.metrics {
            let duration = start.elapsed().as_secs_f64();
            match outcome {
                Ok(()) => m.record_request(path, "success", duration),
                Err(e) => {
                    m.record_request(path, "error", duration);
                    m.record_error(e.kind());
                }
            }
        }
    }

    /// Authenticate and store the session
    ///
    /// Some server versions answer bad credentials with a successful
    /// response whose `uid` is unset; that is reported as
    /// [`AuthenticationFailure::InvalidCredentials`]. On any failure the
    /// previous session, cookie included, is left untouched.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use odoo_jrpc_client::OdooClient;
    ///
    /// # async fn example() -> odoo_jrpc_core::Result<()> {
    /// let client = OdooClient::builder("https://erp.example.com", "prod").build()?;
    /// let user = client.login("admin", "secret").await?;
    /// println!("logged in as {} (uid {})", user.name, user.uid);
    /// # Ok(())
    /// # }
    /// ```
    #[tracing::instrument(skip(self, password), fields(db = %self.db))]
    pub async fn login(&self, username: &str, password: &str) -> Result<LoggedUser> {
        let params = json!({
            "db": self.db,
            "login": username,
            "password": password,
        });
        let exchange = self.exchange(AUTHENTICATE_PATH, params).await;

        let result = match exchange.outcome {
            Ok(result) => result,
            Err(e) => {
                self.record_login("error");
                return Err(e);
            }
        };

        if !result.get("uid").map_or(false, codec::is_truthy) {
            tracing::warn!("Login rejected: incorrect credentials");
            self.record_login("invalid_credentials");
            return Err(Error::Authentication(AuthenticationFailure::InvalidCredentials));
        }

        let cookie = match &exchange.session_cookie {
            Some(cookie) => Some(cookie.clone()),
            None => self.session.session_cookie().await,
        };
        let user = match LoggedUser::from_authenticate_result(&result, cookie.as_deref()) {
            Ok(user) => user,
            Err(e) => {
                self.record_login("error");
                return Err(e);
            }
        };

        if !self
            .session
            .establish(exchange.request_id, exchange.session_cookie, user.clone())
            .await
        {
            tracing::debug!(
                id = exchange.request_id,
                "A newer login already replaced this session"
            );
        }

        self.record_login("success");
        tracing::info!(uid = user.uid, "Logged in");
        Ok(user)
    }

    fn record_login(&self, outcome: &str) {
        if let Some(ref m) = self.metrics {
            m.record_login(outcome);
        }
    }

    /// Invoke `method` on `model` through `/web/dataset/call_kw`
    ///
    /// `kwargs` is copied; with [`CallOptions::include_context`] the copy gets
    /// the session's user context under `context`. The caller's map is never
    /// modified.
    ///
    /// # Errors
    ///
    /// [`AuthenticationFailure::NotAuthenticated`] without any network
    /// traffic when no login has succeeded; otherwise whatever the round trip
    /// reports.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use odoo_jrpc_client::{CallOptions, OdooClient};
    /// use serde_json::{json, Map};
    ///
    /// # async fn example(client: OdooClient) -> odoo_jrpc_core::Result<()> {
    /// let mut kwargs = Map::new();
    /// kwargs.insert("fields".into(), json!(["name", "email"]));
    /// kwargs.insert("limit".into(), json!(5));
    ///
    /// let partners = client
    ///     .call(
    ///         "res.partner",
    ///         "search_read",
    ///         &[json!([["is_company", "=", true]])],
    ///         &kwargs,
    ///         CallOptions::default(),
    ///     )
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    #[tracing::instrument(skip(self, args, kwargs), fields(model = %model, method = %method))]
    pub async fn call(
        &self,
        model: &str,
        method: &str,
        args: &[Value],
        kwargs: &Map<String, Value>,
        options: CallOptions,
    ) -> Result<Value> {
        let Some(context) = self.session.user_context().await else {
            tracing::warn!("Call attempted before login");
            if let Some(ref m) = self.metrics {
                m.record_error("authentication");
            }
            return Err(Error::Authentication(AuthenticationFailure::NotAuthenticated));
        };

        let mut kwargs = kwargs.clone();
        if options.include_context {
            kwargs.insert("context".to_string(), serde_json::to_value(&context)?);
        }

        self.rpc_call(
            CALL_KW_PATH,
            json!({
                "model": model,
                "method": method,
                "args": args,
                "kwargs": kwargs,
            }),
        )
        .await
    }

    /// [`call`](Self::call) with the result deserialized into `R`
    pub async fn call_typed<R: DeserializeOwned>(
        &self,
        model: &str,
        method: &str,
        args: &[Value],
        kwargs: &Map<String, Value>,
        options: CallOptions,
    ) -> Result<R> {
        let value = self.call(model, method, args, kwargs, options).await?;
        serde_json::from_value(value).map_err(|e| Error::Serialization(e.to_string()))
    }
}
