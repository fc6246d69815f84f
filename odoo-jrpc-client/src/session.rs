//! Session state for one client
//!
//! Holds the three pieces of mutable state a client has:
//!
//! - the request id counter
//! - the session cookie captured from `Set-Cookie`
//! - the logged-in user
//!
//! All of it sits behind one `tokio::sync::Mutex`, so clones of a client
//! share it and concurrent calls never see a half-written session. The lock
//! is never held across a network await.
//!
//! # Stale responses
//!
//! Calls issued concurrently can complete out of order. Every stored cookie
//! and user remembers the id of the request whose response produced it, and
//! a response to an older request never replaces state written by a newer
//! one. A successful login goes further: its cookie also outranks every
//! request that was already in flight when it completed.

use crate::user::{LoggedUser, UserContext};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
struct Stamped<T> {
    request_id: u64,
    value: T,
}

#[derive(Debug, Default)]
struct Session {
    last_request_id: u64,
    cookie: Option<Stamped<String>>,
    user: Option<Stamped<LoggedUser>>,
}

impl Session {
    fn accept_cookie(&mut self, request_id: u64, cookie: String) -> bool {
        if matches!(&self.cookie, Some(current) if current.request_id >= request_id) {
            return false;
        }
        self.cookie = Some(Stamped {
            request_id,
            value: cookie,
        });
        true
    }
}

/// Shared, lock-protected session state
#[derive(Debug, Clone, Default)]
pub(crate) struct SessionState {
    inner: Arc<Mutex<Session>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next request id and read the cookie to send with it
    ///
    /// Ids start at 1 and are never reused.
    pub async fn begin_request(&self) -> (u64, Option<String>) {
        let mut session = self.inner.lock().await;
        session.last_request_id += 1;
        let cookie = session.cookie.as_ref().map(|c| c.value.clone());
        (session.last_request_id, cookie)
    }

    /// Store a cookie observed on the response to `request_id`
    ///
    /// Returns false when a newer response already stored one.
    pub async fn store_cookie(&self, request_id: u64, cookie: String) -> bool {
        self.inner.lock().await.accept_cookie(request_id, cookie)
    }

    /// Record a successful login
    ///
    /// The cookie (if any) and the user are written together. Returns false,
    /// writing nothing, when a newer login already completed.
    ///
    /// A login cookie outranks cookies from any request already sent: it is
    /// stamped with the latest allocated id, so responses still in flight
    /// cannot replace it.
    pub async fn establish(
        &self,
        request_id: u64,
        cookie: Option<String>,
        user: LoggedUser,
    ) -> bool {
        let mut session = self.inner.lock().await;
        if matches!(&session.user, Some(current) if current.request_id > request_id) {
            return false;
        }
        if let Some(cookie) = cookie {
            let stamp = session.last_request_id;
            session.cookie = Some(Stamped {
                request_id: stamp,
                value: cookie,
            });
        }
        session.user = Some(Stamped {
            request_id,
            value: user,
        });
        true
    }

    pub async fn logged_user(&self) -> Option<LoggedUser> {
        self.inner.lock().await.user.as_ref().map(|u| u.value.clone())
    }

    pub async fn user_context(&self) -> Option<UserContext> {
        self.inner
            .lock()
            .await
            .user
            .as_ref()
            .map(|u| u.value.context.clone())
    }

    pub async fn session_cookie(&self) -> Option<String> {
        self.inner.lock().await.cookie.as_ref().map(|c| c.value.clone())
    }

    pub async fn last_request_id(&self) -> u64 {
        self.inner.lock().await.last_request_id
    }
}
