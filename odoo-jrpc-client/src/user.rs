//! Logged-in user and user context
//!
//! These are built from the result of `/web/session/authenticate`. Field
//! names on the wire are mapped one by one; a local name matching a wire
//! name is a coincidence, not a contract.

use odoo_jrpc_core::{Error, Result, SESSION_COOKIE_PREFIX};
use serde::{Deserialize, Deserializer, Serialize};

/// Snapshot of the user's context taken at login
///
/// Injected as `kwargs.context` into authenticated calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    /// Locale, e.g. `en_US`
    pub lang: String,
    /// Timezone, e.g. `Europe/Brussels`; empty when the user has none
    pub tz: String,
    /// User id
    pub uid: i64,
}

/// The authenticated user of a client session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedUser {
    pub uid: i64,
    pub username: String,
    pub session_id: String,
    pub partner_id: i64,
    pub name: String,
    pub is_admin: bool,
    pub is_superuser: bool,
    pub company_id: i64,
    pub context: UserContext,
}

#[derive(Deserialize)]
struct AuthenticateResult {
    uid: i64,
    username: String,
    #[serde(default)]
    session_id: Option<String>,
    partner_id: i64,
    name: String,
    #[serde(default)]
    is_admin: bool,
    #[serde(default)]
    is_superuser: bool,
    company_id: i64,
    user_context: WireUserContext,
}

#[derive(Deserialize)]
struct WireUserContext {
    #[serde(deserialize_with = "string_or_false")]
    lang: String,
    #[serde(default, deserialize_with = "string_or_false")]
    tz: String,
    uid: i64,
}

// Odoo sends `false` for unset char fields.
fn string_or_false<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Lenient::deserialize(deserializer)? {
        Lenient::Text(s) => s,
        Lenient::Other(_) => String::new(),
    })
}

impl LoggedUser {
    /// Map an authenticate result onto a user
    ///
    /// Newer servers no longer echo `session_id` in the body; the value of
    /// the session cookie is used instead. The caller has already checked
    /// that `uid` is set.
    ///
    /// # Errors
    ///
    /// [`Error::Protocol`] when a required field is missing or has the wrong
    /// type, or when no session id can be found at all.
    pub(crate) fn from_authenticate_result(
        result: &serde_json::Value,
        session_cookie: Option<&str>,
    ) -> Result<Self> {
        let wire: AuthenticateResult = serde_json::from_value(result.clone())
            .map_err(|e| Error::Protocol(format!("unexpected authenticate result: {}", e)))?;

        let session_id = wire
            .session_id
            .or_else(|| {
                session_cookie
                    .and_then(|c| c.strip_prefix(SESSION_COOKIE_PREFIX))
                    .map(str::to_string)
            })
            .ok_or_else(|| Error::Protocol("authenticate result carries no session id".into()))?;

        Ok(Self {
            uid: wire.uid,
            username: wire.username,
            session_id,
            partner_id: wire.partner_id,
            name: wire.name,
            is_admin: wire.is_admin,
            is_superuser: wire.is_superuser,
            company_id: wire.company_id,
            context: UserContext {
                lang: wire.user_context.lang,
                tz: wire.user_context.tz,
                uid: wire.user_context.uid,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn authenticate_result() -> serde_json::Value {
        json!({
            "uid": 7,
            "partner_id": 3,
            "session_id": "s1",
            "company_id": 1,
            "name": "A",
            "username": "a",
            "is_admin": false,
            "is_superuser": false,
            "user_context": {"lang": "en_US", "tz": "UTC", "uid": 7}
        })
    }

    #[test]
    fn test_maps_every_field() {
        let user = LoggedUser::from_authenticate_result(&authenticate_result(), None).unwrap();

        assert_eq!(user.uid, 7);
        assert_eq!(user.partner_id, 3);
        assert_eq!(user.session_id, "s1");
        assert_eq!(user.company_id, 1);
        assert_eq!(user.name, "A");
        assert_eq!(user.username, "a");
        assert!(!user.is_admin);
        assert!(!user.is_superuser);
        assert_eq!(
            user.context,
            UserContext {
                lang: "en_US".into(),
                tz: "UTC".into(),
                uid: 7
            }
        );
    }

    #[test]
    fn test_session_id_from_cookie() {
        let mut result = authenticate_result();
        result.as_object_mut().unwrap().remove("session_id");

        let user =
            LoggedUser::from_authenticate_result(&result, Some("session_id=cookie42")).unwrap();
        assert_eq!(user.session_id, "cookie42");

        let err = LoggedUser::from_authenticate_result(&result, None).unwrap_err();
        assert_eq!(err.kind(), "protocol");
    }

    #[test]
    fn test_false_timezone_becomes_empty() {
        let mut result = authenticate_result();
        result["user_context"]["tz"] = json!(false);

        let user = LoggedUser::from_authenticate_result(&result, None).unwrap();
        assert_eq!(user.context.tz, "");
    }

    #[test]
    fn test_missing_required_field_is_protocol_error() {
        let mut result = authenticate_result();
        result.as_object_mut().unwrap().remove("partner_id");

        match LoggedUser::from_authenticate_result(&result, None) {
            Err(Error::Protocol(msg)) => assert!(msg.contains("partner_id")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_context_serializes_for_kwargs() {
        let context = UserContext {
            lang: "fr_BE".into(),
            tz: "Europe/Brussels".into(),
            uid: 2,
        };
        assert_eq!(
            serde_json::to_value(&context).unwrap(),
            json!({"lang": "fr_BE", "tz": "Europe/Brussels", "uid": 2})
        );
    }
}
