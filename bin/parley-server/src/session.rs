//! Cookie-backed session state.
//!
//! The browser session is a signed HS256 token carried in an HttpOnly
//! cookie.  The claims hold the authenticated user plus the active-chat
//! pointer `(chat_id, session_id)`; every transition that changes the active
//! chat re-issues the cookie.  There is no server-side session table, so
//! "logout" is simply clearing the cookie and expiry is the token's `exp`.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue, header};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::ServerError;
use crate::state::AppState;

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "parley_session";

/// Session lifetime in seconds (7 days).
const SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Signed cookie payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id.
    pub sub: String,
    pub username: String,
    /// Active chat, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
    /// Active chat's history join key, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Expiry (unix seconds).
    pub exp: i64,
}

impl SessionClaims {
    /// Fresh claims for `user`, optionally pointing at an active chat.
    pub fn new(
        user_id: impl Into<String>,
        username: impl Into<String>,
        active_chat: Option<(String, String)>,
    ) -> Self {
        let (chat_id, session_id) = match active_chat {
            Some((c, s)) => (Some(c), Some(s)),
            None => (None, None),
        };
        Self {
            sub: user_id.into(),
            username: username.into(),
            chat_id,
            session_id,
            exp: Utc::now().timestamp() + SESSION_TTL_SECS,
        }
    }
}

/// Signs and verifies session cookies.  Cheap to clone.
#[derive(Clone)]
pub struct SessionManager {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SessionManager")
    }
}

impl SessionManager {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }

    fn sign(&self, claims: &SessionClaims) -> Result<String, ServerError> {
        encode(&Header::default(), claims, &self.encoding)
            .map_err(|e| ServerError::Internal(format!("failed to sign session token: {e}")))
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, ServerError> {
        decode::<SessionClaims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| ServerError::Unauthorized("session expired or invalid".into()))
    }

    /// `Set-Cookie` headers installing `claims` as the session.
    pub fn issue(&self, claims: &SessionClaims) -> Result<HeaderMap, ServerError> {
        let token = self.sign(claims)?;
        let cookie = format!(
            "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={SESSION_TTL_SECS}"
        );
        let mut headers = HeaderMap::new();
        headers.insert(
            header::SET_COOKIE,
            HeaderValue::from_str(&cookie)
                .map_err(|e| ServerError::Internal(format!("invalid cookie value: {e}")))?,
        );
        Ok(headers)
    }

    /// `Set-Cookie` headers removing the session.
    pub fn clear(&self) -> HeaderMap {
        let cookie = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
        let mut headers = HeaderMap::new();
        // Static ASCII, cannot fail.
        if let Ok(v) = HeaderValue::from_str(&cookie) {
            headers.insert(header::SET_COOKIE, v);
        }
        headers
    }
}

/// Extract the value of cookie `name` from the `Cookie` request header.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (k, v) = pair.trim().split_once('=')?;
        (k == name).then(|| v.to_owned())
    })
}

/// The authenticated caller, extracted from the session cookie.
///
/// Handlers that take this argument reject cookie-less or invalid-cookie
/// requests with 401 before the handler body runs.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub user_id: String,
    pub username: String,
    pub chat_id: Option<String>,
    pub session_id: Option<String>,
}

impl SessionUser {
    /// Claims preserving this user but pointing at a new active chat.
    pub fn with_active_chat(&self, chat_id: String, session_id: String) -> SessionClaims {
        SessionClaims::new(
            self.user_id.clone(),
            self.username.clone(),
            Some((chat_id, session_id)),
        )
    }

    /// Claims preserving this user with no active chat.
    pub fn without_active_chat(&self) -> SessionClaims {
        SessionClaims::new(self.user_id.clone(), self.username.clone(), None)
    }
}

impl FromRequestParts<Arc<AppState>> for SessionUser {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = cookie_value(&parts.headers, SESSION_COOKIE)
            .ok_or_else(|| ServerError::Unauthorized("login required".into()))?;
        let claims = state.sessions.verify(&token)?;
        Ok(Self {
            user_id: claims.sub,
            username: claims.username,
            chat_id: claims.chat_id,
            session_id: claims.session_id,
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sign_verify_round_trip() {
        let mgr = SessionManager::new("secret");
        let claims = SessionClaims::new("u1", "alice", Some(("c1".into(), "s1".into())));
        let token = mgr.sign(&claims).unwrap();

        let back = mgr.verify(&token).unwrap();
        assert_eq!(back.sub, "u1");
        assert_eq!(back.username, "alice");
        assert_eq!(back.chat_id.as_deref(), Some("c1"));
        assert_eq!(back.session_id.as_deref(), Some("s1"));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let mgr = SessionManager::new("secret");
        let claims = SessionClaims::new("u1", "alice", None);
        let token = mgr.sign(&claims).unwrap();

        let other = SessionManager::new("different");
        assert!(matches!(
            other.verify(&token),
            Err(ServerError::Unauthorized(_))
        ));
    }

    #[test]
    fn issued_cookie_is_httponly_and_scoped() {
        let mgr = SessionManager::new("secret");
        let claims = SessionClaims::new("u1", "alice", None);
        let headers = mgr.issue(&claims).unwrap();

        let cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("parley_session="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Path=/"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let mgr = SessionManager::new("secret");
        let headers = mgr.clear();
        let cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn cookie_value_picks_the_right_pair() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; parley_session=tok123; lang=en"),
        );
        assert_eq!(cookie_value(&headers, SESSION_COOKIE).as_deref(), Some("tok123"));
        assert!(cookie_value(&headers, "missing").is_none());
    }
}
