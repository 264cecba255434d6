//! Session - 登录状态
//!
//! 保存当前用户、角色、令牌与权限列表。令牌过期 (JWT `exp`) 或服务端
//! 返回 401 后必须重新登录，没有刷新流程。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use shared::client::{Role, UserInfo};
use shared::types::Permission;
use shared::util::now_secs;
use shared::{AppError, AppResult};
use tally_client::HttpClient;

use crate::store::RequestStatus;

/// Persisted authentication slice
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthState {
    #[serde(default)]
    pub is_authenticated: bool,
    #[serde(default)]
    pub user: Option<UserInfo>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
    /// Unix timestamp from the token's `exp` claim
    #[serde(default)]
    pub expires_at: Option<u64>,
    #[serde(default)]
    pub status: RequestStatus,
    #[serde(default)]
    pub error: Option<AppError>,
}

impl AuthState {
    pub fn is_expired(&self, now: u64) -> bool {
        self.expires_at.is_some_and(|exp| now >= exp)
    }

    /// Whether the permission list grants `action`
    pub fn can(&self, action: &str) -> bool {
        self.permissions.iter().any(|p| p.grants(action))
    }
}

/// 从 JWT token 中解析过期时间 (Unix timestamp)
pub fn parse_jwt_exp(token: &str) -> Option<u64> {
    use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};

    // JWT 格式: header.payload.signature
    let mut parts = token.split('.');
    let (Some(_), Some(payload), Some(_), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };

    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    claims.get("exp")?.as_u64()
}

/// Authentication gate
pub struct Session {
    http: HttpClient,
    state: AuthState,
    expired: Arc<AtomicBool>,
}

impl Session {
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            state: AuthState::default(),
            expired: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag raised by controllers when the server answers 401
    pub fn expiry_flag(&self) -> Arc<AtomicBool> {
        self.expired.clone()
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated
    }

    pub fn user(&self) -> Option<&UserInfo> {
        self.state.user.as_ref()
    }

    pub fn role(&self) -> Option<Role> {
        self.state.role
    }

    pub fn error(&self) -> Option<&AppError> {
        self.state.error.as_ref()
    }

    /// Log in against the role's endpoint
    ///
    /// On failure the session stays unauthenticated and keeps its user.
    pub async fn login(&mut self, role: Role, username: &str, password: &str) -> AppResult<&UserInfo> {
        if username.trim().is_empty() || password.is_empty() {
            let err = AppError::validation("Username and password are required");
            self.state.status = RequestStatus::Rejected;
            self.state.error = Some(err.clone());
            return Err(err);
        }

        self.state.status = RequestStatus::Pending;
        self.state.error = None;

        match self.http.login(role, username, password).await {
            Ok(login) => {
                let expires_at = parse_jwt_exp(&login.access_token);
                self.state = AuthState {
                    is_authenticated: true,
                    user: Some(login.user),
                    role: Some(role),
                    access_token: Some(login.access_token),
                    refresh_token: login.refresh_token,
                    permissions: login.permissions.into_iter().map(Permission).collect(),
                    expires_at,
                    status: RequestStatus::Fulfilled,
                    error: None,
                };
                self.expired.store(false, Ordering::SeqCst);
                tracing::info!(%role, username, "session started");
                match &self.state.user {
                    Some(user) => Ok(user),
                    None => Err(AppError::unauthorized()),
                }
            }
            Err(e) => {
                let err = AppError::from(e);
                tracing::warn!(%role, username, message = %err.message, "login failed");
                self.state.is_authenticated = false;
                self.state.status = RequestStatus::Rejected;
                self.state.error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Adopt a persisted session, installing its token on the client
    ///
    /// Expired sessions are discarded.
    pub async fn restore(&mut self, state: AuthState) -> bool {
        let usable = state.is_authenticated
            && state.access_token.is_some()
            && !state.is_expired(now_secs());
        if !usable {
            if state.is_authenticated {
                tracing::info!("stored session expired, login required");
            }
            self.state = AuthState::default();
            self.http.clear_token().await;
            return false;
        }

        if let Some(token) = &state.access_token {
            self.http.set_token(token.clone()).await;
        }
        self.state = state;
        self.expired.store(false, Ordering::SeqCst);
        true
    }

    /// Drop the session if its token expired locally or was rejected
    ///
    /// Returns `true` when a new login is required.
    pub async fn check_expiry(&mut self) -> bool {
        if !self.state.is_authenticated {
            return true;
        }
        let rejected = self.expired.load(Ordering::SeqCst);
        if rejected || self.state.is_expired(now_secs()) {
            tracing::info!(rejected, "session expired");
            self.reset().await;
            self.state.error = Some(AppError::with_message(
                shared::ErrorKind::Unauthorized,
                "Session expired, please log in again",
            ));
            return true;
        }
        false
    }

    /// Log out on the server, then clear local state whatever the outcome
    pub async fn logout(&mut self) -> AppResult<()> {
        let result = self.http.logout().await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "server logout failed, clearing local session anyway");
        }
        self.reset().await;
        result.map_err(AppError::from)
    }

    async fn reset(&mut self) {
        self.http.clear_token().await;
        self.state = AuthState::default();
        self.expired.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};

    fn jwt(claims: &str) -> String {
        format!(
            "{}.{}.sig",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256"}"#),
            URL_SAFE_NO_PAD.encode(claims)
        )
    }

    #[test]
    fn test_parse_jwt_exp() {
        assert_eq!(parse_jwt_exp(&jwt(r#"{"exp":1700000000}"#)), Some(1_700_000_000));
        assert_eq!(parse_jwt_exp(&jwt(r#"{"sub":"a"}"#)), None);
        assert_eq!(parse_jwt_exp("opaque-token"), None);
        assert_eq!(parse_jwt_exp("a.b.c.d"), None);
    }

    #[test]
    fn test_expiry_and_permissions() {
        let state = AuthState {
            is_authenticated: true,
            expires_at: Some(100),
            permissions: vec![Permission::from("products:*"), Permission::from("sales")],
            ..Default::default()
        };
        assert!(!state.is_expired(99));
        assert!(state.is_expired(100));
        assert!(state.can("products"));
        assert!(state.can("sales"));
        assert!(!state.can("debts"));
    }

    #[tokio::test]
    async fn test_restore_rejects_expired() {
        let http = tally_client::ClientConfig::default().build_http_client().unwrap();
        let mut session = Session::new(http.clone());
        let restored = session
            .restore(AuthState {
                is_authenticated: true,
                access_token: Some("t".into()),
                expires_at: Some(1),
                ..Default::default()
            })
            .await;
        assert!(!restored);
        assert!(!session.is_authenticated());
        assert!(http.token().await.is_none());
    }

    #[tokio::test]
    async fn test_rejected_token_forces_login() {
        let http = tally_client::ClientConfig::default().build_http_client().unwrap();
        let mut session = Session::new(http.clone());
        assert!(
            session
                .restore(AuthState {
                    is_authenticated: true,
                    access_token: Some("t".into()),
                    ..Default::default()
                })
                .await
        );
        assert_eq!(http.token().await.as_deref(), Some("t"));

        session.expiry_flag().store(true, Ordering::SeqCst);
        assert!(session.check_expiry().await);
        assert!(!session.is_authenticated());
        assert!(http.token().await.is_none());
    }
}
