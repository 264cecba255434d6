//! HTTP client for network-based API calls

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, StatusCode, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::ApiResponse;
use shared::client::{LoginRequest, LoginResponse, Role};
use shared::models::{Backup, Statistics};
use tokio::sync::RwLock;

use crate::{AuthScheme, ClientConfig, ClientError, ClientResult, Scope};

/// Error body the backend sends with non-success statuses
#[derive(serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Token and scope, shared by every clone of the client
#[derive(Debug, Default)]
struct Credentials {
    token: Option<String>,
    scheme: AuthScheme,
    scope: Scope,
}

impl Credentials {
    fn authorization(&self) -> Option<String> {
        self.token.as_deref().map(|t| self.scheme.header_value(t))
    }
}

/// HTTP client for making requests to the backend
///
/// Cloning is cheap; clones share the token and scope, so a login through
/// one clone authenticates every repository built from the others.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    credentials: Arc<RwLock<Credentials>>,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials: Arc::new(RwLock::new(Credentials {
                token: config.token.clone(),
                scheme: config.auth_scheme,
                scope: config.scope.clone(),
            })),
        })
    }

    /// Set the access token
    pub async fn set_token(&self, token: impl Into<String>) {
        self.credentials.write().await.token = Some(token.into());
    }

    /// Drop the access token
    pub async fn clear_token(&self) {
        self.credentials.write().await.token = None;
    }

    /// Get the current token
    pub async fn token(&self) -> Option<String> {
        self.credentials.read().await.token.clone()
    }

    /// Replace the scope headers
    pub async fn set_scope(&self, scope: Scope) {
        self.credentials.write().await.scope = scope;
    }

    /// Current scope headers
    pub async fn scope(&self) -> Scope {
        self.credentials.read().await.scope.clone()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Build a request carrying the authorization and scope headers
    async fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = self.url(path);
        let mut request = self.client.request(method, &url);

        let credentials = self.credentials.read().await;
        if let Some(auth) = credentials.authorization() {
            request = request.header(header::AUTHORIZATION, auth);
        }
        if let Some(shop_id) = &credentials.scope.shop_id {
            request = request.header("shop_id", shop_id);
        }
        if let Some(branch) = &credentials.scope.branch {
            request = request.header("branch", branch);
        }
        request
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> ClientResult<T> {
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        tracing::debug!(path, "GET");
        let request = self.request(Method::GET, path).await;
        self.send(request).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        tracing::debug!(path, "POST");
        let request = self.request(Method::POST, path).await.json(body);
        self.send(request).await
    }

    /// Make a POST request without body
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        tracing::debug!(path, "POST");
        let request = self.request(Method::POST, path).await;
        self.send(request).await
    }

    /// Make a PUT request with JSON body
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        tracing::debug!(path, "PUT");
        let request = self.request(Method::PUT, path).await.json(body);
        self.send(request).await
    }

    /// Make a DELETE request
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        tracing::debug!(path, "DELETE");
        let request = self.request(Method::DELETE, path).await;
        self.send(request).await
    }

    /// Handle the HTTP response
    ///
    /// Anything that is not JSON is rejected, whatever the status: proxies
    /// and misrouted requests answer with HTML pages.
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let is_json = content_type.contains("json");
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = is_json
                .then(|| serde_json::from_slice::<ErrorBody>(&body).ok())
                .flatten()
                .and_then(|b| b.message)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("Request failed")
                        .to_string()
                });
            tracing::warn!(status = status.as_u16(), %message, "request rejected");
            return Err(match status {
                StatusCode::UNAUTHORIZED => ClientError::Unauthorized(message),
                StatusCode::FORBIDDEN => ClientError::Forbidden(message),
                StatusCode::NOT_FOUND => ClientError::NotFound(message),
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                    ClientError::Validation(message)
                }
                _ => ClientError::Api {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        if !is_json {
            tracing::warn!(status = status.as_u16(), %content_type, "non-JSON response");
            return Err(ClientError::UnexpectedContent {
                status: status.as_u16(),
                content_type,
            });
        }

        serde_json::from_slice(&body).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    // ========== Auth API ==========

    /// Login with username and password against the role's endpoint
    ///
    /// On success the returned access token is installed on this client.
    pub async fn login(&self, role: Role, username: &str, password: &str) -> ClientResult<LoginResponse> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        let login = self
            .post::<ApiResponse<LoginResponse>, _>(role.login_path(), &request)
            .await?
            .data
            .ok_or_else(|| ClientError::InvalidResponse("Missing login data".to_string()))?;

        self.set_token(login.access_token.clone()).await;
        tracing::info!(%role, username, "logged in");
        Ok(login)
    }

    /// Logout
    ///
    /// The local token is dropped even if the server call fails.
    pub async fn logout(&self) -> ClientResult<()> {
        let result = self
            .post_empty::<ApiResponse<serde_json::Value>>("auth/logout")
            .await;
        self.clear_token().await;
        result.map(|_| ())
    }

    // ========== Statistics API ==========

    /// Dashboard statistics
    pub async fn statistics(&self) -> ClientResult<Statistics> {
        self.get::<ApiResponse<Statistics>>("statistics")
            .await?
            .data
            .ok_or_else(|| ClientError::InvalidResponse("Missing statistics data".to_string()))
    }

    // ========== Backup API ==========

    /// Download a dump of every table
    pub async fn backup(&self) -> ClientResult<Backup> {
        self.get::<ApiResponse<Backup>>("backup")
            .await?
            .data
            .ok_or_else(|| ClientError::InvalidResponse("Missing backup data".to_string()))
    }

    /// Upload a dump produced by [`HttpClient::backup`]
    pub async fn restore(&self, backup: &Backup) -> ClientResult<String> {
        let response = self
            .post::<ApiResponse<serde_json::Value>, _>("restore", backup)
            .await?;
        Ok(response.message)
    }
}
