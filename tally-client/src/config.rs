//! Client configuration

use serde::{Deserialize, Serialize};

/// How the token is written into the `authorization` header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    /// The bare token, as the backend has historically received it
    #[default]
    Raw,
    /// `Bearer <token>`
    Bearer,
}

impl AuthScheme {
    /// Header value for `token`
    pub fn header_value(&self, token: &str) -> String {
        match self {
            Self::Raw => token.to_string(),
            Self::Bearer => format!("Bearer {token}"),
        }
    }
}

impl std::str::FromStr for AuthScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "raw" | "" => Ok(Self::Raw),
            "bearer" => Ok(Self::Bearer),
            other => Err(format!("unknown auth scheme: {other}")),
        }
    }
}

/// Shop/branch scope, sent as the `shop_id` and `branch` headers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    #[serde(default)]
    pub shop_id: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
}

impl Scope {
    pub fn new(shop_id: Option<String>, branch: Option<String>) -> Self {
        Self { shop_id, branch }
    }

    pub fn is_empty(&self) -> bool {
        self.shop_id.is_none() && self.branch.is_none()
    }
}

/// Client configuration for connecting to the backend
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:8080/api")
    pub base_url: String,

    /// Access token
    pub token: Option<String>,

    /// Authorization header scheme
    pub auth_scheme: AuthScheme,

    /// Scope headers
    pub scope: Scope,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            auth_scheme: AuthScheme::Raw,
            scope: Scope::default(),
            timeout: 30,
        }
    }

    /// Set the access token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the authorization scheme
    pub fn with_auth_scheme(mut self, scheme: AuthScheme) -> Self {
        self.auth_scheme = scheme;
        self
    }

    /// Set the scope headers
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Create an HTTP client from this configuration
    pub fn build_http_client(&self) -> crate::ClientResult<crate::HttpClient> {
        crate::HttpClient::new(self)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}
