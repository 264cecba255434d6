//! Client-related types
//!
//! Request/response types for the authentication endpoints.

use serde::{Deserialize, Serialize};

// =============================================================================
// Roles
// =============================================================================

/// The two authenticated roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Shop-wide visibility
    Superuser,
    /// Scoped to one branch and a permission list
    Admin,
}

impl Role {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Superuser => "superuser",
            Self::Admin => "admin",
        }
    }

    /// Login endpoint for this role
    pub fn login_path(&self) -> &'static str {
        match self {
            Self::Superuser => "auth/superuser/login",
            Self::Admin => "auth/admin/login",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "superuser" => Ok(Self::Superuser),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

// =============================================================================
// Auth API DTOs
// =============================================================================

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "access", alias = "token")]
    pub access_token: String,
    #[serde(default, alias = "refresh")]
    pub refresh_token: Option<String>,
    pub user: UserInfo,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Authenticated user information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(alias = "id")]
    pub uuid: String,
    pub username: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    /// Shop the user belongs to
    #[serde(default)]
    pub shop_id: Option<String>,
    /// Branch an admin is scoped to (none for superusers)
    #[serde(default)]
    pub branch: Option<String>,
}

impl UserInfo {
    /// Display name, falling back to the username
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.clone(),
            _ => self.username.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_and_paths() {
        assert_eq!("Superuser".parse::<Role>().unwrap(), Role::Superuser);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("cashier".parse::<Role>().is_err());
        assert_ne!(Role::Superuser.login_path(), Role::Admin.login_path());
    }

    #[test]
    fn test_login_response_aliases() {
        let resp: LoginResponse = serde_json::from_str(
            r#"{"access":"t1","refresh":"r1","user":{"id":"u1","username":"kim"},"permissions":["products"]}"#,
        )
        .unwrap();
        assert_eq!(resp.access_token, "t1");
        assert_eq!(resp.refresh_token.as_deref(), Some("r1"));
        assert_eq!(resp.user.uuid, "u1");
        assert_eq!(resp.user.display_name(), "kim");
        assert_eq!(resp.permissions, vec!["products".to_string()]);
    }
}
