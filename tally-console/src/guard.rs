//! Route guard
//!
//! 前端路由的访问控制 (仅为便利，真正的鉴权由服务端负责)。
//!
//! - 除 `Login` 外所有路由都需要登录
//! - 分店/管理员/权限/备份/统计仅限 superuser
//! - admin 访问其他路由还需要对应的权限

use serde::{Deserialize, Serialize};
use shared::client::Role;
use shared::{AppError, AppResult, ErrorKind};

use crate::session::AuthState;

/// Console screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Login,
    Dashboard,
    Products,
    Categories,
    Brands,
    Sales,
    Debts,
    Reports,
    Cart,
    Branches,
    Admins,
    Permissions,
    Backup,
    Statistics,
}

/// Screens an admin may never open
pub const SUPERUSER_ONLY: &[Route] = &[
    Route::Branches,
    Route::Admins,
    Route::Permissions,
    Route::Backup,
    Route::Statistics,
];

impl Route {
    pub fn is_superuser_only(&self) -> bool {
        SUPERUSER_ONLY.contains(self)
    }

    /// Permission an admin needs for this route
    pub fn permission(&self) -> Option<&'static str> {
        match self {
            Self::Products | Self::Categories | Self::Brands => Some("products"),
            Self::Sales | Self::Cart => Some("sales"),
            Self::Debts => Some("debts"),
            Self::Reports => Some("reports"),
            _ => None,
        }
    }
}

/// Outcome of a guard check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    /// Not logged in: go to the login screen
    LoginRequired,
    Denied,
}

pub struct RouteGuard;

impl RouteGuard {
    pub fn check(auth: &AuthState, route: Route) -> Access {
        if route == Route::Login {
            return Access::Granted;
        }
        if !auth.is_authenticated {
            return Access::LoginRequired;
        }
        match auth.role {
            Some(Role::Superuser) => Access::Granted,
            Some(Role::Admin) if route.is_superuser_only() => Access::Denied,
            Some(Role::Admin) => match route.permission() {
                Some(p) if !auth.can(p) => Access::Denied,
                _ => Access::Granted,
            },
            None => Access::LoginRequired,
        }
    }

    /// [`RouteGuard::check`] as a result
    pub fn require(auth: &AuthState, route: Route) -> AppResult<()> {
        match Self::check(auth, route) {
            Access::Granted => Ok(()),
            Access::LoginRequired => Err(AppError::with_message(
                ErrorKind::Unauthorized,
                "Please log in first",
            )),
            Access::Denied => Err(AppError::forbidden(format!(
                "Your account cannot open {route:?}"
            ))
            .with_detail("route", format!("{route:?}"))),
        }
    }
}
