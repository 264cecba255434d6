//! Console configuration
//!
//! # 环境变量
//!
//! | 环境变量 | 默认值 | 说明 |
//! |----------|--------|------|
//! | TALLY_API_URL | http://localhost:8080 | 后端 API 地址 |
//! | TALLY_TIMEOUT_SECS | 30 | 请求超时(秒) |
//! | TALLY_AUTH_SCHEME | - | `authorization` 头格式: raw / bearer，未设置时沿用本地设置，默认 raw |
//! | TALLY_SHOP_ID | - | `shop_id` 头 |
//! | TALLY_BRANCH | - | `branch` 头 |
//! | TALLY_DATA_DIR | ./.tally | 本地状态目录 |
//! | TALLY_LOG_DIR | {data_dir}/logs | 日志目录 |
//!
//! `.env` 文件会在读取前加载 (见 `main.rs`)。

use std::path::PathBuf;

use tally_client::{AuthScheme, ClientConfig, Scope};

#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// 后端 API 地址
    pub api_url: String,
    /// 请求超时 (秒)
    pub timeout_secs: u64,
    /// 未设置时使用本地设置中的值
    pub auth_scheme: Option<AuthScheme>,
    pub shop_id: Option<String>,
    pub branch: Option<String>,
    /// 本地状态目录
    pub data_dir: PathBuf,
    /// 日志目录
    pub log_dir: PathBuf,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        let data_dir = PathBuf::from(".tally");
        Self {
            api_url: "http://localhost:8080".into(),
            timeout_secs: 30,
            auth_scheme: None,
            shop_id: None,
            branch: None,
            log_dir: data_dir.join("logs"),
            data_dir,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl ConsoleConfig {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置或无法解析，使用默认值
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let data_dir = non_empty_var("TALLY_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);
        Self {
            api_url: non_empty_var("TALLY_API_URL").unwrap_or(defaults.api_url),
            timeout_secs: non_empty_var("TALLY_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_secs),
            auth_scheme: non_empty_var("TALLY_AUTH_SCHEME")
                .and_then(|v| {
                    v.parse::<AuthScheme>()
                        .inspect_err(|e| tracing::warn!(error = %e, "ignoring TALLY_AUTH_SCHEME"))
                        .ok()
                }),
            shop_id: non_empty_var("TALLY_SHOP_ID"),
            branch: non_empty_var("TALLY_BRANCH"),
            log_dir: non_empty_var("TALLY_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join("logs")),
            data_dir,
        }
    }

    pub fn scope(&self) -> Scope {
        Scope::new(self.shop_id.clone(), self.branch.clone())
    }

    /// HTTP client configuration; `fallback` applies when no scheme was configured
    pub fn client_config(&self, fallback: Option<AuthScheme>) -> ClientConfig {
        ClientConfig::new(&self.api_url)
            .with_auth_scheme(self.auth_scheme.or(fallback).unwrap_or_default())
            .with_scope(self.scope())
            .with_timeout(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConsoleConfig::default();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.log_dir, PathBuf::from(".tally/logs"));

        let client = config.client_config(None);
        assert_eq!(client.base_url, "http://localhost:8080");
        assert_eq!(client.auth_scheme, AuthScheme::Raw);
        assert!(client.scope.is_empty());

        let client = config.client_config(Some(AuthScheme::Bearer));
        assert_eq!(client.auth_scheme, AuthScheme::Bearer);
    }
}
