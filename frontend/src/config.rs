//! 运行时配置模块
//!
//! 配置值在构建时通过环境变量注入（Trunk / cargo 的 `option_env!`），
//! 启动时统一校验一次。缺少必填项属于部署错误，应用只展示错误页面。

use std::fmt;

pub const ENV_API_BASE: &str = "DAFONOW_API_BASE";
pub const ENV_API_SCOPE: &str = "DAFONOW_API_SCOPE";
pub const ENV_CLIENT_ID: &str = "DAFONOW_CLIENT_ID";
pub const ENV_TENANT_NAME: &str = "DAFONOW_TENANT_NAME";
pub const ENV_TURNSTILE_SITE_KEY: &str = "DAFONOW_TURNSTILE_SITE_KEY";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "DAFONOW_REQUEST_TIMEOUT_MS";

const DEFAULT_TURNSTILE_SITE_KEY: &str = "0x4AAAAAACLeEQVBdQeog0Gn";
const DEFAULT_REQUEST_TIMEOUT_MS: u32 = 30_000;

/// 配置错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// 必填项缺失或为空
    Missing(&'static str),
    /// 值无法解析
    Invalid { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(name) => write!(f, "缺少必填配置项: {}", name),
            ConfigError::Invalid { name, value } => {
                write!(f, "配置项 {} 的值无效: {:?}", name, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// 应用配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub api_scope: String,
    pub client_id: String,
    pub tenant_name: String,
    pub turnstile_site_key: String,
    pub request_timeout_ms: u32,
}

impl AppConfig {
    /// 从构建时环境变量读取配置
    pub fn from_build_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| {
            let value = match key {
                ENV_API_BASE => option_env!("DAFONOW_API_BASE"),
                ENV_API_SCOPE => option_env!("DAFONOW_API_SCOPE"),
                ENV_CLIENT_ID => option_env!("DAFONOW_CLIENT_ID"),
                ENV_TENANT_NAME => option_env!("DAFONOW_TENANT_NAME"),
                ENV_TURNSTILE_SITE_KEY => option_env!("DAFONOW_TURNSTILE_SITE_KEY"),
                ENV_REQUEST_TIMEOUT_MS => option_env!("DAFONOW_REQUEST_TIMEOUT_MS"),
                _ => None,
            };
            value.map(str::to_string)
        })
    }

    /// 通过任意键值查找函数构建配置
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &'static str| non_blank(key).ok_or(ConfigError::Missing(key));

        let request_timeout_ms = match non_blank(ENV_REQUEST_TIMEOUT_MS) {
            Some(raw) => raw.parse::<u32>().map_err(|_| ConfigError::Invalid {
                name: ENV_REQUEST_TIMEOUT_MS,
                value: raw,
            })?,
            None => DEFAULT_REQUEST_TIMEOUT_MS,
        };

        Ok(Self {
            api_base_url: required(ENV_API_BASE)?.trim_end_matches('/').to_string(),
            api_scope: required(ENV_API_SCOPE)?,
            client_id: required(ENV_CLIENT_ID)?,
            tenant_name: required(ENV_TENANT_NAME)?,
            turnstile_site_key: non_blank(ENV_TURNSTILE_SITE_KEY)
                .unwrap_or_else(|| DEFAULT_TURNSTILE_SITE_KEY.to_string()),
            request_timeout_ms,
        })
    }

    /// 身份提供方的 authority URL
    pub fn authority(&self) -> String {
        format!("https://{}/", self.known_authority())
    }

    pub fn known_authority(&self) -> String {
        format!("{}.ciamlogin.com", self.tenant_name)
    }
}
