//! API 错误归一化
//!
//! 所有 HTTP 调用的失败（服务端错误响应、传输层失败、令牌获取失败）
//! 都被转换为同一个 `ApiError`，调用方通过 `code` 或分类方法分支，无需匹配字符串。

use crate::auth::provider::AuthError;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use std::fmt;

// =========================================================
// 固定错误代码
// =========================================================

pub const CODE_TIMEOUT: &str = "TIMEOUT";
pub const CODE_NETWORK_ERROR: &str = "NETWORK_ERROR";
pub const CODE_NO_RESPONSE: &str = "NO_RESPONSE";
pub const CODE_UNAUTHENTICATED: &str = "UNAUTHENTICATED";
pub const CODE_INTERACTION_REQUIRED: &str = "INTERACTION_REQUIRED";
pub const CODE_AUTH_ERROR: &str = "AUTH_ERROR";
pub const CODE_INVALID_RESPONSE: &str = "INVALID_RESPONSE";
pub const CODE_REQUEST_BUILD_FAILED: &str = "REQUEST_BUILD_FAILED";
pub const CODE_UNKNOWN: &str = "UNKNOWN_ERROR";

const FALLBACK_MESSAGE: &str = "Request failed";

// =========================================================
// 传输层失败
// =========================================================

/// 传输层返回的原始失败信息（请求无法构造，或已发出但没有得到响应）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub code: Option<String>,
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// 浏览器拒绝构造请求（URL 或请求头非法），请求没有发出
    pub fn build_failed(message: impl Into<String>) -> Self {
        Self::new(message).with_code(CODE_REQUEST_BUILD_FAILED)
    }
}

/// 传输层失败类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFailure {
    Timeout,
    NetworkUnreachable,
    NoResponse,
    RequestBuild,
}

impl TransportFailure {
    /// 按错误代码与消息子串分类
    pub fn classify(error: &TransportError) -> Self {
        let code = error.code.as_deref().unwrap_or_default();
        let message = error.message.as_str();

        if code == CODE_REQUEST_BUILD_FAILED {
            return TransportFailure::RequestBuild;
        }

        if code == "ECONNABORTED"
            || code.to_ascii_lowercase().contains("timeout")
            || message.to_ascii_lowercase().contains("timeout")
        {
            return TransportFailure::Timeout;
        }

        if code == "ERR_NETWORK"
            || message.contains("Network Error")
            || message.contains("NetworkError")
            || message.contains("Failed to fetch")
        {
            return TransportFailure::NetworkUnreachable;
        }

        TransportFailure::NoResponse
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            TransportFailure::Timeout => CODE_TIMEOUT,
            TransportFailure::NetworkUnreachable => CODE_NETWORK_ERROR,
            TransportFailure::NoResponse => CODE_NO_RESPONSE,
            TransportFailure::RequestBuild => CODE_REQUEST_BUILD_FAILED,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            TransportFailure::Timeout => "Request timeout: The server did not respond in time",
            TransportFailure::NetworkUnreachable => {
                "Network error: Unable to connect to the server. Please check your internet connection."
            }
            TransportFailure::NoResponse => "Network error: No response from server",
            TransportFailure::RequestBuild => "Request could not be constructed",
        }
    }
}

// =========================================================
// 错误分类
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// 4xx，用户可修正
    Client,
    /// 5xx，值得重试但不会自动重试
    Server,
    /// 无状态码：连接、超时、DNS
    Network,
    /// 令牌获取失败
    Auth,
    Other,
}

// =========================================================
// 核心错误类型
// =========================================================

/// 归一化的 API 错误
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub message: String,
    /// 缺省表示传输层失败
    pub status: Option<u16>,
    /// 服务端返回的原始负载
    pub data: Option<Value>,
    pub code: Option<String>,
    /// ISO-8601 (UTC)
    pub timestamp: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            data: None,
            code: None,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    // --- Builders ---

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    // --- Constructors ---

    /// 服务端返回了非 2xx 响应
    ///
    /// 消息优先级：`message` 字段 > `error` 字段 > `errors` 中所有消息拼接 > 状态文本 > 通用兜底
    pub fn from_response(status: u16, status_text: &str, body: &str) -> Self {
        let data = parse_payload(body);

        let message = data
            .as_ref()
            .and_then(extract_message)
            .or_else(|| Some(status_text.trim().to_string()).filter(|s| !s.is_empty()))
            .unwrap_or_else(|| FALLBACK_MESSAGE.to_string());

        let code = data
            .as_ref()
            .and_then(|d| d.get("code"))
            .and_then(Value::as_str)
            .map(str::to_string);

        let mut error = ApiError::new(message).with_status(status);
        error.data = data;
        error.code = code;
        error
    }

    /// 传输层失败，没有得到响应
    pub fn from_transport(error: &TransportError) -> Self {
        let failure = TransportFailure::classify(error);
        ApiError::new(failure.message()).with_code(failure.error_code())
    }

    /// 令牌获取失败，请求未发出
    pub fn from_auth(error: &AuthError) -> Self {
        match error {
            AuthError::Unauthenticated => {
                ApiError::new(error.message()).with_code(CODE_UNAUTHENTICATED)
            }
            AuthError::InteractionRequired { message } => {
                ApiError::new(message.clone()).with_code(CODE_INTERACTION_REQUIRED)
            }
            AuthError::Provider { code, message } => ApiError::new(message.clone())
                .with_code(CODE_AUTH_ERROR)
                .with_data(serde_json::json!({ "providerCode": code })),
        }
    }

    // --- Accessors ---

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self.status, Some(s) if (400..500).contains(&s))
    }

    pub fn is_server_error(&self) -> bool {
        matches!(self.status, Some(s) if (500..600).contains(&s))
    }

    pub fn is_network_error(&self) -> bool {
        self.status.is_none()
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(
            self.code(),
            Some(CODE_UNAUTHENTICATED | CODE_INTERACTION_REQUIRED | CODE_AUTH_ERROR)
        )
    }

    pub fn kind(&self) -> ApiErrorKind {
        if self.is_auth_error() {
            ApiErrorKind::Auth
        } else if self.is_client_error() {
            ApiErrorKind::Client
        } else if self.is_server_error() {
            ApiErrorKind::Server
        } else if self.is_network_error() {
            ApiErrorKind::Network
        } else {
            ApiErrorKind::Other
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.code().unwrap_or(CODE_UNKNOWN))?;
        if let Some(status) = self.status {
            write!(f, " ({})", status)?;
        }
        write!(f, " {}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        ApiError::from_auth(&e)
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

// =========================================================
// 辅助函数
// =========================================================

/// 解析错误响应体：JSON 优先，否则保留原始文本
fn parse_payload(body: &str) -> Option<Value> {
    if body.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string())))
}

/// 从错误响应体中提取可读消息
pub fn extract_message(body: &Value) -> Option<String> {
    let non_empty_str = |key: &str| {
        body.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    if let Some(message) = non_empty_str("message") {
        return Some(message);
    }
    if let Some(error) = non_empty_str("error") {
        return Some(error);
    }

    // 字段名 -> 消息列表，按出现顺序拼接
    let errors = body.get("errors")?.as_object()?;
    let joined = errors
        .values()
        .flat_map(|messages| match messages {
            Value::Array(items) => items
                .iter()
                .filter_map(|m| m.as_str().map(str::to_string))
                .collect::<Vec<_>>(),
            Value::String(s) => vec![s.clone()],
            _ => Vec::new(),
        })
        .collect::<Vec<_>>()
        .join(", ");

    Some(joined).filter(|s| !s.is_empty())
}
