//! HTTP 客户端封装
//!
//! 负责：
//! - 拼接 URL 与查询参数
//! - 每次请求前获取访问令牌并附加 `Authorization: Bearer <token>`
//! - 将所有失败归一化为 `ApiError`

use std::rc::Rc;

use async_trait::async_trait;
use dafonow_shared::protocol::{ApiRequest, HttpMethod};
use dafonow_shared::{CONTENT_TYPE_JSON, HEADER_AUTHORIZATION, HEADER_CONTENT_TYPE};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::error::{
    ApiError, ApiResult, CODE_INVALID_RESPONSE, CODE_REQUEST_BUILD_FAILED, TransportError,
};
use crate::auth::provider::AuthError;

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

/// 通用 HTTP 请求结构
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// 通用 HTTP 响应结构
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl HttpResponse {
    /// 检查响应是否成功 (2xx)
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP 传输特性 (Trait)
/// (?Send) 是因为浏览器环境下 JS 对象不是 Send 的
#[async_trait(?Send)]
pub trait HttpTransport {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// 访问令牌来源
#[async_trait(?Send)]
pub trait TokenSource {
    async fn access_token(&self) -> Result<String, AuthError>;
}

// =========================================================
// 请求选项
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub query: Vec<(String, String)>,
    /// 公开接口不获取令牌，也不附加 Authorization 头
    pub public: bool,
}

impl RequestOptions {
    pub fn public() -> Self {
        Self {
            public: true,
            ..Default::default()
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

// =========================================================
// 客户端
// =========================================================

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Rc<dyn HttpTransport>,
    tokens: Rc<dyn TokenSource>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        transport: Rc<dyn HttpTransport>,
        tokens: Rc<dyn TokenSource>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            transport,
            tokens,
        }
    }

    fn url(&self, path: &str, query: &[(String, String)]) -> ApiResult<String> {
        let joined = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut url = Url::parse(&joined).map_err(|e| {
            ApiError::new(format!("Invalid request URL {}: {}", joined, e))
                .with_code(CODE_REQUEST_BUILD_FAILED)
        })?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url.into())
    }

    pub async fn get<R: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> ApiResult<R> {
        self.execute(HttpMethod::Get, path, None, options).await
    }

    pub async fn post<R, B>(&self, path: &str, body: &B, options: RequestOptions) -> ApiResult<R>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(HttpMethod::Post, path, Some(encode(body)?), options)
            .await
    }

    pub async fn put<R, B>(&self, path: &str, body: &B, options: RequestOptions) -> ApiResult<R>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(HttpMethod::Put, path, Some(encode(body)?), options)
            .await
    }

    pub async fn patch<R, B>(&self, path: &str, body: &B, options: RequestOptions) -> ApiResult<R>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(HttpMethod::Patch, path, Some(encode(body)?), options)
            .await
    }

    pub async fn delete<R: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> ApiResult<R> {
        self.execute(HttpMethod::Delete, path, None, options).await
    }

    /// 按 `ApiRequest` 声明的方法与路径发送请求
    pub async fn call<Q: ApiRequest>(&self, request: &Q, mut options: RequestOptions) -> ApiResult<Q::Response> {
        let body = if Q::METHOD.carries_body() {
            Some(encode(request)?)
        } else {
            options.query.extend(request.query_pairs());
            None
        };
        self.execute(Q::METHOD, Q::PATH, body, options).await
    }

    async fn execute<R: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<String>,
        options: RequestOptions,
    ) -> ApiResult<R> {
        let url = self.url(path, &options.query)?;
        let mut request =
            HttpRequest::new(&url, method).with_header(HEADER_CONTENT_TYPE, CONTENT_TYPE_JSON);

        // 令牌获取失败时请求不会发出
        if !options.public {
            let token = self.tokens.access_token().await.map_err(|e| {
                log::warn!("[Api] {} {} aborted: {}", method, path, e);
                ApiError::from_auth(&e)
            })?;
            request = request.with_header(HEADER_AUTHORIZATION, &format!("Bearer {}", token));
        }

        if let Some(body) = body {
            request = request.with_body(body);
        }

        log::debug!("[Api] {} {}", method, path);
        let response = self.transport.send(request).await.map_err(|e| {
            let error = ApiError::from_transport(&e);
            log::warn!("[Api] {} {} failed: {} ({})", method, path, error, e.message);
            error
        })?;

        if !response.ok() {
            if response.status == 401 && cfg!(debug_assertions) {
                log::error!("[Api] Unauthorized – token expired or invalid");
            }
            return Err(ApiError::from_response(
                response.status,
                &response.status_text,
                &response.body,
            ));
        }

        decode(&response)
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> ApiResult<String> {
    serde_json::to_string(body).map_err(|e| {
        ApiError::new(format!("Failed to encode request body: {}", e))
            .with_code(CODE_REQUEST_BUILD_FAILED)
    })
}

/// 空响应体按 JSON `null` 解析，使 `()` / `Option<T>` 响应可用
fn decode<R: DeserializeOwned>(response: &HttpResponse) -> ApiResult<R> {
    let body = if response.body.trim().is_empty() {
        "null"
    } else {
        response.body.as_str()
    };
    serde_json::from_str(body).map_err(|e| {
        ApiError::new(format!("Invalid response body: {}", e))
            .with_status(response.status)
            .with_code(CODE_INVALID_RESPONSE)
    })
}

#[cfg(test)]
pub(crate) mod tests;
