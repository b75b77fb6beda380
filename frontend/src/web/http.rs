//! HTTP 传输层
//!
//! 使用 `web_sys::fetch` 实现 `HttpTransport`，超时通过 `AbortSignal.timeout` 实现。

use async_trait::async_trait;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortSignal, Headers, Request, RequestInit, Response};

use crate::api::HttpTransport;
use crate::api::client::{HttpRequest, HttpResponse};
use crate::api::error::TransportError;
use crate::serde_helper::JsErrorInfo;

/// 基于 `window.fetch` 的传输层
pub struct FetchTransport {
    timeout_ms: u32,
}

impl FetchTransport {
    pub fn new(timeout_ms: u32) -> Self {
        Self { timeout_ms }
    }

    fn build_request(&self, req: &HttpRequest) -> Result<Request, JsValue> {
        let headers = Headers::new()?;
        for (key, value) in &req.headers {
            headers.set(key, value)?;
        }

        let opts = RequestInit::new();
        opts.set_method(req.method.as_str());
        opts.set_headers(&headers.into());
        opts.set_signal(Some(&AbortSignal::timeout_with_u32(self.timeout_ms)));

        if let Some(body) = &req.body {
            opts.set_body(&JsValue::from_str(body));
        }

        Request::new_with_str_and_init(&req.url, &opts)
    }
}

/// fetch 的拒绝值转为 `TransportError`
///
/// 超时时浏览器抛出 `TimeoutError`，网络不可达时抛出 `TypeError: Failed to fetch`。
fn transport_error(value: JsValue) -> TransportError {
    let info = JsErrorInfo::from_js(&value);
    let error = TransportError::new(info.message);
    match info.code.or(info.name) {
        Some(code) => error.with_code(code),
        None => error,
    }
}

async fn read_text(response: &Response) -> Result<String, TransportError> {
    let promise = response.text().map_err(transport_error)?;
    let text = JsFuture::from(promise).await.map_err(transport_error)?;
    Ok(text.as_string().unwrap_or_default())
}

#[async_trait(?Send)]
impl HttpTransport for FetchTransport {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        let request = self
            .build_request(&req)
            .map_err(|e| TransportError::build_failed(JsErrorInfo::from_js(&e).message))?;

        let window =
            web_sys::window().ok_or_else(|| TransportError::new("无法获取 window 对象"))?;

        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(transport_error)?;

        let response: Response = resp_value
            .dyn_into()
            .map_err(|_| TransportError::new("Response 类型转换失败"))?;

        Ok(HttpResponse {
            status: response.status(),
            status_text: response.status_text(),
            body: read_text(&response).await?,
        })
    }
}
