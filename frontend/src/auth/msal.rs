//! MSAL 浏览器绑定
//!
//! 通过 wasm_bindgen 调用页面全局加载的 `msal.PublicClientApplication`
//! （msal-browser 的 UMD 构建，由 index.html 引入）。

use std::cell::Cell;

use js_sys::{Function, Promise};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use super::provider::{AccountInfo, AuthError, IdentityProvider, LoginRequest};
use crate::config::AppConfig;
use crate::serde_helper::{self, JsErrorInfo};
use async_trait::async_trait;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = msal)]
    type PublicClientApplication;

    #[wasm_bindgen(constructor, catch, js_namespace = msal)]
    fn new(config: &JsValue) -> Result<PublicClientApplication, JsValue>;

    #[wasm_bindgen(method)]
    fn initialize(this: &PublicClientApplication) -> Promise;

    #[wasm_bindgen(method, js_name = handleRedirectPromise)]
    fn handle_redirect_promise(this: &PublicClientApplication) -> Promise;

    #[wasm_bindgen(method, catch, js_name = getAllAccounts)]
    fn get_all_accounts(this: &PublicClientApplication) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, js_name = acquireTokenSilent)]
    fn acquire_token_silent(this: &PublicClientApplication, request: &JsValue) -> Promise;

    #[wasm_bindgen(method, js_name = loginRedirect)]
    fn login_redirect(this: &PublicClientApplication, request: &JsValue) -> Promise;

    #[wasm_bindgen(method, js_name = logoutRedirect)]
    fn logout_redirect(this: &PublicClientApplication, request: &JsValue) -> Promise;
}

// =========================================================
// 配置
// =========================================================

/// msal-browser 的 LogLevel 枚举值
const LOG_LEVEL_ERROR: u8 = 0;
const LOG_LEVEL_WARNING: u8 = 1;
const LOG_LEVEL_INFO: u8 = 2;

/// 这些错误代码表示需要用户交互才能继续
const INTERACTION_REQUIRED_CODES: &[&str] = &[
    "interaction_required",
    "consent_required",
    "login_required",
    "no_tokens_found",
    "refresh_token_expired",
    "bad_token",
];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MsalConfig {
    auth: AuthOptions,
    cache: CacheOptions,
    system: SystemOptions,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthOptions {
    client_id: String,
    authority: String,
    known_authorities: Vec<String>,
    navigate_to_login_request_url: bool,
    post_logout_redirect_uri: String,
    redirect_uri: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CacheOptions {
    cache_location: &'static str,
    store_auth_state_in_cookie: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SystemOptions {
    allow_platform_broker: bool,
    logger_options: LoggerOptions,
}

/// `loggerCallback` 是函数，序列化后单独设置
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoggerOptions {
    log_level: u8,
}

impl MsalConfig {
    fn new(config: &AppConfig, origin: &str) -> Self {
        Self {
            auth: AuthOptions {
                client_id: config.client_id.clone(),
                authority: config.authority(),
                known_authorities: vec![config.known_authority()],
                navigate_to_login_request_url: false,
                post_logout_redirect_uri: origin.to_string(),
                redirect_uri: origin.to_string(),
            },
            cache: CacheOptions {
                cache_location: "localStorage",
                store_auth_state_in_cookie: false,
            },
            system: SystemOptions {
                allow_platform_broker: false,
                logger_options: LoggerOptions {
                    log_level: if cfg!(debug_assertions) {
                        LOG_LEVEL_INFO
                    } else {
                        LOG_LEVEL_ERROR
                    },
                },
            },
        }
    }
}

/// MSAL 日志转发到 `log`，包含个人信息的消息直接丢弃
fn logger_callback() -> Function {
    let closure = Closure::<dyn Fn(u8, String, bool)>::new(
        |level: u8, message: String, contains_pii: bool| {
            if contains_pii {
                return;
            }
            match level {
                LOG_LEVEL_ERROR => log::error!("[MSAL] {}", message),
                LOG_LEVEL_WARNING => log::warn!("[MSAL] {}", message),
                LOG_LEVEL_INFO => log::info!("[MSAL] {}", message),
                _ => log::debug!("[MSAL] {}", message),
            }
        },
    );
    // 泄漏闭包以保持回调存活
    closure.into_js_value().unchecked_into()
}

// =========================================================
// 请求 / 响应结构
// =========================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SilentRequest<'a> {
    scopes: &'a [String],
    account: &'a AccountInfo,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LogoutRequest<'a> {
    account: &'a AccountInfo,
    post_logout_redirect_uri: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthenticationResult {
    #[serde(default)]
    access_token: String,
    #[serde(default)]
    account: Option<AccountInfo>,
}

fn interop_error(e: serde_helper::Error) -> AuthError {
    AuthError::provider("interop_error", e.to_string())
}

/// 将 MSAL 抛出的异常映射为 `AuthError`
fn auth_error(value: JsValue) -> AuthError {
    let info = JsErrorInfo::from_js(&value);
    let interaction_required = info.name.as_deref() == Some("InteractionRequiredAuthError")
        || info
            .code
            .as_deref()
            .is_some_and(|c| INTERACTION_REQUIRED_CODES.contains(&c));

    if interaction_required {
        AuthError::InteractionRequired {
            message: info.message,
        }
    } else {
        AuthError::provider(
            info.code.or(info.name).unwrap_or_else(|| "unknown".to_string()),
            info.message,
        )
    }
}

async fn await_promise(promise: Promise) -> Result<JsValue, AuthError> {
    JsFuture::from(promise).await.map_err(auth_error)
}

// =========================================================
// Provider
// =========================================================

/// 基于 msal-browser 的身份提供方
pub struct MsalProvider {
    app: PublicClientApplication,
    initialized: Cell<bool>,
}

impl MsalProvider {
    pub fn new(config: &AppConfig, origin: &str) -> Result<Self, AuthError> {
        let options = serde_helper::to_value(&MsalConfig::new(config, origin)).map_err(interop_error)?;

        let logger = js_sys::Reflect::get(&options, &JsValue::from_str("system"))
            .and_then(|system| js_sys::Reflect::get(&system, &JsValue::from_str("loggerOptions")))
            .map_err(auth_error)?;
        serde_helper::set_property(&logger, "loggerCallback", &logger_callback())
            .map_err(interop_error)?;

        let app = PublicClientApplication::new(&options).map_err(auth_error)?;
        Ok(Self {
            app,
            initialized: Cell::new(false),
        })
    }

    /// 首次使用前完成初始化；MSAL 对重复初始化是幂等的
    async fn ensure_initialized(&self) -> Result<(), AuthError> {
        if self.initialized.get() {
            return Ok(());
        }
        await_promise(self.app.initialize()).await?;
        self.initialized.set(true);
        log::debug!("[Auth] MSAL 初始化完成");
        Ok(())
    }
}

#[async_trait(?Send)]
impl IdentityProvider for MsalProvider {
    async fn handle_redirect(&self) -> Result<Option<AccountInfo>, AuthError> {
        self.ensure_initialized().await?;
        let value = await_promise(self.app.handle_redirect_promise()).await?;
        let result: Option<AuthenticationResult> =
            serde_helper::from_value(value).map_err(interop_error)?;
        Ok(result.and_then(|r| r.account))
    }

    fn all_accounts(&self) -> Vec<AccountInfo> {
        // 初始化之前 MSAL 会拒绝访问缓存
        if !self.initialized.get() {
            return Vec::new();
        }
        match self.app.get_all_accounts() {
            Ok(value) => serde_helper::from_value(value).unwrap_or_else(|e| {
                log::warn!("[Auth] 无法解析缓存账户: {}", e);
                Vec::new()
            }),
            Err(e) => {
                log::warn!("[Auth] 读取缓存账户失败: {}", JsErrorInfo::from_js(&e).message);
                Vec::new()
            }
        }
    }

    async fn acquire_token_silent(
        &self,
        scopes: &[String],
        account: &AccountInfo,
    ) -> Result<String, AuthError> {
        self.ensure_initialized().await?;
        let request =
            serde_helper::to_value(&SilentRequest { scopes, account }).map_err(interop_error)?;
        let value = await_promise(self.app.acquire_token_silent(&request)).await?;
        let result: AuthenticationResult = serde_helper::from_value(value).map_err(interop_error)?;
        Ok(result.access_token)
    }

    async fn login_redirect(&self, request: LoginRequest) -> Result<(), AuthError> {
        self.ensure_initialized().await?;
        let request = serde_helper::to_value(&request).map_err(interop_error)?;
        await_promise(self.app.login_redirect(&request)).await?;
        Ok(())
    }

    async fn logout_redirect(
        &self,
        account: &AccountInfo,
        post_logout_redirect_uri: &str,
    ) -> Result<(), AuthError> {
        self.ensure_initialized().await?;
        let request = serde_helper::to_value(&LogoutRequest {
            account,
            post_logout_redirect_uri,
        })
        .map_err(interop_error)?;
        await_promise(self.app.logout_redirect(&request)).await?;
        Ok(())
    }
}
