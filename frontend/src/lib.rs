//! DAFO Now 前端应用
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `web::route`: 路由定义（领域模型）
//! - `web::router`: 路由服务（核心引擎）
//! - `auth`: 会话状态与身份提供方
//! - `api`: HTTP 客户端与注册服务
//! - `flow`: 登录 / 注册流程的纯逻辑
//! - `components`: UI 组件层

mod api;
mod auth;
mod components {
    pub mod captcha;
    pub mod contacts_search;
    pub mod dashboard;
    mod icons;
    pub mod layout;
    pub mod login;
    pub mod notification;
}
mod config;
mod flow;
mod serde_helper;

use std::fmt;
use std::rc::Rc;

use crate::api::{ApiClient, SignupContext, SignupService};
use crate::auth::msal::MsalProvider;
use crate::auth::provider::{AuthError, IdentityProvider};
use crate::auth::token::TokenAcquirer;
use crate::auth::{AuthContext, AuthService, init_auth};
use crate::components::dashboard::{DashboardPage, OrdersPlaceholderPage};
use crate::components::login::LoginPage;
use crate::config::{AppConfig, ConfigError};

use leptos::prelude::*;

// 原生 Web API 封装模块
// 此模块提供对浏览器原生 API 的轻量级封装（fetch、History、setTimeout）。
pub(crate) mod web {
    pub mod http;
    pub mod route;
    pub mod router;
    pub mod timer;
}

use web::http::FetchTransport;
use web::route::AppRoute;
use web::router::{Router, RouterOutlet};

/// 启动失败（部署配置错误）
#[derive(Debug)]
enum StartupError {
    Config(ConfigError),
    Auth(AuthError),
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupError::Config(e) => write!(f, "{}", e),
            StartupError::Auth(e) => write!(f, "身份提供方初始化失败: {}", e),
        }
    }
}

impl From<ConfigError> for StartupError {
    fn from(e: ConfigError) -> Self {
        StartupError::Config(e)
    }
}

impl From<AuthError> for StartupError {
    fn from(e: AuthError) -> Self {
        StartupError::Auth(e)
    }
}

struct Services {
    config: AppConfig,
    auth: AuthService,
    signup: SignupService,
}

fn window_origin() -> String {
    web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_default()
}

/// 组装服务：身份提供方 -> 令牌获取 -> HTTP 客户端 -> 注册服务
fn build_services() -> Result<Services, StartupError> {
    let config = AppConfig::from_build_env()?;
    let origin = window_origin();

    let provider: Rc<dyn IdentityProvider> = Rc::new(MsalProvider::new(&config, &origin)?);
    let tokens = TokenAcquirer::new(provider.clone(), vec![config.api_scope.clone()])
        .with_redirect_uri(origin);
    let client = ApiClient::new(
        config.api_base_url.clone(),
        Rc::new(FetchTransport::new(config.request_timeout_ms)),
        Rc::new(tokens),
    );

    Ok(Services {
        auth: AuthService::new(provider),
        signup: SignupService::new(client),
        config,
    })
}

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Dashboard => view! { <DashboardPage /> }.into_any(),
        other => view! { <OrdersPlaceholderPage route=other /> }.into_any(),
    }
}

#[component]
fn Misconfigured(message: String) -> impl IntoView {
    view! {
        <div class="flex items-center justify-center min-h-screen bg-base-200">
            <div class="text-center max-w-md">
                <h1 class="text-3xl font-bold text-error">"Application is misconfigured"</h1>
                <p class="mt-4 text-base-content/70">{message}</p>
            </div>
        </div>
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 组装服务；配置错误只展示错误页面
    let Services {
        config,
        auth,
        signup,
    } = match build_services() {
        Ok(services) => services,
        Err(e) => {
            log::error!("[App] 启动失败: {}", e);
            return view! { <Misconfigured message=e.to_string() /> }.into_any();
        }
    };

    // 2. 提供上下文
    provide_context(config);
    provide_context(SignupContext::new(Rc::new(signup)));
    let auth_ctx = AuthContext::new(auth);
    provide_context(auth_ctx);

    // 3. 初始化会话（处理重定向回跳，否则查找缓存账户）
    init_auth(&auth_ctx);

    // 4. 认证与加载信号注入路由服务
    let is_authenticated = auth_ctx.is_authenticated_signal();
    let is_loading = auth_ctx.is_loading_signal();

    view! {
        <Router is_authenticated=is_authenticated is_loading=is_loading>
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
    .into_any()
}
