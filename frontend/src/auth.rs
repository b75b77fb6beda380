//! 认证模块
//!
//! 管理用户会话状态，与路由系统解耦。
//! 路由服务通过注入的认证信号和加载信号来执行守卫。
//!
//! - `provider`: 身份提供方抽象
//! - `msal`: 浏览器端 MSAL 绑定
//! - `token`: 访问令牌获取

pub mod msal;
pub mod provider;
pub mod token;

use std::rc::Rc;

use leptos::prelude::*;
use leptos::reactive::owner::LocalStorage;

use provider::{AccountInfo, AuthError, IdentityProvider, LoginRequest};

const DEFAULT_USER_NAME: &str = "User";
const DEFAULT_ORGANIZATION: &str = "Organization";
const POST_LOGOUT_REDIRECT: &str = "/login";

/// 当前登录用户
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub name: String,
    pub organization: String,
    pub email: String,
    pub account: AccountInfo,
}

impl User {
    /// 显示名依次取 `name`、`username`，都为空时使用 "User"
    pub fn from_account(account: AccountInfo) -> Self {
        let name = account
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(Some(account.username.as_str()).filter(|u| !u.is_empty()))
            .unwrap_or(DEFAULT_USER_NAME)
            .to_string();

        Self {
            name,
            organization: DEFAULT_ORGANIZATION.to_string(),
            email: account.username.clone(),
            account,
        }
    }

    /// 头像缩写：前两个单词的首字母
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }
}

/// 会话状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<User>,
    /// 初始化完成前为 true，完成后只会被置为 false 一次
    pub is_loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            user: None,
            is_loading: true,
        }
    }
}

// =========================================================
// 认证服务（不依赖响应式运行时）
// =========================================================

pub struct AuthService {
    provider: Rc<dyn IdentityProvider>,
}

impl AuthService {
    pub fn new(provider: Rc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    /// 启动时解析会话：先处理登录跳转的返回段，再回退到缓存账户
    ///
    /// 初始化失败只在开发构建中记录，结果视为未登录。
    pub async fn resolve_session(&self) -> Option<User> {
        match self.provider.handle_redirect().await {
            Ok(Some(account)) => {
                log::info!("[Auth] 登录跳转返回: {}", account.username);
                return Some(User::from_account(account));
            }
            Ok(None) => {}
            Err(e) => {
                if cfg!(debug_assertions) {
                    log::error!("[Auth] Auth initialization error: {}", e);
                }
                return None;
            }
        }

        self.cached_account().map(User::from_account)
    }

    pub fn cached_account(&self) -> Option<AccountInfo> {
        self.provider.all_accounts().into_iter().next()
    }

    pub fn has_cached_account(&self) -> bool {
        self.cached_account().is_some()
    }

    /// 交互式登录请求：不请求额外 scope，强制显示登录页
    pub fn login_request(email_hint: Option<&str>) -> LoginRequest {
        LoginRequest {
            scopes: Vec::new(),
            prompt: Some("login".to_string()),
            login_hint: email_hint
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string),
            redirect_uri: None,
        }
    }

    /// 发起跳转登录；成功时页面离开
    pub async fn login_redirect(&self, email_hint: Option<&str>) -> Result<(), AuthError> {
        let result = self
            .provider
            .login_redirect(Self::login_request(email_hint))
            .await;
        if let Err(e) = &result {
            if cfg!(debug_assertions) {
                log::error!("[Auth] Login redirect error: {}", e);
            }
        }
        result
    }

    /// 没有账户时什么也不做
    pub async fn logout(&self) -> Result<(), AuthError> {
        let Some(account) = self.cached_account() else {
            log::debug!("[Auth] 没有已登录账户，忽略注销");
            return Ok(());
        };
        self.provider
            .logout_redirect(&account, POST_LOGOUT_REDIRECT)
            .await
    }
}

// =========================================================
// 响应式上下文
// =========================================================

/// 认证上下文
///
/// 包含读写信号，通过 Context 在组件间共享。
#[derive(Clone, Copy)]
pub struct AuthContext {
    /// 会话状态（只读）
    pub state: ReadSignal<SessionState>,
    /// 设置会话状态（写入）
    pub set_state: WriteSignal<SessionState>,
    service: StoredValue<Rc<AuthService>, LocalStorage>,
}

impl AuthContext {
    /// 创建新的认证上下文
    pub fn new(service: AuthService) -> Self {
        let (state, set_state) = signal(SessionState::default());
        Self {
            state,
            set_state,
            service: StoredValue::new_local(Rc::new(service)),
        }
    }

    pub fn service(&self) -> Rc<AuthService> {
        self.service.get_value()
    }

    /// 认证状态信号（用于路由服务注入）
    ///
    /// 已解析出用户，或身份提供方缓存中存在账户，均视为已认证。
    pub fn is_authenticated_signal(&self) -> Signal<bool> {
        let state = self.state;
        let service = self.service;
        Signal::derive(move || {
            state.with(|s| s.user.is_some()) || service.with_value(|s| s.has_cached_account())
        })
    }

    /// 加载状态信号（用于路由服务注入）
    pub fn is_loading_signal(&self) -> Signal<bool> {
        let state = self.state;
        Signal::derive(move || state.with(|s| s.is_loading))
    }
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}

/// 初始化认证状态
///
/// 异步解析会话，完成后关闭加载状态。
pub fn init_auth(ctx: &AuthContext) {
    let service = ctx.service();
    let set_state = ctx.set_state;
    leptos::task::spawn_local(async move {
        let user = service.resolve_session().await;
        set_state.update(|state| {
            state.user = user;
            state.is_loading = false;
        });
    });
}

/// 跳转到身份提供方登录页
///
/// 导航由浏览器完成；返回时 `init_auth` 会处理跳转结果。
pub async fn login_redirect(ctx: &AuthContext, email_hint: Option<String>) -> Result<(), AuthError> {
    ctx.service().login_redirect(email_hint.as_deref()).await
}

/// 注销并跳转到登录页
pub async fn logout(ctx: &AuthContext) -> Result<(), AuthError> {
    ctx.service().logout().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use provider::tests::{MockProvider, account};

    fn service(provider: &Rc<MockProvider>) -> AuthService {
        AuthService::new(provider.clone())
    }

    #[test]
    fn test_user_initials() {
        let mut user = User::from_account(account("ann"));
        user.name = "james earl smith".to_string();
        assert_eq!(user.initials(), "JE");
        user.name = "Ann".to_string();
        assert_eq!(user.initials(), "A");
    }

    #[test]
    fn test_user_name_fallbacks() {
        let user = User::from_account(account("ann"));
        assert_eq!(user.name, "ann");
        assert_eq!(user.email, "ann@example.com");
        assert_eq!(user.organization, "Organization");

        let mut no_name = account("bob");
        no_name.name = None;
        assert_eq!(User::from_account(no_name).name, "bob@example.com");

        let mut anonymous = account("x");
        anonymous.name = Some(String::new());
        anonymous.username = String::new();
        assert_eq!(User::from_account(anonymous).name, "User");
    }

    #[test]
    fn test_session_starts_loading() {
        let state = SessionState::default();
        assert!(state.is_loading);
        assert!(state.user.is_none());
    }

    #[tokio::test]
    async fn test_redirect_account_wins() {
        let provider = Rc::new(MockProvider::new().with_account(account("cached")));
        *provider.redirect_result.borrow_mut() = Some(Ok(Some(account("fresh"))));

        let user = service(&provider).resolve_session().await.unwrap();
        assert_eq!(user.email, "fresh@example.com");
    }

    #[tokio::test]
    async fn test_falls_back_to_cached_account() {
        let provider = Rc::new(MockProvider::new().with_account(account("cached")));
        let user = service(&provider).resolve_session().await.unwrap();
        assert_eq!(user.email, "cached@example.com");
    }

    #[tokio::test]
    async fn test_no_account_resolves_to_none() {
        let provider = Rc::new(MockProvider::new());
        assert!(service(&provider).resolve_session().await.is_none());
    }

    #[tokio::test]
    async fn test_initialization_error_resolves_to_none() {
        let provider = Rc::new(MockProvider::new().with_account(account("cached")));
        *provider.redirect_result.borrow_mut() =
            Some(Err(AuthError::provider("state_mismatch", "bad state")));

        assert!(service(&provider).resolve_session().await.is_none());
    }

    #[tokio::test]
    async fn test_login_request_with_hint() {
        let provider = Rc::new(MockProvider::new());
        service(&provider)
            .login_redirect(Some("jane@example.com"))
            .await
            .unwrap();

        let requests = provider.login_requests.borrow();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].scopes.is_empty());
        assert_eq!(requests[0].prompt.as_deref(), Some("login"));
        assert_eq!(requests[0].login_hint.as_deref(), Some("jane@example.com"));
    }

    #[test]
    fn test_blank_hint_is_omitted() {
        assert_eq!(AuthService::login_request(Some("  ")).login_hint, None);
        assert_eq!(AuthService::login_request(None).login_hint, None);
    }

    #[tokio::test]
    async fn test_login_failure_is_returned() {
        let provider = Rc::new(MockProvider::new());
        *provider.login_result.borrow_mut() = Err(AuthError::provider("interaction_in_progress", "busy"));

        let result = service(&provider).login_redirect(None).await;
        assert!(matches!(result, Err(AuthError::Provider { .. })));
    }

    #[tokio::test]
    async fn test_logout_without_account_is_noop() {
        let provider = Rc::new(MockProvider::new());
        service(&provider).logout().await.unwrap();
        assert!(provider.logout_calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_logout_redirects_to_login() {
        let provider = Rc::new(MockProvider::new().with_account(account("ann")));
        service(&provider).logout().await.unwrap();

        let calls = provider.logout_calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0.username, "ann@example.com");
        assert_eq!(calls[0].1, "/login");
    }
}
