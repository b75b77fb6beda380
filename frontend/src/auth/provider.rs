//! 身份提供方抽象
//!
//! 跳转式登录（离开页面再回来）被建模为两个独立能力：
//! - 终结性命令：`login_redirect` / `logout_redirect`，成功时页面被导航走，调用不会正常返回
//! - 启动时无条件执行一次的"恢复"检查：`handle_redirect`

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 身份提供方缓存的账户信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub home_account_id: String,
    #[serde(default)]
    pub environment: String,
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub local_account_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// 交互式登录请求
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub scopes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
}

/// 认证错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// 本地没有任何已知账户
    Unauthenticated,
    /// 静默刷新失败，需要用户交互
    InteractionRequired { message: String },
    /// 其它身份提供方错误
    Provider { code: String, message: String },
}

impl AuthError {
    pub fn provider(code: impl Into<String>, message: impl Into<String>) -> Self {
        AuthError::Provider {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AuthError::Unauthenticated => "User not authenticated",
            AuthError::InteractionRequired { message } => message,
            AuthError::Provider { message, .. } => message,
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Unauthenticated => write!(f, "未认证: User not authenticated"),
            AuthError::InteractionRequired { message } => write!(f, "需要交互式登录: {}", message),
            AuthError::Provider { code, message } => write!(f, "身份提供方错误 [{}]: {}", code, message),
        }
    }
}

impl std::error::Error for AuthError {}

/// 身份提供方特性 (Trait)
///
/// 浏览器下由 MSAL 实现，测试中使用 mock。
/// (?Send) 是因为 WASM 环境下 JS 对象不是 Send 的。
#[async_trait(?Send)]
pub trait IdentityProvider {
    /// 检查本次页面加载是否为登录跳转的返回段，是则返回登录账户
    async fn handle_redirect(&self) -> Result<Option<AccountInfo>, AuthError>;

    /// 纯本地查询，不触发网络请求或导航
    fn all_accounts(&self) -> Vec<AccountInfo>;

    async fn acquire_token_silent(
        &self,
        scopes: &[String],
        account: &AccountInfo,
    ) -> Result<String, AuthError>;

    async fn login_redirect(&self, request: LoginRequest) -> Result<(), AuthError>;

    async fn logout_redirect(
        &self,
        account: &AccountInfo,
        post_logout_redirect_uri: &str,
    ) -> Result<(), AuthError>;
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;

    /// 记录调用的身份提供方 mock
    pub struct MockProvider {
        pub redirect_result: RefCell<Option<Result<Option<AccountInfo>, AuthError>>>,
        pub accounts: RefCell<Vec<AccountInfo>>,
        pub silent_result: RefCell<Option<Result<String, AuthError>>>,
        pub login_result: RefCell<Result<(), AuthError>>,
        pub login_requests: RefCell<Vec<LoginRequest>>,
        pub logout_calls: RefCell<Vec<(AccountInfo, String)>>,
        pub silent_calls: RefCell<u32>,
    }

    impl MockProvider {
        pub fn new() -> Self {
            Self {
                redirect_result: RefCell::new(None),
                accounts: RefCell::new(Vec::new()),
                silent_result: RefCell::new(None),
                login_result: RefCell::new(Ok(())),
                login_requests: RefCell::new(Vec::new()),
                logout_calls: RefCell::new(Vec::new()),
                silent_calls: RefCell::new(0),
            }
        }

        pub fn with_account(self, account: AccountInfo) -> Self {
            self.accounts.borrow_mut().push(account);
            self
        }
    }

    pub fn account(name: &str) -> AccountInfo {
        AccountInfo {
            home_account_id: format!("{}-home", name),
            environment: "cascade.ciamlogin.com".to_string(),
            tenant_id: "tenant".to_string(),
            username: format!("{}@example.com", name),
            local_account_id: format!("{}-local", name),
            name: Some(name.to_string()),
        }
    }

    #[async_trait(?Send)]
    impl IdentityProvider for MockProvider {
        async fn handle_redirect(&self) -> Result<Option<AccountInfo>, AuthError> {
            self.redirect_result.borrow_mut().take().unwrap_or(Ok(None))
        }

        fn all_accounts(&self) -> Vec<AccountInfo> {
            self.accounts.borrow().clone()
        }

        async fn acquire_token_silent(
            &self,
            _scopes: &[String],
            _account: &AccountInfo,
        ) -> Result<String, AuthError> {
            *self.silent_calls.borrow_mut() += 1;
            self.silent_result
                .borrow()
                .clone()
                .unwrap_or_else(|| Ok("token-abc".to_string()))
        }

        async fn login_redirect(&self, request: LoginRequest) -> Result<(), AuthError> {
            self.login_requests.borrow_mut().push(request);
            self.login_result.borrow().clone()
        }

        async fn logout_redirect(
            &self,
            account: &AccountInfo,
            post_logout_redirect_uri: &str,
        ) -> Result<(), AuthError> {
            self.logout_calls
                .borrow_mut()
                .push((account.clone(), post_logout_redirect_uri.to_string()));
            Ok(())
        }
    }
}
