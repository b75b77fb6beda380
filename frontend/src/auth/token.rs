//! 访问令牌获取
//!
//! 每次 API 调用前执行：取缓存中的第一个账户静默刷新；
//! 需要交互时发起跳转登录，并把原始错误返回给调用方。

use std::rc::Rc;

use async_trait::async_trait;

use super::provider::{AccountInfo, AuthError, IdentityProvider, LoginRequest};
use crate::api::TokenSource;

pub struct TokenAcquirer {
    provider: Rc<dyn IdentityProvider>,
    scopes: Vec<String>,
    redirect_uri: Option<String>,
}

impl TokenAcquirer {
    pub fn new(provider: Rc<dyn IdentityProvider>, scopes: Vec<String>) -> Self {
        Self {
            provider,
            scopes,
            redirect_uri: None,
        }
    }

    pub fn with_redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(uri.into());
        self
    }

    /// 当前使用的账户（缓存中的第一个）
    pub fn account(&self) -> Option<AccountInfo> {
        self.provider.all_accounts().into_iter().next()
    }

    pub async fn acquire_access_token(&self) -> Result<String, AuthError> {
        let account = self.account().ok_or(AuthError::Unauthenticated)?;

        match self
            .provider
            .acquire_token_silent(&self.scopes, &account)
            .await
        {
            Ok(token) => Ok(token),
            Err(error @ AuthError::InteractionRequired { .. }) => {
                log::info!("[Auth] 静默刷新需要交互，发起跳转登录");
                let request = LoginRequest {
                    scopes: self.scopes.clone(),
                    redirect_uri: self.redirect_uri.clone(),
                    ..Default::default()
                };
                // 跳转成功时页面离开，这里只有失败才会继续执行
                if let Err(e) = self.provider.login_redirect(request).await {
                    log::warn!("[Auth] 跳转登录失败: {}", e);
                }
                Err(error)
            }
            Err(error) => Err(error),
        }
    }
}

#[async_trait(?Send)]
impl TokenSource for TokenAcquirer {
    async fn access_token(&self) -> Result<String, AuthError> {
        self.acquire_access_token().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::provider::tests::{MockProvider, account};

    fn acquirer(provider: Rc<MockProvider>) -> TokenAcquirer {
        TokenAcquirer::new(provider, vec!["api://dafo/.default".to_string()])
            .with_redirect_uri("https://app.example.com")
    }

    #[tokio::test]
    async fn test_no_account_is_unauthenticated() {
        let provider = Rc::new(MockProvider::new());
        let result = acquirer(provider.clone()).acquire_access_token().await;

        assert_eq!(result, Err(AuthError::Unauthenticated));
        assert_eq!(*provider.silent_calls.borrow(), 0);
        assert!(provider.login_requests.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_silent_success_returns_token() {
        let provider = Rc::new(MockProvider::new().with_account(account("ann")));
        let token = acquirer(provider.clone()).access_token().await.unwrap();

        assert_eq!(token, "token-abc");
        assert_eq!(*provider.silent_calls.borrow(), 1);
    }

    #[tokio::test]
    async fn test_interaction_required_starts_redirect_and_fails() {
        let provider = Rc::new(MockProvider::new().with_account(account("ann")));
        let needed = AuthError::InteractionRequired {
            message: "consent_required".to_string(),
        };
        *provider.silent_result.borrow_mut() = Some(Err(needed.clone()));

        let result = acquirer(provider.clone()).acquire_access_token().await;
        assert_eq!(result, Err(needed));

        let requests = provider.login_requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].scopes, vec!["api://dafo/.default".to_string()]);
        assert_eq!(
            requests[0].redirect_uri.as_deref(),
            Some("https://app.example.com")
        );
    }

    #[tokio::test]
    async fn test_redirect_failure_still_returns_original_error() {
        let provider = Rc::new(MockProvider::new().with_account(account("ann")));
        let needed = AuthError::InteractionRequired {
            message: "login_required".to_string(),
        };
        *provider.silent_result.borrow_mut() = Some(Err(needed.clone()));
        *provider.login_result.borrow_mut() = Err(AuthError::provider("popup_blocked", "blocked"));

        let result = acquirer(provider).acquire_access_token().await;
        assert_eq!(result, Err(needed));
    }

    #[tokio::test]
    async fn test_other_errors_do_not_redirect() {
        let provider = Rc::new(MockProvider::new().with_account(account("ann")));
        let failure = AuthError::provider("network_error", "offline");
        *provider.silent_result.borrow_mut() = Some(Err(failure.clone()));

        let result = acquirer(provider.clone()).acquire_access_token().await;
        assert_eq!(result, Err(failure));
        assert!(provider.login_requests.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_uses_first_cached_account() {
        let provider = Rc::new(
            MockProvider::new()
                .with_account(account("first"))
                .with_account(account("second")),
        );
        let acquirer = acquirer(provider);
        assert_eq!(acquirer.account().unwrap().username, "first@example.com");
    }
}
