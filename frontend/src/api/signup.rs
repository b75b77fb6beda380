//! 注册流程服务
//!
//! 注册阶段用户尚未拥有身份提供方账户，因此这里的接口全部以公开方式调用。

use std::rc::Rc;

use async_trait::async_trait;
use dafonow_shared::{
    ContactRecord, ContactSearchQuery, LinkContactRequest, SendOtpRequest, SignUpRequest,
    ValidateAccountRequest, ValidateAccountResponse, VerifyOtpRequest,
};

use leptos::prelude::*;
use leptos::reactive::owner::LocalStorage;

use super::{ApiClient, RequestOptions};
use super::error::ApiResult;

/// 注册流程所需的后端能力
#[async_trait(?Send)]
pub trait SignupApi {
    async fn validate_account(
        &self,
        request: &ValidateAccountRequest,
    ) -> ApiResult<ValidateAccountResponse>;

    /// 返回一页联系人，条数少于页大小表示没有更多
    async fn search_contacts(&self, query: &ContactSearchQuery) -> ApiResult<Vec<ContactRecord>>;

    async fn link_contact(&self, request: &LinkContactRequest) -> ApiResult<()>;

    /// 成功后服务端向邮箱发送第一封验证码
    async fn register(&self, request: &SignUpRequest) -> ApiResult<()>;

    async fn send_otp(&self, request: &SendOtpRequest) -> ApiResult<()>;

    async fn verify_otp(&self, request: &VerifyOtpRequest) -> ApiResult<()>;
}

/// 基于 `ApiClient` 的实现
#[derive(Clone)]
pub struct SignupService {
    client: ApiClient,
}

impl SignupService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait(?Send)]
impl SignupApi for SignupService {
    async fn validate_account(
        &self,
        request: &ValidateAccountRequest,
    ) -> ApiResult<ValidateAccountResponse> {
        self.client.call(request, RequestOptions::public()).await
    }

    async fn search_contacts(&self, query: &ContactSearchQuery) -> ApiResult<Vec<ContactRecord>> {
        let envelope = self.client.call(query, RequestOptions::public()).await?;
        Ok(envelope.data)
    }

    async fn link_contact(&self, request: &LinkContactRequest) -> ApiResult<()> {
        self.client.call(request, RequestOptions::public()).await?;
        Ok(())
    }

    async fn register(&self, request: &SignUpRequest) -> ApiResult<()> {
        self.client.call(request, RequestOptions::public()).await?;
        Ok(())
    }

    async fn send_otp(&self, request: &SendOtpRequest) -> ApiResult<()> {
        self.client.call(request, RequestOptions::public()).await?;
        Ok(())
    }

    async fn verify_otp(&self, request: &VerifyOtpRequest) -> ApiResult<()> {
        self.client.call(request, RequestOptions::public()).await?;
        Ok(())
    }
}

// =========================================================
// 响应式上下文
// =========================================================

/// 组件通过 Context 取得的注册服务句柄
#[derive(Clone, Copy)]
pub struct SignupContext {
    api: StoredValue<Rc<dyn SignupApi>, LocalStorage>,
}

impl SignupContext {
    pub fn new(api: Rc<dyn SignupApi>) -> Self {
        Self {
            api: StoredValue::new_local(api),
        }
    }

    pub fn api(&self) -> Rc<dyn SignupApi> {
        self.api.get_value()
    }
}

pub fn use_signup_api() -> Rc<dyn SignupApi> {
    use_context::<SignupContext>()
        .expect("SignupContext should be provided")
        .api()
}
