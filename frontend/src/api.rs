//! 后端 API 访问层
//!
//! - `client`: HTTP 客户端封装（令牌注入、URL 构建、响应解码）
//! - `error`: 错误归一化
//! - `signup`: 注册流程使用的服务接口

pub mod client;
pub mod error;
pub mod signup;

pub use client::{ApiClient, HttpTransport, RequestOptions, TokenSource};
pub use error::{ApiError, ApiResult};
pub use signup::{SignupApi, SignupContext, SignupService, use_signup_api};
