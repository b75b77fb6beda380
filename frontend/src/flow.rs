//! 登录 / 注册流程的纯逻辑层
//!
//! 不依赖响应式运行时与 DOM，组件只负责把事件转发到这里并渲染结果。

pub mod captcha;
pub mod notice;
pub mod otp;
pub mod search;
pub mod submit;
pub mod validation;
pub mod wizard;
