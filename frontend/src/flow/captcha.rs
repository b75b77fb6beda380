//! 人机验证状态
//!
//! 勾选 "Verify you are human" 后显示验证组件；组件回调写入或清除令牌。

use super::validation::{Field, FieldErrors, MSG_CAPTCHA_REQUIRED};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptchaState {
    pub shown: bool,
    pub token: Option<String>,
}

impl CaptchaState {
    /// 取消勾选时丢弃已有令牌
    pub fn set_shown(&mut self, shown: bool) {
        self.shown = shown;
        if !shown {
            self.token = None;
        }
    }

    pub fn on_success(&mut self, token: String) {
        self.token = Some(token).filter(|t| !t.is_empty());
    }

    /// 组件出错或令牌过期
    pub fn on_invalidated(&mut self) {
        self.token = None;
    }

    pub fn is_verified(&self) -> bool {
        self.token.is_some()
    }

    /// 提交前取出令牌，缺失时返回字段错误
    pub fn require_token(&self) -> Result<String, FieldErrors> {
        self.token
            .clone()
            .ok_or_else(|| FieldErrors::single(Field::Captcha, MSG_CAPTCHA_REQUIRED))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchecking_clears_token() {
        let mut captcha = CaptchaState::default();
        captcha.set_shown(true);
        captcha.on_success("tok".to_string());
        assert!(captcha.is_verified());

        captcha.set_shown(false);
        assert!(!captcha.is_verified());
        assert!(!captcha.shown);
    }

    #[test]
    fn test_expiry_clears_token() {
        let mut captcha = CaptchaState::default();
        captcha.set_shown(true);
        captcha.on_success("tok".to_string());
        captcha.on_invalidated();
        assert_eq!(captcha.token, None);
        assert!(captcha.shown);
    }

    #[test]
    fn test_require_token() {
        let mut captcha = CaptchaState::default();
        let err = captcha.require_token().unwrap_err();
        assert_eq!(err.get(Field::Captcha), Some(MSG_CAPTCHA_REQUIRED));

        captcha.on_success(String::new());
        assert!(captcha.require_token().is_err());

        captcha.on_success("tok".to_string());
        assert_eq!(captcha.require_token().unwrap(), "tok");
    }
}
