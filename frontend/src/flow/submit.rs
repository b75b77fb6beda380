//! 各步骤的提交处理
//!
//! 先做本地校验，失败时不发出任何请求；随后调用 `SignupApi`，
//! 把服务端结果映射为 `Outcome` 交给向导状态机结算。

use dafonow_shared::{
    ContactRecord, LinkContactRequest, OtpMethod, SendOtpRequest, SignUpRequest,
    ValidateAccountRequest, ValidateAccountResponse, VerifyOtpRequest,
};

use super::captcha::CaptchaState;
use super::notice::Notice;
use super::otp::OtpCells;
use super::validation::{
    self, Field, FieldErrors, MSG_ACCOUNT_INVALID, MSG_CONTACT_REQUIRED, MSG_OTP_INCOMPLETE,
    SignupDetails,
};
use super::wizard::{Outcome, WizardEvent};
use crate::api::{ApiError, SignupApi};

pub const MSG_ACCOUNT_REJECTED: &str = "Invalid Account Number or Billing Zip Code.";
pub const MSG_ACCOUNT_INACTIVE: &str =
    "Account Number is not an active account. Contact Customer Support.";
pub const MSG_OTP_RESENT: &str = "A new code has been sent.";
pub const MSG_NEW_ACCOUNT_INFO: &str =
    "To request a new account, please contact Customer Support.";

fn failed(action: &str, error: ApiError) -> Outcome {
    log::warn!("[Flow] {} 失败: {}", action, error);
    Outcome::Failed(Notice::error(error.message()))
}

// =========================================================
// AccountValidation
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountForm {
    pub account_number: String,
    pub billing_zip_code: String,
}

pub async fn submit_account(api: &dyn SignupApi, form: &AccountForm) -> Outcome {
    let errors = validation::validate_account_form(&form.account_number, &form.billing_zip_code);
    if !errors.is_empty() {
        return Outcome::Invalid(errors);
    }

    let request = ValidateAccountRequest {
        account_number: form.account_number.trim().to_string(),
        billing_zip_code: form.billing_zip_code.trim().to_string(),
    };
    match api.validate_account(&request).await {
        Ok(response) => account_outcome(response),
        Err(e) => failed("账户校验", e),
    }
}

/// 账户校验结果映射
///
/// 有效但缺少客户 ID 的响应按拒绝处理。
pub fn account_outcome(response: ValidateAccountResponse) -> Outcome {
    let customer_id = response.customer_id.filter(|id| !id.trim().is_empty());
    if let (true, Some(customer_id)) = (response.is_valid, customer_id) {
        return Outcome::Accepted(WizardEvent::AccountValidated { customer_id });
    }

    let mut notice = Notice::error(MSG_ACCOUNT_REJECTED);
    let mut field_errors = FieldErrors::new();
    if response.is_valid_account_id == Some(false) {
        field_errors.set(Field::AccountNumber, MSG_ACCOUNT_INVALID);
    } else if response.is_active == Some(false) {
        notice = Notice::error(MSG_ACCOUNT_INACTIVE);
    }

    Outcome::Rejected {
        event: WizardEvent::AccountRejected {
            offer_new_account: response.enable_new_request == Some(true),
        },
        notice,
        field_errors,
    }
}

// =========================================================
// NameSearch
// =========================================================

pub async fn submit_contact(
    api: &dyn SignupApi,
    customer_id: Option<&str>,
    contact: Option<&ContactRecord>,
    captcha: &CaptchaState,
) -> Outcome {
    let mut errors = FieldErrors::new();
    if contact.is_none() {
        errors.set(Field::Contact, MSG_CONTACT_REQUIRED);
    }
    let token = match captcha.require_token() {
        Ok(token) => Some(token),
        Err(captcha_errors) => {
            errors.update(Field::Captcha, captcha_errors.get(Field::Captcha));
            None
        }
    };
    let (Some(contact), Some(captcha_token)) = (contact, token) else {
        return Outcome::Invalid(errors);
    };

    let request = LinkContactRequest {
        customer_id: customer_id.map(str::to_string),
        contact_id: contact.id.clone(),
        captcha_token,
    };
    match api.link_contact(&request).await {
        Ok(()) => Outcome::Accepted(WizardEvent::ContactLinked),
        Err(e) => failed("关联联系人", e),
    }
}

// =========================================================
// SignupDetails
// =========================================================

pub async fn submit_details(
    api: &dyn SignupApi,
    customer_id: Option<&str>,
    details: &SignupDetails,
    captcha: &CaptchaState,
) -> Outcome {
    let mut errors = validation::validate_details(details);
    let token = match captcha.require_token() {
        Ok(token) => Some(token),
        Err(captcha_errors) => {
            errors.update(Field::Captcha, captcha_errors.get(Field::Captcha));
            None
        }
    };
    let Some(captcha_token) = token.filter(|_| errors.is_empty()) else {
        return Outcome::Invalid(errors);
    };

    let email = details.email.trim().to_string();
    let request = SignUpRequest {
        customer_id: customer_id.map(str::to_string),
        first_name: details.first_name.trim().to_string(),
        last_name: details.last_name.trim().to_string(),
        phone: details.phone.trim().to_string(),
        email: email.clone(),
        captcha_token,
    };
    match api.register(&request).await {
        Ok(()) => Outcome::Accepted(WizardEvent::DetailsSubmitted { email }),
        Err(e) => failed("注册", e),
    }
}

// =========================================================
// OtpVerification
// =========================================================

pub async fn submit_otp(api: &dyn SignupApi, email: &str, method: OtpMethod, cells: &OtpCells) -> Outcome {
    let Some(code) = cells.code() else {
        return Outcome::Invalid(FieldErrors::single(Field::Otp, MSG_OTP_INCOMPLETE));
    };

    let request = VerifyOtpRequest {
        email: email.to_string(),
        method,
        code,
    };
    match api.verify_otp(&request).await {
        Ok(()) => Outcome::Accepted(WizardEvent::OtpVerified),
        Err(e) => failed("验证码校验", e),
    }
}

/// 重新发送验证码，结果只产生提示，不改变步骤
pub async fn resend_otp(api: &dyn SignupApi, email: &str, method: OtpMethod) -> Notice {
    let request = SendOtpRequest {
        email: email.to_string(),
        method,
    };
    match api.send_otp(&request).await {
        Ok(()) => Notice::success(MSG_OTP_RESENT),
        Err(e) => {
            log::warn!("[Flow] 重新发送验证码失败: {}", e);
            Notice::error(e.message())
        }
    }
}
