//! 表单字段校验
//!
//! 校验规则全部是纯函数，返回 `Some(message)` 表示该字段无效。
//! 字段错误只在表单内展示，不会转换为 `ApiError`。

use std::collections::BTreeMap;

pub const ACCOUNT_NUMBER_LENGTH: usize = 7;
pub const ZIP_MIN_LENGTH: usize = 4;
pub const ZIP_MAX_LENGTH: usize = 12;
pub const NAME_MAX_LENGTH: usize = 40;
pub const PHONE_MAX_LENGTH: usize = 12;

pub const MSG_EMAIL_REQUIRED: &str = "Email is required";
pub const MSG_EMAIL_INVALID: &str = "Enter a valid email";
pub const MSG_ACCOUNT_REQUIRED: &str = "Account Number is required";
pub const MSG_ACCOUNT_INVALID: &str = "Invalid Account Number.";
pub const MSG_ZIP_REQUIRED: &str = "Billing Zip Code is required";
pub const MSG_ZIP_INVALID: &str = "Invalid Billing Zip Code";
pub const MSG_FIRST_NAME_REQUIRED: &str = "First name is required";
pub const MSG_LAST_NAME_REQUIRED: &str = "Last name is required";
pub const MSG_PHONE_REQUIRED: &str = "Phone is required";
pub const MSG_PHONE_TOO_LONG: &str = "Phone must be at most 12 characters";
pub const MSG_OTP_INCOMPLETE: &str = "Please enter the 6-digit code";
pub const MSG_CAPTCHA_REQUIRED: &str = "Please verify you are human";
pub const MSG_CONTACT_REQUIRED: &str = "Please select a name from the list";

/// 表单字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Email,
    AccountNumber,
    BillingZipCode,
    Contact,
    FirstName,
    LastName,
    Phone,
    Otp,
    Captcha,
}

/// 字段 -> 错误消息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: Field, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.set(field, message);
        errors
    }

    pub fn set(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    /// `None` 清除该字段的错误
    pub fn update(&mut self, field: Field, message: Option<&str>) {
        match message {
            Some(message) => self.set(field, message),
            None => self.clear(field),
        }
    }

    pub fn clear(&mut self, field: Field) {
        self.0.remove(&field);
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    fn check(&mut self, field: Field, message: Option<&'static str>) {
        if let Some(message) = message {
            self.set(field, message);
        }
    }
}

// =========================================================
// 单字段规则
// =========================================================

/// `^[^\s@]+@[^\s@]+\.[^\s@]+$`
fn looks_like_email(value: &str) -> bool {
    let valid_part = |s: &str| !s.is_empty() && !s.chars().any(|c| c.is_whitespace() || c == '@');

    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if !valid_part(local) || domain.contains('@') {
        return false;
    }
    // 域名中任意一个点两侧都非空即可
    domain
        .char_indices()
        .filter(|&(_, c)| c == '.')
        .any(|(i, _)| valid_part(&domain[..i]) && valid_part(&domain[i + 1..]))
}

pub fn validate_email(value: &str) -> Option<&'static str> {
    if value.trim().is_empty() {
        Some(MSG_EMAIL_REQUIRED)
    } else if !looks_like_email(value) {
        Some(MSG_EMAIL_INVALID)
    } else {
        None
    }
}

/// 账号：恰好 7 位数字
pub fn validate_account_number(value: &str) -> Option<&'static str> {
    if value.trim().is_empty() {
        Some(MSG_ACCOUNT_REQUIRED)
    } else if value.len() != ACCOUNT_NUMBER_LENGTH || !value.chars().all(|c| c.is_ascii_digit()) {
        Some(MSG_ACCOUNT_INVALID)
    } else {
        None
    }
}

/// 账单邮编：4 到 12 位字母或数字
pub fn validate_zip_code(value: &str) -> Option<&'static str> {
    if value.trim().is_empty() {
        return Some(MSG_ZIP_REQUIRED);
    }
    let alphanumeric = value.chars().all(|c| c.is_ascii_alphanumeric());
    if !alphanumeric || !(ZIP_MIN_LENGTH..=ZIP_MAX_LENGTH).contains(&value.len()) {
        Some(MSG_ZIP_INVALID)
    } else {
        None
    }
}

pub fn validate_phone(value: &str) -> Option<&'static str> {
    let value = value.trim();
    if value.is_empty() {
        Some(MSG_PHONE_REQUIRED)
    } else if value.chars().count() > PHONE_MAX_LENGTH {
        Some(MSG_PHONE_TOO_LONG)
    } else {
        None
    }
}

fn required(value: &str, message: &'static str) -> Option<&'static str> {
    value.trim().is_empty().then_some(message)
}

// =========================================================
// 表单级校验
// =========================================================

pub fn validate_login(email: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.check(Field::Email, validate_email(email));
    errors
}

pub fn validate_account_form(account_number: &str, zip_code: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.check(Field::AccountNumber, validate_account_number(account_number));
    errors.check(Field::BillingZipCode, validate_zip_code(zip_code));
    errors
}

/// 账户表单的实时校验（每次输入变化时调用）
pub fn validate_account_field(field: Field, value: &str) -> Option<&'static str> {
    match field {
        Field::AccountNumber => validate_account_number(value),
        Field::BillingZipCode => validate_zip_code(value),
        _ => None,
    }
}

/// 注册详情表单
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupDetails {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
}

pub fn validate_details(details: &SignupDetails) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.check(Field::FirstName, required(&details.first_name, MSG_FIRST_NAME_REQUIRED));
    errors.check(Field::LastName, required(&details.last_name, MSG_LAST_NAME_REQUIRED));
    errors.check(Field::Phone, validate_phone(&details.phone));
    errors.check(Field::Email, validate_email(&details.email));
    errors
}

/// 按最大字符数截断输入
pub fn clamp_len(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}
