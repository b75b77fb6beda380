use serde::{Deserialize, Serialize};
use std::fmt;

pub mod protocol;

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// 联系人搜索中"执业者"的类型编号
pub const CONTACT_TYPE_PRACTITIONER: u8 = 5;
pub const CONTACT_STATUS_ACTIVE: &str = "active";
pub const DEFAULT_PAGE_SIZE: u32 = 20;

// =========================================================
// 通用响应包装
// =========================================================

/// 服务端对列表类接口使用的包装结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

// =========================================================
// 账户校验 (Account Validation)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateAccountRequest {
    pub account_number: String,
    pub billing_zip_code: String,
}

/// 账户校验结果
///
/// 除 `is_valid` 外的字段都可能缺省，缺省时按"未提供"处理。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidateAccountResponse {
    pub customer_id: Option<String>,
    pub is_valid: bool,
    pub is_valid_account_id: Option<bool>,
    pub enable_new_request: Option<bool>,
    pub is_active: Option<bool>,
    pub response_message: Option<String>,
}

// =========================================================
// 联系人搜索 (Contact Search)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSearchQuery {
    pub contact_type: u8,
    /// 页码，从 1 开始
    pub current: u32,
    pub page_size: u32,
    pub contact_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_status: Option<String>,
}

impl ContactSearchQuery {
    /// 按名称搜索执业者；`include_inactive` 为 false 时只返回活跃联系人
    pub fn practitioners(name: impl Into<String>, page: u32, page_size: u32, include_inactive: bool) -> Self {
        Self {
            contact_type: CONTACT_TYPE_PRACTITIONER,
            current: page,
            page_size,
            contact_name: name.into(),
            contact_status: if include_inactive {
                None
            } else {
                Some(CONTACT_STATUS_ACTIVE.to_string())
            },
        }
    }
}

/// 联系人 ID：服务端可能返回数字或字符串
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContactId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContactId::Number(n) => write!(f, "{}", n),
            ContactId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
    pub id: ContactId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub customer_name: Option<String>,
}

impl ContactRecord {
    /// 下拉列表中显示的标签，例如 `Jane Smith [Acme Clinic]`
    pub fn display_label(&self) -> String {
        let mut label = format!("{} {}", self.first_name, self.last_name);
        if let Some(customer) = self.customer_name.as_deref().filter(|c| !c.is_empty()) {
            label.push_str(&format!(" [{}]", customer));
        }
        label
    }
}

// =========================================================
// 注册 (Signup)
// =========================================================

/// 将已存在的联系人关联到客户账户
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkContactRequest {
    pub customer_id: Option<String>,
    pub contact_id: ContactId,
    pub captcha_token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub customer_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub captcha_token: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpMethod {
    #[default]
    Email,
    Phone,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOtpRequest {
    pub email: String,
    pub method: OtpMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    pub email: String,
    pub method: OtpMethod,
    pub code: String,
}
