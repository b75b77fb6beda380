use crate::{
    ApiResponse, ContactRecord, ContactSearchQuery, LinkContactRequest, SendOtpRequest,
    SignUpRequest, ValidateAccountRequest, ValidateAccountResponse, VerifyOtpRequest,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned, de::IgnoredAny};
use std::fmt;

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// GET / DELETE 通过查询参数传递请求，其余方法发送 JSON body
    pub fn carries_body(&self) -> bool {
        !matches!(self, HttpMethod::Get | HttpMethod::Delete)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
pub trait ApiRequest: Serialize {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The URL path (or suffix).
    const PATH: &'static str;
    /// The HTTP method.
    const METHOD: HttpMethod;

    /// Query parameters for methods without a body.
    fn query_pairs(&self) -> Vec<(String, String)> {
        Vec::new()
    }
}

// =========================================================
// Request Definitions
// =========================================================

impl ApiRequest for ValidateAccountRequest {
    type Response = ValidateAccountResponse;
    const PATH: &'static str = "/api/signup/validate-account";
    const METHOD: HttpMethod = HttpMethod::Post;
}

impl ApiRequest for ContactSearchQuery {
    type Response = ApiResponse<Vec<ContactRecord>>;
    const PATH: &'static str = "/api/contacts";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("contactType".to_string(), self.contact_type.to_string()),
            ("current".to_string(), self.current.to_string()),
            ("pageSize".to_string(), self.page_size.to_string()),
            ("contactName".to_string(), self.contact_name.clone()),
        ];
        if let Some(status) = &self.contact_status {
            pairs.push(("contactStatus".to_string(), status.clone()));
        }
        pairs
    }
}

// 以下接口的响应体内容不被使用，IgnoredAny 可以接受任意 JSON（包括 null）

impl ApiRequest for LinkContactRequest {
    type Response = IgnoredAny;
    const PATH: &'static str = "/api/signup/link-contact";
    const METHOD: HttpMethod = HttpMethod::Post;
}

impl ApiRequest for SignUpRequest {
    type Response = IgnoredAny;
    const PATH: &'static str = "/api/signup/register";
    const METHOD: HttpMethod = HttpMethod::Post;
}

impl ApiRequest for SendOtpRequest {
    type Response = IgnoredAny;
    const PATH: &'static str = "/api/signup/otp/send";
    const METHOD: HttpMethod = HttpMethod::Post;
}

impl ApiRequest for VerifyOtpRequest {
    type Response = IgnoredAny;
    const PATH: &'static str = "/api/signup/otp/verify";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_query_pairs() {
        let query = ContactSearchQuery::practitioners("jan e", 3, 20, false);
        let pairs = query.query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("contactType".to_string(), "5".to_string()),
                ("current".to_string(), "3".to_string()),
                ("pageSize".to_string(), "20".to_string()),
                ("contactName".to_string(), "jan e".to_string()),
                ("contactStatus".to_string(), "active".to_string()),
            ]
        );
    }

    #[test]
    fn test_methods_with_body() {
        assert!(!HttpMethod::Get.carries_body());
        assert!(!HttpMethod::Delete.carries_body());
        assert!(HttpMethod::Patch.carries_body());
        assert_eq!(HttpMethod::Put.to_string(), "PUT");
    }
}
