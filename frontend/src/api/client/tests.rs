use super::*;
use crate::api::error::{
    CODE_NETWORK_ERROR, CODE_REQUEST_BUILD_FAILED, CODE_TIMEOUT, CODE_UNAUTHENTICATED,
};
use dafonow_shared::{ApiResponse, ContactRecord, ContactSearchQuery};
use serde::Deserialize;
use std::cell::RefCell;
use std::collections::VecDeque;

// =========================================================
// Mock 实现
// =========================================================

/// 按顺序返回预设响应并记录请求的传输层 mock
pub struct MockTransport {
    pub requests: RefCell<Vec<HttpRequest>>,
    responses: RefCell<VecDeque<Result<HttpResponse, TransportError>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            requests: RefCell::new(Vec::new()),
            responses: RefCell::new(VecDeque::new()),
        }
    }

    pub fn respond(&self, status: u16, body: &str) {
        self.responses.borrow_mut().push_back(Ok(HttpResponse {
            status,
            status_text: status_text(status).to_string(),
            body: body.to_string(),
        }));
    }

    pub fn fail(&self, error: TransportError) {
        self.responses.borrow_mut().push_back(Err(error));
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "",
    }
}

#[async_trait(?Send)]
impl HttpTransport for MockTransport {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.borrow_mut().push(req);
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::new("no response queued")))
    }
}

pub struct StaticToken(pub Result<String, AuthError>);

#[async_trait(?Send)]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> Result<String, AuthError> {
        self.0.clone()
    }
}

pub fn client_with(transport: Rc<MockTransport>, token: Result<String, AuthError>) -> ApiClient {
    ApiClient::new(
        "https://api.example.com/",
        transport,
        Rc::new(StaticToken(token)),
    )
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
struct Widget {
    id: u32,
    name: String,
}

// =========================================================
// 请求构建
// =========================================================

#[tokio::test]
async fn test_get_attaches_bearer_and_content_type() {
    let transport = Rc::new(MockTransport::new());
    transport.respond(200, r#"{"id": 1, "name": "brace"}"#);
    let client = client_with(transport.clone(), Ok("tok-1".to_string()));

    let widget: Widget = client
        .get("/widgets/1", RequestOptions::default())
        .await
        .unwrap();
    assert_eq!(widget.name, "brace");

    let requests = transport.requests.borrow();
    let req = &requests[0];
    assert_eq!(req.url, "https://api.example.com/widgets/1");
    assert_eq!(req.method, HttpMethod::Get);
    assert_eq!(req.header("Authorization"), Some("Bearer tok-1"));
    assert_eq!(req.header("content-type"), Some("application/json"));
    assert!(req.body.is_none());
}

#[tokio::test]
async fn test_post_put_patch_send_json_body() {
    let transport = Rc::new(MockTransport::new());
    transport.respond(200, "");
    transport.respond(200, "");
    transport.respond(200, "");
    let client = client_with(transport.clone(), Ok("t".to_string()));
    let body = Widget {
        id: 2,
        name: "splint".to_string(),
    };

    let _: () = client.post("widgets", &body, RequestOptions::default()).await.unwrap();
    let _: () = client.put("widgets/2", &body, RequestOptions::default()).await.unwrap();
    let _: () = client.patch("widgets/2", &body, RequestOptions::default()).await.unwrap();

    let requests = transport.requests.borrow();
    let methods: Vec<_> = requests.iter().map(|r| r.method).collect();
    assert_eq!(methods, vec![HttpMethod::Post, HttpMethod::Put, HttpMethod::Patch]);
    for req in requests.iter() {
        assert_eq!(req.body.as_deref(), Some(r#"{"id":2,"name":"splint"}"#));
    }
}

#[tokio::test]
async fn test_delete_with_query() {
    let transport = Rc::new(MockTransport::new());
    transport.respond(200, "null");
    let client = client_with(transport.clone(), Ok("t".to_string()));

    let result: Option<Widget> = client
        .delete("widgets", RequestOptions::default().with_query("id", "a b&c"))
        .await
        .unwrap();
    assert!(result.is_none());
    assert_eq!(
        transport.requests.borrow()[0].url,
        "https://api.example.com/widgets?id=a+b%26c"
    );
}

#[tokio::test]
async fn test_call_get_request_uses_query_pairs() {
    let transport = Rc::new(MockTransport::new());
    transport.respond(
        200,
        r#"{"data": [{"id": 9, "firstName": "Ann", "lastName": "Lee"}]}"#,
    );
    let client = client_with(transport.clone(), Ok("t".to_string()));

    let query = ContactSearchQuery::practitioners("ann", 1, 20, false);
    let resp: ApiResponse<Vec<ContactRecord>> =
        client.call(&query, RequestOptions::public()).await.unwrap();
    assert_eq!(resp.data.len(), 1);

    let requests = transport.requests.borrow();
    assert_eq!(
        requests[0].url,
        "https://api.example.com/api/contacts?contactType=5&current=1&pageSize=20&contactName=ann&contactStatus=active"
    );
    assert!(requests[0].body.is_none());
}

// =========================================================
// 令牌
// =========================================================

#[tokio::test]
async fn test_token_failure_prevents_transmission() {
    let transport = Rc::new(MockTransport::new());
    let client = client_with(transport.clone(), Err(AuthError::Unauthenticated));

    let err = client
        .get::<Widget>("widgets/1", RequestOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(CODE_UNAUTHENTICATED));
    assert!(err.is_auth_error());
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_public_request_skips_token() {
    let transport = Rc::new(MockTransport::new());
    transport.respond(200, "{}");
    let client = client_with(transport.clone(), Err(AuthError::Unauthenticated));

    let _: serde_json::Value = client
        .get("status", RequestOptions::public())
        .await
        .unwrap();
    assert_eq!(transport.requests.borrow()[0].header("Authorization"), None);
}

// =========================================================
// 错误映射
// =========================================================

#[tokio::test]
async fn test_error_response_normalized() {
    let transport = Rc::new(MockTransport::new());
    transport.respond(400, r#"{"errors": {"email": ["Email taken"]}}"#);
    let client = client_with(transport, Ok("t".to_string()));

    let err = client
        .post::<Widget, _>("widgets", &serde_json::json!({}), RequestOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.status, Some(400));
    assert_eq!(err.message(), "Email taken");
    assert!(err.is_client_error());
}

#[tokio::test]
async fn test_unauthorized_status_is_client_error() {
    let transport = Rc::new(MockTransport::new());
    transport.respond(401, "");
    let client = client_with(transport, Ok("t".to_string()));

    let err = client
        .get::<Widget>("widgets", RequestOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.status, Some(401));
    assert_eq!(err.message(), "Unauthorized");
    assert!(!err.is_auth_error());
}

#[tokio::test]
async fn test_transport_failures_get_stable_codes() {
    let transport = Rc::new(MockTransport::new());
    transport.fail(TransportError::new("timeout exceeded"));
    transport.fail(TransportError::new("TypeError: NetworkError when attempting to fetch resource."));
    let client = client_with(transport, Ok("t".to_string()));

    let err = client
        .get::<Widget>("a", RequestOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.status, None);
    assert_eq!(err.code(), Some(CODE_TIMEOUT));

    let err = client
        .get::<Widget>("a", RequestOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(CODE_NETWORK_ERROR));
}

#[tokio::test]
async fn test_unbuildable_request_reports_build_failure() {
    let transport = Rc::new(MockTransport::new());
    transport.fail(TransportError::build_failed("Failed to construct 'Request': Invalid URL"));
    let client = client_with(transport.clone(), Ok("t".to_string()));

    let err = client
        .get::<Widget>("a", RequestOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.status, None);
    assert_eq!(err.code(), Some(CODE_REQUEST_BUILD_FAILED));
}

#[tokio::test]
async fn test_undecodable_success_body() {
    let transport = Rc::new(MockTransport::new());
    transport.respond(200, "not json");
    let client = client_with(transport, Ok("t".to_string()));

    let err = client
        .get::<Widget>("a", RequestOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.status, Some(200));
    assert_eq!(err.code(), Some(CODE_INVALID_RESPONSE));
}

#[tokio::test]
async fn test_invalid_base_url() {
    let transport = Rc::new(MockTransport::new());
    let client = ApiClient::new(
        "not a url",
        transport.clone(),
        Rc::new(StaticToken(Ok("t".to_string()))),
    );
    let err = client
        .get::<Widget>("a", RequestOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(CODE_REQUEST_BUILD_FAILED));
    assert_eq!(transport.request_count(), 0);
}
