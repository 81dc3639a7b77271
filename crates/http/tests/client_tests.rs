//! Integration tests for the SmartBI HTTP client

use reqwest::Request;
use serde_json::json;
use smartbi_core::tests::{RecordingNavigator, RecordingNotifier};
use smartbi_core::{
    MemoryTokenStore, NavigationGuard, RouteTable, Router, SessionToken, TokenStore,
};
use smartbi_http::client::error::{ClientError, SESSION_EXPIRED_MESSAGE};
use smartbi_http::client::interceptor::RequestInterceptor;
use smartbi_http::{ApiResponse, SmartBiClient, UserInfo};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    client: SmartBiClient,
    tokens: Arc<MemoryTokenStore>,
    notifier: Arc<RecordingNotifier>,
    navigator: Arc<RecordingNavigator>,
}

fn harness(base_url: &str, token: Option<&str>) -> Harness {
    let tokens = Arc::new(match token {
        Some(token) => MemoryTokenStore::with_token(token),
        None => MemoryTokenStore::new(),
    });
    let notifier = Arc::new(RecordingNotifier::default());
    let navigator = Arc::new(RecordingNavigator::default());

    let client = SmartBiClient::builder()
        .base_url(base_url)
        .token_store(tokens.clone())
        .notifier(notifier.clone())
        .navigator(navigator.clone())
        .build()
        .unwrap();

    Harness {
        client,
        tokens,
        notifier,
        navigator,
    }
}

#[tokio::test]
async fn test_client_builder() {
    let client = SmartBiClient::builder()
        .base_url("http://localhost:3000/")
        .build();

    assert!(client.is_ok());
    let client = client.unwrap();
    assert_eq!(client.base_url(), "http://localhost:3000");
}

#[tokio::test]
async fn test_client_builder_requires_base_url() {
    let result = SmartBiClient::builder().build();
    assert!(matches!(result, Err(ClientError::Configuration(_))));

    let result = SmartBiClient::new("not a url");
    assert!(matches!(result, Err(ClientError::Configuration(_))));
}

#[tokio::test]
async fn test_bearer_token_attached() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/current-user"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 1,
            "data": {"id": 1, "userAccount": "alice01", "userRole": "user"},
            "message": "ok"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), Some("test-token"));
    let response = h.client.current_user().await.unwrap();
    let user: UserInfo = response.data_as().unwrap();
    assert_eq!(user.user_account, "alice01");
    assert!(h.notifier.notifications().is_empty());
}

#[tokio::test]
async fn test_no_authorization_header_without_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 1})))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), None);
    h.client.login("alice01", "password1").await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_token_read_on_every_call() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/current-user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 1})))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), None);
    h.client.current_user().await.unwrap();
    h.tokens.write(SessionToken::new("second")).unwrap();
    h.client.current_user().await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert!(!requests[0].headers.contains_key("authorization"));
    assert_eq!(requests[1].headers["authorization"], "Bearer second");
}

#[tokio::test]
async fn test_coded_response_returned_unchanged() {
    let mock_server = MockServer::start().await;

    let body = json!({
        "code": 1,
        "msg": "login ok",
        "data": {"id": 3, "userAccount": "alice01", "userRole": "user"},
        "token": "jwt-value",
        "success": false
    });

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), None);
    let response = h.client.login("alice01", "password1").await.unwrap();
    assert_eq!(response.token(), Some(SessionToken::new("jwt-value")));
    assert_eq!(response, ApiResponse::Raw(body));
    // The pipeline never stores the token itself
    assert!(h.tokens.read().is_none());
}

#[tokio::test]
async fn test_success_envelope_unwrapped() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/current-user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [1, 2, 3],
            "message": "loaded",
            "total": 3
        })))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), Some("t"));
    let response = h.client.current_user().await.unwrap();
    assert_eq!(
        response.into_value(),
        json!({"data": [1, 2, 3], "message": "loaded"})
    );
}

#[tokio::test]
async fn test_application_failure_notifies_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": false, "message": "account exists"})),
        )
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), None);
    let err = h.client.register("alice01", "password1").await.unwrap_err();

    assert!(matches!(err, ClientError::Application { .. }));
    assert_eq!(err.message(), "account exists");
    assert_eq!(err.status(), None);
    assert_eq!(h.notifier.messages(), vec!["account exists".to_string()]);
    assert!(h.navigator.paths().is_empty());
}

#[tokio::test]
async fn test_non_json_success_body_is_a_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/current-user"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), None);
    let err = h.client.current_user().await.unwrap_err();
    assert_eq!(err.message(), "request failed");
    assert_eq!(h.notifier.notifications().len(), 1);
}

#[tokio::test]
async fn test_unauthorized_clears_session() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/current-user"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "认证失败"})))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), Some("expired"));
    let err = h.client.current_user().await.unwrap_err();

    assert!(err.is_auth_expired());
    assert_eq!(err.status(), Some(401));
    assert!(h.tokens.read().is_none());
    assert_eq!(h.navigator.paths(), vec!["/login".to_string()]);
    assert_eq!(h.notifier.messages(), vec![SESSION_EXPIRED_MESSAGE.to_string()]);
}

#[tokio::test]
async fn test_unauthorized_clears_non_ascii_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/current-user"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), Some("tökén"));
    let err = h.client.current_user().await.unwrap_err();

    assert!(err.is_auth_expired());
    assert!(h.tokens.read().is_none());
    assert_eq!(h.navigator.paths(), vec!["/login".to_string()]);
}

#[tokio::test]
async fn test_empty_token_sends_no_authorization_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/current-user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 1})))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), Some(""));
    h.client.current_user().await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

/// Simulates a login that completes while an older request is in flight
struct LoginDuringFlight {
    tokens: Arc<MemoryTokenStore>,
}

impl RequestInterceptor for LoginDuringFlight {
    fn intercept(&self, request: Request) -> Result<Request, ClientError> {
        self.tokens.write(SessionToken::new("fresh")).unwrap();
        Ok(request)
    }
}

#[tokio::test]
async fn test_unauthorized_keeps_newer_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/current-user"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let tokens = Arc::new(MemoryTokenStore::with_token("stale"));
    let navigator = Arc::new(RecordingNavigator::default());
    let client = SmartBiClient::builder()
        .base_url(mock_server.uri())
        .token_store(tokens.clone())
        .notifier(Arc::new(RecordingNotifier::default()))
        .navigator(navigator.clone())
        .interceptor(Arc::new(LoginDuringFlight {
            tokens: tokens.clone(),
        }))
        .build()
        .unwrap();

    let err = client.current_user().await.unwrap_err();
    assert!(err.is_auth_expired());
    assert_eq!(tokens.read(), Some(SessionToken::new("fresh")));
    assert_eq!(navigator.paths().len(), 1);
}

#[tokio::test]
async fn test_server_error_message_priority() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"detail": "账号或密码错误"})))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), None);

    let err = h.client.login("alice01", "wrongpass").await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.message(), "账号或密码错误");

    let err = h.client.register("alice01", "password1").await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.message(), "Request failed with status code 500");

    assert_eq!(
        h.notifier.messages(),
        vec![
            "账号或密码错误".to_string(),
            "Request failed with status code 500".to_string()
        ]
    );
    assert!(h.navigator.paths().is_empty());
}

#[tokio::test]
async fn test_network_failure() {
    // Nothing listens on port 1
    let h = harness("http://127.0.0.1:1", Some("t"));
    let err = h.client.current_user().await.unwrap_err();

    assert!(matches!(err, ClientError::Transport { status: None, .. }));
    assert!(!err.message().is_empty());
    assert_eq!(h.notifier.notifications().len(), 1);
    assert!(h.tokens.read().is_some());
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/current-user"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"code": 1}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let tokens = Arc::new(MemoryTokenStore::with_token("t"));
    let notifier = Arc::new(RecordingNotifier::default());
    let navigator = Arc::new(RecordingNavigator::default());
    let client = SmartBiClient::builder()
        .base_url(mock_server.uri())
        .timeout(Duration::from_millis(50))
        .token_store(tokens.clone())
        .notifier(notifier.clone())
        .navigator(navigator.clone())
        .build()
        .unwrap();

    let err = client.current_user().await.unwrap_err();

    assert!(matches!(err, ClientError::Transport { status: None, .. }));
    assert_eq!(notifier.notifications().len(), 1);
    assert_eq!(tokens.read(), Some(SessionToken::new("t")));
    assert!(navigator.paths().is_empty());
}

#[tokio::test]
async fn test_preparation_failure_is_not_sent() {
    let mock_server = MockServer::start().await;

    let h = harness(&mock_server.uri(), Some("broken\ntoken"));
    let err = h.client.current_user().await.unwrap_err();

    assert!(matches!(err, ClientError::Preparation(_)));
    assert!(h.notifier.notifications().is_empty());
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_register_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .and(body_json(json!({
            "userAccount": "alice",
            "userPassword": "pw",
            "userName": "alice",
            "userRole": "user"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 1, "msg": "ok"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), None);
    let response = h.client.register("alice", "pw").await.unwrap();
    assert_eq!(response.message(), Some("ok"));
}

#[tokio::test]
async fn test_login_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"userAccount": "alice", "userPassword": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 1, "token": "abc"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), None);
    let response = h.client.login("alice", "pw").await.unwrap();
    h.tokens.write(response.token().unwrap()).unwrap();
    assert!(h.tokens.is_authenticated());

    h.client.logout().unwrap();
    h.client.logout().unwrap();
    assert!(h.tokens.read().is_none());
}

#[tokio::test]
async fn test_unauthorized_redirect_goes_through_router() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/current-user"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let tokens = Arc::new(MemoryTokenStore::with_token("expired"));
    let notifier = Arc::new(RecordingNotifier::default());
    let router = Arc::new(Router::new(
        RouteTable::smartbi(),
        NavigationGuard::new(tokens.clone(), notifier.clone()),
    ));
    router.push("/analysis/overview").unwrap();

    let client = SmartBiClient::builder()
        .base_url(mock_server.uri())
        .token_store(tokens.clone())
        .notifier(notifier.clone())
        .navigator(router.clone())
        .build()
        .unwrap();

    client.current_user().await.unwrap_err();

    assert_eq!(router.current().unwrap().name, "Login");
    // Only the pipeline notifies: the login route itself is public
    assert_eq!(notifier.messages(), vec![SESSION_EXPIRED_MESSAGE.to_string()]);
}
