use std::sync::Arc;
use std::time::Duration;

use bilimcert_gateway::{
    Credentials, EmailRequest, EngineEvent, EngineHandle, FileAttachment, Gateway, GatewayError,
    GatewaySettings, MemoryTokenStore, ReqwestGateway, TokenPair, TokenStore,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{
    body_string_contains, header, header_regex, method, path, query_param,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway_for(server: &MockServer, store: Arc<MemoryTokenStore>) -> ReqwestGateway {
    let settings = GatewaySettings::default().with_base_url(format!("{}/api", server.uri()));
    ReqwestGateway::new(settings, store).unwrap()
}

fn email(file: Option<FileAttachment>) -> EmailRequest {
    EmailRequest {
        subject: "Аккредитация".into(),
        message: "Организация: Университет".into(),
        to: "contact@bilimcert.kz".into(),
        file,
        recaptcha_token: "captcha-ok".into(),
    }
}

fn page_body() -> serde_json::Value {
    json!({
        "results": [{"id": 1, "title": "First"}, {"id": 2, "title": "Second"}],
        "count": 11,
        "next": "http://example/api/news/?page=2",
        "previous": null
    })
}

#[tokio::test]
async fn attaches_bearer_token_and_language() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/news/"))
        .and(header("authorization", "Bearer access-1"))
        .and(header("accept-language", "ru"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body()))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_tokens(TokenPair::new("access-1", None)));
    let gateway = gateway_for(&server, store);
    gateway.set_language(Some("ru".into()));

    let page = gateway
        .fetch_page("/news/", &[("page".into(), "2".into())])
        .await
        .unwrap();
    assert_eq!(page.count, 11);
    assert_eq!(page.results.len(), 2);
    assert!(page.has_next());
}

#[tokio::test]
async fn refreshes_once_and_retries_on_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/news/"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/"))
        .and(body_string_contains("\"refresh\":\"refresh-1\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "fresh"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/news/"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body()))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_tokens(TokenPair::new(
        "stale",
        Some("refresh-1".into()),
    )));
    let gateway = gateway_for(&server, store.clone());

    let page = gateway.fetch_page("news/", &[]).await.unwrap();
    assert_eq!(page.count, 11);

    let tokens = store.load().unwrap();
    assert_eq!(tokens.access, "fresh");
    assert_eq!(tokens.refresh.as_deref(), Some("refresh-1"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_unauthorized_requests_share_one_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/news/"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/news/"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body()))
        .expect(2)
        .mount(&server)
        .await;
    // The refresh token rotates: the first use succeeds, any reuse is refused.
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/"))
        .and(body_string_contains("\"refresh\":\"refresh-1\""))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(200))
                .set_body_json(json!({"access": "fresh", "refresh": "refresh-2"})),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(0)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_tokens(TokenPair::new(
        "stale",
        Some("refresh-1".into()),
    )));
    let gateway = gateway_for(&server, store.clone());

    let (first, second) = tokio::join!(
        gateway.fetch_page("news/", &[]),
        gateway.fetch_page("news/", &[])
    );
    assert_eq!(first.unwrap().count, 11);
    assert_eq!(second.unwrap().count, 11);
    assert_eq!(
        store.load(),
        Some(TokenPair::new("fresh", Some("refresh-2".into())))
    );
}

#[tokio::test]
async fn failed_refresh_clears_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/news/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_tokens(TokenPair::new(
        "stale",
        Some("refresh-1".into()),
    )));
    let gateway = gateway_for(&server, store.clone());

    let err = gateway.fetch_page("news/", &[]).await.unwrap_err();
    assert_eq!(
        err,
        GatewayError::SessionExpired {
            login_path: "/auth/login".into()
        }
    );
    assert!(store.load().is_none());
}

#[tokio::test]
async fn unauthorized_without_refresh_token_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/news/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "no token"})))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_tokens(TokenPair::new("only", None)));
    let gateway = gateway_for(&server, store.clone());

    let err = gateway.fetch_page("news/", &[]).await.unwrap_err();
    assert_eq!(
        err,
        GatewayError::HttpStatus {
            status: 401,
            detail: Some("no token".into())
        }
    );
    assert!(store.load().is_some());
}

#[tokio::test]
async fn email_without_file_is_still_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/email/send"))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .and(body_string_contains("name=\"isFiles\"\r\n\r\nfalse"))
        .and(body_string_contains("name=\"recaptcha_token\"\r\n\r\ncaptcha-ok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": 200})))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway_for(&server, Arc::new(MemoryTokenStore::new()));
    gateway.send_email(&email(None)).await.unwrap();
}

#[tokio::test]
async fn email_with_file_is_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/email/send"))
        .and(body_string_contains("name=\"isFiles\""))
        .and(body_string_contains("filename=\"diploma.pdf\""))
        .and(body_string_contains("%PDF-1.4"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway_for(&server, Arc::new(MemoryTokenStore::new()));
    let file = FileAttachment {
        file_name: "diploma.pdf".into(),
        content_type: "application/pdf".into(),
        bytes: b"%PDF-1.4 test".to_vec(),
    };
    gateway.send_email(&email(Some(file))).await.unwrap();
}

#[tokio::test]
async fn backend_rejection_in_body_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/email/send"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": 400, "response": "reCAPTCHA failed"})),
        )
        .mount(&server)
        .await;

    let gateway = gateway_for(&server, Arc::new(MemoryTokenStore::new()));
    let err = gateway.send_email(&email(None)).await.unwrap_err();
    assert_eq!(
        err,
        GatewayError::Rejected {
            status: 400,
            message: "reCAPTCHA failed".into()
        }
    );
}

#[tokio::test]
async fn login_stores_returned_tokens_and_logout_clears_them() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .and(body_string_contains("\"username\":\"aida\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tokens": {"access": "a-1", "refresh": "r-1"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/logout"))
        .and(header("authorization", "Bearer a-1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let gateway = gateway_for(&server, store.clone());
    let tokens = gateway
        .login(&Credentials {
            username: "aida".into(),
            password: "secret".into(),
            recaptcha_token: "tok".into(),
        })
        .await
        .unwrap();
    assert_eq!(tokens, Some(TokenPair::new("a-1", Some("r-1".into()))));
    assert_eq!(store.load().unwrap().access, "a-1");

    gateway.logout().await.unwrap();
    assert!(store.load().is_none());
}

#[tokio::test]
async fn server_errors_keep_status_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/registry/"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "boom"})))
        .mount(&server)
        .await;

    let gateway = gateway_for(&server, Arc::new(MemoryTokenStore::new()));
    let err = gateway.fetch_page("registry/", &[]).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(
        err,
        GatewayError::HttpStatus {
            status: 500,
            detail: Some("boom".into())
        }
    );
}

#[test]
fn rejects_unsupported_base_url() {
    let settings = GatewaySettings::default().with_base_url("ftp://example.org/api");
    let result = ReqwestGateway::new(settings, Arc::new(MemoryTokenStore::new()));
    assert!(matches!(result, Err(GatewayError::InvalidUrl(_))));
}

#[test]
fn engine_reports_results_through_channel() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let server = runtime.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/news/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_body()))
            .mount(&server)
            .await;
        server
    });

    let gateway = gateway_for(&server, Arc::new(MemoryTokenStore::new()));
    let engine = EngineHandle::new(Arc::new(gateway)).unwrap();
    engine.fetch_page(7, "news/", vec![("page".into(), "1".into())]);

    let event = engine.recv_timeout(Duration::from_secs(10)).unwrap();
    match event {
        EngineEvent::PageFetched { request_id, result } => {
            assert_eq!(request_id, 7);
            assert_eq!(result.unwrap().count, 11);
        }
        other => panic!("unexpected event {other:?}"),
    }
}
