use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use super::*;
use crate::config::Timeouts;

fn config(base_url: &str) -> ClientConfig {
    ClientConfig {
        base_url: base_url.to_owned(),
        cookie_file: std::path::PathBuf::from("unused"),
        timeouts: Timeouts { request_secs: 5, connect_secs: 5 },
    }
}

/// Accept one connection, answer with `status_line` and `body`, and hand back
/// the raw request text.
async fn serve_once(status_line: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        request
    });
    (format!("http://{addr}"), handle)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf).into_owned();
        if let Some(end) = text.find("\r\n\r\n") {
            let length = text[..end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

// =============================================================================
// pure helpers
// =============================================================================

#[test]
fn resource_endpoint_appends_id() {
    assert_eq!(resource_endpoint(PATHS_ENDPOINT, PathId(11)), "/api/v1/paths/11");
    assert_eq!(resource_endpoint(BUNDLES_ENDPOINT, BundleId(7)), "/api/v1/bundles/7");
}

#[test]
fn session_cookie_header_uses_session_id_name() {
    assert_eq!(session_cookie_header("abc"), "SessionId=abc");
}

#[test]
fn parse_login_response_reads_session_id() {
    assert_eq!(parse_login_response(r#"{"SessionId":"s-1"}"#).unwrap(), "s-1");
    assert!(matches!(parse_login_response(r#"{"session":"s-1"}"#), Err(ApiError::Parse(_))));
}

#[test]
fn parse_json_reports_parse_errors() {
    let result: Result<Bundle, ApiError> = parse_json("not json");
    assert!(matches!(result, Err(ApiError::Parse(_))));
}

#[test]
fn request_carries_cookie_only_with_token() {
    let token = SessionToken::default();
    let api = HttpApi::new(&config("http://example.test"), token.clone()).unwrap();

    let anonymous = api.request(Method::GET, BUNDLES_ENDPOINT).build().unwrap();
    assert_eq!(anonymous.url().as_str(), "http://example.test/api/v1/bundles");
    assert!(anonymous.headers().get(COOKIE).is_none());

    token.set("tok".into());
    let authed = api.request(Method::GET, BUNDLES_ENDPOINT).build().unwrap();
    assert_eq!(authed.headers().get(COOKIE).unwrap(), "SessionId=tok");
}

// =============================================================================
// over the wire
// =============================================================================

#[tokio::test]
async fn list_bundles_decodes_null_as_empty() {
    let (base_url, server) = serve_once("200 OK", "null").await;
    let api = HttpApi::new(&config(&base_url), SessionToken::new(Some("tok".into()))).unwrap();

    assert!(api.list_bundles().await.unwrap().is_empty());

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /api/v1/bundles HTTP/1.1"));
    assert!(request.to_ascii_lowercase().contains("cookie: sessionid=tok"));
}

#[tokio::test]
async fn unauthorized_status_keeps_server_message() {
    let (base_url, server) = serve_once("401 Unauthorized", r#"{"status":401,"message":"Session expired"}"#).await;
    let api = HttpApi::new(&config(&base_url), SessionToken::default()).unwrap();

    let err = api.delete_path(PathId(3)).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.notice_detail(), "401 Session expired");

    let request = server.await.unwrap();
    assert!(request.starts_with("DELETE /api/v1/paths/3 HTTP/1.1"));
}

#[tokio::test]
async fn login_posts_form_and_returns_session_id() {
    let (base_url, server) = serve_once("200 OK", r#"{"SessionId":"fresh"}"#).await;
    let api = HttpApi::new(&config(&base_url), SessionToken::default()).unwrap();

    let session = api.login(&LoginForm::new("admin", "secret")).await.unwrap();
    assert_eq!(session, "fresh");

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/v1/login HTTP/1.1"));
    assert!(request.to_ascii_lowercase().contains("content-type: application/x-www-form-urlencoded"));
    assert!(request.ends_with("username=admin&password=secret"));
}

#[tokio::test]
async fn connection_refused_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let api = HttpApi::new(&config(&format!("http://{addr}")), SessionToken::default()).unwrap();

    assert!(matches!(api.list_bundles().await, Err(ApiError::Transport(_))));
}
