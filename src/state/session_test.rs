use super::*;
use crate::state::notice::NoticeBoard;
use crate::test_helpers::{FakeApi, ISSUED_SESSION, VALID_PASSWORD, VALID_USERNAME, server_error};

fn gate_with(api: Arc<FakeApi>, cookie: Option<&str>) -> (SessionGate, Arc<NoticeBoard>) {
    let notices = Arc::new(NoticeBoard::new());
    let gate = SessionGate::new(
        SessionToken::default(),
        Box::new(MemoryCookie::new(cookie)),
        api,
        notices.clone(),
    );
    (gate, notices)
}

// =============================================================
// SessionToken
// =============================================================

#[test]
fn empty_token_is_not_present() {
    let token = SessionToken::new(Some(String::new()));
    assert!(!token.is_present());
    assert!(token.get().is_none());
}

#[test]
fn token_clones_share_state() {
    let token = SessionToken::default();
    let other = token.clone();
    token.set("abc".into());
    assert_eq!(other.get().as_deref(), Some("abc"));
    other.clear();
    assert!(!token.is_present());
}

// =============================================================
// Cookie persistence
// =============================================================

#[test]
fn parse_cookie_line_finds_session_id() {
    assert_eq!(parse_cookie_line("SessionId=abc123\n").as_deref(), Some("abc123"));
    assert_eq!(parse_cookie_line("Other=1\nSessionId = xyz\n").as_deref(), Some("xyz"));
    assert!(parse_cookie_line("SessionId=\n").is_none());
    assert!(parse_cookie_line("").is_none());
}

#[test]
fn cookie_file_round_trips_and_clears() {
    let path = std::env::temp_dir().join(format!("trailmap-cookie-{}", std::process::id()));
    let file = CookieFile::new(&path);
    file.store("tok").unwrap();
    assert_eq!(file.load().as_deref(), Some("tok"));
    file.clear().unwrap();
    assert!(file.load().is_none());
    // Clearing a missing file is fine.
    file.clear().unwrap();
}

#[cfg(unix)]
#[test]
fn cookie_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let path = std::env::temp_dir().join(format!("trailmap-cookie-mode-{}", std::process::id()));
    std::fs::write(&path, "stale").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

    let file = CookieFile::new(&path);
    file.store("tok").unwrap();
    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "SessionId=tok\n");
    file.clear().unwrap();
}

// =============================================================
// SessionGate
// =============================================================

#[test]
fn gate_seeds_token_from_cookie() {
    let (gate, _) = gate_with(FakeApi::new(Vec::new()), Some("persisted"));
    assert!(gate.is_authenticated());
    assert_eq!(gate.token().get().as_deref(), Some("persisted"));
}

#[tokio::test]
async fn login_success_stores_token_and_notifies() {
    let (gate, notices) = gate_with(FakeApi::new(Vec::new()), None);
    gate.login(&LoginForm::new(VALID_USERNAME, VALID_PASSWORD)).await.unwrap();

    assert!(gate.is_authenticated());
    assert_eq!(gate.token().get().as_deref(), Some(ISSUED_SESSION));
    assert_eq!(gate.cookie.load().as_deref(), Some(ISSUED_SESSION));
    assert_eq!(notices.current().unwrap().message, "Successfully logged in");
}

#[tokio::test]
async fn login_with_wrong_credentials_keeps_token_absent() {
    let (gate, notices) = gate_with(FakeApi::new(Vec::new()), None);
    let result = gate.login(&LoginForm::new(VALID_USERNAME, "wrong")).await;

    assert!(result.is_err());
    assert!(!gate.is_authenticated());
    let notice = notices.current().unwrap();
    assert_eq!(notice.message, "Failed to log in: Invalid username and password");
    assert_eq!(notice.level, NoticeLevel::Alarm);
}

#[tokio::test]
async fn logout_success_clears_token_and_cookie() {
    let (gate, notices) = gate_with(FakeApi::new(Vec::new()), Some("persisted"));
    gate.logout().await.unwrap();

    assert!(!gate.is_authenticated());
    assert!(gate.cookie.load().is_none());
    assert_eq!(notices.current().unwrap().message, "Successfully logged out");
}

#[tokio::test]
async fn logout_failure_notifies_and_keeps_token() {
    let api = FakeApi::new(Vec::new());
    api.fail_next(server_error());
    let (gate, notices) = gate_with(api, Some("persisted"));

    assert!(gate.logout().await.is_err());
    assert!(gate.is_authenticated());
    assert_eq!(notices.current().unwrap().message, "Failed to log out");
}
