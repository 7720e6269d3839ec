//! Session gate: the single "is an administrator logged in" flag.
//!
//! ARCHITECTURE
//! ============
//! The session id lives in one `SessionToken` cell shared by the gate and the
//! HTTP client, so a login is visible to the next request without rewiring.
//! The value is mirrored into a `CookieStore` so it survives restarts.
//!
//! TRADE-OFFS
//! ==========
//! The gate never retries a login and never validates the token locally; a
//! stale token is only discovered when the server answers `401`.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::error::ApiError;
use crate::net::api::AuthApi;
use crate::net::payload::LoginForm;
use crate::state::notice::{NoticeLevel, Notifier};

/// Cookie name the server issues and expects.
pub const SESSION_COOKIE: &str = "SessionId";

// =============================================================================
// SESSION TOKEN
// =============================================================================

/// Shared, cloneable handle to the current session id.
#[derive(Clone, Debug, Default)]
pub struct SessionToken {
    inner: Arc<RwLock<Option<String>>>,
}

impl SessionToken {
    #[must_use]
    pub fn new(initial: Option<String>) -> Self {
        let token = Self::default();
        if let Some(value) = initial {
            token.set(value);
        }
        token
    }

    /// Current token; empty strings count as absent.
    #[must_use]
    pub fn get(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .filter(|t| !t.is_empty())
    }

    pub fn set(&self, value: String) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(value);
    }

    pub fn clear(&self) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    #[must_use]
    pub fn is_present(&self) -> bool {
        self.get().is_some()
    }
}

// =============================================================================
// COOKIE PERSISTENCE
// =============================================================================

/// Persistence for the session cookie.
pub trait CookieStore: Send + Sync {
    fn load(&self) -> Option<String>;
    /// # Errors
    ///
    /// Returns an error if the cookie could not be written.
    fn store(&self, token: &str) -> io::Result<()>;
    /// # Errors
    ///
    /// Returns an error if the cookie could not be removed.
    fn clear(&self) -> io::Result<()>;
}

/// Cookie persisted as a single `SessionId=<token>` line in a file.
#[derive(Clone, Debug)]
pub struct CookieFile {
    path: PathBuf,
}

impl CookieFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CookieStore for CookieFile {
    fn load(&self) -> Option<String> {
        let text = std::fs::read_to_string(&self.path).ok()?;
        parse_cookie_line(&text)
    }

    fn store(&self, token: &str) -> io::Result<()> {
        let mut file = open_owner_only(&self.path)?;
        file.write_all(format!("{SESSION_COOKIE}={token}\n").as_bytes())
    }

    fn clear(&self) -> io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// Open for overwrite, readable by the owner only. A pre-existing file
/// has its mode tightened as well.
#[cfg(unix)]
fn open_owner_only(path: &Path) -> io::Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = OpenOptions::new().write(true).create(true).truncate(true).mode(0o600).open(path)?;
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_owner_only(path: &Path) -> io::Result<File> {
    OpenOptions::new().write(true).create(true).truncate(true).open(path)
}

/// In-process cookie, used when nothing should touch the filesystem.
#[derive(Debug, Default)]
pub struct MemoryCookie {
    value: Mutex<Option<String>>,
}

impl MemoryCookie {
    #[must_use]
    pub fn new(initial: Option<&str>) -> Self {
        Self { value: Mutex::new(initial.map(str::to_owned)) }
    }
}

impl CookieStore for MemoryCookie {
    fn load(&self) -> Option<String> {
        self.value.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn store(&self, token: &str) -> io::Result<()> {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_owned());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

fn parse_cookie_line(text: &str) -> Option<String> {
    text.lines().find_map(|line| {
        let (name, value) = line.trim().split_once('=')?;
        (name.trim() == SESSION_COOKIE && !value.trim().is_empty()).then(|| value.trim().to_owned())
    })
}

// =============================================================================
// SESSION GATE
// =============================================================================

/// Login/logout and the authenticated predicate.
pub struct SessionGate {
    token: SessionToken,
    cookie: Box<dyn CookieStore>,
    api: Arc<dyn AuthApi>,
    notifier: Arc<dyn Notifier>,
}

impl SessionGate {
    /// Build a gate, seeding `token` from the persisted cookie.
    pub fn new(
        token: SessionToken,
        cookie: Box<dyn CookieStore>,
        api: Arc<dyn AuthApi>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        if let Some(persisted) = cookie.load() {
            token.set(persisted);
        }
        Self { token, cookie, api, notifier }
    }

    /// Shared handle to the token, for wiring into an HTTP client.
    #[must_use]
    pub fn token(&self) -> SessionToken {
        self.token.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_present()
    }

    /// Post credentials and store the returned session id.
    ///
    /// # Errors
    ///
    /// Returns the API error after surfacing a failure notice.
    pub async fn login(&self, form: &LoginForm) -> Result<(), ApiError> {
        match self.api.login(form).await {
            Ok(session_id) => {
                self.token.set(session_id.clone());
                if let Err(e) = self.cookie.store(&session_id) {
                    tracing::warn!(error = %e, "failed to persist session cookie");
                }
                tracing::info!(username = %form.username, "logged in");
                self.notifier.notify("Successfully logged in", NoticeLevel::Info);
                Ok(())
            }
            Err(e) => {
                self.notifier
                    .notify(&format!("Failed to log in: {}", e.message()), NoticeLevel::Alarm);
                Err(e)
            }
        }
    }

    /// Post logout; on success the token is cleared whatever the body says.
    ///
    /// # Errors
    ///
    /// Returns the API error after surfacing a failure notice.
    pub async fn logout(&self) -> Result<(), ApiError> {
        match self.api.logout().await {
            Ok(()) => {
                self.clear();
                self.notifier.notify("Successfully logged out", NoticeLevel::Info);
                Ok(())
            }
            Err(e) => {
                self.notifier.notify("Failed to log out", NoticeLevel::Alarm);
                Err(e)
            }
        }
    }

    /// Drop the token and the persisted cookie without contacting the server.
    pub fn clear(&self) {
        self.token.clear();
        if let Err(e) = self.cookie.clear() {
            tracing::warn!(error = %e, "failed to remove session cookie");
        }
    }
}
