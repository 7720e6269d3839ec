//! REST clients for bundles, paths, places and the login endpoints.
//!
//! SYSTEM CONTEXT
//! ==============
//! Controllers and the bundle store talk to the server only through the
//! `BundleApi`/`PathApi`/`PlaceApi`/`AuthApi` traits. `HttpApi` is the reqwest
//! implementation; tests substitute in-memory fakes.
//!
//! ERROR HANDLING
//! ==============
//! No call is retried and none caches anything. Transport failures and
//! non-2xx statuses both come back as `ApiError` through the same `Result`.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::time::Duration;

use reqwest::Method;
use reqwest::header::COOKIE;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use super::payload::{BundlePayload, LoginForm, PathPayload, PlacePayload};
use super::types::{Bundle, BundleId, Path, PathId, Place, PlaceId};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::state::session::{SESSION_COOKIE, SessionToken};

pub const BUNDLES_ENDPOINT: &str = "/api/v1/bundles";
pub const PATHS_ENDPOINT: &str = "/api/v1/paths";
pub const PLACES_ENDPOINT: &str = "/api/v1/places";
pub const LOGIN_ENDPOINT: &str = "/api/v1/login";
pub const LOGOUT_ENDPOINT: &str = "/api/v1/logout";

// =============================================================================
// RESOURCE TRAITS
// =============================================================================

/// Remote operations on bundles.
#[async_trait::async_trait]
pub trait BundleApi: Send + Sync {
    /// Fetch the full bundle tree (bundles with nested paths and places).
    async fn list_bundles(&self) -> Result<Vec<Bundle>, ApiError>;
    async fn create_bundle(&self, payload: &BundlePayload<'_>) -> Result<Bundle, ApiError>;
    async fn update_bundle(&self, id: BundleId, payload: &BundlePayload<'_>) -> Result<Bundle, ApiError>;
    async fn delete_bundle(&self, id: BundleId) -> Result<(), ApiError>;
}

/// Remote operations on paths. Paths are never cached outside their bundle.
#[async_trait::async_trait]
pub trait PathApi: Send + Sync {
    async fn create_path(&self, payload: &PathPayload<'_>) -> Result<Path, ApiError>;
    async fn update_path(&self, id: PathId, payload: &PathPayload<'_>) -> Result<Path, ApiError>;
    async fn delete_path(&self, id: PathId) -> Result<(), ApiError>;
}

/// Remote operations on places. Places are never cached outside their path.
#[async_trait::async_trait]
pub trait PlaceApi: Send + Sync {
    async fn create_place(&self, payload: &PlacePayload<'_>) -> Result<Place, ApiError>;
    async fn update_place(&self, id: PlaceId, payload: &PlacePayload<'_>) -> Result<Place, ApiError>;
    async fn delete_place(&self, id: PlaceId) -> Result<(), ApiError>;
}

/// Login/logout against the session endpoints.
#[async_trait::async_trait]
pub trait AuthApi: Send + Sync {
    /// Post credentials; returns the new session id.
    async fn login(&self, form: &LoginForm) -> Result<String, ApiError>;
    async fn logout(&self) -> Result<(), ApiError>;
}

/// Everything a view controller needs from the server.
pub trait Api: BundleApi + PathApi + PlaceApi + AuthApi {}

impl<T> Api for T where T: BundleApi + PathApi + PlaceApi + AuthApi {}

// =============================================================================
// HTTP IMPLEMENTATION
// =============================================================================

/// reqwest-backed client for the trail server's `/api/v1` surface.
///
/// The session id is read from the shared `SessionToken` on every request and
/// sent as the `SessionId` cookie.
pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
    token: SessionToken,
}

impl HttpApi {
    /// Build a client from config, sharing `token` with the session gate.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client fails to build.
    pub fn new(config: &ClientConfig, token: SessionToken) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.base_url.clone(), token })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        let builder = self.http.request(method, url);
        match self.token.get() {
            Some(token) => builder.header(COOKIE, session_cookie_header(&token)),
            None => builder,
        }
    }

    async fn send(&self, method: Method, path: &str, builder: reqwest::RequestBuilder) -> Result<String, ApiError> {
        tracing::debug!(%method, path, "api request");
        let response = builder.send().await.map_err(|e| {
            tracing::warn!(%method, path, error = %e, "api request failed");
            ApiError::Transport(e.to_string())
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !status.is_success() {
            let err = ApiError::from_status_body(status.as_u16(), &body);
            tracing::warn!(%method, path, status = status.as_u16(), error = %err, "api error response");
            return Err(err);
        }
        Ok(body)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, ApiError> {
        let mut builder = self.request(method.clone(), path);
        if let Some(body) = body {
            builder = builder.json(&body);
        }
        let text = self.send(method, path, builder).await?;
        parse_json(&text)
    }

    async fn send_empty(&self, method: Method, path: &str) -> Result<(), ApiError> {
        let builder = self.request(method.clone(), path);
        self.send(method, path, builder).await.map(|_| ())
    }
}

#[async_trait::async_trait]
impl BundleApi for HttpApi {
    async fn list_bundles(&self) -> Result<Vec<Bundle>, ApiError> {
        let bundles: Option<Vec<Bundle>> = self.send_json(Method::GET, BUNDLES_ENDPOINT, None).await?;
        Ok(bundles.unwrap_or_default())
    }

    async fn create_bundle(&self, payload: &BundlePayload<'_>) -> Result<Bundle, ApiError> {
        self.send_json(Method::POST, BUNDLES_ENDPOINT, Some(encode_body(payload)?)).await
    }

    async fn update_bundle(&self, id: BundleId, payload: &BundlePayload<'_>) -> Result<Bundle, ApiError> {
        let path = resource_endpoint(BUNDLES_ENDPOINT, id);
        self.send_json(Method::PUT, &path, Some(encode_body(payload)?)).await
    }

    async fn delete_bundle(&self, id: BundleId) -> Result<(), ApiError> {
        self.send_empty(Method::DELETE, &resource_endpoint(BUNDLES_ENDPOINT, id)).await
    }
}

#[async_trait::async_trait]
impl PathApi for HttpApi {
    async fn create_path(&self, payload: &PathPayload<'_>) -> Result<Path, ApiError> {
        self.send_json(Method::POST, PATHS_ENDPOINT, Some(encode_body(payload)?)).await
    }

    async fn update_path(&self, id: PathId, payload: &PathPayload<'_>) -> Result<Path, ApiError> {
        let path = resource_endpoint(PATHS_ENDPOINT, id);
        self.send_json(Method::PUT, &path, Some(encode_body(payload)?)).await
    }

    async fn delete_path(&self, id: PathId) -> Result<(), ApiError> {
        self.send_empty(Method::DELETE, &resource_endpoint(PATHS_ENDPOINT, id)).await
    }
}

#[async_trait::async_trait]
impl PlaceApi for HttpApi {
    async fn create_place(&self, payload: &PlacePayload<'_>) -> Result<Place, ApiError> {
        self.send_json(Method::POST, PLACES_ENDPOINT, Some(encode_body(payload)?)).await
    }

    async fn update_place(&self, id: PlaceId, payload: &PlacePayload<'_>) -> Result<Place, ApiError> {
        let path = resource_endpoint(PLACES_ENDPOINT, id);
        self.send_json(Method::PUT, &path, Some(encode_body(payload)?)).await
    }

    async fn delete_place(&self, id: PlaceId) -> Result<(), ApiError> {
        self.send_empty(Method::DELETE, &resource_endpoint(PLACES_ENDPOINT, id)).await
    }
}

#[async_trait::async_trait]
impl AuthApi for HttpApi {
    async fn login(&self, form: &LoginForm) -> Result<String, ApiError> {
        let builder = self.request(Method::POST, LOGIN_ENDPOINT).form(form);
        let text = self.send(Method::POST, LOGIN_ENDPOINT, builder).await?;
        parse_login_response(&text)
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.send_empty(Method::POST, LOGOUT_ENDPOINT).await
    }
}

// =============================================================================
// PURE HELPERS
// =============================================================================

fn resource_endpoint(collection: &str, id: impl std::fmt::Display) -> String {
    format!("{collection}/{id}")
}

fn session_cookie_header(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}")
}

fn encode_body<T: Serialize>(body: &T) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Encode(e.to_string()))
}

fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::Parse(e.to_string()))
}

fn parse_login_response(text: &str) -> Result<String, ApiError> {
    #[derive(Deserialize)]
    struct LoginResponse {
        #[serde(rename = "SessionId")]
        session_id: String,
    }

    let body: LoginResponse = parse_json(text)?;
    Ok(body.session_id)
}
