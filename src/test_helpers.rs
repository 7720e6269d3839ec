//! Shared fakes for store, session and controller tests.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::ApiError;
use crate::net::api::{AuthApi, BundleApi, PathApi, PlaceApi};
use crate::net::payload::{BundlePayload, LoginForm, PathPayload, PlacePayload};
use crate::net::types::{Bundle, BundleId, LatLng, Path, PathId, Place, PlaceId};

pub const VALID_USERNAME: &str = "admin";
pub const VALID_PASSWORD: &str = "secret";
pub const ISSUED_SESSION: &str = "session-abc";

/// One recorded request.
#[derive(Clone, Debug, PartialEq)]
pub struct Call {
    pub method: &'static str,
    pub endpoint: String,
    pub body: Option<serde_json::Value>,
}

/// In-memory stand-in for the REST server.
///
/// Creates echo the payload back with a fresh id; updates echo it back with
/// the addressed id. `fail_next` makes exactly one subsequent call fail.
pub struct FakeApi {
    pub tree: Mutex<Vec<Bundle>>,
    pub calls: Mutex<Vec<Call>>,
    fail_next: Mutex<Option<ApiError>>,
    next_id: AtomicI64,
}

impl FakeApi {
    pub fn new(tree: Vec<Bundle>) -> Arc<Self> {
        Arc::new(Self {
            tree: Mutex::new(tree),
            calls: Mutex::new(Vec::new()),
            fail_next: Mutex::new(None),
            next_id: AtomicI64::new(100),
        })
    }

    pub fn fail_next(&self, err: ApiError) {
        *self.fail_next.lock().unwrap() = Some(err);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, method: &str, endpoint: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method && c.endpoint == endpoint)
            .collect()
    }

    fn record(&self, method: &'static str, endpoint: String, body: Option<serde_json::Value>) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(Call { method, endpoint, body });
        match self.fail_next.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn fresh_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

fn echo<T: serde::de::DeserializeOwned>(mut body: serde_json::Value, id: i64) -> T {
    body["id"] = serde_json::json!(id);
    serde_json::from_value(body).unwrap()
}

#[async_trait::async_trait]
impl BundleApi for FakeApi {
    async fn list_bundles(&self) -> Result<Vec<Bundle>, ApiError> {
        self.record("GET", "/api/v1/bundles".into(), None)?;
        Ok(self.tree.lock().unwrap().clone())
    }

    async fn create_bundle(&self, payload: &BundlePayload<'_>) -> Result<Bundle, ApiError> {
        let body = serde_json::to_value(payload).unwrap();
        self.record("POST", "/api/v1/bundles".into(), Some(body.clone()))?;
        Ok(echo(body, self.fresh_id()))
    }

    async fn update_bundle(&self, id: BundleId, payload: &BundlePayload<'_>) -> Result<Bundle, ApiError> {
        let body = serde_json::to_value(payload).unwrap();
        self.record("PUT", format!("/api/v1/bundles/{id}"), Some(body.clone()))?;
        Ok(echo(body, id.0))
    }

    async fn delete_bundle(&self, id: BundleId) -> Result<(), ApiError> {
        self.record("DELETE", format!("/api/v1/bundles/{id}"), None)
    }
}

#[async_trait::async_trait]
impl PathApi for FakeApi {
    async fn create_path(&self, payload: &PathPayload<'_>) -> Result<Path, ApiError> {
        let body = serde_json::to_value(payload).unwrap();
        self.record("POST", "/api/v1/paths".into(), Some(body.clone()))?;
        Ok(echo(body, self.fresh_id()))
    }

    async fn update_path(&self, id: PathId, payload: &PathPayload<'_>) -> Result<Path, ApiError> {
        let body = serde_json::to_value(payload).unwrap();
        self.record("PUT", format!("/api/v1/paths/{id}"), Some(body.clone()))?;
        Ok(echo(body, id.0))
    }

    async fn delete_path(&self, id: PathId) -> Result<(), ApiError> {
        self.record("DELETE", format!("/api/v1/paths/{id}"), None)
    }
}

#[async_trait::async_trait]
impl PlaceApi for FakeApi {
    async fn create_place(&self, payload: &PlacePayload<'_>) -> Result<Place, ApiError> {
        let body = serde_json::to_value(payload).unwrap();
        self.record("POST", "/api/v1/places".into(), Some(body.clone()))?;
        Ok(echo(body, self.fresh_id()))
    }

    async fn update_place(&self, id: PlaceId, payload: &PlacePayload<'_>) -> Result<Place, ApiError> {
        let body = serde_json::to_value(payload).unwrap();
        self.record("PUT", format!("/api/v1/places/{id}"), Some(body.clone()))?;
        Ok(echo(body, id.0))
    }

    async fn delete_place(&self, id: PlaceId) -> Result<(), ApiError> {
        self.record("DELETE", format!("/api/v1/places/{id}"), None)
    }
}

#[async_trait::async_trait]
impl AuthApi for FakeApi {
    async fn login(&self, form: &LoginForm) -> Result<String, ApiError> {
        self.record("POST", "/api/v1/login".into(), Some(serde_json::to_value(form).unwrap()))?;
        if form.username == VALID_USERNAME && form.password == VALID_PASSWORD {
            Ok(ISSUED_SESSION.to_owned())
        } else {
            Err(unauthorized("Invalid username and password"))
        }
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.record("POST", "/api/v1/logout".into(), None)
    }
}

pub fn unauthorized(message: &str) -> ApiError {
    ApiError::Status { status: 401, message: message.to_owned() }
}

pub fn server_error() -> ApiError {
    ApiError::Status { status: 500, message: "Internal Server Error".to_owned() }
}

// =============================================================================
// FIXTURES
// =============================================================================

pub fn place(id: i64, path_id: i64, lat: f64, lng: f64) -> Place {
    Place {
        id: Some(PlaceId(id)),
        name: format!("Place {id}"),
        info: format!("About place {id}"),
        radius: 1.0,
        position: LatLng::new(lat, lng),
        path_id: Some(PathId(path_id)),
        ..Place::default()
    }
}

pub fn path(id: i64, bundle_id: i64, places: Vec<Place>) -> Path {
    Path {
        id: Some(PathId(id)),
        name: format!("Path {id}"),
        info: format!("About path {id}"),
        length: 10.0,
        duration: 3.0,
        polyline: vec![LatLng::new(1.0, 1.0), LatLng::new(2.0, 3.0)],
        places,
        bundle_id: Some(BundleId(bundle_id)),
        ..Path::default()
    }
}

pub fn bundle(id: i64, paths: Vec<Path>) -> Bundle {
    Bundle {
        id: Some(BundleId(id)),
        name: format!("Bundle {id}"),
        info: String::new(),
        image: String::new(),
        paths,
    }
}

/// Bundle 7 → paths 11 (places 21, 22) and 12 (place 23); bundle 8 → path 13.
pub fn sample_tree() -> Vec<Bundle> {
    vec![
        bundle(
            7,
            vec![
                path(11, 7, vec![place(21, 11, 1.0, 1.0), place(22, 11, 1.5, 1.5)]),
                path(12, 7, vec![place(23, 12, 4.0, 4.0)]),
            ],
        ),
        bundle(8, vec![path(13, 8, Vec::new())]),
    ]
}
