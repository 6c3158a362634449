//! HTTP client for the backend REST service.
//!
//! Every entity lives under `{base_url}/{endpoint}` with the usual verbs:
//! GET list, GET item, POST create, PUT update, DELETE remove. List endpoints
//! answer either a bare JSON array or `{ "records": [...] }`.

pub mod endpoints;
pub mod error;
pub mod snapshot;

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use self::error::ApiError;
pub use self::snapshot::SnapshotStore;

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::InvalidRequest(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    // --------------------------------------------------------------------
    // Private HTTP helpers
    // --------------------------------------------------------------------

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| body.get("message").and_then(Value::as_str).map(String::from));
        Err(ApiError::Status { status: status.as_u16(), message })
    }

    /// Send and decode the body as JSON. An empty body decodes as `null`.
    pub(crate) async fn send_json(&self, req: reqwest::RequestBuilder) -> Result<Value, ApiError> {
        let resp = self.send(req).await?;
        let bytes = resp.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub(crate) fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http.request(method, self.url(path))
    }

    // --------------------------------------------------------------------
    // Generic CRUD
    // --------------------------------------------------------------------

    /// `GET /{endpoint}`: the full list as raw JSON objects.
    pub async fn list(&self, endpoint: &str) -> Result<Vec<Value>, ApiError> {
        let body = self.send_json(self.request(reqwest::Method::GET, endpoint)).await?;
        unwrap_list(body)
    }

    /// `GET /{endpoint}/{id}`
    pub async fn get(&self, endpoint: &str, id: i64) -> Result<Value, ApiError> {
        let path = format!("{endpoint}/{id}");
        self.send_json(self.request(reqwest::Method::GET, &path)).await
    }

    pub async fn get_as<T: DeserializeOwned>(&self, endpoint: &str, id: i64) -> Result<T, ApiError> {
        Ok(serde_json::from_value(self.get(endpoint, id).await?)?)
    }

    /// `POST /{endpoint}`: returns whatever the backend echoes back.
    pub async fn create<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> Result<Value, ApiError> {
        let req = self.request(reqwest::Method::POST, endpoint).json(body);
        self.send_json(req).await
    }

    /// `PUT /{endpoint}/{id}`
    pub async fn update<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        id: i64,
        body: &B,
    ) -> Result<Value, ApiError> {
        let path = format!("{endpoint}/{id}");
        let req = self.request(reqwest::Method::PUT, &path).json(body);
        self.send_json(req).await
    }

    /// `DELETE /{endpoint}/{id}`
    pub async fn delete(&self, endpoint: &str, id: i64) -> Result<(), ApiError> {
        let path = format!("{endpoint}/{id}");
        self.send(self.request(reqwest::Method::DELETE, &path)).await?;
        Ok(())
    }
}

/// Accept a bare array or a `{ "records": [...] }` envelope.
pub fn unwrap_list(body: Value) -> Result<Vec<Value>, ApiError> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("records") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(ApiError::Shape("expected an array or a `records` array".to_string())),
        },
        other => Err(ApiError::Shape(format!("expected an array, got {}", json_kind(&other)))),
    }
}

/// Read an integer id from a JSON object field, tolerating numeric strings.
pub fn id_of(value: &Value, field: &str) -> Option<i64> {
    match value.get(field)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
