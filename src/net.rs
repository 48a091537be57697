//! HTTP client for the four-endpoint control API.
//!
//! The panel never negotiates anything beyond the documented JSON shapes:
//! `GET /api/check` yields a [`StatusSnapshot`], the three mutating `POST`
//! endpoints yield an [`ActionResult`]. Failures are classified into a
//! structured taxonomy so the controller can tell "server unreachable"
//! (connectivity, routed to the monitor) apart from "server said no"
//! (application error, surfaced as a danger alert).

use crate::state::{ActionKind, ActionResult, StatusSnapshot};

/// Error taxonomy for control API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The transport could not reach the server at all. Routed to the
    /// connectivity monitor instead of the generic alert surface.
    #[error("server unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),
    /// The server was reachable but answered with a non-2xx status.
    #[error("server returned HTTP {0}")]
    Status(reqwest::StatusCode),
    /// The response body did not match the documented JSON shape.
    #[error("malformed response body: {0}")]
    Decode(#[source] reqwest::Error),
    /// Any other transport-level failure.
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
}

impl ApiError {
    /// Whether this failure means the server is unreachable, as opposed to
    /// an application-level error response.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }
}

/// Classify a transport error from `reqwest` into the taxonomy.
///
/// This replaces the fragile "message contains 'Failed to fetch'" heuristic
/// with the client's structured failure kinds: connection and timeout
/// failures are connectivity, body-shape failures are decode errors.
fn classify(err: reqwest::Error) -> ApiError {
    if err.is_connect() || err.is_timeout() {
        ApiError::Unreachable(err)
    } else if err.is_decode() {
        ApiError::Decode(err)
    } else {
        ApiError::Transport(err)
    }
}

/// Thin client over a shared [`reqwest::Client`] bound to one server base URL.
#[derive(Clone, Debug)]
pub struct ApiClient {
    base: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Build a client for `base`, e.g. `http://127.0.0.1:5000`. A trailing
    /// slash is tolerated. No timeout is set beyond the transport's own.
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Server base URL this client talks to.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// `GET /api/check`: fetch the current status snapshot.
    pub async fn fetch_status(&self) -> Result<StatusSnapshot, ApiError> {
        let url = format!("{}/api/check", self.base);
        let resp = self.http.get(&url).send().await.map_err(classify)?;
        if !resp.status().is_success() {
            return Err(ApiError::Status(resp.status()));
        }
        resp.json::<StatusSnapshot>().await.map_err(classify)
    }

    /// `POST` the given action's endpoint: no body, JSON content-type only.
    pub async fn post_action(&self, action: ActionKind) -> Result<ActionResult, ApiError> {
        let url = format!("{}{}", self.base, action.endpoint());
        let resp = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(classify)?;
        if !resp.status().is_success() {
            return Err(ApiError::Status(resp.status()));
        }
        resp.json::<ActionResult>().await.map_err(classify)
    }
}
