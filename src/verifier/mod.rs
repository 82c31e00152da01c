//! Verification request model and outcome classification.

pub mod http;

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::core::error::Result;
use crate::core::results::Verdict;

pub use http::CurlClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// How the candidate credential is attached to the request.
#[derive(Debug, Clone)]
pub enum Auth {
    /// Credential is already embedded in the URL or body.
    None,
    Bearer(String),
    Basic { user: String, password: String },
    Header { name: &'static str, value: String },
}

/// One bounded outbound request against a provider's identity or
/// introspection endpoint.
#[derive(Debug, Clone)]
pub struct VerificationRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<String>,
    pub auth: Auth,
}

impl VerificationRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            auth: Auth::None,
        }
    }

    pub fn post(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body.into()),
            auth: Auth::None,
        }
    }

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.auth = Auth::Bearer(token.into());
        self
    }

    pub fn basic(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Auth::Basic {
            user: user.into(),
            password: password.into(),
        };
        self
    }

    pub fn auth_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.auth = Auth::Header {
            name,
            value: value.into(),
        };
        self
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(Into::into)
    }
}

/// Executes verification requests. One implementation talks libcurl;
/// tests substitute deterministic stubs.
#[async_trait]
pub trait VerificationClient: Send + Sync {
    async fn execute(
        &self,
        request: &VerificationRequest,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse>;
}

/// Extracts side metadata from a successful response body. `None`
/// means the body was not decodable.
pub type ExtraDataFn = fn(&[u8]) -> Option<BTreeMap<String, String>>;

/// Classify a transport outcome into a verification verdict.
///
/// Priority order:
/// 1. transport failure or cancellation: Indeterminate, never a
///    rejection;
/// 2. a status the provider defines as rejected: Rejected;
/// 3. 2xx (or a provider-specific accepted status): Verified, with
///    side metadata pulled from the body when an extractor is given —
///    an undecodable body downgrades to Indeterminate;
/// 4. anything else: Indeterminate with the status as diagnostic.
pub fn classify(
    outcome: Result<HttpResponse>,
    rejected_statuses: &[u16],
    accepted_statuses: &[u16],
    extra_data: Option<ExtraDataFn>,
) -> Verdict {
    let response = match outcome {
        Ok(response) => response,
        Err(e) => return Verdict::indeterminate(e.to_string()),
    };

    if rejected_statuses.contains(&response.status) {
        return Verdict::rejected();
    }

    if response.is_success() || accepted_statuses.contains(&response.status) {
        return match extra_data {
            None => Verdict::verified(BTreeMap::new()),
            Some(extract) => match extract(&response.body) {
                Some(map) => Verdict::verified(map),
                None => Verdict::indeterminate(format!(
                    "undecodable response body (status {})",
                    response.status
                )),
            },
        };
    }

    warn!(status = response.status, "unexpected verification status");
    Verdict::indeterminate(format!("unexpected status {}", response.status))
}
