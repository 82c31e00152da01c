//! libcurl-backed verification client.

use async_trait::async_trait;
use curl::easy::{Easy2, Handler, List, WriteError};
use std::net::{IpAddr, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::{Auth, HttpResponse, Method, VerificationClient, VerificationRequest};
use crate::core::error::{Result, ScanError};

/// Collects the response body and aborts the transfer when the
/// cancellation flag flips.
struct Collector {
    buf: Vec<u8>,
    cancelled: Arc<AtomicBool>,
}

impl Handler for Collector {
    fn write(&mut self, data: &[u8]) -> std::result::Result<usize, WriteError> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn progress(&mut self, _dltotal: f64, _dlnow: f64, _ultotal: f64, _ulnow: f64) -> bool {
        !self.cancelled.load(Ordering::Relaxed)
    }
}

/// HTTP client for verification calls.
///
/// The detector default refuses loopback, link-local and private
/// destinations; a provider endpoint resolving there is an SSRF
/// attempt, not a credential check. Tests use [`CurlClient::sane`],
/// which allows them.
#[derive(Debug, Clone)]
pub struct CurlClient {
    timeout: Duration,
    allow_local: bool,
}

impl CurlClient {
    /// Client with local destinations permitted.
    pub fn sane() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            allow_local: true,
        }
    }

    /// Client refusing loopback/link-local/private destinations.
    pub fn no_local_addresses() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            allow_local: false,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl VerificationClient for CurlClient {
    async fn execute(
        &self,
        request: &VerificationRequest,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse> {
        if cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }

        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let request = request.clone();
        let timeout = self.timeout;
        let allow_local = self.allow_local;

        let mut task =
            tokio::task::spawn_blocking(move || perform(&request, timeout, allow_local, flag));

        tokio::select! {
            joined = &mut task => {
                joined.map_err(|e| ScanError::Unknown(format!("task join error: {}", e)))?
            }
            _ = cancel.cancelled() => {
                cancelled.store(true, Ordering::Relaxed);
                // The progress callback aborts the transfer; wait for
                // the blocking task to unwind before returning.
                let _ = task.await;
                Err(ScanError::Cancelled)
            }
        }
    }
}

fn perform(
    request: &VerificationRequest,
    timeout: Duration,
    allow_local: bool,
    cancelled: Arc<AtomicBool>,
) -> Result<HttpResponse> {
    if !allow_local {
        screen_destination(&request.url)?;
    }

    let mut easy = Easy2::new(Collector {
        buf: Vec::new(),
        cancelled,
    });

    easy.url(&request.url)?;
    easy.timeout(timeout)?;
    easy.follow_location(true)?;
    easy.max_redirections(5)?;
    easy.ssl_verify_peer(true)?;
    easy.ssl_verify_host(true)?;
    easy.progress(true)?;

    if let Method::Post = request.method {
        easy.post(true)?;
        if let Some(body) = &request.body {
            easy.post_fields_copy(body.as_bytes())?;
        }
    }

    let mut list = List::new();
    match &request.auth {
        Auth::None => {}
        Auth::Bearer(token) => list.append(&format!("Authorization: Bearer {}", token))?,
        Auth::Header { name, value } => list.append(&format!("{}: {}", name, value))?,
        Auth::Basic { user, password } => {
            easy.username(user)?;
            easy.password(password)?;
        }
    }
    for (name, value) in &request.headers {
        list.append(&format!("{}: {}", name, value))?;
    }
    easy.http_headers(list)?;

    match easy.perform() {
        Ok(()) => {}
        Err(e) if e.is_aborted_by_callback() => return Err(ScanError::Cancelled),
        Err(e) if e.is_operation_timedout() => return Err(ScanError::Timeout(timeout)),
        Err(e) => return Err(ScanError::Curl(e)),
    }

    let status = easy.response_code()? as u16;
    let body = std::mem::take(&mut easy.get_mut().buf);

    Ok(HttpResponse { status, body })
}

/// Resolve the request host and refuse local destinations.
fn screen_destination(url: &str) -> Result<()> {
    let (host, port) = host_port(url)
        .ok_or_else(|| ScanError::Http(format!("unparseable URL: {}", url)))?;

    let addrs = (host.as_str(), port)
        .to_socket_addrs()
        .map_err(|e| ScanError::Http(format!("failed to resolve {}: {}", host, e)))?;

    for addr in addrs {
        if is_local_address(addr.ip()) {
            return Err(ScanError::BlockedAddress(format!("{} -> {}", host, addr.ip())));
        }
    }
    Ok(())
}

fn is_local_address(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback() || v4.is_link_local() || v4.is_private() || v4.is_unspecified()
        }
        IpAddr::V6(v6) => {
            let segments = v6.segments();
            v6.is_loopback()
                || v6.is_unspecified()
                // fe80::/10 link-local, fc00::/7 unique-local
                || (segments[0] & 0xffc0) == 0xfe80
                || (segments[0] & 0xfe00) == 0xfc00
        }
    }
}

/// Pull `(host, port)` out of an http(s) URL.
fn host_port(url: &str) -> Option<(String, u16)> {
    let (scheme, rest) = url.split_once("://")?;
    let default_port = match scheme {
        "http" => 80,
        "https" => 443,
        _ => return None,
    };

    let authority = rest.split(['/', '?', '#']).next()?;
    let authority = authority.rsplit('@').next()?;

    // Bracketed IPv6 literal.
    if let Some(rest) = authority.strip_prefix('[') {
        let (host, tail) = rest.split_once(']')?;
        let port = match tail.strip_prefix(':') {
            Some(p) => p.parse().ok()?,
            None => default_port,
        };
        return Some((host.to_string(), port));
    }

    match authority.rsplit_once(':') {
        Some((host, port)) => Some((host.to_string(), port.parse().ok()?)),
        None => Some((authority.to_string(), default_port)),
    }
}
