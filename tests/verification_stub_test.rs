//! Classification scenarios against a live local HTTP stub.

use leakscan::core::{ScanError, VerificationStatus};
use leakscan::verifier::{classify, CurlClient, VerificationClient, VerificationRequest};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// One-shot HTTP stub answering a single request with a canned
/// response.
fn spawn_stub(response: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf);
            let _ = stream.write_all(response.as_bytes());
        }
    });
    format!("http://{}/check", addr)
}

/// Stub that accepts the connection and never answers.
fn spawn_silent_stub() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf);
            std::thread::sleep(Duration::from_secs(10));
        }
    });
    format!("http://{}/check", addr)
}

#[tokio::test]
async fn explicit_401_classifies_as_rejected_without_error() {
    let url = spawn_stub(
        "HTTP/1.1 401 Unauthorized\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
    );
    let client = CurlClient::sane();

    let outcome = client
        .execute(
            &VerificationRequest::get(url).bearer("bogus"),
            &CancellationToken::new(),
        )
        .await;
    let verdict = classify(outcome, &[401], &[], None);

    assert_eq!(verdict.status, VerificationStatus::Rejected);
    assert!(verdict.diagnostic.is_none());
}

#[tokio::test]
async fn success_body_reaches_the_metadata_extractor() {
    let url = spawn_stub(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 15\r\nConnection: close\r\n\r\n{\"plan\":\"dev\"}\n",
    );
    let client = CurlClient::sane();

    fn extract(body: &[u8]) -> Option<std::collections::BTreeMap<String, String>> {
        let v: serde_json::Value = serde_json::from_slice(body).ok()?;
        let mut map = std::collections::BTreeMap::new();
        if let Some(plan) = v.get("plan").and_then(|p| p.as_str()) {
            map.insert("plan".to_string(), plan.to_string());
        }
        Some(map)
    }

    let outcome = client
        .execute(&VerificationRequest::get(url), &CancellationToken::new())
        .await;
    let verdict = classify(outcome, &[401], &[], Some(extract));

    assert_eq!(verdict.status, VerificationStatus::Verified);
    assert_eq!(verdict.extra_data.get("plan").map(String::as_str), Some("dev"));
}

#[tokio::test]
async fn timeout_classifies_as_indeterminate_with_diagnostic() {
    let url = spawn_silent_stub();
    let client = CurlClient::sane().with_timeout(Duration::from_millis(500));

    let outcome = client
        .execute(&VerificationRequest::get(url), &CancellationToken::new())
        .await;
    assert!(matches!(outcome, Err(ScanError::Timeout(_))));

    let verdict = classify(outcome, &[401], &[], None);
    assert_eq!(verdict.status, VerificationStatus::Indeterminate);
    // This is what distinguishes a timeout from an explicit rejection:
    // the caller gets a diagnostic, not a silent "not verified".
    assert!(verdict.diagnostic.is_some());
}

#[tokio::test]
async fn unexpected_status_keeps_the_status_code_visible() {
    let url = spawn_stub(
        "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
    );
    let client = CurlClient::sane();

    let outcome = client
        .execute(&VerificationRequest::get(url), &CancellationToken::new())
        .await;
    let verdict = classify(outcome, &[401], &[], None);

    assert_eq!(verdict.status, VerificationStatus::Indeterminate);
    assert_eq!(verdict.diagnostic.as_deref(), Some("unexpected status 503"));
}

#[tokio::test]
async fn cancellation_aborts_an_outstanding_request() {
    let url = spawn_silent_stub();
    let client = CurlClient::sane().with_timeout(Duration::from_secs(30));

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            cancel.cancel();
        });
    }

    let start = std::time::Instant::now();
    let outcome = client
        .execute(&VerificationRequest::get(url), &cancel)
        .await;

    assert!(matches!(outcome, Err(ScanError::Cancelled)));
    // Aborted promptly, nowhere near the 30s timeout.
    assert!(start.elapsed() < Duration::from_secs(10));

    let verdict = classify(outcome, &[401], &[], None);
    assert_eq!(verdict.status, VerificationStatus::Indeterminate);
}

#[tokio::test]
async fn default_client_refuses_local_destinations() {
    let url = spawn_stub("HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
    let client = CurlClient::no_local_addresses();

    let outcome = client
        .execute(&VerificationRequest::get(url), &CancellationToken::new())
        .await;
    assert!(matches!(outcome, Err(ScanError::BlockedAddress(_))));
}
