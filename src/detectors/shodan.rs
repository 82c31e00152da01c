//! Shodan API keys: 32 alphanumeric characters near a "shodan" keyword.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;

use super::provider::{redact_value, ProviderSpec};
use crate::core::results::DetectorKind;
use crate::matcher::{prefix_regex, FieldPattern};
use crate::utils::PatternUtils;
use crate::verifier::VerificationRequest;

lazy_static! {
    static ref KEY_PATTERN: Regex = Regex::new(&format!(
        "{}{}",
        prefix_regex(&["shodan"]),
        r"\b([a-zA-Z0-9]{32})\b"
    ))
    .unwrap();
}

#[derive(Debug, Deserialize)]
struct ApiInfo {
    plan: Option<String>,
    query_credits: Option<i64>,
    scan_credits: Option<i64>,
}

fn extra_data(body: &[u8]) -> Option<BTreeMap<String, String>> {
    let info: ApiInfo = serde_json::from_slice(body).ok()?;
    let mut map = BTreeMap::new();
    if let Some(plan) = info.plan {
        map.insert("plan".to_string(), plan);
    }
    if let Some(credits) = info.query_credits {
        map.insert("query_credits".to_string(), credits.to_string());
    }
    if let Some(credits) = info.scan_credits {
        map.insert("scan_credits".to_string(), credits.to_string());
    }
    Some(map)
}

/// The 32-alnum shape also matches MD5 hashes and other constants;
/// real keys mix cases with digits and carry decent entropy.
fn false_positive(key: &str) -> Option<String> {
    if !PatternUtils::has_mixed_case(key) || !PatternUtils::has_digits(key) {
        return Some("missing mixed case or digits".to_string());
    }
    if PatternUtils::looks_like_hash(key) {
        return Some("looks like a hex digest".to_string());
    }
    if !PatternUtils::has_min_entropy(key, 4.0) {
        return Some("entropy too low".to_string());
    }
    None
}

pub fn spec() -> ProviderSpec {
    ProviderSpec {
        kind: DetectorKind::Shodan,
        description: "Shodan is a search engine for internet-connected devices. \
                      API keys grant query and scan credits on the holder's account.",
        keywords: &["shodan"],
        fields: vec![FieldPattern::capture("key", KEY_PATTERN.clone())],
        primary: 0,
        self_pair_excluded: &[],
        request: |c| {
            VerificationRequest::get(format!("https://api.shodan.io/api-info?key={}", c.value(0)))
                .header("Accept", "application/json")
        },
        rejected_statuses: &[401],
        accepted_statuses: &[],
        redact: |c| redact_value(c.value(0)),
        extra_data: Some(extra_data),
        false_positive: Some(false_positive),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::Detector;
    use crate::detectors::provider::ProviderDetector;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn detects_key_near_keyword() {
        let detector = ProviderDetector::new(spec());
        let data = b"SHODAN_API_KEY=oykKBEq2KRySU33OxizNkOir5PgHpMLv";
        let results = detector
            .from_data(data, false, &CancellationToken::new())
            .await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].raw, "oykKBEq2KRySU33OxizNkOir5PgHpMLv");
        assert_eq!(results[0].raw_v2, results[0].raw);
    }

    #[tokio::test]
    async fn hex_digest_is_filtered() {
        let detector = ProviderDetector::new(spec());
        let data = b"shodan hash = 5d41402abc4b2a76b9719d911017c592";
        let results = detector
            .from_data(data, false, &CancellationToken::new())
            .await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn key_without_keyword_is_ignored() {
        let detector = ProviderDetector::new(spec());
        let data = b"token=oykKBEq2KRySU33OxizNkOir5PgHpMLv";
        let results = detector
            .from_data(data, false, &CancellationToken::new())
            .await;
        assert!(results.is_empty());
    }

    #[test]
    fn exposes_false_positive_capability() {
        let detector = ProviderDetector::new(spec());
        let check = detector.false_positive_check().unwrap();
        assert!(check
            .is_false_positive("5d41402abc4b2a76b9719d911017c592")
            .is_some());
        assert!(check
            .is_false_positive("oykKBEq2KRySU33OxizNkOir5PgHpMLv")
            .is_none());
    }

    #[test]
    fn extra_data_parses_api_info() {
        let body = br#"{"plan":"dev","query_credits":100,"scan_credits":50,"https":true}"#;
        let map = extra_data(body).unwrap();
        assert_eq!(map.get("plan").map(String::as_str), Some("dev"));
        assert_eq!(map.get("query_credits").map(String::as_str), Some("100"));
    }
}
