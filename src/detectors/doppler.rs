//! Doppler tokens: self-identifying `dp.<scope>.` prefixes.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;

use super::provider::{redact_value, ProviderSpec};
use crate::core::results::DetectorKind;
use crate::matcher::FieldPattern;
use crate::verifier::VerificationRequest;

lazy_static! {
    static ref TOKEN_PATTERN: Regex = Regex::new(
        r"\b(dp\.(?:ct|pt|st(?:\.[a-z0-9\-_]{2,35})?|sa|scim|audit)\.[a-zA-Z0-9]{40,44})\b"
    )
    .unwrap();
}

#[derive(Debug, Deserialize)]
struct MeResponse {
    #[serde(rename = "type")]
    token_type: Option<String>,
    #[serde(default)]
    workplace: Workplace,
}

#[derive(Debug, Deserialize, Default)]
struct Workplace {
    name: Option<String>,
}

fn extra_data(body: &[u8]) -> Option<BTreeMap<String, String>> {
    let me: MeResponse = serde_json::from_slice(body).ok()?;
    let mut map = BTreeMap::new();
    if let Some(token_type) = me.token_type {
        map.insert("token_type".to_string(), token_type);
    }
    if let Some(workplace) = me.workplace.name {
        map.insert("workplace".to_string(), workplace);
    }
    Some(map)
}

pub fn spec() -> ProviderSpec {
    ProviderSpec {
        kind: DetectorKind::Doppler,
        description: "Doppler is a secrets management platform; its tokens grant \
                      access to stored environment secrets.",
        keywords: &["dp.ct.", "dp.pt.", "dp.st", "dp.sa.", "dp.scim.", "dp.audit."],
        fields: vec![FieldPattern::capture("token", TOKEN_PATTERN.clone())],
        primary: 0,
        self_pair_excluded: &[],
        request: |c| {
            VerificationRequest::get("https://api.doppler.com/v3/me")
                .bearer(c.value(0))
                .header("Accept", "application/json")
        },
        rejected_statuses: &[401],
        accepted_statuses: &[],
        redact: |c| redact_value(c.value(0)),
        extra_data: Some(extra_data),
        false_positive: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::Detector;
    use crate::detectors::provider::ProviderDetector;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn detects_service_token() {
        let detector = ProviderDetector::new(spec());
        let data = b"DOPPLER_TOKEN=dp.ct.aBcDeFgHiJkLmNoPqRsTuVwXyZ0123456789abcd";
        let results = detector
            .from_data(data, false, &CancellationToken::new())
            .await;
        assert_eq!(results.len(), 1);
        assert!(results[0].raw.starts_with("dp.ct."));
    }

    #[tokio::test]
    async fn single_field_detector_has_no_multi_part_capability() {
        let detector = ProviderDetector::new(spec());
        assert!(detector.multi_part().is_none());
    }

    #[test]
    fn extra_data_reads_me_endpoint() {
        let body = br#"{"name":"ci","type":"service","workplace":{"name":"acme"}}"#;
        let map = extra_data(body).unwrap();
        assert_eq!(map.get("token_type").map(String::as_str), Some("service"));
        assert_eq!(map.get("workplace").map(String::as_str), Some("acme"));
    }
}
