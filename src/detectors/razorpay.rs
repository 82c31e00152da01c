//! Razorpay key id / secret pairs.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;

use super::provider::ProviderSpec;
use crate::core::results::DetectorKind;
use crate::matcher::FieldPattern;
use crate::verifier::VerificationRequest;

lazy_static! {
    static ref KEY_ID_PATTERN: Regex =
        Regex::new(r"(?i)\brzp_live_[A-Za-z0-9]{14}\b").unwrap();
    static ref SECRET_PATTERN: Regex = Regex::new(r"\b[A-Za-z0-9]{24}\b").unwrap();
}

/// A live key answers with a JSON item list; an HTML error page on a
/// 2xx means we proved nothing.
fn extra_data(body: &[u8]) -> Option<BTreeMap<String, String>> {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .map(|_| BTreeMap::new())
}

pub fn spec() -> ProviderSpec {
    ProviderSpec {
        kind: DetectorKind::Razorpay,
        description: "Razorpay is a payment gateway; key pairs can read and \
                      disburse payment transactions.",
        keywords: &["rzp_live_"],
        fields: vec![
            FieldPattern::whole("key_id", KEY_ID_PATTERN.clone()),
            FieldPattern::whole("secret", SECRET_PATTERN.clone()),
        ],
        primary: 0,
        self_pair_excluded: &[],
        request: |c| {
            VerificationRequest::get("https://api.razorpay.com/v1/items?count=1")
                .basic(c.value(0), c.value(1))
        },
        rejected_statuses: &[401],
        accepted_statuses: &[],
        redact: |c| c.value(0).to_string(),
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
    async fn pairs_key_id_with_every_secret_candidate() {
        let detector = ProviderDetector::new(spec());
        let data = b"RZP_KEY=rzp_live_A1b2C3d4E5f6G7\nRZP_SECRET=aAbBcCdDeEfFgGhHiIjJkKlL";
        let results = detector
            .from_data(data, false, &CancellationToken::new())
            .await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].raw, "rzp_live_A1b2C3d4E5f6G7");
        assert_eq!(
            results[0].raw_v2,
            "rzp_live_A1b2C3d4E5f6G7;-|aAbBcCdDeEfFgGhHiIjJkKlL"
        );
        // Key id is public-ish; it serves as the redacted form.
        assert_eq!(results[0].redacted, "rzp_live_A1b2C3d4E5f6G7");
    }

    #[tokio::test]
    async fn key_without_secret_yields_nothing() {
        let detector = ProviderDetector::new(spec());
        let data = b"RZP_KEY=rzp_live_A1b2C3d4E5f6G7";
        let results = detector
            .from_data(data, false, &CancellationToken::new())
            .await;
        assert!(results.is_empty());
    }
}
