//! Amplitude API key/secret pairs. Both fields share one lexical shape,
//! so self-pairing must be excluded during assembly.

use lazy_static::lazy_static;
use regex::Regex;

use super::provider::{redact_value, ProviderSpec};
use crate::core::results::DetectorKind;
use crate::matcher::{prefix_regex, FieldPattern};
use crate::verifier::VerificationRequest;

lazy_static! {
    static ref HEX32_PATTERN: Regex = Regex::new(&format!(
        "{}{}",
        prefix_regex(&["amplitude"]),
        r"\b([0-9a-f]{32})\b"
    ))
    .unwrap();
}

pub fn spec() -> ProviderSpec {
    ProviderSpec {
        kind: DetectorKind::AmplitudeApiKey,
        description: "Amplitude is a product analytics service; key/secret pairs \
                      can read and modify tracked event data.",
        keywords: &["amplitude"],
        fields: vec![
            FieldPattern::capture("key", HEX32_PATTERN.clone()),
            FieldPattern::capture("secret", HEX32_PATTERN.clone()),
        ],
        primary: 0,
        // Same pattern backs both roles; an identical value in both is
        // one literal, not a pair.
        self_pair_excluded: &[(0, 1)],
        request: |c| {
            VerificationRequest::get("https://amplitude.com/api/2/taxonomy/category")
                .basic(c.value(0), c.value(1))
        },
        rejected_statuses: &[401],
        accepted_statuses: &[],
        redact: |c| redact_value(c.value(0)),
        extra_data: None,
        false_positive: None,
    }
}
