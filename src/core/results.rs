use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Stable identifier for a provider detector.
///
/// The numeric ids are persisted in re-verification records and must
/// never be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorKind {
    Shodan,
    Doppler,
    AmplitudeApiKey,
    Razorpay,
    Shopify,
}

impl DetectorKind {
    pub const ALL: &'static [DetectorKind] = &[
        DetectorKind::Shodan,
        DetectorKind::Doppler,
        DetectorKind::AmplitudeApiKey,
        DetectorKind::Razorpay,
        DetectorKind::Shopify,
    ];

    pub fn id(&self) -> u32 {
        match self {
            DetectorKind::Shodan => 1,
            DetectorKind::Doppler => 2,
            DetectorKind::AmplitudeApiKey => 3,
            DetectorKind::Razorpay => 4,
            DetectorKind::Shopify => 5,
        }
    }

    pub fn from_id(id: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.id() == id)
    }

    pub fn name(&self) -> &'static str {
        match self {
            DetectorKind::Shodan => "shodan",
            DetectorKind::Doppler => "doppler",
            DetectorKind::AmplitudeApiKey => "amplitude",
            DetectorKind::Razorpay => "razorpay",
            DetectorKind::Shopify => "shopify",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        Self::ALL.iter().copied().find(|k| k.name() == name)
    }
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of verifying one composite candidate.
///
/// `Rejected` means the provider explicitly refused the credential;
/// `Indeterminate` means no usable evidence either way (network
/// failure, cancellation, surprising status, undecodable body). The
/// two must not be conflated: only `Rejected` asserts a negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// Verification was not attempted.
    Unverified,
    Verified,
    Rejected,
    Indeterminate,
}

impl VerificationStatus {
    pub fn is_verified(&self) -> bool {
        matches!(self, VerificationStatus::Verified)
    }
}

/// What the verification client concluded about one candidate.
#[derive(Debug, Clone)]
pub struct Verdict {
    pub status: VerificationStatus,
    /// Provider-specific context (scopes, plan, account names),
    /// populated only on successful verification.
    pub extra_data: BTreeMap<String, String>,
    /// Diagnostic for Indeterminate outcomes, e.g. the status code or
    /// transport error. Never set for a clean rejection.
    pub diagnostic: Option<String>,
}

impl Verdict {
    pub fn verified(extra_data: BTreeMap<String, String>) -> Self {
        Self {
            status: VerificationStatus::Verified,
            extra_data,
            diagnostic: None,
        }
    }

    pub fn rejected() -> Self {
        Self {
            status: VerificationStatus::Rejected,
            extra_data: BTreeMap::new(),
            diagnostic: None,
        }
    }

    pub fn indeterminate(diagnostic: impl Into<String>) -> Self {
        Self {
            status: VerificationStatus::Indeterminate,
            extra_data: BTreeMap::new(),
            diagnostic: Some(diagnostic.into()),
        }
    }
}

/// One candidate credential found in a chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub kind: DetectorKind,
    /// Primary raw value (the most secret-like field), used for display
    /// and rotation linkage.
    pub raw: String,
    /// Canonical serialization of the full composite, used for identity
    /// and offline re-verification.
    pub raw_v2: String,
    /// Redacted display form.
    pub redacted: String,
    pub status: VerificationStatus,
    /// Diagnostic carried over from an Indeterminate verdict.
    pub error: Option<String>,
    pub extra_data: BTreeMap<String, String>,
}

impl ScanResult {
    pub fn discovered(kind: DetectorKind, raw: String, raw_v2: String, redacted: String) -> Self {
        Self {
            kind,
            raw,
            raw_v2,
            redacted,
            status: VerificationStatus::Unverified,
            error: None,
            extra_data: BTreeMap::new(),
        }
    }

    /// Collapse the status to the boolean consumers persist. The full
    /// enum stays on the record; this is a convenience only.
    pub fn verified(&self) -> bool {
        self.status.is_verified()
    }

    pub fn apply_verdict(&mut self, verdict: Verdict) {
        self.status = verdict.status;
        self.extra_data = verdict.extra_data;
        self.error = verdict.diagnostic;
    }
}

/// Persisted record consumed by the offline re-verification entry
/// point. `detector` is the stringified stable id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretRecord {
    pub detector: String,
    pub secret: String,
    pub verified: bool,
    #[serde(default)]
    pub reason: String,
}

/// Envelope written by the CLI scan command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub timestamp: DateTime<Utc>,
    pub total: usize,
    pub verified: usize,
    pub results: Vec<ScanResult>,
}

impl ScanReport {
    pub fn new(results: Vec<ScanResult>) -> Self {
        Self {
            timestamp: Utc::now(),
            total: results.len(),
            verified: results.iter().filter(|r| r.verified()).count(),
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_ids_are_stable() {
        assert_eq!(DetectorKind::Shodan.id(), 1);
        assert_eq!(DetectorKind::from_id(4), Some(DetectorKind::Razorpay));
        assert_eq!(DetectorKind::from_id(999), None);
    }

    #[test]
    fn kind_name_round_trip() {
        for kind in DetectorKind::ALL {
            assert_eq!(DetectorKind::from_name(kind.name()), Some(*kind));
        }
        assert_eq!(DetectorKind::from_name("SHOPIFY"), Some(DetectorKind::Shopify));
        assert_eq!(DetectorKind::from_name("nope"), None);
    }

    #[test]
    fn rejection_carries_no_error() {
        let mut result = ScanResult::discovered(
            DetectorKind::Razorpay,
            "rzp_live_abc".into(),
            "rzp_live_abc".into(),
            "rzp_live_...".into(),
        );
        result.apply_verdict(Verdict::rejected());
        assert_eq!(result.status, VerificationStatus::Rejected);
        assert!(!result.verified());
        assert!(result.error.is_none());
    }

    #[test]
    fn indeterminate_keeps_diagnostic() {
        let mut result = ScanResult::discovered(
            DetectorKind::Doppler,
            "dp.ct.x".into(),
            "dp.ct.x".into(),
            "dp.ct....".into(),
        );
        result.apply_verdict(Verdict::indeterminate("unexpected status 500"));
        assert_eq!(result.status, VerificationStatus::Indeterminate);
        assert!(!result.verified());
        assert_eq!(result.error.as_deref(), Some("unexpected status 500"));
    }
}
