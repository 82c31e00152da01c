use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::results::{DetectorKind, ScanResult};

/// Contract implemented by every provider detector.
///
/// Extraction is pure and stateless; verification issues at most one
/// bounded outbound request per composite candidate. Per-candidate
/// verification failures never abort the whole call.
#[async_trait]
pub trait Detector: Send + Sync {
    /// Stable identifier, persisted by re-verification records.
    fn kind(&self) -> DetectorKind;

    /// Human-readable description of the provider and what its
    /// credentials grant access to.
    fn description(&self) -> &str;

    /// Short literal tokens for the chunk prefilter. Must be a safe
    /// superset: a chunk containing this provider's credentials always
    /// contains at least one keyword.
    fn keywords(&self) -> &[&str];

    /// Find and optionally verify credentials in a chunk of bytes.
    async fn from_data(
        &self,
        data: &[u8],
        verify: bool,
        cancel: &CancellationToken,
    ) -> Vec<ScanResult>;

    /// Re-verify a previously serialized credential (canonical form, or
    /// the bare raw value for single-field detectors). Stateless and
    /// safe to call repeatedly.
    async fn verify(&self, secret: &str, cancel: &CancellationToken) -> bool;

    /// Capability query for the optional false-positive filter.
    fn false_positive_check(&self) -> Option<&dyn FalsePositiveCheck> {
        None
    }

    /// Capability query for multi-part credential metadata.
    fn multi_part(&self) -> Option<&dyn MultiPartCredential> {
        None
    }
}

/// Optional extension: provider-specific filtering of candidates that
/// match the pattern but cannot be real credentials.
pub trait FalsePositiveCheck: Send + Sync {
    /// Returns the reason a candidate should be dropped, if any.
    fn is_false_positive(&self, candidate: &str) -> Option<String>;
}

/// Optional extension: detectors whose credential is assembled from
/// more than one field.
pub trait MultiPartCredential: Send + Sync {
    /// Ordered semantic field names composing one credential, in
    /// canonical serialization order.
    fn fields(&self) -> Vec<&'static str>;
}
