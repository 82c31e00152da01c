//! Offline re-verification of previously persisted findings.

use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::core::error::Result;
use crate::core::results::SecretRecord;
use crate::core::traits::Detector;
use crate::detectors;

/// Reason tag stamped on records this tool re-verified.
pub const REASON_TAG: &str = "leakscan";

/// Re-verify a record in place. Returns whether the record was
/// updated; an unknown detector id leaves it untouched.
pub async fn reverify_record(record: &mut SecretRecord, cancel: &CancellationToken) -> bool {
    let detector = record
        .detector
        .parse::<u32>()
        .ok()
        .and_then(detectors::detector_by_id);

    let Some(detector) = detector else {
        warn!(detector = %record.detector, "unknown detector id, record left unmodified");
        return false;
    };

    record.verified = detector.verify(&record.secret, cancel).await;
    record.reason = REASON_TAG.to_string();
    info!(detector = %detector.kind(), verified = record.verified, "re-verified record");
    true
}

/// Read one persisted record, re-verify it and rewrite the file. The
/// file is only rewritten when a detector was found.
pub async fn reverify_file(path: &Path, cancel: &CancellationToken) -> Result<bool> {
    let contents = std::fs::read_to_string(path)?;
    let mut record: SecretRecord = serde_json::from_str(&contents)?;

    let updated = reverify_record(&mut record, cancel).await;
    if updated {
        std::fs::write(path, serde_json::to_string_pretty(&record)?)?;
    }
    Ok(updated)
}
