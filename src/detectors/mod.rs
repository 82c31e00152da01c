pub mod provider;

pub mod amplitude;
pub mod doppler;
pub mod razorpay;
pub mod shodan;
pub mod shopify;

pub use provider::{ProviderDetector, ProviderSpec};

use lazy_static::lazy_static;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::results::DetectorKind;
use crate::core::traits::Detector;
use crate::utils::RateLimiter;
use crate::verifier::VerificationClient;

fn all_specs() -> [ProviderSpec; 5] {
    [
        shodan::spec(),
        doppler::spec(),
        amplitude::spec(),
        razorpay::spec(),
        shopify::spec(),
    ]
}

lazy_static! {
    /// Registry keyed by stable id, built once. The offline
    /// re-verification path resolves detectors from persisted ids
    /// through this map.
    static ref REGISTRY: BTreeMap<u32, Arc<dyn Detector>> = {
        let mut map: BTreeMap<u32, Arc<dyn Detector>> = BTreeMap::new();
        for spec in all_specs() {
            let detector: Arc<dyn Detector> = Arc::new(ProviderDetector::new(spec));
            map.insert(detector.kind().id(), detector);
        }
        map
    };
}

/// All registered detectors, in stable-id order.
pub fn all_detectors() -> Vec<Arc<dyn Detector>> {
    REGISTRY.values().cloned().collect()
}

/// Fresh detector instances bound to a caller-supplied client and
/// request limiter, for callers configuring timeouts, pacing or
/// local-address policy.
pub fn configured_detectors(
    client: Arc<dyn VerificationClient>,
    limiter: Arc<RateLimiter>,
) -> Vec<Arc<dyn Detector>> {
    all_specs()
        .into_iter()
        .map(|spec| {
            Arc::new(
                ProviderDetector::with_client(spec, client.clone()).with_limiter(limiter.clone()),
            ) as Arc<dyn Detector>
        })
        .collect()
}

pub fn get_detector(kind: DetectorKind) -> Option<Arc<dyn Detector>> {
    REGISTRY.get(&kind.id()).cloned()
}

/// Lookup by persisted stable id. Unknown ids are `None`, not errors.
pub fn detector_by_id(id: u32) -> Option<Arc<dyn Detector>> {
    REGISTRY.get(&id).cloned()
}

pub fn detector_by_name(name: &str) -> Option<Arc<dyn Detector>> {
    DetectorKind::from_name(name).and_then(get_detector)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_every_kind() {
        for kind in DetectorKind::ALL {
            let detector = get_detector(*kind).unwrap();
            assert_eq!(detector.kind(), *kind);
            assert!(!detector.keywords().is_empty());
            assert!(!detector.description().is_empty());
        }
        assert_eq!(all_detectors().len(), DetectorKind::ALL.len());
    }

    #[test]
    fn unknown_id_is_none() {
        assert!(detector_by_id(0).is_none());
        assert!(detector_by_id(9999).is_none());
    }

    #[test]
    fn lookup_by_name_is_case_insensitive() {
        assert!(detector_by_name("Razorpay").is_some());
        assert!(detector_by_name("nope").is_none());
    }
}
