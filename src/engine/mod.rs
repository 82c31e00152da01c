//! Scanning driver: keyword prefilter plus a bounded worker pool over
//! chunks.

pub mod reverify;

use aho_corasick::AhoCorasick;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::config::VerifierConfig;
use crate::core::error::{Result, ScanError};
use crate::core::results::ScanResult;
use crate::core::traits::Detector;
use crate::detectors;

/// Runs registered detectors over chunks. Cheap to clone; all state is
/// shared and read-only after construction.
#[derive(Clone)]
pub struct Scanner {
    detectors: Vec<Arc<dyn Detector>>,
    prefilter: AhoCorasick,
    /// Maps prefilter pattern index to detector index.
    keyword_owner: Vec<usize>,
    semaphore: Arc<Semaphore>,
}

impl Scanner {
    /// Scanner over every registered detector.
    pub fn new(config: &VerifierConfig) -> Result<Self> {
        Self::with_detectors(detectors::all_detectors(), config)
    }

    pub fn with_detectors(
        detectors: Vec<Arc<dyn Detector>>,
        config: &VerifierConfig,
    ) -> Result<Self> {
        let mut patterns: Vec<String> = Vec::new();
        let mut keyword_owner = Vec::new();
        for (index, detector) in detectors.iter().enumerate() {
            for keyword in detector.keywords() {
                patterns.push(keyword.to_string());
                keyword_owner.push(index);
            }
        }

        let prefilter = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(&patterns)
            .map_err(|e| ScanError::Config(format!("keyword automaton: {}", e)))?;

        Ok(Self {
            detectors,
            prefilter,
            keyword_owner,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    /// Detectors whose keywords occur in the chunk. A keyword hit only
    /// costs an extraction run; a miss is a guarantee the detector
    /// cannot match.
    pub fn candidates(&self, data: &[u8]) -> Vec<Arc<dyn Detector>> {
        let mut hit = vec![false; self.detectors.len()];
        for m in self.prefilter.find_iter(data) {
            hit[self.keyword_owner[m.pattern().as_usize()]] = true;
        }

        self.detectors
            .iter()
            .zip(hit)
            .filter_map(|(detector, hit)| hit.then(|| detector.clone()))
            .collect()
    }

    /// Scan one chunk with every prefilter-matched detector. Request
    /// pacing happens inside the detectors, per outbound call.
    pub async fn scan(
        &self,
        data: &[u8],
        verify: bool,
        cancel: &CancellationToken,
    ) -> Vec<ScanResult> {
        let mut results = Vec::new();
        for detector in self.candidates(data) {
            if cancel.is_cancelled() {
                break;
            }
            debug!(detector = %detector.kind(), "running detector");
            results.extend(detector.from_data(data, verify, cancel).await);
        }
        results
    }

    /// Scan many chunks concurrently, bounded by the configured
    /// in-flight cap. Results come back grouped per input chunk.
    pub async fn scan_chunks(
        &self,
        chunks: Vec<Vec<u8>>,
        verify: bool,
        cancel: &CancellationToken,
    ) -> Vec<Vec<ScanResult>> {
        let total = chunks.len();
        let mut tasks: JoinSet<(usize, Vec<ScanResult>)> = JoinSet::new();

        for (index, chunk) in chunks.into_iter().enumerate() {
            let scanner = self.clone();
            let cancel = cancel.clone();
            tasks.spawn(async move {
                let Ok(_permit) = scanner.semaphore.acquire().await else {
                    return (index, Vec::new());
                };
                (index, scanner.scan(&chunk, verify, &cancel).await)
            });
        }

        let mut grouped = vec![Vec::new(); total];
        while let Some(joined) = tasks.join_next().await {
            if let Ok((index, results)) = joined {
                grouped[index] = results;
            }
        }
        grouped
    }
}
