//! # leakscan
//!
//! A modular framework for detecting leaked credentials in arbitrary
//! byte chunks and checking, against the issuing service, whether each
//! candidate is still active.
//!
//! ## Architecture
//!
//! Provider modules contribute only data (patterns, endpoint, field
//! layout); the shared machinery does the rest:
//!
//! - [`matcher`]: per-field regex extraction over a chunk
//! - [`assembler`]: composite assembly and canonical serialization
//! - [`verifier`]: one bounded request per candidate, classified
//!   three ways (verified / rejected / indeterminate)
//! - [`detectors`]: the [`core::Detector`] contract, the shared
//!   provider architecture and the stable-id registry
//! - [`engine`]: keyword-prefiltered scanning driver and the offline
//!   re-verification entry point
//!
//! ## Example
//!
//! ```rust,no_run
//! use leakscan::core::Detector;
//! use leakscan::detectors;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() {
//! let detector = detectors::detector_by_name("shodan").unwrap();
//! let chunk = b"SHODAN_API_KEY=oykKBEq2KRySU33OxizNkOir5PgHpMLv";
//! let results = detector.from_data(chunk, false, &CancellationToken::new()).await;
//! println!("Found {} candidates", results.len());
//! # }
//! ```

pub mod assembler;
pub mod cli;
pub mod core;
pub mod detectors;
pub mod engine;
pub mod matcher;
pub mod utils;
pub mod verifier;

// Re-export commonly used types
pub use crate::core::{
    Config, Detector, DetectorKind, Result, ScanError, ScanReport, ScanResult, SecretRecord,
    Verdict, VerificationStatus, VerifierConfig,
};

pub use detectors::{all_detectors, detector_by_id, detector_by_name, get_detector};
pub use engine::Scanner;
