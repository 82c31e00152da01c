pub mod config;
pub mod error;
pub mod results;
pub mod traits;

pub use config::{Config, DetectorSettings, VerifierConfig};
pub use error::{Result, ScanError};
pub use results::{
    DetectorKind, ScanReport, ScanResult, SecretRecord, Verdict, VerificationStatus,
};
pub use traits::{Detector, FalsePositiveCheck, MultiPartCredential};
