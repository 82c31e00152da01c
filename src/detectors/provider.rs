//! The shared detector architecture. Provider modules supply only data
//! (patterns, endpoint, field layout) through [`ProviderSpec`]; all
//! extraction, assembly and verification behavior lives here.

use async_trait::async_trait;
use lazy_static::lazy_static;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::assembler::{assemble, Composite};
use crate::core::config::VerifierConfig;
use crate::core::results::{DetectorKind, ScanResult, Verdict};
use crate::core::traits::{Detector, FalsePositiveCheck, MultiPartCredential};
use crate::matcher::{extract_fields, FieldPattern};
use crate::utils::RateLimiter;
use crate::verifier::{
    classify, CurlClient, ExtraDataFn, VerificationClient, VerificationRequest,
};

/// Builds the single verification request for one composite.
pub type RequestFn = fn(&Composite) -> VerificationRequest;

/// Returns the reason a primary value is a false positive, if any.
pub type FalsePositiveFn = fn(&str) -> Option<String>;

/// Produces the redacted display form of a composite.
pub type RedactFn = fn(&Composite) -> String;

/// Everything a provider contributes: data, no behavior.
pub struct ProviderSpec {
    pub kind: DetectorKind,
    pub description: &'static str,
    pub keywords: &'static [&'static str],
    /// Ordered fields; one pattern per field, canonical serialization
    /// order.
    pub fields: Vec<FieldPattern>,
    /// Index of the most secret-like field, used as the primary raw
    /// value.
    pub primary: usize,
    /// Field index pairs sharing one underlying pattern, for which
    /// identical values must not be paired.
    pub self_pair_excluded: &'static [(usize, usize)],
    pub request: RequestFn,
    /// Statuses the provider defines as an explicit rejection.
    pub rejected_statuses: &'static [u16],
    /// Non-2xx statuses the provider defines as "valid but restricted".
    pub accepted_statuses: &'static [u16],
    pub redact: RedactFn,
    pub extra_data: Option<ExtraDataFn>,
    pub false_positive: Option<FalsePositiveFn>,
}

lazy_static! {
    /// Process-wide default client, shared across detector instances.
    static ref DEFAULT_CLIENT: Arc<CurlClient> = Arc::new(CurlClient::no_local_addresses());
    /// Default request pacing, shared so the rate bounds the process
    /// rather than each detector instance.
    static ref DEFAULT_LIMITER: Arc<RateLimiter> =
        Arc::new(RateLimiter::new(VerifierConfig::default().requests_per_second));
}

/// One provider detector: a [`ProviderSpec`] plus an HTTP client. The
/// client defaults to the shared process-wide one and is overridable
/// per instance.
pub struct ProviderDetector {
    spec: ProviderSpec,
    client: Arc<dyn VerificationClient>,
    limiter: Arc<RateLimiter>,
}

impl ProviderDetector {
    pub fn new(spec: ProviderSpec) -> Self {
        Self {
            spec,
            client: DEFAULT_CLIENT.clone(),
            limiter: DEFAULT_LIMITER.clone(),
        }
    }

    pub fn with_client(spec: ProviderSpec, client: Arc<dyn VerificationClient>) -> Self {
        Self {
            spec,
            client,
            limiter: DEFAULT_LIMITER.clone(),
        }
    }

    pub fn with_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    fn field_names(&self) -> Vec<&'static str> {
        self.spec.fields.iter().map(|f| f.name).collect()
    }

    async fn verify_composite(&self, composite: &Composite, cancel: &CancellationToken) -> Verdict {
        // Every outbound request pays the limiter, one per composite.
        self.limiter.wait().await;
        let request = (self.spec.request)(composite);
        let outcome = self.client.execute(&request, cancel).await;
        classify(
            outcome,
            self.spec.rejected_statuses,
            self.spec.accepted_statuses,
            self.spec.extra_data,
        )
    }
}

#[async_trait]
impl Detector for ProviderDetector {
    fn kind(&self) -> DetectorKind {
        self.spec.kind
    }

    fn description(&self) -> &str {
        self.spec.description
    }

    fn keywords(&self) -> &[&str] {
        self.spec.keywords
    }

    async fn from_data(
        &self,
        data: &[u8],
        verify: bool,
        cancel: &CancellationToken,
    ) -> Vec<ScanResult> {
        let text = String::from_utf8_lossy(data);
        let field_sets = extract_fields(&text, &self.spec.fields);
        let names = self.field_names();
        let composites = assemble(&field_sets, &names, self.spec.self_pair_excluded);

        let mut results = Vec::with_capacity(composites.len());
        for composite in composites {
            let raw = composite.value(self.spec.primary).to_string();

            if let Some(check) = self.spec.false_positive {
                if let Some(reason) = check(&raw) {
                    debug!(detector = %self.spec.kind, %reason, "dropping false positive");
                    continue;
                }
            }

            let mut result = ScanResult::discovered(
                self.spec.kind,
                raw,
                composite.serialize(),
                (self.spec.redact)(&composite),
            );

            if verify {
                // Failures stay local to this composite: an error
                // becomes an Indeterminate verdict, never an abort.
                let verdict = self.verify_composite(&composite, cancel).await;
                result.apply_verdict(verdict);
            }

            results.push(result);
        }

        results
    }

    async fn verify(&self, secret: &str, cancel: &CancellationToken) -> bool {
        let Some(composite) = Composite::parse(secret, self.spec.fields.len()) else {
            return false;
        };
        self.verify_composite(&composite, cancel)
            .await
            .status
            .is_verified()
    }

    fn false_positive_check(&self) -> Option<&dyn FalsePositiveCheck> {
        if self.spec.false_positive.is_some() {
            Some(self)
        } else {
            None
        }
    }

    fn multi_part(&self) -> Option<&dyn MultiPartCredential> {
        if self.spec.fields.len() > 1 {
            Some(self)
        } else {
            None
        }
    }
}

impl FalsePositiveCheck for ProviderDetector {
    fn is_false_positive(&self, candidate: &str) -> Option<String> {
        self.spec.false_positive.and_then(|check| check(candidate))
    }
}

impl MultiPartCredential for ProviderDetector {
    fn fields(&self) -> Vec<&'static str> {
        self.field_names()
    }
}

/// Default redaction: a short prefix of the primary value.
pub fn redact_value(value: &str) -> String {
    let prefix: String = value.chars().take(6).collect();
    format!("{}...", prefix)
}
