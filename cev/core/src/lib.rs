#![deny(
    missing_docs,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications
)]

//! Certificate Expiration Verifier
//!
//! Lists certificate records from a [`CertificateSource`] and reports the ones
//! which are about to expire or have already expired.

use thiserror::Error;

pub use record::CertificateRecord;
pub use report::{ExpirationReport, ExpirationReportJSON, Reason};
pub use source::{CertificateSource, SourceError};
pub use verifier::{verify_expiration, Verifier};

mod record;
mod report;
mod source;
mod verifier;

/// Error from [`Verifier`]
#[derive(Debug, Error)]
pub enum VerifyError {
    /// Certificate source refused to list certificates
    #[error("permission denied while getting the certificates")]
    PermissionDenied(#[source] SourceError),
    /// Any other failure when listing certificates
    #[error("failed to communicate with Kubernetes cluster")]
    CommunicationFailure(#[source] SourceError),
}

impl From<SourceError> for VerifyError {
    fn from(e: SourceError) -> Self {
        if e.is_forbidden() {
            VerifyError::PermissionDenied(e)
        } else {
            VerifyError::CommunicationFailure(e)
        }
    }
}
