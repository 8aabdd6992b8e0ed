use std::error::Error as StdError;

use thiserror::Error;

use crate::record::CertificateRecord;

/// Error from [`CertificateSource`]
#[derive(Debug, Error)]
pub enum SourceError {
    /// Listing certificates is not allowed
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Any other failure e.g. network or malformed response
    #[error(transparent)]
    Other(Box<dyn StdError + Send + Sync>),
}

impl SourceError {
    /// Wrap any error which is not about permission
    ///
    /// ```
    /// # use cev::SourceError;
    /// let e = SourceError::other("connection refused");
    /// assert!(!e.is_forbidden());
    /// ```
    pub fn other<E>(e: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        SourceError::Other(e.into())
    }

    /// Is listing refused because of permission?
    pub fn is_forbidden(&self) -> bool {
        matches!(self, SourceError::Forbidden(..))
    }
}

/// Anything able to list certificates in all namespaces
#[allow(async_fn_in_trait)]
pub trait CertificateSource {
    /// List every certificate record, in the order the source returns them
    async fn list_certificates(&self) -> Result<Vec<CertificateRecord>, SourceError>;
}

/// Records at hand are a source which never fails
impl CertificateSource for Vec<CertificateRecord> {
    async fn list_certificates(&self) -> Result<Vec<CertificateRecord>, SourceError> {
        Ok(self.clone())
    }
}
