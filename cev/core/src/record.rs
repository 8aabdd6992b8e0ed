use chrono::{DateTime, Utc};

/// Certificate as recorded by the cluster
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CertificateRecord {
    /// Namespace the certificate lives in
    pub namespace: String,
    /// Name of the certificate resource
    pub name: String,
    /// DNS names the certificate is issued for
    pub dns_names: Vec<String>,
    /// Expiration time, absent until the certificate has been issued
    pub not_after: Option<DateTime<Utc>>,
}
