#![allow(unused_qualifications)]

use chrono::{DateTime, Utc};
use kube::{CustomResource, ResourceExt as _};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use cev::CertificateRecord;

/// cert-manager certificate, only fields to verify expiration
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "cert-manager.io",
    version = "v1",
    kind = "Certificate",
    namespaced,
    status = "CertificateStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct CertificateSpec {
    #[serde(default)]
    pub dns_names: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[allow(missing_copy_implementations)]
pub struct CertificateStatus {
    pub not_after: Option<DateTime<Utc>>,
}

impl From<Certificate> for CertificateRecord {
    fn from(certificate: Certificate) -> Self {
        CertificateRecord {
            namespace: certificate.namespace().unwrap_or_default(),
            name: certificate.name_any(),
            not_after: certificate.status.and_then(|s| s.not_after),
            dns_names: certificate.spec.dns_names,
        }
    }
}
