use std::path::Path;

use kube::api::{Api, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::core::ErrorResponse;
use kube::{Client, Config};
use log::{debug, Level};
use logging_timer::{finish, stimer};

use cev::{CertificateRecord, CertificateSource, SourceError};

use crate::crd::Certificate;

/// Build configuration from the pod service account or a kubeconfig
pub async fn build_config(
    in_cluster: bool,
    kubeconfig: Option<&Path>,
    context: Option<&str>,
) -> anyhow::Result<Config> {
    if in_cluster {
        debug!("use in-cluster configuration");
        return Ok(Config::incluster()?);
    }

    let options = KubeConfigOptions {
        context: context.map(String::from),
        ..Default::default()
    };
    let config = match kubeconfig {
        Some(path) => {
            debug!("use kubeconfig at {path:?}");
            let kubeconfig = Kubeconfig::read_from(path)?;
            Config::from_custom_kubeconfig(kubeconfig, &options).await?
        }
        None => {
            debug!("use default kubeconfig");
            Config::from_kubeconfig(&options).await?
        }
    };
    Ok(config)
}

/// cert-manager certificates of a cluster
#[derive(Clone)]
pub struct ClusterSource {
    client: Client,
}

impl std::fmt::Debug for ClusterSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterSource").finish_non_exhaustive()
    }
}

impl TryFrom<Config> for ClusterSource {
    type Error = kube::Error;

    fn try_from(config: Config) -> Result<Self, Self::Error> {
        debug!("connect to {}", config.cluster_url);
        let client = Client::try_from(config)?;
        Ok(ClusterSource { client })
    }
}

impl CertificateSource for ClusterSource {
    async fn list_certificates(&self) -> Result<Vec<CertificateRecord>, SourceError> {
        let api: Api<Certificate> = Api::all(self.client.clone());

        let tmr = stimer!(Level::Debug; "LIST", "certificates in all namespaces");
        let list = api.list(&ListParams::default()).await.map_err(classify)?;
        finish!(tmr, "{} certificate(s) found", list.items.len());

        Ok(list.items.into_iter().map(CertificateRecord::from).collect())
    }
}

fn classify(e: kube::Error) -> SourceError {
    match e {
        kube::Error::Api(ErrorResponse {
            code: 403, message, ..
        }) => SourceError::Forbidden(message),
        e => SourceError::other(e),
    }
}
