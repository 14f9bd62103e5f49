// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resolution of kubeconfig / in-cluster credentials into a `kube::Config`

use crate::config::KubernetesConfig;
use crate::error::{KubeClientError, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::Config as KConfig;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Where the cluster credentials come from. Resolved once, at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    /// Kubeconfig file; `None` selects the in-cluster service account
    pub kubeconfig: Option<PathBuf>,
    /// Context override for kubeconfig files
    pub context: Option<String>,
    /// User override for kubeconfig files
    pub user: Option<String>,
}

impl ConnectionParams {
    pub fn from_config(config: &KubernetesConfig) -> Self {
        let kubeconfig = Some(config.kubeconfig.trim())
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);

        Self {
            kubeconfig,
            context: config.context.clone(),
            user: config.user.clone(),
        }
    }

    /// Human readable name of the credential source, used in errors and logs
    pub fn credential_source(&self) -> String {
        match &self.kubeconfig {
            Some(path) => format!("kubeconfig {}", path.display()),
            None => "in-cluster service account".to_string(),
        }
    }

    /// Turn the parameters into a connection descriptor. Only local files are read.
    pub async fn resolve(&self) -> Result<KConfig> {
        match &self.kubeconfig {
            None => {
                if self.context.is_some() || self.user.is_some() {
                    warn!(
                        context = ?self.context,
                        user = ?self.user,
                        "Ignoring kubeconfig overrides for in-cluster configuration"
                    );
                }
                debug!("Resolving in-cluster configuration");
                KConfig::incluster().map_err(|e| self.resolution_error(e))
            }
            Some(path) => {
                debug!(
                    path = %path.display(),
                    context = ?self.context,
                    user = ?self.user,
                    "Resolving kubeconfig"
                );
                let kubeconfig = Kubeconfig::read_from(path).map_err(|e| self.resolution_error(e))?;
                let options = KubeConfigOptions {
                    context: self.context.clone(),
                    user: self.user.clone(),
                    ..Default::default()
                };
                KConfig::from_custom_kubeconfig(kubeconfig, &options)
                    .await
                    .map_err(|e| self.resolution_error(e))
            }
        }
    }

    fn resolution_error(
        &self,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> KubeClientError {
        KubeClientError::ConnectionResolutionError {
            credential: self.credential_source(),
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{kubeconfig_file, TEST_SERVER_HOST};
    use std::io::Write;
    use std::time::Duration;

    fn kubernetes_config(kubeconfig: &str, context: Option<&str>) -> KubernetesConfig {
        KubernetesConfig {
            kubeconfig: kubeconfig.to_string(),
            context: context.map(String::from),
            user: None,
            resync_interval: Duration::from_secs(30),
        }
    }

    #[test]
    fn test_empty_kubeconfig_selects_in_cluster() {
        let params = ConnectionParams::from_config(&kubernetes_config("  ", None));
        assert_eq!(params.kubeconfig, None);
        assert_eq!(params.credential_source(), "in-cluster service account");
    }

    #[test]
    fn test_kubeconfig_path_is_kept() {
        let params = ConnectionParams::from_config(&kubernetes_config("/etc/kube/config", Some("dev")));
        assert_eq!(params.kubeconfig, Some(PathBuf::from("/etc/kube/config")));
        assert_eq!(params.context.as_deref(), Some("dev"));
        assert_eq!(params.credential_source(), "kubeconfig /etc/kube/config");
    }

    #[tokio::test]
    async fn test_resolve_kubeconfig_current_context() {
        let file = kubeconfig_file();
        let params = ConnectionParams::from_config(&kubernetes_config(
            file.path().to_str().unwrap(),
            None,
        ));

        let resolved = params.resolve().await.unwrap();
        assert_eq!(resolved.cluster_url.host(), Some(TEST_SERVER_HOST));
        assert_eq!(resolved.cluster_url.port_u16(), Some(6443));
        assert_eq!(resolved.default_namespace, "apisix");
    }

    #[tokio::test]
    async fn test_resolve_kubeconfig_context_override() {
        let file = kubeconfig_file();
        let params = ConnectionParams::from_config(&kubernetes_config(
            file.path().to_str().unwrap(),
            Some("secondary"),
        ));

        let resolved = params.resolve().await.unwrap();
        assert_eq!(resolved.default_namespace, "ingress");
    }

    #[tokio::test]
    async fn test_resolve_kubeconfig_user_override() {
        let file = kubeconfig_file();
        let mut params = ConnectionParams::from_config(&kubernetes_config(
            file.path().to_str().unwrap(),
            Some("secondary"),
        ));
        params.user = Some("viewer".to_string());

        let resolved = params.resolve().await.unwrap();
        assert_eq!(resolved.default_namespace, "ingress");
        assert_eq!(resolved.auth_info.username.as_deref(), Some("viewer"));
        assert!(resolved.auth_info.token.is_none());

        params.user = None;
        let resolved = params.resolve().await.unwrap();
        assert_eq!(resolved.auth_info.username, None);
        assert!(resolved.auth_info.token.is_some());
    }

    #[tokio::test]
    async fn test_resolve_unknown_context() {
        let file = kubeconfig_file();
        let params = ConnectionParams::from_config(&kubernetes_config(
            file.path().to_str().unwrap(),
            Some("does-not-exist"),
        ));

        let err = params.resolve().await.unwrap_err();
        assert!(matches!(err, KubeClientError::ConnectionResolutionError { .. }));
    }

    #[tokio::test]
    async fn test_resolve_missing_file() {
        let params = ConnectionParams::from_config(&kubernetes_config("/nonexistent/path", None));

        let err = params.resolve().await.unwrap_err();
        match err {
            KubeClientError::ConnectionResolutionError { credential, .. } => {
                assert_eq!(credential, "kubeconfig /nonexistent/path");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_resolve_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"clusters: [this is: not: valid").unwrap();
        let params = ConnectionParams::from_config(&kubernetes_config(
            file.path().to_str().unwrap(),
            None,
        ));

        let err = params.resolve().await.unwrap_err();
        assert!(matches!(err, KubeClientError::ConnectionResolutionError { .. }));
    }

    #[tokio::test]
    async fn test_resolve_in_cluster_without_service_account() {
        // Only meaningful outside a pod
        if std::env::var_os("KUBERNETES_SERVICE_HOST").is_some() {
            return;
        }
        let params = ConnectionParams::from_config(&kubernetes_config("", None));

        let err = params.resolve().await.unwrap_err();
        assert!(matches!(err, KubeClientError::ConnectionResolutionError { .. }));
    }
}
