// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Naming of the objects fleetsync produces
pub mod naming {
    /// Prefix for the kubeconfig secret of a managed cluster
    pub const MANAGED_CLUSTER_PREFIX: &str = "verrazzano-managed-cluster";
    /// Data key holding the kubeconfig text in a managed cluster secret
    pub const KUBECONFIG_SECRET_KEY: &str = "kubeconfig";
    /// Namespace records and secrets are written to unless configured otherwise
    pub const DEFAULT_NAMESPACE: &str = "default";
}

/// Labels identifying fleet-managed records and secrets
pub mod labels {
    pub const APP: &str = "k8s-app";
    pub const APP_VALUE: &str = "verrazzano.oracle.com";
    pub const CLUSTER: &str = "verrazzano.cluster";
}

/// Registry REST API paths, parameters and response fields
pub mod registry {
    pub const CLUSTERS_PATH: &str = "/v3/clusters";
    pub const ACTION_PARAM: &str = "action";
    pub const GENERATE_KUBECONFIG_ACTION: &str = "generateKubeconfig";

    pub const DATA_PATH: &str = "data";
    pub const ID_PATH: &str = "id";
    pub const NAME_PATH: &str = "name";
    pub const K8S_API_HOST_PATH: &str = "labels.k8sApiHost";
    pub const K8S_API_PORT_PATH: &str = "labels.k8sApiPort";
    pub const TYPE_PATH: &str = "labels.type";
    pub const CONFIG_PATH: &str = "config";

    /// Namespace of the secret terminating TLS in front of the registry
    pub const INGRESS_NAMESPACE: &str = "cattle-system";
    /// Secret whose `ca.crt` is trusted for registry calls
    pub const INGRESS_TLS_SECRET: &str = "tls-rancher-ingress";
    pub const CA_CERT_KEY: &str = "ca.crt";
}

/// HTTP transport settings for registry calls
pub mod http {
    use std::time::Duration;

    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
    pub const RESPONSE_HEADER_TIMEOUT: Duration = Duration::from_secs(10);
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

    /// Proxy variables, first non-empty wins
    pub const PROXY_ENV_VARS: [&str; 4] = ["https_proxy", "HTTPS_PROXY", "http_proxy", "HTTP_PROXY"];
}

/// Backoff applied to every registry call
pub mod retry {
    pub const STEPS: u32 = 12;
    pub const DURATION_SECS: u64 = 5;
    pub const FACTOR: f64 = 1.0;
    pub const JITTER: f64 = 0.1;
}

/// How often the registry is polled
pub const POLL_INTERVAL_SECS: u64 = 30;

/// The operator name used as field manager
pub const OPERATOR_NAME: &str = "fleetsync";

/// CRD polling configuration
pub mod crd {
    /// Initial polling interval in seconds when waiting for CRD
    pub const POLL_INTERVAL_SECS: u64 = 10;
    /// Maximum polling interval in seconds (exponential backoff cap)
    pub const POLL_MAX_INTERVAL_SECS: u64 = 60;
}
