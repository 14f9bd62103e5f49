// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::time::Duration;

/// API group of the APISIX custom resources
pub const APISIX_GROUP: &str = "apisix.apache.org";

/// Resync interval used when the configuration does not set one
pub const DEFAULT_RESYNC_INTERVAL: Duration = Duration::from_secs(6 * 60 * 60);

/// Environment variables read by `Config::load`
pub mod env {
    /// Path of a YAML configuration file
    pub const CONFIG_PATH: &str = "APISIX_CONFIG_PATH";
    /// Overrides `kubernetes.kubeconfig`
    pub const KUBECONFIG: &str = "APISIX_KUBECONFIG";
    /// Overrides `kubernetes.context`
    pub const KUBE_CONTEXT: &str = "APISIX_KUBE_CONTEXT";
    /// Overrides `kubernetes.user`
    pub const KUBE_USER: &str = "APISIX_KUBE_USER";
    /// Overrides `kubernetes.resync_interval`
    pub const RESYNC_INTERVAL: &str = "APISIX_RESYNC_INTERVAL";
}

/// Informer tuning
pub mod informer {
    /// Events buffered per informer before slow subscribers start lagging
    pub const EVENT_CHANNEL_CAPACITY: usize = 1024;
}
