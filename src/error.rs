// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::fmt;

use thiserror::Error;

/// Identifies which of the two API clients (or the factory bound to it) an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientKind {
    /// Client for the platform's built-in resource types
    Kubernetes,
    /// Client for the apisix.apache.org resource group
    Apisix,
}

impl fmt::Display for ClientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientKind::Kubernetes => f.write_str("kubernetes"),
            ClientKind::Apisix => f.write_str("apisix"),
        }
    }
}

#[derive(Error, Debug)]
pub enum KubeClientError {
    #[error("Failed to resolve cluster connection from {credential}: {source}")]
    ConnectionResolutionError {
        credential: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to construct {client} client: {source}")]
    ClientConstructionError {
        client: ClientKind,
        #[source]
        source: kube::Error,
    },

    #[error("Failed to construct {factory} informer factory: {reason}")]
    FactoryConstructionError { factory: ClientKind, reason: String },
}

pub type Result<T> = std::result::Result<T, KubeClientError>;
