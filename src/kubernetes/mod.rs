// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster connection resolution and API client construction.

pub mod apisix_client;
pub mod client;
pub mod connection;

pub use apisix_client::ApisixClient;
pub use client::KubeClient;
pub use connection::ConnectionParams;
