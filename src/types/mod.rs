// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Custom resource types of the apisix.apache.org group.

pub mod apisix;

pub use apisix::{
    ApisixResource, ApisixRoute, ApisixRouteSpec, ApisixTls, ApisixTlsSpec, ApisixUpstream,
    ApisixUpstreamSpec,
};
