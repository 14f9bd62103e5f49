// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// Marker for resource kinds served by the apisix.apache.org group.
///
/// The APISIX informer factory only hands out informers for types implementing this trait.
pub trait ApisixResource: kube::Resource<DynamicType = ()> {}

impl ApisixResource for ApisixRoute {}
impl ApisixResource for ApisixUpstream {}
impl ApisixResource for ApisixTls {}

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "apisix.apache.org", version = "v2", kind = "ApisixRoute")]
#[kube(namespaced, shortname = "ar")]
#[kube(status = "ApisixStatus")]
#[serde(rename_all = "camelCase")]
pub struct ApisixRouteSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub http: Vec<ApisixRouteHttp>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApisixRouteHttp {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(rename = "match")]
    pub route_match: ApisixRouteHttpMatch,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub backends: Vec<ApisixRouteHttpBackend>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApisixRouteHttpMatch {
    pub paths: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosts: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<String>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApisixRouteHttpBackend {
    pub service_name: String,
    pub service_port: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<i64>,
}

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "apisix.apache.org", version = "v2", kind = "ApisixUpstream")]
#[kube(namespaced, shortname = "au")]
#[kube(status = "ApisixStatus")]
#[serde(rename_all = "camelCase")]
pub struct ApisixUpstreamSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loadbalancer: Option<LoadBalancer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retries: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<UpstreamTimeout>,
}

#[derive(Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancer {
    #[serde(rename = "type")]
    pub balancer_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash_on: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// Upstream timeouts, written as durations such as `5s`
#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
pub struct UpstreamTimeout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read: Option<String>,
}

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[kube(group = "apisix.apache.org", version = "v2", kind = "ApisixTls")]
#[kube(namespaced, plural = "apisixtlses", shortname = "atls")]
#[kube(status = "ApisixStatus")]
#[serde(rename_all = "camelCase")]
pub struct ApisixTlsSpec {
    pub hosts: Vec<String>,
    pub secret: ApisixSecret,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
pub struct ApisixSecret {
    pub name: String,
    pub namespace: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApisixStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<Condition>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
