// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities: a mock API server, JSON fixtures and kubeconfig fixtures.

use http::{Request, Response};
use kube::client::Body;
use kube::Client;
use serde_json::{json, Value};
use std::io::Write;
use tempfile::NamedTempFile;
use tower_test::mock;

/// Handle used by a test to receive the requests a mock client sends and answer them
pub type ApiServerHandle = mock::Handle<Request<Body>, Response<Body>>;

/// Host of the API server named in [`kubeconfig_file`]
pub const TEST_SERVER_HOST: &str = "127.0.0.1";

/// Self-signed CA certificate (PEM, base64 encoded) used as certificate-authority-data
const TEST_CA_DATA: &str = "LS0tLS1CRUdJTiBDRVJUSUZJQ0FURS0tLS0tCk1JSUJlekNDQVNHZ0F3SUJBZ0lVUVFjTXR6TW5ONm5sYWlwV04xcE5sUzlhWURjd0NnWUlLb1pJemowRUF3SXcKRWpFUU1BNEdBMVVFQXd3SGRHVnpkQzFqWVRBZ0Z3MHlOakV3TVRZd056STVNamxhR0E4eU1USTJNRGt5TWpBMwpNamt5T1Zvd0VqRVFNQTRHQTFVRUF3d0hkR1Z6ZEMxallUQlpNQk1HQnlxR1NNNDlBZ0VHQ0NxR1NNNDlBd0VICkEwSUFCQWRXbGs3c3R2alViNitVU05vWitzUWNmTVBIdVA4SVhYM2c1ajBOZm5NS3c3ZHVkZ2NYbDFRd1E2SVkKYWpRU01CUmRxRzgraTFmWEE3Q3JZaS93eFpxalV6QlJNQjBHQTFVZERnUVdCQlFJS0hhV1JBM2lQYW9ZVWNRLwo0WlB5dWRYMkpUQWZCZ05WSFNNRUdEQVdnQlFJS0hhV1JBM2lQYW9ZVWNRLzRaUHl1ZFgySlRBUEJnTlZIUk1CCkFmOEVCVEFEQVFIL01Bb0dDQ3FHU000OUJBTUNBMGdBTUVVQ0lRQ0xENXEwYmRhZXQ5K2s2WFBranY3RXZBOWwKQjl3MU5pSTNTTkJTSGZQbTlBSWdWdFlYL1plR0JyamdDMkRXb0hCM0JKQk9iM216d0gwVmxYdHNUTndIeHVJPQotLS0tLUVORCBDRVJUSUZJQ0FURS0tLS0tCg==";

/// Build a kube Client backed by a mock service
pub fn mock_client() -> (Client, ApiServerHandle) {
    let (service, handle) = mock::pair::<Request<Body>, Response<Body>>();
    (Client::new(service, "default"), handle)
}

/// PEM block whose body is not a certificate, base64 encoded
pub const INVALID_CA_DATA: &str =
    "LS0tLS1CRUdJTiBDRVJUSUZJQ0FURS0tLS0tCkFBRUNBdz09Ci0tLS0tRU5EIENFUlRJRklDQVRFLS0tLS0K";

/// Write a kubeconfig with two contexts to a temporary file.
///
/// `primary` is the current context (namespace `apisix`), `secondary` uses namespace `ingress`.
/// Both contexts authenticate as `test-user` with a token; `viewer` uses basic auth.
pub fn kubeconfig_file() -> NamedTempFile {
    kubeconfig_file_with_ca(TEST_CA_DATA)
}

/// Like [`kubeconfig_file`], with the given certificate-authority-data
pub fn kubeconfig_file_with_ca(ca_data: &str) -> NamedTempFile {
    let kubeconfig = format!(
        r#"apiVersion: v1
kind: Config
clusters:
  - name: test
    cluster:
      server: https://{TEST_SERVER_HOST}:6443
      certificate-authority-data: {ca_data}
users:
  - name: test-user
    user:
      token: test-token
  - name: viewer
    user:
      username: viewer
      password: viewer-password
contexts:
  - name: primary
    context:
      cluster: test
      user: test-user
      namespace: apisix
  - name: secondary
    context:
      cluster: test
      user: test-user
      namespace: ingress
current-context: primary
"#
    );

    let mut file = NamedTempFile::new().expect("failed to create kubeconfig file");
    file.write_all(kubeconfig.as_bytes())
        .expect("failed to write kubeconfig file");
    file
}

/// Create a 200 response carrying a JSON body
pub fn ok_json(body: Value) -> Response<Body> {
    Response::builder()
        .status(200)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string().into_bytes()))
        .unwrap()
}

/// Create a list response as returned by the API server
pub fn list_json(api_version: &str, kind: &str, resource_version: &str, items: Vec<Value>) -> Value {
    json!({
        "apiVersion": api_version,
        "kind": kind,
        "metadata": { "resourceVersion": resource_version },
        "items": items
    })
}

/// Create a mock ConfigMap JSON object
pub fn config_map_json(namespace: &str, name: &str, resource_version: &str) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "ConfigMap",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "uid": format!("{namespace}-{name}-uid"),
            "resourceVersion": resource_version
        },
        "data": { "key": "value" }
    })
}

/// Create a mock ApisixRoute JSON object
pub fn apisix_route_json(namespace: &str, name: &str) -> Value {
    json!({
        "apiVersion": "apisix.apache.org/v2",
        "kind": "ApisixRoute",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "uid": format!("{namespace}-{name}-uid"),
            "resourceVersion": "1"
        },
        "spec": {
            "http": [{
                "name": "rule1",
                "match": { "paths": ["/*"] },
                "backends": [{ "serviceName": "httpbin", "servicePort": 80 }]
            }]
        }
    })
}
