// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Deserializer};
use std::env::{self, VarError};
use std::path::Path;
use std::time::Duration;

use crate::constants::{env as env_vars, DEFAULT_RESYNC_INTERVAL};

/// Controller configuration, loaded from an optional YAML file and environment overrides
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub kubernetes: KubernetesConfig,
}

/// How to reach the cluster API and how often informers resync
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KubernetesConfig {
    /// Path to a kubeconfig file. Empty selects the in-cluster service account.
    pub kubeconfig: String,
    /// Kubeconfig context to use instead of the file's current context
    pub context: Option<String>,
    /// Kubeconfig user to authenticate as instead of the context's user
    pub user: Option<String>,
    /// Periodic resync of every informer cache. Zero disables resync.
    #[serde(deserialize_with = "deserialize_duration")]
    pub resync_interval: Duration,
}

impl Default for KubernetesConfig {
    fn default() -> Self {
        Self {
            kubeconfig: String::new(),
            context: None,
            user: None,
            resync_interval: DEFAULT_RESYNC_INTERVAL,
        }
    }
}

impl Config {
    /// Load configuration from the file named by `APISIX_CONFIG_PATH` (if set),
    /// then apply environment variable overrides
    pub fn load() -> Result<Self> {
        let mut config = match config_path(env::var(env_vars::CONFIG_PATH))? {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&raw).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(kubeconfig) = lookup(env_vars::KUBECONFIG) {
            self.kubernetes.kubeconfig = kubeconfig;
        }
        if let Some(context) = lookup(env_vars::KUBE_CONTEXT).filter(|c| !c.is_empty()) {
            self.kubernetes.context = Some(context);
        }
        if let Some(user) = lookup(env_vars::KUBE_USER).filter(|u| !u.is_empty()) {
            self.kubernetes.user = Some(user);
        }
        if let Some(interval) = lookup(env_vars::RESYNC_INTERVAL) {
            self.kubernetes.resync_interval = parse_duration(&interval)
                .with_context(|| format!("{} is invalid", env_vars::RESYNC_INTERVAL))?;
        }
        Ok(())
    }
}

/// An unset variable means no config file; a set but non-UTF-8 one is an error
fn config_path(var: std::result::Result<String, VarError>) -> Result<Option<String>> {
    match var {
        Ok(path) => Ok(Some(path)),
        Err(VarError::NotPresent) => Ok(None),
        Err(e @ VarError::NotUnicode(_)) => {
            Err(e).with_context(|| format!("{} is invalid", env_vars::CONFIG_PATH))
        }
    }
}

/// Parse a Go-style duration such as `30s`, `1h30m` or `250ms`.
/// A bare `0` is accepted; negative durations are rejected.
pub fn parse_duration(input: &str) -> Result<Duration> {
    let s = input.trim();
    if s.is_empty() {
        bail!("empty duration");
    }
    if s.starts_with('-') {
        bail!("duration must not be negative: {input:?}");
    }
    let s = s.strip_prefix('+').unwrap_or(s);
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total_secs = 0f64;
    let mut rest = s;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 {
            bail!("invalid duration {input:?}: expected a number");
        }
        let (number, tail) = rest.split_at(number_len);
        let value: f64 = number
            .parse()
            .with_context(|| format!("invalid duration {input:?}"))?;

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        let scale = match unit {
            "ns" => 1e-9,
            "us" | "µs" => 1e-6,
            "ms" => 1e-3,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            "" => bail!("missing unit in duration {input:?}"),
            other => bail!("unknown unit {other:?} in duration {input:?}"),
        };

        total_secs += value * scale;
        rest = tail;
    }

    Duration::try_from_secs_f64(total_secs).with_context(|| format!("duration {input:?} out of range"))
}

fn deserialize_duration<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Seconds(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Seconds(secs) => Ok(Duration::from_secs(secs)),
        Raw::Text(text) => parse_duration(&text).map_err(serde::de::Error::custom),
    }
}
