// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Shared, cached watch/list infrastructure built on kube-runtime reflectors.

pub mod factory;
pub mod informer;

pub use factory::{
    ApisixInformerFactory, InformerFactory, ResourceClient, ServesResource, SharedInformerFactory,
};
pub use informer::{Informer, InformerEvent, WatchedResource};
