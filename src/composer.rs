// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stack Composer
//!
//! Runs the four layers in their only valid order, threading each layer's
//! handle into the layers after it:
//!
//! ```text
//! StackConfig ─┬─> NetworkLayer ──NetworkHandle──┐
//!              ├─> StorageLayer <────────────────┤──StorageHandle──┐
//!              ├─> ComputeLayer <────────────────┤<────────────────┘
//!              └─> IngressLayer <────────────────┘<──ComputeHandle
//! ```
//!
//! A failing layer stops composition; nothing after it is declared and the
//! partial graph is dropped. The `Application` tag is applied once every
//! layer has succeeded.

use std::collections::BTreeMap;
use tracing::{info, info_span};

use crate::config::StackConfig;
use crate::errors::{StackError, StackResult};
use crate::graph::ResourceGraph;
use crate::layers::{
    ComputeHandle, ComputeLayer, ComputeSpec, IngressDeclaration, IngressLayer, IngressSpec,
    LayerKind, NetworkHandle, NetworkLayer, NetworkSpec, StorageHandle, StorageLayer, StorageSpec,
};

/// Tag key applied to every created resource
pub const APPLICATION_TAG: &str = "Application";

/// Path of the single access point on the shared filesystem
pub const ACCESS_POINT_PATH: &str = "/app-data";

/// A fully declared stack
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedStack {
    pub name: String,
    pub tags: BTreeMap<String, String>,
    /// Layers in the order they were declared
    pub layers: Vec<LayerKind>,
    pub network: NetworkHandle,
    pub storage: StorageHandle,
    pub compute: ComputeHandle,
    pub ingress: IngressDeclaration,
    pub graph: ResourceGraph,
}

/// Composes one stack from a validated configuration
pub struct StackComposer {
    config: StackConfig,
}

impl StackComposer {
    pub fn new(config: StackConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    pub fn network_spec(&self) -> NetworkSpec {
        NetworkSpec {
            name: format!("{}-vpc", self.config.name()),
            cidr: self.config.cidr(),
            public_mask: self.config.public_cidr_mask(),
            private_mask: self.config.private_cidr_mask(),
            zones: self.config.max_azs(),
            nat_gateways: self.config.nat_gateways(),
        }
    }

    pub fn storage_spec(&self) -> StorageSpec {
        StorageSpec {
            name: format!("{}-efs", self.config.name()),
            access_point_path: ACCESS_POINT_PATH.to_string(),
        }
    }

    pub fn compute_spec(&self) -> ComputeSpec {
        ComputeSpec::standard(self.config.name())
    }

    pub fn ingress_spec(&self) -> IngressSpec {
        IngressSpec {
            name: self.config.name().to_string(),
            domain: self.config.domain().clone(),
            host: self.config.host().clone(),
            zone_id: self.config.zone_id().to_string(),
            allowed_ips: self.config.allowed_ips().clone(),
        }
    }

    /// Declare network, storage, compute and ingress, in that order
    pub fn compose(&self) -> StackResult<ComposedStack> {
        let name = self.config.name();
        let mut graph = ResourceGraph::new();
        let mut layers = Vec::with_capacity(LayerKind::ORDER.len());

        let network = in_layer(LayerKind::Network, &mut layers, || {
            NetworkLayer::declare(&self.network_spec(), &mut graph)
        })?;

        let storage = in_layer(LayerKind::Storage, &mut layers, || {
            StorageLayer::declare(&self.storage_spec(), &network, &mut graph)
        })?;

        let compute = in_layer(LayerKind::Compute, &mut layers, || {
            ComputeLayer::declare(&self.compute_spec(), &network, &storage, &mut graph)
        })?;

        let ingress = in_layer(LayerKind::Ingress, &mut layers, || {
            IngressLayer::declare(&self.ingress_spec(), &network, &compute, &mut graph)
        })?;

        graph.apply_tag(APPLICATION_TAG, name);
        let tags = BTreeMap::from([(APPLICATION_TAG.to_string(), name.to_string())]);

        info!(
            stack = %name,
            resources = graph.len(),
            endpoint = %ingress.endpoint(),
            "stack composed"
        );

        Ok(ComposedStack {
            name: name.to_string(),
            tags,
            layers,
            network,
            storage,
            compute,
            ingress,
            graph,
        })
    }
}

/// Run one layer inside its span, attributing any failure to it
fn in_layer<T>(
    layer: LayerKind,
    completed: &mut Vec<LayerKind>,
    declare: impl FnOnce() -> StackResult<T>,
) -> StackResult<T> {
    let span = info_span!("layer", %layer);
    let _guard = span.enter();

    let handle = declare().map_err(|e| StackError::in_layer(layer, e))?;
    completed.push(layer);
    Ok(handle)
}
