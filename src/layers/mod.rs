// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stack Layers
//!
//! Each layer declares one category of infrastructure into the shared
//! [`ResourceGraph`](crate::graph::ResourceGraph) and returns a plain handle
//! value for the layers after it.
//!
//! ```text
//! NetworkLayer ──NetworkHandle──┬──> StorageLayer ──StorageHandle──┐
//!                               │                                  ▼
//!                               ├─────────────────────────> ComputeLayer
//!                               │                                  │
//!                               │                           ComputeHandle
//!                               ▼                                  │
//!                          IngressLayer <──────────────────────────┘
//! ```
//!
//! No layer holds a reference to its consumers; handles only flow forward.

pub mod compute;
pub mod ingress;
pub mod network;
pub mod security_group;
pub mod storage;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use compute::{ComputeHandle, ComputeLayer, ComputeSpec};
pub use ingress::{IngressDeclaration, IngressLayer, IngressSpec};
pub use network::{NetworkHandle, NetworkLayer, NetworkSpec, SubnetRef};
pub use storage::{StorageHandle, StorageLayer, StorageSpec};

/// Layers in the only order they can be composed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Network,
    Storage,
    Compute,
    Ingress,
}

impl LayerKind {
    /// Composition order
    pub const ORDER: [LayerKind; 4] = [
        LayerKind::Network,
        LayerKind::Storage,
        LayerKind::Compute,
        LayerKind::Ingress,
    ];

    /// Construct scope under which the layer's resource ids live
    pub fn scope(&self) -> &'static str {
        match self {
            LayerKind::Network => "AppVpc",
            LayerKind::Storage => "AppEfs",
            LayerKind::Compute => "AppEcs",
            LayerKind::Ingress => "AppIngress",
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerKind::Network => write!(f, "network"),
            LayerKind::Storage => write!(f, "storage"),
            LayerKind::Compute => write!(f, "compute"),
            LayerKind::Ingress => write!(f, "ingress"),
        }
    }
}
