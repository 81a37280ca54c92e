// Copyright (c) 2025 - Cowboy AI, Inc.
//! Provisioning Runtime Boundary
//!
//! The composed graph leaves this crate as a [`StackManifest`] submitted to a
//! [`ProvisioningRuntime`]. Realization, reconciliation and rollback happen
//! on the far side; a [`SubmissionReceipt`] only confirms the hand-off.
//!
//! ```text
//! ComposedStack ──StackManifest::from_stack──> manifest
//!                                                │
//!                       ProvisioningRuntime::submit
//!                          ├── InMemoryRuntime (dry runs, tests)
//!                          └── NatsProvisioningRuntime (stacks.{name}.declared)
//! ```

pub mod nats;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::composer::ComposedStack;
use crate::errors::StackResult;
use crate::graph::ResourceGraph;

pub use self::nats::NatsProvisioningRuntime;

/// Envelope around a composed graph
///
/// Identity and time live here only; two manifests of the same
/// configuration differ in `manifest_id` and `created_at` and nowhere else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackManifest {
    pub manifest_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub stack: String,
    pub tags: BTreeMap<String, String>,
    /// Public endpoint of the declared ingress
    pub endpoint: String,
    pub graph: ResourceGraph,
}

impl StackManifest {
    pub fn from_stack(stack: &ComposedStack) -> Self {
        Self {
            manifest_id: Uuid::now_v7(),
            created_at: Utc::now(),
            stack: stack.name.clone(),
            tags: stack.tags.clone(),
            endpoint: stack.ingress.endpoint(),
            graph: stack.graph.clone(),
        }
    }

    pub fn to_json_pretty(&self) -> StackResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Where a manifest was handed off to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "target")]
pub enum SubmissionTarget {
    Memory,
    Subject(String),
}

/// Confirmation that a runtime accepted a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub manifest_id: Uuid,
    pub resources: usize,
    pub target: SubmissionTarget,
    pub accepted_at: DateTime<Utc>,
}

/// Accepts composed manifests for realization
#[async_trait]
pub trait ProvisioningRuntime: Send + Sync {
    async fn submit(&self, manifest: &StackManifest) -> StackResult<SubmissionReceipt>;
}

/// Keeps submitted manifests in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryRuntime {
    submitted: Arc<Mutex<Vec<StackManifest>>>,
}

impl InMemoryRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Manifests accepted so far, oldest first
    pub async fn submitted(&self) -> Vec<StackManifest> {
        self.submitted.lock().await.clone()
    }
}

#[async_trait]
impl ProvisioningRuntime for InMemoryRuntime {
    async fn submit(&self, manifest: &StackManifest) -> StackResult<SubmissionReceipt> {
        manifest.graph.verify_order()?;

        self.submitted.lock().await.push(manifest.clone());

        info!(
            manifest_id = %manifest.manifest_id,
            stack = %manifest.stack,
            "manifest recorded"
        );

        Ok(SubmissionReceipt {
            manifest_id: manifest.manifest_id,
            resources: manifest.graph.len(),
            target: SubmissionTarget::Memory,
            accepted_at: Utc::now(),
        })
    }
}
