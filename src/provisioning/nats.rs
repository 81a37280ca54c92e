// Copyright (c) 2025 - Cowboy AI, Inc.
//! Hands manifests to an external realization engine over NATS.

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use super::{ProvisioningRuntime, StackManifest, SubmissionReceipt, SubmissionTarget};
use crate::errors::StackResult;
use crate::nats::NatsClient;
use crate::subjects;

/// Publishes each manifest to `stacks.{name}.declared`
#[derive(Clone)]
pub struct NatsProvisioningRuntime {
    client: NatsClient,
}

impl NatsProvisioningRuntime {
    pub fn new(client: NatsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProvisioningRuntime for NatsProvisioningRuntime {
    async fn submit(&self, manifest: &StackManifest) -> StackResult<SubmissionReceipt> {
        manifest.graph.verify_order()?;

        let subject = subjects::stack_declared(&manifest.stack);
        self.client.publish(&subject, manifest).await?;

        info!(
            manifest_id = %manifest.manifest_id,
            subject = %subject,
            resources = manifest.graph.len(),
            "manifest published"
        );

        Ok(SubmissionReceipt {
            manifest_id: manifest.manifest_id,
            resources: manifest.graph.len(),
            target: SubmissionTarget::Subject(subject),
            accepted_at: Utc::now(),
        })
    }
}
