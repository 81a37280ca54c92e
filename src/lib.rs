//! Layered stack composition for a containerized web application
//!
//! A validated [`StackConfig`] is composed into a dependency-ordered
//! [`ResourceGraph`]: an isolated network, shared encrypted storage, a
//! containerized service and an authenticated, IP-filtered public ingress.
//! The graph is handed to an external realization engine through a
//! [`ProvisioningRuntime`]; nothing in this crate calls a cloud API.

pub mod composer;
pub mod config;
pub mod domain;
pub mod errors;
pub mod graph;
pub mod layers;
pub mod nats;
pub mod provisioning;
pub mod state_machine;
pub mod subjects;

// Re-export commonly used types
pub use composer::{ComposedStack, StackComposer};
pub use config::{ConfigError, RawStackConfig, StackConfig};
pub use errors::{StackError, StackResult};
pub use graph::{AttrRef, GraphError, Resource, ResourceGraph, ResourceId};
pub use layers::LayerKind;
pub use nats::{NatsClient, NatsConfig};
pub use provisioning::{
    InMemoryRuntime, NatsProvisioningRuntime, ProvisioningRuntime, StackManifest,
    SubmissionReceipt,
};
pub use state_machine::request_flow::{ClientRequest, IngressGate, RequestState};
