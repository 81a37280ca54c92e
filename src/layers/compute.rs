// Copyright (c) 2025 - Cowboy AI, Inc.
//! Compute Layer
//!
//! Declares the containerized service: a cluster scoped to the network, a
//! fixed-size task template with the storage access point mounted as a
//! named volume, one container exposing one port, a runtime identity with
//! exactly the grants the container needs, and the service itself on mixed
//! interruptible/on-demand capacity.
//!
//! Nothing here retries. Placement and scheduling retries belong to the
//! provisioning runtime.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{ResourceKind, SubnetTier};
use crate::errors::StackResult;
use crate::graph::{AttrRef, ResourceGraph, ResourceId};

use super::network::NetworkHandle;
use super::security_group::{InboundRule, Peer, SecurityGroupProps};
use super::storage::StorageHandle;
use super::LayerKind;

/// Port the application container listens on
pub const SERVICE_PORT: u16 = 8501;

/// Fixed task sizing
pub const TASK_SIZING: TaskSizing = TaskSizing {
    memory_mib: 1024,
    cpu_units: 512,
    ephemeral_storage_gib: 80,
};

/// Seconds a new task may stay unhealthy before health checks are enforced
pub const HEALTH_CHECK_GRACE_SECS: u32 = 300;

/// Container log retention
pub const LOG_RETENTION_DAYS: u32 = 30;

/// Directory the container image is built from
pub const IMAGE_ASSET_DIRECTORY: &str = "../image-reader";

/// Name of the data volume bound to the access point
pub const DATA_VOLUME: &str = "data";

/// Where the data volume appears inside the container
pub const DATA_MOUNT_PATH: &str = "/image-reader/data";

/// Task memory, CPU and scratch disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSizing {
    pub memory_mib: u32,
    /// 1024 units = 1 vCPU
    pub cpu_units: u32,
    pub ephemeral_storage_gib: u32,
}

/// Source of the container image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerImage {
    /// Built from a local directory at realization time
    Asset { directory: String },
    /// Pulled from a registry
    Registry { image: String },
}

/// Named volume mounted into the container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeBinding {
    pub volume: String,
    pub container_path: String,
    pub read_only: bool,
}

/// What a permission grant applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantScope {
    /// Every resource (`*`)
    Unscoped,
    /// Only the filesystem declared by the storage layer
    DeclaredFileSystem,
}

/// A capability granted to the task's runtime identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub sid: String,
    pub actions: Vec<String>,
    pub scope: GrantScope,
}

impl PermissionGrant {
    pub fn new(sid: &str, actions: &[&str], scope: GrantScope) -> Self {
        Self {
            sid: sid.to_string(),
            actions: actions.iter().map(|a| a.to_string()).collect(),
            scope,
        }
    }
}

/// The grants every application task carries, in order
pub fn standard_grants() -> Vec<PermissionGrant> {
    vec![
        PermissionGrant::new("InvokeInference", &["bedrock:invoke*"], GrantScope::Unscoped),
        PermissionGrant::new(
            "FileSystemClient",
            &[
                "elasticfilesystem:ClientRootAccess",
                "elasticfilesystem:ClientWrite",
                "elasticfilesystem:ClientMount",
                "elasticfilesystem:DescribeMountTargets",
            ],
            GrantScope::DeclaredFileSystem,
        ),
        PermissionGrant::new(
            "DiscoverZones",
            &["ec2:DescribeAvailabilityZones"],
            GrantScope::Unscoped,
        ),
    ]
}

/// Capacity pool a service may place tasks on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapacityProvider {
    /// Interruptible, lower-cost capacity
    #[serde(rename = "FARGATE_SPOT")]
    Spot,
    /// Guaranteed capacity
    #[serde(rename = "FARGATE")]
    OnDemand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityWeight {
    pub provider: CapacityProvider,
    pub weight: u32,
}

/// Favor interruptible capacity 2:1, fall back to guaranteed capacity
pub const CAPACITY_STRATEGY: [CapacityWeight; 2] = [
    CapacityWeight {
        provider: CapacityProvider::Spot,
        weight: 2,
    },
    CapacityWeight {
        provider: CapacityProvider::OnDemand,
        weight: 1,
    },
];

/// Input to the compute layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeSpec {
    pub name: String,
    pub container_name: String,
    pub log_stream_prefix: String,
    pub sizing: TaskSizing,
    pub image: ContainerImage,
    pub port: u16,
    pub volume: VolumeBinding,
    pub grants: Vec<PermissionGrant>,
    pub desired_count: u32,
    pub health_check_grace_secs: u32,
    pub log_retention_days: u32,
}

impl ComputeSpec {
    /// The application service with its fixed sizing, port, volume and grants,
    /// named after the stack
    pub fn standard(stack: &str) -> Self {
        Self {
            name: format!("{stack}-ecs"),
            container_name: format!("{stack}-container"),
            log_stream_prefix: stack.to_string(),
            sizing: TASK_SIZING,
            image: ContainerImage::Asset {
                directory: IMAGE_ASSET_DIRECTORY.to_string(),
            },
            port: SERVICE_PORT,
            volume: VolumeBinding {
                volume: DATA_VOLUME.to_string(),
                container_path: DATA_MOUNT_PATH.to_string(),
                read_only: false,
            },
            grants: standard_grants(),
            desired_count: 1,
            health_check_grace_secs: HEALTH_CHECK_GRACE_SECS,
            log_retention_days: LOG_RETENTION_DAYS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterProps {
    pub name: String,
    pub vpc: AttrRef,
    pub container_insights: bool,
    pub capacity_providers: Vec<CapacityProvider>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogGroupProps {
    pub stream_prefix: String,
    pub retention_days: u32,
}

/// Resource an identity statement applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatementResource {
    Ref(AttrRef),
    Wildcard(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyStatement {
    pub sid: String,
    pub effect: String,
    pub actions: Vec<String>,
    pub resources: Vec<StatementResource>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRoleProps {
    pub assumed_by: String,
    pub statements: Vec<PolicyStatement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Toggle {
    Enabled,
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeAuthorization {
    pub access_point: AttrRef,
    pub iam: Toggle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSystemVolume {
    pub name: String,
    pub file_system: AttrRef,
    pub transit_encryption: Toggle,
    pub authorization: VolumeAuthorization,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMapping {
    pub container_port: u16,
    pub host_port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountPoint {
    pub source_volume: String,
    pub container_path: String,
    pub read_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerDefinition {
    pub name: String,
    pub image: ContainerImage,
    pub essential: bool,
    pub port_mappings: Vec<PortMapping>,
    pub mount_points: Vec<MountPoint>,
    pub log_group: AttrRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDefinitionProps {
    pub family: String,
    pub memory_mib: u32,
    pub cpu_units: u32,
    pub ephemeral_storage_gib: u32,
    pub network_mode: String,
    pub task_role: AttrRef,
    pub volumes: Vec<FileSystemVolume>,
    pub containers: Vec<ContainerDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceProps {
    pub cluster: AttrRef,
    pub task_definition: AttrRef,
    pub desired_count: u32,
    pub health_check_grace_period_secs: u32,
    pub capacity_provider_strategy: Vec<CapacityWeight>,
    pub subnets: Vec<AttrRef>,
    pub security_groups: Vec<AttrRef>,
    pub assign_public_ip: bool,
}

/// Read-only view of the declared service, used as a load-balancing target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputeHandle {
    service: ResourceId,
    cluster: ResourceId,
    security_group: ResourceId,
    container_name: String,
    port: u16,
}

impl ComputeHandle {
    pub fn service(&self) -> &ResourceId {
        &self.service
    }

    pub fn service_ref(&self) -> AttrRef {
        AttrRef::id(&self.service)
    }

    pub fn cluster(&self) -> &ResourceId {
        &self.cluster
    }

    pub fn security_group(&self) -> &ResourceId {
        &self.security_group
    }

    pub fn container_name(&self) -> &str {
        &self.container_name
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

/// Declares the containerized service
pub struct ComputeLayer;

impl ComputeLayer {
    pub fn declare(
        spec: &ComputeSpec,
        network: &NetworkHandle,
        storage: &StorageHandle,
        graph: &mut ResourceGraph,
    ) -> StackResult<ComputeHandle> {
        let scope = ResourceId::new(LayerKind::Compute.scope());

        let cluster = graph.declare(
            scope.child("AppCluster"),
            ResourceKind::Cluster,
            &ClusterProps {
                name: spec.name.clone(),
                vpc: network.vpc_ref(),
                container_insights: true,
                capacity_providers: vec![CapacityProvider::OnDemand, CapacityProvider::Spot],
            },
        )?;

        let log_group = graph.declare(
            scope.child("AppLogGroup"),
            ResourceKind::LogGroup,
            &LogGroupProps {
                stream_prefix: spec.log_stream_prefix.clone(),
                retention_days: spec.log_retention_days,
            },
        )?;

        let statements = spec
            .grants
            .iter()
            .map(|grant| PolicyStatement {
                sid: grant.sid.clone(),
                effect: "Allow".to_string(),
                actions: grant.actions.clone(),
                resources: vec![match grant.scope {
                    GrantScope::Unscoped => StatementResource::Wildcard("*".to_string()),
                    GrantScope::DeclaredFileSystem => {
                        StatementResource::Ref(storage.file_system_arn())
                    }
                }],
            })
            .collect();

        let task_role = graph.declare(
            scope.child("AppTaskRole"),
            ResourceKind::TaskRole,
            &TaskRoleProps {
                assumed_by: "ecs-tasks.amazonaws.com".to_string(),
                statements,
            },
        )?;

        let task_definition = graph.declare(
            scope.child("AppTaskDefinition"),
            ResourceKind::TaskDefinition,
            &TaskDefinitionProps {
                family: spec.name.clone(),
                memory_mib: spec.sizing.memory_mib,
                cpu_units: spec.sizing.cpu_units,
                ephemeral_storage_gib: spec.sizing.ephemeral_storage_gib,
                network_mode: "awsvpc".to_string(),
                task_role: AttrRef::arn(&task_role),
                volumes: vec![FileSystemVolume {
                    name: spec.volume.volume.clone(),
                    file_system: storage.file_system_id(),
                    transit_encryption: Toggle::Enabled,
                    authorization: VolumeAuthorization {
                        access_point: storage.access_point_id(),
                        iam: Toggle::Enabled,
                    },
                }],
                containers: vec![ContainerDefinition {
                    name: spec.container_name.clone(),
                    image: spec.image.clone(),
                    essential: true,
                    port_mappings: vec![PortMapping {
                        container_port: spec.port,
                        host_port: spec.port,
                    }],
                    mount_points: vec![MountPoint {
                        source_volume: spec.volume.volume.clone(),
                        container_path: spec.volume.container_path.clone(),
                        read_only: spec.volume.read_only,
                    }],
                    log_group: AttrRef::id(&log_group),
                }],
            },
        )?;

        let security_group = graph.declare(
            scope.child("AppServiceSecurityGroup"),
            ResourceKind::SecurityGroup,
            &SecurityGroupProps {
                name: Some(format!("{}-service-sg", spec.name)),
                description: format!("{} service", spec.name),
                vpc: network.vpc_ref(),
                allow_all_outbound: true,
                inbound: vec![InboundRule::tcp(
                    Peer::Ipv4(network.cidr()),
                    spec.port,
                    "Application traffic from within the network",
                )],
            },
        )?;

        // Tasks mount the filesystem on start, so every mount target comes first
        let mount_targets: Vec<&ResourceId> = storage.mount_targets().iter().collect();
        let service = graph.declare_after(
            scope.child("AppService"),
            ResourceKind::Service,
            &ServiceProps {
                cluster: AttrRef::id(&cluster),
                task_definition: AttrRef::arn(&task_definition),
                desired_count: spec.desired_count,
                health_check_grace_period_secs: spec.health_check_grace_secs,
                capacity_provider_strategy: CAPACITY_STRATEGY.to_vec(),
                subnets: network.subnet_refs(SubnetTier::Private),
                security_groups: vec![AttrRef::id(&security_group)],
                assign_public_ip: false,
            },
            &mount_targets,
        )?;

        info!(
            service = %spec.name,
            port = spec.port,
            grants = spec.grants.len(),
            "declared compute layer"
        );

        Ok(ComputeHandle {
            service,
            cluster,
            security_group,
            container_name: spec.container_name.clone(),
            port: spec.port,
        })
    }
}
