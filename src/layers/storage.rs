// Copyright (c) 2025 - Cowboy AI, Inc.
//! Storage Layer
//!
//! Declares one encrypted, backed-up shared filesystem mounted into the
//! private tier, reachable only from inside the network's address range,
//! and exactly one access point. The access point pins every client to a
//! single path with a fixed POSIX identity; consumers never see the
//! filesystem root.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::invariants::validate_access_point_path;
use crate::domain::{ResourceKind, SubnetTier};
use crate::errors::StackResult;
use crate::graph::{AttrRef, ResourceGraph, ResourceId};

use super::network::NetworkHandle;
use super::security_group::{InboundRule, Peer, SecurityGroupProps};
use super::LayerKind;

/// NFS port the filesystem listens on
pub const NFS_PORT: u16 = 2049;

/// POSIX identity and permissions applied at the access point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosixOwner {
    pub uid: u32,
    pub gid: u32,
    /// Octal permission bits for the created directory
    pub permissions: u16,
}

impl PosixOwner {
    /// Permission bits in the octal text form the provider expects
    pub fn permissions_octal(&self) -> String {
        format!("{:o}", self.permissions)
    }
}

/// Owner of the access point directory and identity of every client
pub const ACCESS_POINT_OWNER: PosixOwner = PosixOwner {
    uid: 1001,
    gid: 1001,
    permissions: 0o750,
};

/// Input to the storage layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSpec {
    pub name: String,
    /// The only path the access point exposes
    pub access_point_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceMode {
    GeneralPurpose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThroughputMode {
    Bursting,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSystemProps {
    pub name: String,
    pub vpc: AttrRef,
    pub encrypted: bool,
    pub automatic_backups: bool,
    pub performance_mode: PerformanceMode,
    pub throughput_mode: ThroughputMode,
    pub security_group: AttrRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountTargetProps {
    pub file_system: AttrRef,
    pub subnet: AttrRef,
    pub security_group: AttrRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAcl {
    pub owner_uid: String,
    pub owner_gid: String,
    pub permissions: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosixUser {
    pub uid: String,
    pub gid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPointProps {
    pub file_system: AttrRef,
    pub path: String,
    pub create_acl: CreateAcl,
    pub posix_user: PosixUser,
}

/// Read-only view of the declared storage for the compute layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageHandle {
    file_system: ResourceId,
    access_point: ResourceId,
    mount_targets: Vec<ResourceId>,
    path: String,
    owner: PosixOwner,
}

impl StorageHandle {
    pub fn file_system(&self) -> &ResourceId {
        &self.file_system
    }

    pub fn file_system_id(&self) -> AttrRef {
        AttrRef::id(&self.file_system)
    }

    pub fn file_system_arn(&self) -> AttrRef {
        AttrRef::arn(&self.file_system)
    }

    pub fn access_point(&self) -> &ResourceId {
        &self.access_point
    }

    pub fn access_point_id(&self) -> AttrRef {
        AttrRef::id(&self.access_point)
    }

    /// Mount targets that must be ready before any client mounts
    pub fn mount_targets(&self) -> &[ResourceId] {
        &self.mount_targets
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn owner(&self) -> PosixOwner {
        self.owner
    }
}

/// Declares the shared filesystem and its access point
pub struct StorageLayer;

impl StorageLayer {
    pub fn declare(
        spec: &StorageSpec,
        network: &NetworkHandle,
        graph: &mut ResourceGraph,
    ) -> StackResult<StorageHandle> {
        validate_access_point_path(&spec.access_point_path)?;
        let scope = ResourceId::new(LayerKind::Storage.scope());

        let security_group = graph.declare(
            scope.child("EfsSecurityGroup"),
            ResourceKind::SecurityGroup,
            &SecurityGroupProps {
                name: None,
                description: format!("{} filesystem clients", spec.name),
                vpc: network.vpc_ref(),
                allow_all_outbound: true,
                inbound: vec![InboundRule::tcp(
                    Peer::Ipv4(network.cidr()),
                    NFS_PORT,
                    "NFS from within the network",
                )],
            },
        )?;

        let file_system = graph.declare(
            scope.child("Efs"),
            ResourceKind::FileSystem,
            &FileSystemProps {
                name: spec.name.clone(),
                vpc: network.vpc_ref(),
                encrypted: true,
                automatic_backups: true,
                performance_mode: PerformanceMode::GeneralPurpose,
                throughput_mode: ThroughputMode::Bursting,
                security_group: AttrRef::id(&security_group),
            },
        )?;

        let mut mount_targets = Vec::new();
        for subnet in network.subnets(SubnetTier::Private) {
            mount_targets.push(graph.declare(
                file_system.child(format!("MountTarget{}", subnet.zone + 1)),
                ResourceKind::MountTarget,
                &MountTargetProps {
                    file_system: AttrRef::id(&file_system),
                    subnet: AttrRef::id(&subnet.id),
                    security_group: AttrRef::id(&security_group),
                },
            )?);
        }

        let owner = ACCESS_POINT_OWNER;
        let access_point = graph.declare(
            file_system.child("AccessPoint"),
            ResourceKind::AccessPoint,
            &AccessPointProps {
                file_system: AttrRef::id(&file_system),
                path: spec.access_point_path.clone(),
                create_acl: CreateAcl {
                    owner_uid: owner.uid.to_string(),
                    owner_gid: owner.gid.to_string(),
                    permissions: owner.permissions_octal(),
                },
                posix_user: PosixUser {
                    uid: owner.uid.to_string(),
                    gid: owner.gid.to_string(),
                },
            },
        )?;

        info!(
            file_system = %spec.name,
            path = %spec.access_point_path,
            mount_targets = mount_targets.len(),
            "declared storage layer"
        );

        Ok(StorageHandle {
            file_system,
            access_point,
            mount_targets,
            path: spec.access_point_path.clone(),
            owner,
        })
    }
}
