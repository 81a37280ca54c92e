// Copyright (c) 2025 - Cowboy AI, Inc.
//! Declared Resource Kind Taxonomy
//!
//! The closed vocabulary of cloud resources a stack can declare. The
//! provisioning runtime dispatches on these kinds to pick the provider API
//! that realizes each declaration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a declared cloud resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    // Network
    /// Isolated virtual network
    Vpc,
    /// Address range within the network, bound to one zone
    Subnet,
    /// Internet gateway serving the public tier
    InternetGateway,
    /// NAT gateway providing egress for the private tier
    NatGateway,
    /// Stateful traffic-control group
    SecurityGroup,

    // Storage
    /// Encrypted, network-attached shared filesystem
    FileSystem,
    /// Per-subnet mount target of the filesystem
    MountTarget,
    /// Path- and identity-scoped view into the filesystem
    AccessPoint,

    // Compute
    /// Logical container cluster
    Cluster,
    /// Container log group
    LogGroup,
    /// Runtime identity assumed by the task
    TaskRole,
    /// Task template (sizing, volumes, containers)
    TaskDefinition,
    /// Long-running containerized service
    Service,

    // Security
    /// IP prefix set referenced by firewall rules
    IpSet,
    /// Web-application firewall policy
    WebAcl,
    /// Binding of a web ACL to a protected resource
    WebAclAssociation,

    // Identity
    /// User directory for the identity provider
    UserPool,
    /// Hosted authentication domain
    UserPoolDomain,
    /// OAuth2 application client
    UserPoolClient,

    // Ingress
    /// Public application load balancer
    LoadBalancer,
    /// TLS certificate
    Certificate,
    /// Health-checked backend pool
    TargetGroup,
    /// Load balancer listener
    Listener,

    // DNS
    /// Hosted DNS zone (imported, never created)
    HostedZone,
    /// CNAME record
    CnameRecord,
}

impl ResourceKind {
    /// Get the canonical string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vpc => "vpc",
            Self::Subnet => "subnet",
            Self::InternetGateway => "internet_gateway",
            Self::NatGateway => "nat_gateway",
            Self::SecurityGroup => "security_group",
            Self::FileSystem => "file_system",
            Self::MountTarget => "mount_target",
            Self::AccessPoint => "access_point",
            Self::Cluster => "cluster",
            Self::LogGroup => "log_group",
            Self::TaskRole => "task_role",
            Self::TaskDefinition => "task_definition",
            Self::Service => "service",
            Self::IpSet => "ip_set",
            Self::WebAcl => "web_acl",
            Self::WebAclAssociation => "web_acl_association",
            Self::UserPool => "user_pool",
            Self::UserPoolDomain => "user_pool_domain",
            Self::UserPoolClient => "user_pool_client",
            Self::LoadBalancer => "load_balancer",
            Self::Certificate => "certificate",
            Self::TargetGroup => "target_group",
            Self::Listener => "listener",
            Self::HostedZone => "hosted_zone",
            Self::CnameRecord => "cname_record",
        }
    }

    /// Get the primary category for this resource kind
    pub fn category(&self) -> ResourceCategory {
        match self {
            Self::Vpc
            | Self::Subnet
            | Self::InternetGateway
            | Self::NatGateway
            | Self::SecurityGroup => ResourceCategory::Network,

            Self::FileSystem | Self::MountTarget | Self::AccessPoint => ResourceCategory::Storage,

            Self::Cluster
            | Self::LogGroup
            | Self::TaskRole
            | Self::TaskDefinition
            | Self::Service => ResourceCategory::Compute,

            Self::IpSet | Self::WebAcl | Self::WebAclAssociation => ResourceCategory::Security,

            Self::UserPool | Self::UserPoolDomain | Self::UserPoolClient => {
                ResourceCategory::Identity
            }

            Self::LoadBalancer | Self::Certificate | Self::TargetGroup | Self::Listener => {
                ResourceCategory::Ingress
            }

            Self::HostedZone | Self::CnameRecord => ResourceCategory::Dns,
        }
    }

    /// Whether the realized resource is reachable from the public internet
    pub fn is_publicly_reachable(&self) -> bool {
        matches!(self, Self::LoadBalancer)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resource category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceCategory {
    Network,
    Storage,
    Compute,
    Security,
    Identity,
    Ingress,
    Dns,
}

impl fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Network => "network",
            Self::Storage => "storage",
            Self::Compute => "compute",
            Self::Security => "security",
            Self::Identity => "identity",
            Self::Ingress => "ingress",
            Self::Dns => "dns",
        };
        write!(f, "{}", name)
    }
}
