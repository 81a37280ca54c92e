// Copyright (c) 2025 - Cowboy AI, Inc.
//! Load balancer, certificate, target group, authenticated listener and the
//! DNS record that names the whole path.

use serde::{Deserialize, Serialize};

use crate::domain::{Hostname, ResourceKind, SubnetTier};
use crate::graph::{AttrRef, GraphError, ResourceGraph, ResourceId};
use crate::layers::compute::ComputeHandle;
use crate::layers::network::NetworkHandle;
use crate::layers::security_group::{InboundRule, Peer, SecurityGroupProps};

use super::identity::Identity;

/// Public TLS port
pub const LISTENER_PORT: u16 = 443;

/// Liveness path the target group probes
pub const LIVENESS_PATH: &str = "/_stcore/health";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationProtocol {
    Http,
    Https,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancerProps {
    pub vpc: AttrRef,
    pub internet_facing: bool,
    pub subnets: Vec<AttrRef>,
    pub security_group: AttrRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateValidation {
    /// Ownership proven through a DNS challenge record
    Dns,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateProps {
    pub domain_name: Hostname,
    pub validation: CertificateValidation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    Ip,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheck {
    pub path: String,
    pub protocol: ApplicationProtocol,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetGroupProps {
    pub vpc: AttrRef,
    pub port: u16,
    pub protocol: ApplicationProtocol,
    pub target_type: TargetType,
    pub targets: Vec<AttrRef>,
    pub target_container: String,
    pub health_check: HealthCheck,
}

/// What the listener does with a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ListenerAction {
    /// Require a session from the identity pool, then run `next`
    AuthenticateCognito {
        user_pool: AttrRef,
        user_pool_client: AttrRef,
        user_pool_domain: AttrRef,
        next: Box<ListenerAction>,
    },
    Forward {
        target_groups: Vec<AttrRef>,
    },
}

impl ListenerAction {
    /// Whether every path through this action authenticates before forwarding
    pub fn authenticates_before_forward(&self) -> bool {
        match self {
            ListenerAction::AuthenticateCognito { .. } => true,
            ListenerAction::Forward { .. } => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerProps {
    pub load_balancer: AttrRef,
    pub port: u16,
    pub protocol: ApplicationProtocol,
    pub certificates: Vec<AttrRef>,
    pub default_action: ListenerAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedZoneProps {
    pub zone_name: Hostname,
    pub hosted_zone_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CnameRecordProps {
    pub zone: AttrRef,
    pub record_name: String,
    pub domain_name: AttrRef,
}

/// Declare the load balancer and its traffic-control group
///
/// The group admits the TLS port from anywhere; source filtering is the
/// web ACL's job.
pub fn declare_load_balancer(
    network: &NetworkHandle,
    scope: &ResourceId,
    graph: &mut ResourceGraph,
) -> Result<(ResourceId, ResourceId), GraphError> {
    let security_group = graph.declare(
        scope.child("LoadBalancerSecurityGroup"),
        ResourceKind::SecurityGroup,
        &SecurityGroupProps {
            name: None,
            description: "Public HTTPS".to_string(),
            vpc: network.vpc_ref(),
            allow_all_outbound: true,
            inbound: vec![InboundRule::tcp(Peer::AnyIpv4, LISTENER_PORT, "HTTPS from anywhere")],
        },
    )?;

    let load_balancer = graph.declare(
        scope.child("LoadBalancer"),
        ResourceKind::LoadBalancer,
        &LoadBalancerProps {
            vpc: network.vpc_ref(),
            internet_facing: true,
            subnets: network.subnet_refs(SubnetTier::Public),
            security_group: AttrRef::id(&security_group),
        },
    )?;

    Ok((security_group, load_balancer))
}

pub fn declare_certificate(
    fqdn: &Hostname,
    scope: &ResourceId,
    graph: &mut ResourceGraph,
) -> Result<ResourceId, GraphError> {
    graph.declare(
        scope.child("Certificate"),
        ResourceKind::Certificate,
        &CertificateProps {
            domain_name: fqdn.clone(),
            validation: CertificateValidation::Dns,
        },
    )
}

/// Target group over the compute service, probed on the service port
pub fn declare_target_group(
    network: &NetworkHandle,
    compute: &ComputeHandle,
    scope: &ResourceId,
    graph: &mut ResourceGraph,
) -> Result<ResourceId, GraphError> {
    graph.declare(
        scope.child("TargetGroup"),
        ResourceKind::TargetGroup,
        &TargetGroupProps {
            vpc: network.vpc_ref(),
            port: compute.port(),
            protocol: ApplicationProtocol::Http,
            target_type: TargetType::Ip,
            targets: vec![compute.service_ref()],
            target_container: compute.container_name().to_string(),
            health_check: HealthCheck {
                path: LIVENESS_PATH.to_string(),
                protocol: ApplicationProtocol::Http,
                port: compute.port(),
            },
        },
    )
}

/// Require a session from the identity pool, then forward to the target group
pub fn authenticate_then_forward(identity: &Identity, target_group: &ResourceId) -> ListenerAction {
    ListenerAction::AuthenticateCognito {
        user_pool: AttrRef::arn(&identity.user_pool),
        user_pool_client: AttrRef::id(&identity.client),
        user_pool_domain: AttrRef::id(&identity.domain),
        next: Box::new(ListenerAction::Forward {
            target_groups: vec![AttrRef::arn(target_group)],
        }),
    }
}

/// HTTPS listener on the public port with a single default action
pub fn declare_listener(
    load_balancer: &ResourceId,
    certificate: &ResourceId,
    default_action: &ListenerAction,
    scope: &ResourceId,
    graph: &mut ResourceGraph,
) -> Result<ResourceId, GraphError> {
    graph.declare(
        scope.child("HttpsListener"),
        ResourceKind::Listener,
        &ListenerProps {
            load_balancer: AttrRef::arn(load_balancer),
            port: LISTENER_PORT,
            protocol: ApplicationProtocol::Https,
            certificates: vec![AttrRef::arn(certificate)],
            default_action: default_action.clone(),
        },
    )
}

/// Look up the hosted zone and point the host label at the load balancer
pub fn declare_dns_record(
    domain: &Hostname,
    zone_id: &str,
    host: &str,
    load_balancer: &ResourceId,
    scope: &ResourceId,
    graph: &mut ResourceGraph,
) -> Result<(ResourceId, ResourceId), GraphError> {
    let zone = graph.import(
        scope.child("HostedZone"),
        ResourceKind::HostedZone,
        &HostedZoneProps {
            zone_name: domain.clone(),
            hosted_zone_id: zone_id.to_string(),
        },
    )?;

    let record = graph.declare(
        scope.child("CnameRecord"),
        ResourceKind::CnameRecord,
        &CnameRecordProps {
            zone: AttrRef::id(&zone),
            record_name: host.to_string(),
            domain_name: AttrRef::dns_name(load_balancer),
        },
    )?;

    Ok((zone, record))
}
