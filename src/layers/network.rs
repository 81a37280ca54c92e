// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Layer
//!
//! Declares the isolated network: one VPC, a public tier routed through an
//! internet gateway and a private tier routed through NAT, both replicated
//! across the requested number of availability zones.
//!
//! Subnet ranges are carved before anything is declared, so a mask that
//! does not fit under the parent range fails fast with no partial graph.

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::{carve_subnets, CarvedSubnet, ResourceKind, SubnetTier};
use crate::errors::StackResult;
use crate::graph::{AttrRef, ResourceGraph, ResourceId};

use super::LayerKind;

/// Input to the network layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub name: String,
    pub cidr: Ipv4Net,
    pub public_mask: u8,
    pub private_mask: u8,
    pub zones: u8,
    pub nat_gateways: u8,
}

impl NetworkSpec {
    /// Carve both tiers, public first
    pub fn carve(&self) -> StackResult<Vec<CarvedSubnet>> {
        Ok(carve_subnets(
            self.cidr,
            &[
                (SubnetTier::Public, self.public_mask),
                (SubnetTier::Private, self.private_mask),
            ],
            self.zones,
        )?)
    }
}

/// Where a subnet sends traffic bound outside the network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultRoute {
    InternetGateway(AttrRef),
    NatGateway(AttrRef),
    /// No route out of the network
    Isolated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpcProps {
    pub name: String,
    pub cidr_block: Ipv4Net,
    pub max_azs: u8,
    pub enable_dns_hostnames: bool,
    pub enable_dns_support: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternetGatewayProps {
    pub vpc: AttrRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetProps {
    pub vpc: AttrRef,
    pub tier: SubnetTier,
    pub zone_index: u8,
    pub cidr_block: Ipv4Net,
    pub map_public_ip_on_launch: bool,
    pub default_route: DefaultRoute,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NatGatewayProps {
    pub subnet: AttrRef,
    pub allocate_elastic_ip: bool,
}

/// A declared subnet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetRef {
    pub id: ResourceId,
    pub tier: SubnetTier,
    pub zone: u8,
    pub cidr: Ipv4Net,
}

/// Read-only view of the declared network for downstream layers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkHandle {
    vpc: ResourceId,
    cidr: Ipv4Net,
    subnets: Vec<SubnetRef>,
    nat_gateways: Vec<ResourceId>,
}

impl NetworkHandle {
    pub fn vpc(&self) -> &ResourceId {
        &self.vpc
    }

    pub fn vpc_ref(&self) -> AttrRef {
        AttrRef::id(&self.vpc)
    }

    /// The network's address range
    pub fn cidr(&self) -> Ipv4Net {
        self.cidr
    }

    /// Subnets of one tier, ordered by zone
    pub fn subnets(&self, tier: SubnetTier) -> impl Iterator<Item = &SubnetRef> {
        self.subnets.iter().filter(move |s| s.tier == tier)
    }

    /// References to the ids of one tier's subnets
    pub fn subnet_refs(&self, tier: SubnetTier) -> Vec<AttrRef> {
        self.subnets(tier).map(|s| AttrRef::id(&s.id)).collect()
    }

    pub fn nat_gateways(&self) -> &[ResourceId] {
        &self.nat_gateways
    }
}

/// Declares the isolated network
pub struct NetworkLayer;

impl NetworkLayer {
    pub fn declare(spec: &NetworkSpec, graph: &mut ResourceGraph) -> StackResult<NetworkHandle> {
        let carved = spec.carve()?;
        let scope = ResourceId::new(LayerKind::Network.scope());

        let vpc = graph.declare(
            scope.child("Vpc"),
            ResourceKind::Vpc,
            &VpcProps {
                name: spec.name.clone(),
                cidr_block: spec.cidr,
                max_azs: spec.zones,
                enable_dns_hostnames: true,
                enable_dns_support: true,
            },
        )?;

        let igw = graph.declare(
            vpc.child("InternetGateway"),
            ResourceKind::InternetGateway,
            &InternetGatewayProps {
                vpc: AttrRef::id(&vpc),
            },
        )?;

        let mut subnets = Vec::with_capacity(carved.len());
        let mut nat_gateways = Vec::with_capacity(usize::from(spec.nat_gateways));

        for carved in carved.iter().filter(|s| s.tier == SubnetTier::Public) {
            let id = graph.declare(
                vpc.child(format!("publicSubnet{}", carved.zone + 1)),
                ResourceKind::Subnet,
                &SubnetProps {
                    vpc: AttrRef::id(&vpc),
                    tier: SubnetTier::Public,
                    zone_index: carved.zone,
                    cidr_block: carved.cidr,
                    map_public_ip_on_launch: true,
                    default_route: DefaultRoute::InternetGateway(AttrRef::id(&igw)),
                },
            )?;

            if carved.zone < spec.nat_gateways {
                nat_gateways.push(graph.declare(
                    id.child("NatGateway"),
                    ResourceKind::NatGateway,
                    &NatGatewayProps {
                        subnet: AttrRef::id(&id),
                        allocate_elastic_ip: true,
                    },
                )?);
            }

            subnets.push(SubnetRef {
                id,
                tier: SubnetTier::Public,
                zone: carved.zone,
                cidr: carved.cidr,
            });
        }

        if nat_gateways.is_empty() {
            warn!(network = %spec.name, "no NAT gateways: private subnets are isolated");
        }

        for carved in carved.iter().filter(|s| s.tier == SubnetTier::Private) {
            // Same-zone gateway when there is one, otherwise the first
            let default_route = nat_gateways
                .get(usize::from(carved.zone))
                .or_else(|| nat_gateways.first())
                .map(|nat| DefaultRoute::NatGateway(AttrRef::id(nat)))
                .unwrap_or(DefaultRoute::Isolated);

            let id = graph.declare(
                vpc.child(format!("privateSubnet{}", carved.zone + 1)),
                ResourceKind::Subnet,
                &SubnetProps {
                    vpc: AttrRef::id(&vpc),
                    tier: SubnetTier::Private,
                    zone_index: carved.zone,
                    cidr_block: carved.cidr,
                    map_public_ip_on_launch: false,
                    default_route,
                },
            )?;

            subnets.push(SubnetRef {
                id,
                tier: SubnetTier::Private,
                zone: carved.zone,
                cidr: carved.cidr,
            });
        }

        info!(
            network = %spec.name,
            cidr = %spec.cidr,
            subnets = subnets.len(),
            nat_gateways = nat_gateways.len(),
            "declared network layer"
        );

        Ok(NetworkHandle {
            vpc,
            cidr: spec.cidr,
            subnets,
            nat_gateways,
        })
    }
}
