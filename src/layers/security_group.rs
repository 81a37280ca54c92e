// Copyright (c) 2025 - Cowboy AI, Inc.
//! Traffic-control group properties shared by the storage, compute and
//! ingress layers.

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};

use crate::graph::AttrRef;

/// Transport protocol of an inbound rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportProtocol {
    Tcp,
}

/// Source of inbound traffic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Peer {
    /// A specific IPv4 range
    Ipv4(Ipv4Net),
    /// Any IPv4 source (`0.0.0.0/0`)
    AnyIpv4,
}

impl Peer {
    /// Whether traffic from outside the given network range is admitted
    pub fn admits_outside(&self, network: Ipv4Net) -> bool {
        match self {
            Peer::Ipv4(range) => !network.contains(range),
            Peer::AnyIpv4 => true,
        }
    }
}

/// One inbound allowance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundRule {
    pub peer: Peer,
    pub protocol: TransportProtocol,
    pub port: u16,
    pub description: String,
}

impl InboundRule {
    pub fn tcp(peer: Peer, port: u16, description: impl Into<String>) -> Self {
        Self {
            peer,
            protocol: TransportProtocol::Tcp,
            port,
            description: description.into(),
        }
    }
}

/// Properties of a declared traffic-control group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityGroupProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub description: String,
    pub vpc: AttrRef,
    pub allow_all_outbound: bool,
    pub inbound: Vec<InboundRule>,
}
