// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stack Domain Models
//!
//! Validated value objects shared by every layer of the stack.
//!
//! # Value Objects with Invariants
//!
//! - [`Hostname`] - DNS-validated zone or host names (RFC 1123)
//! - [`DnsLabel`] - a single DNS label (the host part of `host.domain`)
//! - [`AllowList`] - non-empty, duplicate-free IPv4 client prefixes
//! - [`CarvedSubnet`] - a subnet range assigned to one tier and zone
//! - [`ResourceKind`] - declared cloud resource taxonomy
//!
//! Pure configuration rules live in [`invariants`].

pub mod hostname;
pub mod invariants;
pub mod network;
pub mod resource_kind;

pub use hostname::{DnsLabel, Hostname, HostnameError};
pub use invariants::{ValidationError, ValidationResult};
pub use network::{
    carve_subnets, parse_ipv4_net, AllowList, CarvedSubnet, NetworkError, SubnetTier,
};
pub use resource_kind::{ResourceCategory, ResourceKind};
