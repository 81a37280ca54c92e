// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Value Objects with Validation Invariants
//!
//! Address arithmetic for the isolated network: carving per-zone subnets out
//! of the parent range, and the client IP allow-list that feeds the ingress
//! filtering policy.

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;
use thiserror::Error;

/// Narrowest subnet the provider will accept
pub const MAX_SUBNET_PREFIX: u8 = 28;

/// Widest network range the provider will accept
pub const MIN_NETWORK_PREFIX: u8 = 16;

/// Network validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Invalid CIDR notation: {0}")]
    InvalidCidr(String),

    #[error("Only IPv4 prefixes are supported: {0}")]
    NotIpv4(String),

    #[error("Host bits set in {0}; write the network address instead")]
    HostBitsSet(String),

    #[error("Network prefix /{0} out of range (must be /16 to /28)")]
    NetworkPrefixOutOfRange(u8),

    #[error("Subnet mask /{mask} does not fit under parent range {parent} (must be /{min} to /28)")]
    MaskDoesNotFit { mask: u8, parent: Ipv4Net, min: u8 },

    #[error("Address space of {parent} exhausted while carving {tier} subnet for zone {zone}")]
    AddressSpaceExhausted {
        parent: Ipv4Net,
        tier: SubnetTier,
        zone: u8,
    },

    #[error("Allow-list is empty; an empty allow-list with a default-deny policy makes the service unreachable")]
    EmptyAllowList,

    #[error("Allow-list contains {0} more than once")]
    DuplicatePrefix(Ipv4Net),
}

/// Subnet tier within the isolated network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubnetTier {
    /// Internet-reachable through the internet gateway
    Public,
    /// Egress-only, reachable outward through NAT
    Private,
}

impl fmt::Display for SubnetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubnetTier::Public => write!(f, "public"),
            SubnetTier::Private => write!(f, "private"),
        }
    }
}

/// Parse an IPv4 network range such as `10.0.0.0/16`
///
/// The address must be the network address of the range.
pub fn parse_ipv4_net(cidr: &str) -> Result<Ipv4Net, NetworkError> {
    let cidr = cidr.trim();
    if !cidr.contains('/') {
        return Err(NetworkError::InvalidCidr(cidr.to_string()));
    }
    match Ipv4Net::from_str(cidr) {
        Ok(net) if net != net.trunc() => Err(NetworkError::HostBitsSet(cidr.to_string())),
        Ok(net) => Ok(net),
        Err(_) if cidr.contains(':') => Err(NetworkError::NotIpv4(cidr.to_string())),
        Err(_) => Err(NetworkError::InvalidCidr(cidr.to_string())),
    }
}

/// Check that a tier mask carves strictly narrower ranges out of `parent`
pub fn validate_subnet_mask(parent: Ipv4Net, mask: u8) -> Result<(), NetworkError> {
    if mask <= parent.prefix_len() || mask > MAX_SUBNET_PREFIX {
        return Err(NetworkError::MaskDoesNotFit {
            mask,
            parent,
            min: parent.prefix_len() + 1,
        });
    }
    Ok(())
}

/// A subnet range assigned to one tier in one availability zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CarvedSubnet {
    pub tier: SubnetTier,
    pub zone: u8,
    pub cidr: Ipv4Net,
}

/// Carve per-zone subnets for each tier out of `parent`
///
/// Tiers are allocated in the given order, each tier replicated across
/// `zones` availability zones. Every block is aligned to its own size and
/// allocated after the previous one, so blocks never overlap.
pub fn carve_subnets(
    parent: Ipv4Net,
    tiers: &[(SubnetTier, u8)],
    zones: u8,
) -> Result<Vec<CarvedSubnet>, NetworkError> {
    let parent = parent.trunc();
    let mut cursor = u64::from(u32::from(parent.network()));
    let end = u64::from(u32::from(parent.broadcast())) + 1;
    let mut carved = Vec::with_capacity(tiers.len() * usize::from(zones));

    for &(tier, mask) in tiers {
        validate_subnet_mask(parent, mask)?;
        let size = 1u64 << (32 - u32::from(mask));

        for zone in 0..zones {
            let start = cursor.div_ceil(size) * size;
            if start + size > end {
                return Err(NetworkError::AddressSpaceExhausted { parent, tier, zone });
            }

            // start < 2^32 is guaranteed by the bound check above
            let cidr = Ipv4Net::new(Ipv4Addr::from(start as u32), mask)
                .map_err(|_| NetworkError::MaskDoesNotFit {
                    mask,
                    parent,
                    min: parent.prefix_len() + 1,
                })?;

            carved.push(CarvedSubnet { tier, zone, cidr });
            cursor = start + size;
        }
    }

    Ok(carved)
}

/// Ordered, non-empty, duplicate-free set of allowed client IPv4 prefixes
///
/// # Examples
///
/// ```rust
/// use cim_app_stack::domain::AllowList;
///
/// let allow = AllowList::parse(["203.0.113.0/24"]).unwrap();
/// assert!(allow.contains("203.0.113.7".parse().unwrap()));
/// assert!(!allow.contains("198.51.100.1".parse().unwrap()));
///
/// assert!(AllowList::parse(Vec::<String>::new()).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Ipv4Net>", into = "Vec<Ipv4Net>")]
pub struct AllowList(Vec<Ipv4Net>);

impl AllowList {
    pub fn new(prefixes: Vec<Ipv4Net>) -> Result<Self, NetworkError> {
        if prefixes.is_empty() {
            return Err(NetworkError::EmptyAllowList);
        }
        for (i, prefix) in prefixes.iter().enumerate() {
            if *prefix != prefix.trunc() {
                return Err(NetworkError::HostBitsSet(prefix.to_string()));
            }
            if prefixes[..i].contains(prefix) {
                return Err(NetworkError::DuplicatePrefix(*prefix));
            }
        }
        Ok(Self(prefixes))
    }

    /// Parse textual prefixes, preserving their order
    pub fn parse<I, S>(prefixes: I) -> Result<Self, NetworkError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed = prefixes
            .into_iter()
            .map(|p| parse_ipv4_net(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(parsed)
    }

    pub fn prefixes(&self) -> &[Ipv4Net] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether a client address falls inside any allowed prefix
    pub fn contains(&self, addr: IpAddr) -> bool {
        match addr {
            IpAddr::V4(v4) => self.0.iter().any(|net| net.contains(&v4)),
            IpAddr::V6(v6) => v6
                .to_ipv4_mapped()
                .map(|v4| self.0.iter().any(|net| net.contains(&v4)))
                .unwrap_or(false),
        }
    }

    /// Prefixes in the textual form handed to the firewall IP set
    pub fn to_strings(&self) -> Vec<String> {
        self.0.iter().map(|net| net.to_string()).collect()
    }
}

impl TryFrom<Vec<Ipv4Net>> for AllowList {
    type Error = NetworkError;

    fn try_from(value: Vec<Ipv4Net>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AllowList> for Vec<Ipv4Net> {
    fn from(value: AllowList) -> Self {
        value.0
    }
}
