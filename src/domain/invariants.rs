// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Validation Functions - Stack Configuration Invariants
//!
//! Every rule a stack configuration must satisfy before any layer is
//! declared. All functions are pure (no side effects) and return detailed
//! validation results.
//!
//! # Invariant Categories
//!
//! 1. **Naming**: physical-name prefixes, canonical DNS names, hosted zone ids
//! 2. **Addressing**: network range, subnet masks, zone and NAT counts
//! 3. **Storage**: access point path scoping

use ipnet::Ipv4Net;

use super::hostname::HostnameError;
use super::network::{NetworkError, MIN_NETWORK_PREFIX, MAX_SUBNET_PREFIX};

/// Validation result with detailed error information
pub type ValidationResult = Result<(), ValidationError>;

/// Maximum length of the stack name prefix
pub const MAX_NAME_LENGTH: usize = 32;

/// Validation error with context
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Stack name unusable as a physical-name prefix
    #[error("Invalid stack name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// Address arithmetic failed
    #[error("Invalid {field}: {source}")]
    Network {
        field: &'static str,
        #[source]
        source: NetworkError,
    },

    /// DNS name or label failed validation
    #[error("Invalid {field}: {source}")]
    Dns {
        field: &'static str,
        #[source]
        source: HostnameError,
    },

    /// Zone count below one
    #[error("maxAzs must be at least 1, got {0}")]
    ZoneCount(u8),

    /// More NAT gateways than zones to place them in
    #[error("natGateways ({nat}) cannot exceed maxAzs ({zones})")]
    NatGateways { nat: u8, zones: u8 },

    /// DNS name not written in its canonical form
    #[error("Invalid {field} {written:?}: write it as {canonical:?}")]
    NonCanonicalName {
        field: &'static str,
        written: String,
        canonical: String,
    },

    /// Hosted zone id malformed
    #[error("Invalid zoneId {0:?}: must be non-empty uppercase alphanumeric")]
    InvalidZoneId(String),

    /// Access point path not an absolute, normalized, non-root path
    #[error("Invalid access point path {0:?}: must be absolute, normalized and below the filesystem root")]
    InvalidAccessPointPath(String),
}

impl ValidationError {
    pub fn network(field: &'static str, source: NetworkError) -> Self {
        Self::Network { field, source }
    }

    pub fn dns(field: &'static str, source: HostnameError) -> Self {
        Self::Dns { field, source }
    }
}

/// Validate the stack name used to prefix physical resource names
///
/// # Rules
/// - 1 to 32 characters
/// - Lowercase ASCII letters, digits and hyphens
/// - No leading or trailing hyphen
pub fn validate_stack_name(name: &str) -> ValidationResult {
    let invalid = |reason: &str| ValidationError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(invalid("must be at most 32 characters"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(invalid("only lowercase letters, digits and hyphens are allowed"));
    }
    if name.starts_with('-') || name.ends_with('-') {
        return Err(invalid("must not start or end with a hyphen"));
    }
    Ok(())
}

/// Validate the parent network range
///
/// # Rules
/// - Prefix between /16 and /28
pub fn validate_network_cidr(cidr: Ipv4Net) -> ValidationResult {
    let prefix = cidr.prefix_len();
    if !(MIN_NETWORK_PREFIX..=MAX_SUBNET_PREFIX).contains(&prefix) {
        return Err(ValidationError::network(
            "cidr",
            NetworkError::NetworkPrefixOutOfRange(prefix),
        ));
    }
    Ok(())
}

/// Validate zone count
pub fn validate_zone_count(zones: u8) -> ValidationResult {
    if zones == 0 {
        return Err(ValidationError::ZoneCount(zones));
    }
    Ok(())
}

/// Validate NAT gateway count against zone count
///
/// # Rules
/// - Zero is allowed (private tier without egress)
/// - At most one gateway per zone
pub fn validate_nat_gateways(nat: u8, zones: u8) -> ValidationResult {
    if nat > zones {
        return Err(ValidationError::NatGateways { nat, zones });
    }
    Ok(())
}

/// Require a DNS name to be written exactly as its canonical form
///
/// URLs and records are built from the validated value; a name that only
/// validates after lowercasing or dropping a trailing dot is rejected.
pub fn validate_canonical_name(
    field: &'static str,
    written: &str,
    canonical: &str,
) -> ValidationResult {
    if written != canonical {
        return Err(ValidationError::NonCanonicalName {
            field,
            written: written.to_string(),
            canonical: canonical.to_string(),
        });
    }
    Ok(())
}

/// Validate hosted zone identifier
pub fn validate_zone_id(zone_id: &str) -> ValidationResult {
    if zone_id.is_empty()
        || !zone_id
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    {
        return Err(ValidationError::InvalidZoneId(zone_id.to_string()));
    }
    Ok(())
}

/// Validate the single path an access point exposes
///
/// # Rules
/// - Absolute
/// - Not the filesystem root
/// - No empty, `.` or `..` segments
pub fn validate_access_point_path(path: &str) -> ValidationResult {
    let invalid = || ValidationError::InvalidAccessPointPath(path.to_string());

    let rest = path.strip_prefix('/').ok_or_else(invalid)?;
    if rest.is_empty() {
        return Err(invalid());
    }
    if rest
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(invalid());
    }
    Ok(())
}
