// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stack Configuration
//!
//! A YAML file yields a [`RawStackConfig`]; [`RawStackConfig::validate`]
//! turns it into a fully-required [`StackConfig`] or reports the first
//! violated rule. Nothing is declared until this step has succeeded.
//!
//! ```yaml
//! name: image-reader
//! cidr: 10.0.0.0/16
//! publicCidrMask: 24
//! privateCidrMask: 24
//! maxAzs: 2
//! natGateways: 1
//! domain: example.com
//! host: app
//! zoneId: Z123
//! allowedIps:
//!   - 203.0.113.0/24
//! ```

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::invariants::{
    validate_canonical_name, validate_nat_gateways, validate_network_cidr, validate_stack_name,
    validate_zone_count, validate_zone_id,
};
use crate::domain::{
    carve_subnets, parse_ipv4_net, AllowList, DnsLabel, Hostname, SubnetTier, ValidationError,
};

/// Environment variable naming the configuration file
pub const CONFIG_FILE_ENV: &str = "APP_STACK_CONFIG_FILE";

/// Configuration file used when the environment does not name one
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file {} is missing.", .0.display())]
    Missing(PathBuf),

    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed configuration: {0}")]
    Malformed(String),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ValidationError),
}

/// Resolve the configuration file location from the environment
pub fn config_path_from_env() -> PathBuf {
    std::env::var_os(CONFIG_FILE_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Configuration as written in the file, before validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStackConfig {
    pub name: String,
    pub cidr: String,
    #[serde(alias = "publicMask")]
    pub public_cidr_mask: u8,
    #[serde(alias = "privateMask")]
    pub private_cidr_mask: u8,
    pub max_azs: u8,
    pub nat_gateways: u8,
    pub domain: String,
    pub host: String,
    pub zone_id: String,
    pub allowed_ips: Vec<String>,
}

impl RawStackConfig {
    /// Check every configuration rule and produce the validated record
    pub fn validate(self) -> Result<StackConfig, ValidationError> {
        validate_stack_name(&self.name)?;

        let cidr = parse_ipv4_net(&self.cidr).map_err(|e| ValidationError::network("cidr", e))?;
        validate_network_cidr(cidr)?;
        validate_zone_count(self.max_azs)?;
        validate_nat_gateways(self.nat_gateways, self.max_azs)?;

        // Both tiers have to fit side by side in the parent range
        carve_subnets(
            cidr,
            &[
                (SubnetTier::Public, self.public_cidr_mask),
                (SubnetTier::Private, self.private_cidr_mask),
            ],
            self.max_azs,
        )
        .map_err(|e| ValidationError::network("subnet masks", e))?;

        if self.nat_gateways == 0 {
            warn!("natGateways is 0: private subnets will have no egress route");
        }

        let domain = Hostname::new(&self.domain).map_err(|e| ValidationError::dns("domain", e))?;
        validate_canonical_name("domain", &self.domain, domain.as_str())?;
        let host = DnsLabel::new(&self.host).map_err(|e| ValidationError::dns("host", e))?;
        validate_canonical_name("host", &self.host, host.as_str())?;
        domain
            .with_label(&host)
            .map_err(|e| ValidationError::dns("host.domain", e))?;

        validate_zone_id(&self.zone_id)?;

        let allowed_ips = AllowList::parse(&self.allowed_ips)
            .map_err(|e| ValidationError::network("allowedIps", e))?;

        Ok(StackConfig {
            name: self.name,
            cidr,
            public_cidr_mask: self.public_cidr_mask,
            private_cidr_mask: self.private_cidr_mask,
            max_azs: self.max_azs,
            nat_gateways: self.nat_gateways,
            domain,
            host,
            zone_id: self.zone_id,
            allowed_ips,
        })
    }
}

/// Validated, fully-required stack configuration
///
/// Only constructible through [`RawStackConfig::validate`], so holding one
/// means every configuration rule has been checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StackConfig {
    name: String,
    cidr: Ipv4Net,
    public_cidr_mask: u8,
    private_cidr_mask: u8,
    max_azs: u8,
    nat_gateways: u8,
    domain: Hostname,
    host: DnsLabel,
    zone_id: String,
    allowed_ips: AllowList,
}

impl StackConfig {
    /// Load and validate a YAML configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::Missing(path.to_path_buf()));
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Config file {} is found.", path.display());

        Self::from_yaml_str(&contents)
    }

    /// Parse and validate YAML configuration text
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let raw: RawStackConfig =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        Ok(raw.validate()?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cidr(&self) -> Ipv4Net {
        self.cidr
    }

    pub fn public_cidr_mask(&self) -> u8 {
        self.public_cidr_mask
    }

    pub fn private_cidr_mask(&self) -> u8 {
        self.private_cidr_mask
    }

    pub fn max_azs(&self) -> u8 {
        self.max_azs
    }

    pub fn nat_gateways(&self) -> u8 {
        self.nat_gateways
    }

    pub fn domain(&self) -> &Hostname {
        &self.domain
    }

    pub fn host(&self) -> &DnsLabel {
        &self.host
    }

    pub fn zone_id(&self) -> &str {
        &self.zone_id
    }

    pub fn allowed_ips(&self) -> &AllowList {
        &self.allowed_ips
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawStackConfig {
        RawStackConfig {
            name: "image-reader".to_string(),
            cidr: "10.0.0.0/16".to_string(),
            public_cidr_mask: 24,
            private_cidr_mask: 24,
            max_azs: 2,
            nat_gateways: 1,
            domain: "example.com".to_string(),
            host: "app".to_string(),
            zone_id: "Z123".to_string(),
            allowed_ips: vec!["203.0.113.0/24".to_string()],
        }
    }

    #[test]
    fn test_valid_config() {
        let config = raw().validate().unwrap();
        assert_eq!(config.name(), "image-reader");
        assert_eq!(config.cidr().to_string(), "10.0.0.0/16");
        assert_eq!(config.domain().as_str(), "example.com");
        assert_eq!(config.host().as_str(), "app");
        assert_eq!(config.allowed_ips().to_strings(), vec!["203.0.113.0/24"]);
    }

    #[test]
    fn test_empty_allow_list_rejected() {
        let mut raw = raw();
        raw.allowed_ips.clear();
        assert!(matches!(
            raw.validate(),
            Err(ValidationError::Network { field: "allowedIps", .. })
        ));
    }

    #[test]
    fn test_mask_wider_than_parent_rejected() {
        let mut raw = raw();
        raw.public_cidr_mask = 16;
        assert!(matches!(
            raw.validate(),
            Err(ValidationError::Network { field: "subnet masks", .. })
        ));
    }

    #[test]
    fn test_mixed_case_names_rejected() {
        let mut raw = raw();
        raw.host = "App".to_string();
        assert!(matches!(
            raw.validate(),
            Err(ValidationError::NonCanonicalName { field: "host", .. })
        ));

        let mut raw = self::raw();
        raw.domain = "Example.com".to_string();
        assert!(matches!(
            raw.validate(),
            Err(ValidationError::NonCanonicalName { field: "domain", .. })
        ));
    }

    #[test]
    fn test_too_many_nat_gateways_rejected() {
        let mut raw = raw();
        raw.nat_gateways = 3;
        assert_eq!(
            raw.validate(),
            Err(ValidationError::NatGateways { nat: 3, zones: 2 })
        );
    }

    #[test]
    fn test_yaml_accepts_short_mask_aliases() {
        let yaml = r#"
name: image-reader
cidr: 10.0.0.0/16
publicMask: 24
privateMask: 25
maxAzs: 2
natGateways: 1
domain: example.com
host: app
zoneId: Z123
allowedIps: ["203.0.113.0/24"]
"#;
        let config = StackConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.public_cidr_mask(), 24);
        assert_eq!(config.private_cidr_mask(), 25);
    }

    #[test]
    fn test_yaml_missing_field_is_malformed() {
        let yaml = "name: image-reader\ncidr: 10.0.0.0/16\n";
        assert!(matches!(
            StackConfig::from_yaml_str(yaml),
            Err(ConfigError::Malformed(_))
        ));
    }
}
