// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-app-stack
//!
//! Deterministic configuration and manifest data shared by the integration
//! tests. Manifests built here carry fixed ids and timestamps instead of
//! `Uuid::now_v7()` / `Utc::now()`.
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use cim_app_stack::{ComposedStack, RawStackConfig, StackComposer, StackConfig, StackManifest};

// Fixed test UUID (UUID v7 format, but deterministic for testing)
pub const MANIFEST_ID_1: &str = "01934f4a-0001-7000-8000-000000000001";

// Fixed test timestamp (2026-01-19T12:00:00Z)
pub const FIXED_TIMESTAMP: &str = "2026-01-19T12:00:00Z";

/// The reference deployment: two zones, one NAT, one allowed prefix
pub const SCENARIO_YAML: &str = r#"
name: image-reader
cidr: 10.0.0.0/16
publicMask: 24
privateMask: 24
maxAzs: 2
natGateways: 1
domain: example.com
host: app
zoneId: Z123
allowedIps:
  - 203.0.113.0/24
"#;

pub fn parse_uuid(s: &str) -> Uuid {
    Uuid::parse_str(s).expect("Invalid UUID in test fixture")
}

pub fn fixed_timestamp() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(FIXED_TIMESTAMP)
        .expect("Invalid timestamp in test fixture")
        .with_timezone(&Utc)
}

/// Raw configuration of the reference deployment
pub fn scenario_raw() -> RawStackConfig {
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

pub fn scenario_config() -> StackConfig {
    scenario_raw().validate().expect("Invalid scenario config")
}

pub fn compose(config: StackConfig) -> ComposedStack {
    StackComposer::new(config).compose().expect("Composition failed")
}

pub fn scenario_stack() -> ComposedStack {
    compose(scenario_config())
}

/// Manifest of a stack with fixed identity and time
pub fn fixed_manifest(stack: &ComposedStack) -> StackManifest {
    StackManifest {
        manifest_id: parse_uuid(MANIFEST_ID_1),
        created_at: fixed_timestamp(),
        ..StackManifest::from_stack(stack)
    }
}
