// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Stack Composition
//!
//! For any valid configuration, composition is deterministic, the layers
//! run in their fixed order and every dependency precedes its dependent.

use cim_app_stack::domain::ResourceKind;
use cim_app_stack::layers::LayerKind;
use cim_app_stack::RawStackConfig;
use proptest::prelude::*;

use crate::fixtures::{compose, scenario_raw};

/// Valid configurations around the reference deployment
fn stack_config() -> impl Strategy<Value = RawStackConfig> {
    (1u8..=3, 20u8..=26, 20u8..=26, "[a-z][a-z0-9-]{0,10}[a-z0-9]")
        .prop_flat_map(|(zones, public, private, name)| {
            (Just(zones), 0..=zones, Just(public), Just(private), Just(name))
        })
        .prop_map(|(zones, nat, public, private, name)| RawStackConfig {
            name,
            max_azs: zones,
            nat_gateways: nat,
            public_cidr_mask: public,
            private_cidr_mask: private,
            ..scenario_raw()
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: Composing the same configuration twice yields the same graph
    #[test]
    fn prop_composition_is_deterministic(raw in stack_config()) {
        let config = raw.validate().expect("generated config is valid");
        let first = compose(config.clone());
        let second = compose(config);

        prop_assert_eq!(first.graph, second.graph);
        prop_assert_eq!(first.tags, second.tags);
    }

    /// Property: Layers always run network, storage, compute, ingress
    #[test]
    fn prop_layers_in_fixed_order(raw in stack_config()) {
        let stack = compose(raw.validate().expect("valid"));
        prop_assert_eq!(stack.layers, LayerKind::ORDER.to_vec());
    }

    /// Property: Every dependency is declared before its dependent
    #[test]
    fn prop_dependencies_precede_dependents(raw in stack_config()) {
        let stack = compose(raw.validate().expect("valid"));
        prop_assert!(stack.graph.verify_order().is_ok());

        for resource in stack.graph.iter() {
            let at = stack.graph.position(&resource.id).expect("declared");
            for dependency in &resource.depends_on {
                let before = stack.graph.position(dependency).expect("dependency declared");
                prop_assert!(before < at, "{} does not precede {}", dependency, resource.id);
            }
        }
    }

    /// Property: Zone and NAT counts show up one-for-one in the graph
    #[test]
    fn prop_counts_follow_config(raw in stack_config()) {
        let zones = usize::from(raw.max_azs);
        let nat = usize::from(raw.nat_gateways);
        let stack = compose(raw.validate().expect("valid"));

        prop_assert_eq!(stack.graph.count(ResourceKind::Subnet), 2 * zones);
        prop_assert_eq!(stack.graph.count(ResourceKind::NatGateway), nat);
        prop_assert_eq!(stack.graph.count(ResourceKind::MountTarget), zones);
    }

    /// Property: Every created resource carries the application tag
    #[test]
    fn prop_created_resources_tagged(raw in stack_config()) {
        let name = raw.name.clone();
        let stack = compose(raw.validate().expect("valid"));

        for resource in stack.graph.iter().filter(|r| !r.imported) {
            prop_assert_eq!(
                resource.tags.get("Application").map(String::as_str),
                Some(name.as_str()),
                "{} untagged", resource.id
            );
        }
    }
}
