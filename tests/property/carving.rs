// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Subnet Carving

use cim_app_stack::domain::{carve_subnets, SubnetTier};
use ipnet::Ipv4Net;
use proptest::prelude::*;
use std::net::Ipv4Addr;

/// A parent range /16../24 with two tier masks narrower than it
fn network_layout() -> impl Strategy<Value = (Ipv4Net, u8, u8, u8)> {
    (16u8..=24, any::<u32>(), 1u8..=4).prop_flat_map(|(prefix, addr, zones)| {
        let parent = Ipv4Net::new(Ipv4Addr::from(addr), prefix)
            .expect("prefix in range")
            .trunc();
        (
            Just(parent),
            (prefix + 1)..=28,
            (prefix + 1)..=28,
            Just(zones),
        )
    })
}

proptest! {
    /// Property: Carved subnets are strictly narrower than their parent
    /// and lie inside it
    #[test]
    fn prop_subnets_inside_parent((parent, public, private, zones) in network_layout()) {
        if let Ok(carved) = carve_subnets(
            parent,
            &[(SubnetTier::Public, public), (SubnetTier::Private, private)],
            zones,
        ) {
            for subnet in &carved {
                prop_assert!(subnet.cidr.prefix_len() > parent.prefix_len());
                prop_assert!(parent.contains(&subnet.cidr), "{} outside {}", subnet.cidr, parent);
            }
        }
    }

    /// Property: No two carved subnets overlap, across or within tiers
    #[test]
    fn prop_subnets_never_overlap((parent, public, private, zones) in network_layout()) {
        if let Ok(carved) = carve_subnets(
            parent,
            &[(SubnetTier::Public, public), (SubnetTier::Private, private)],
            zones,
        ) {
            for (i, a) in carved.iter().enumerate() {
                for b in &carved[i + 1..] {
                    prop_assert!(
                        !a.cidr.contains(&b.cidr) && !b.cidr.contains(&a.cidr),
                        "{} overlaps {}", a.cidr, b.cidr
                    );
                }
            }
        }
    }

    /// Property: Each tier gets exactly one subnet per zone with its own mask
    #[test]
    fn prop_one_subnet_per_zone_and_tier((parent, public, private, zones) in network_layout()) {
        if let Ok(carved) = carve_subnets(
            parent,
            &[(SubnetTier::Public, public), (SubnetTier::Private, private)],
            zones,
        ) {
            for (tier, mask) in [(SubnetTier::Public, public), (SubnetTier::Private, private)] {
                let of_tier: Vec<_> = carved.iter().filter(|s| s.tier == tier).collect();
                prop_assert_eq!(of_tier.len(), usize::from(zones));
                prop_assert!(of_tier.iter().all(|s| s.cidr.prefix_len() == mask));
                let zone_ids: Vec<u8> = of_tier.iter().map(|s| s.zone).collect();
                prop_assert_eq!(zone_ids, (0..zones).collect::<Vec<_>>());
            }
        }
    }

    /// Property: Carving succeeds whenever the blocks fit back to back
    #[test]
    fn prop_fitting_layout_is_accepted(prefix in 16u8..=22, zones in 1u8..=3) {
        let parent = Ipv4Net::new(Ipv4Addr::new(10, 0, 0, 0), prefix).expect("prefix in range");
        // Sixteen blocks of this size fit; at most six are needed
        let mask = prefix + 4;
        prop_assert!(carve_subnets(
            parent,
            &[(SubnetTier::Public, mask), (SubnetTier::Private, mask)],
            zones,
        )
        .is_ok());
    }

    /// Property: Masks not narrower than the parent are always rejected
    #[test]
    fn prop_wide_masks_rejected(prefix in 16u8..=24, delta in 0u8..=8) {
        let parent = Ipv4Net::new(Ipv4Addr::new(10, 0, 0, 0), prefix).expect("prefix in range");
        let mask = prefix.saturating_sub(delta);
        prop_assert!(carve_subnets(parent, &[(SubnetTier::Public, mask)], 1).is_err());
    }
}
