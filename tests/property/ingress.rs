// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for the Ingress Path
//!
//! Derived URLs and the filtering policy's shape hold for every legal
//! host/domain pair and every non-empty allow-list.

use cim_app_stack::domain::{AllowList, DnsLabel, Hostname, ValidationError};
use cim_app_stack::layers::ingress::firewall::{FilterAction, FilteringPolicy};
use cim_app_stack::layers::ingress::identity::{callback_url, logout_url};
use cim_app_stack::{ClientRequest, IngressGate, RawStackConfig, RequestState};
use ipnet::Ipv4Net;
use proptest::prelude::*;
use std::net::{IpAddr, Ipv4Addr};

use crate::fixtures::{compose, scenario_raw};

/// Legal DNS labels in any letter case
fn dns_label() -> impl Strategy<Value = String> {
    "[a-zA-Z]([a-zA-Z0-9-]{0,20}[a-zA-Z0-9])?"
}

fn domain() -> impl Strategy<Value = String> {
    (prop::collection::vec(dns_label(), 1..3), "[a-zA-Z]{2,6}")
        .prop_map(|(labels, tld)| format!("{}.{}", labels.join("."), tld))
}

fn is_lowercase(name: &str) -> bool {
    !name.chars().any(|c| c.is_ascii_uppercase())
}

fn allow_list() -> impl Strategy<Value = Vec<Ipv4Net>> {
    prop::collection::btree_set((any::<u32>(), 8u8..=32), 1..6).prop_map(|set| {
        let mut prefixes: Vec<Ipv4Net> = Vec::new();
        for (addr, prefix) in set {
            let net = Ipv4Net::new(Ipv4Addr::from(addr), prefix)
                .expect("prefix in range")
                .trunc();
            if !prefixes.contains(&net) {
                prefixes.push(net);
            }
        }
        prefixes
    })
}

proptest! {
    /// Property: Every accepted host/domain pair yields URLs built from the
    /// strings exactly as written; any other casing is refused up front
    #[test]
    fn prop_urls_use_host_and_domain_as_written(host in dns_label(), domain in domain()) {
        let raw = RawStackConfig {
            host: host.clone(),
            domain: domain.clone(),
            ..scenario_raw()
        };

        match raw.validate() {
            Ok(config) => {
                prop_assert!(is_lowercase(&host) && is_lowercase(&domain));
                let stack = compose(config);
                prop_assert_eq!(
                    &stack.ingress.callback_url,
                    &format!("https://{host}.{domain}/oauth2/idpresponse")
                );
                prop_assert_eq!(
                    &stack.ingress.logout_url,
                    &format!("https://{host}.{domain}/logout")
                );
            }
            Err(err) => {
                prop_assert!(!(is_lowercase(&host) && is_lowercase(&domain)), "{}", err);
                let is_non_canonical = matches!(err, ValidationError::NonCanonicalName { .. });
                prop_assert!(is_non_canonical, "{}", err);
            }
        }
    }

    /// Property: URL derivation from a canonical name is plain interpolation
    #[test]
    fn prop_urls_derived_from_fqdn(host in dns_label(), domain in domain()) {
        let domain = Hostname::new(domain.to_ascii_lowercase()).expect("generated domain is valid");
        let host = DnsLabel::new(host.to_ascii_lowercase()).expect("generated label is valid");
        let fqdn = domain.with_label(&host).expect("short enough");

        prop_assert_eq!(
            callback_url(&fqdn),
            format!("https://{}.{}/oauth2/idpresponse", host.as_str(), domain.as_str())
        );
        prop_assert_eq!(
            logout_url(&fqdn),
            format!("https://{}.{}/logout", host.as_str(), domain.as_str())
        );
    }

    /// Property: The filtering policy blocks by default and has exactly one
    /// allow rule over the whole allow-list
    #[test]
    fn prop_policy_default_block_single_allow(prefixes in allow_list()) {
        let allowed = AllowList::new(prefixes.clone()).expect("non-empty, unique");
        let policy = FilteringPolicy::allow_only(allowed);

        prop_assert_eq!(policy.default_action, FilterAction::Block);
        prop_assert_eq!(policy.rules.len(), 1);
        prop_assert_eq!(policy.rules[0].action, FilterAction::Allow);
        prop_assert_eq!(policy.rules[0].sources.prefixes(), prefixes.as_slice());
    }

    /// Property: A source is allowed exactly when some prefix contains it
    #[test]
    fn prop_policy_matches_allow_list(prefixes in allow_list(), source in any::<u32>()) {
        let source = Ipv4Addr::from(source);
        let policy = FilteringPolicy::allow_only(AllowList::new(prefixes.clone()).expect("valid"));

        let expected = if prefixes.iter().any(|p| p.contains(&source)) {
            FilterAction::Allow
        } else {
            FilterAction::Block
        };
        prop_assert_eq!(policy.evaluate(IpAddr::V4(source)), expected);
    }

    /// Property: No request reaches the backend without a session, and no
    /// blocked source ever reaches authentication
    #[test]
    fn prop_forward_requires_allow_and_session(source in any::<u32>(), session in any::<bool>()) {
        let stack = compose(scenario_raw().validate().expect("valid"));
        let gate = IngressGate::from_ingress(&stack.ingress);
        let source = IpAddr::V4(Ipv4Addr::from(source));

        let state = gate.evaluate(&ClientRequest { source, session }).expect("settles");
        let allowed = stack.ingress.policy.evaluate(source) == FilterAction::Allow;

        match (allowed, session) {
            (false, _) => prop_assert_eq!(state, RequestState::Blocked),
            (true, false) => prop_assert_eq!(state, RequestState::RedirectToLogin),
            (true, true) => prop_assert_eq!(state, RequestState::Forwarded),
        }
    }
}
