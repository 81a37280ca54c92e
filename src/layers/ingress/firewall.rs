// Copyright (c) 2025 - Cowboy AI, Inc.
//! Request filtering: the IP allow-list and the web ACL that gates the
//! load balancer on it.
//!
//! The filtering policy is evaluated before any authentication and knows
//! nothing about identity. Its default action is always to block; the only
//! rule allows sources inside the allow-list.

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::domain::{AllowList, ResourceKind};
use crate::graph::{AttrRef, GraphError, ResourceGraph, ResourceId};

/// Priority of the single allow rule
pub const ALLOW_RULE_PRIORITY: u32 = 1;

/// Name of the single allow rule
pub const ALLOW_RULE_NAME: &str = "AllowListedSources";

/// What the web ACL does with a matching request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterAction {
    Allow,
    Block,
}

/// Where the web ACL can be attached; regional covers load balancers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterScope {
    Regional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IpAddressVersion {
    Ipv4,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpSetProps {
    pub name: String,
    pub scope: FilterScope,
    pub ip_address_version: IpAddressVersion,
    pub addresses: Vec<Ipv4Net>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityConfig {
    pub metric_name: String,
    pub cloud_watch_metrics_enabled: bool,
    pub sampled_requests_enabled: bool,
}

impl VisibilityConfig {
    fn enabled(metric_name: impl Into<String>) -> Self {
        Self {
            metric_name: metric_name.into(),
            cloud_watch_metrics_enabled: true,
            sampled_requests_enabled: true,
        }
    }
}

/// Match condition of a web ACL rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleStatement {
    IpSetReference { arn: AttrRef },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebAclRule {
    pub name: String,
    pub priority: u32,
    pub action: FilterAction,
    pub statement: RuleStatement,
    pub visibility: VisibilityConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebAclProps {
    pub name: String,
    pub scope: FilterScope,
    pub default_action: FilterAction,
    pub rules: Vec<WebAclRule>,
    pub visibility: VisibilityConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebAclAssociationProps {
    pub resource_arn: AttrRef,
    pub web_acl_arn: AttrRef,
}

/// One resolved rule of a [`FilteringPolicy`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRule {
    pub name: String,
    pub priority: u32,
    pub action: FilterAction,
    pub sources: AllowList,
}

/// The declared web ACL with its IP set resolved, for local evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilteringPolicy {
    pub default_action: FilterAction,
    pub rules: Vec<PolicyRule>,
}

impl FilteringPolicy {
    /// Default-deny with a single rule admitting the allow-list
    pub fn allow_only(sources: AllowList) -> Self {
        Self {
            default_action: FilterAction::Block,
            rules: vec![PolicyRule {
                name: ALLOW_RULE_NAME.to_string(),
                priority: ALLOW_RULE_PRIORITY,
                action: FilterAction::Allow,
                sources,
            }],
        }
    }

    /// First matching rule by priority decides, otherwise the default action
    pub fn evaluate(&self, source: IpAddr) -> FilterAction {
        let mut rules: Vec<&PolicyRule> = self.rules.iter().collect();
        rules.sort_by_key(|r| r.priority);
        rules
            .into_iter()
            .find(|r| r.sources.contains(source))
            .map(|r| r.action)
            .unwrap_or(self.default_action)
    }
}

/// Declared filtering resources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Firewall {
    pub ip_set: ResourceId,
    pub web_acl: ResourceId,
    pub policy: FilteringPolicy,
}

/// Declare the IP set and the web ACL referencing it
pub fn declare_firewall(
    name: &str,
    allowed: &AllowList,
    scope: &ResourceId,
    graph: &mut ResourceGraph,
) -> Result<Firewall, GraphError> {
    let ip_set = graph.declare(
        scope.child("AllowedIpSet"),
        ResourceKind::IpSet,
        &IpSetProps {
            name: format!("{name}-allowed-ips"),
            scope: FilterScope::Regional,
            ip_address_version: IpAddressVersion::Ipv4,
            addresses: allowed.prefixes().to_vec(),
        },
    )?;

    let web_acl = graph.declare(
        scope.child("WebAcl"),
        ResourceKind::WebAcl,
        &WebAclProps {
            name: format!("{name}-web-acl"),
            scope: FilterScope::Regional,
            default_action: FilterAction::Block,
            rules: vec![WebAclRule {
                name: ALLOW_RULE_NAME.to_string(),
                priority: ALLOW_RULE_PRIORITY,
                action: FilterAction::Allow,
                statement: RuleStatement::IpSetReference {
                    arn: AttrRef::arn(&ip_set),
                },
                visibility: VisibilityConfig::enabled(format!("{name}-allowed-ips")),
            }],
            visibility: VisibilityConfig::enabled(format!("{name}-web-acl")),
        },
    )?;

    Ok(Firewall {
        ip_set,
        web_acl,
        policy: FilteringPolicy::allow_only(allowed.clone()),
    })
}

/// Attach the web ACL to a load balancer
pub fn associate(
    firewall: &Firewall,
    load_balancer: &ResourceId,
    scope: &ResourceId,
    graph: &mut ResourceGraph,
) -> Result<ResourceId, GraphError> {
    graph.declare(
        scope.child("WebAclAssociation"),
        ResourceKind::WebAclAssociation,
        &WebAclAssociationProps {
            resource_arn: AttrRef::arn(load_balancer),
            web_acl_arn: AttrRef::arn(&firewall.web_acl),
        },
    )
}
