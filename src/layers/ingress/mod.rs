// Copyright (c) 2025 - Cowboy AI, Inc.
//! Ingress Layer
//!
//! The authenticated, filtered, TLS-terminated public entry point in front
//! of the compute service. It is the terminal layer: nothing is declared
//! after it.
//!
//! # Construction order
//!
//! ```text
//!  1. IpSet ─────────────┐
//!  2. WebAcl (block, allow IpSet)
//!  3. UserPool ── Domain ── Client (callback / logout URLs)
//!  4. LB SecurityGroup ── LoadBalancer
//!  5. WebAclAssociation (WebAcl -> LoadBalancer)
//!  6. Certificate ({host}.{domain}, DNS validated)
//!  7. TargetGroup (compute service, liveness check)
//!  8. HttpsListener: authenticate(3) then forward(7), cert(6)
//!  9. HostedZone (imported) ── CnameRecord -> LoadBalancer
//! ```
//!
//! Each step only references resources from earlier steps. Requests pass
//! two gates in series: the web ACL's allow-list, then the listener's
//! authentication. The load balancer's own traffic-control group is open
//! on 443.

pub mod firewall;
pub mod identity;
pub mod listener;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{AllowList, DnsLabel, Hostname};
use crate::errors::StackResult;
use crate::graph::{ResourceGraph, ResourceId};

use super::compute::ComputeHandle;
use super::network::NetworkHandle;
use super::LayerKind;

pub use firewall::{FilterAction, FilteringPolicy};
pub use listener::{ListenerAction, LISTENER_PORT, LIVENESS_PATH};

/// Input to the ingress layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressSpec {
    pub name: String,
    pub domain: Hostname,
    pub host: DnsLabel,
    pub zone_id: String,
    pub allowed_ips: AllowList,
}

impl IngressSpec {
    /// `{host}.{domain}`
    pub fn fqdn(&self) -> StackResult<Hostname> {
        Ok(self.domain.with_label(&self.host)?)
    }
}

/// Everything the ingress layer declared, plus the derived values callers
/// need to reason about the request path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngressDeclaration {
    pub ip_set: ResourceId,
    pub web_acl: ResourceId,
    pub user_pool: ResourceId,
    pub user_pool_domain: ResourceId,
    pub user_pool_client: ResourceId,
    pub load_balancer_security_group: ResourceId,
    pub load_balancer: ResourceId,
    pub web_acl_association: ResourceId,
    pub certificate: ResourceId,
    pub target_group: ResourceId,
    pub listener: ResourceId,
    pub hosted_zone: ResourceId,
    pub dns_record: ResourceId,
    pub policy: FilteringPolicy,
    /// The listener's default action
    pub default_action: ListenerAction,
    pub fqdn: Hostname,
    pub callback_url: String,
    pub logout_url: String,
    pub listener_port: u16,
}

impl IngressDeclaration {
    /// Public endpoint, `https://{host}.{domain}`
    pub fn endpoint(&self) -> String {
        format!("https://{}", self.fqdn)
    }

    /// Ids in declaration order
    pub fn resources(&self) -> [&ResourceId; 13] {
        [
            &self.ip_set,
            &self.web_acl,
            &self.user_pool,
            &self.user_pool_domain,
            &self.user_pool_client,
            &self.load_balancer_security_group,
            &self.load_balancer,
            &self.web_acl_association,
            &self.certificate,
            &self.target_group,
            &self.listener,
            &self.hosted_zone,
            &self.dns_record,
        ]
    }
}

/// Declares the authenticated ingress path
pub struct IngressLayer;

impl IngressLayer {
    pub fn declare(
        spec: &IngressSpec,
        network: &NetworkHandle,
        compute: &ComputeHandle,
        graph: &mut ResourceGraph,
    ) -> StackResult<IngressDeclaration> {
        let fqdn = spec.fqdn()?;
        let scope = ResourceId::new(LayerKind::Ingress.scope());

        let firewall = firewall::declare_firewall(&spec.name, &spec.allowed_ips, &scope, graph)?;
        let identity = identity::declare_identity(&spec.name, &fqdn, &scope, graph)?;
        let (lb_security_group, load_balancer) =
            listener::declare_load_balancer(network, &scope, graph)?;
        let association = firewall::associate(&firewall, &load_balancer, &scope, graph)?;
        let certificate = listener::declare_certificate(&fqdn, &scope, graph)?;
        let target_group = listener::declare_target_group(network, compute, &scope, graph)?;
        let default_action = listener::authenticate_then_forward(&identity, &target_group);
        let https_listener = listener::declare_listener(
            &load_balancer,
            &certificate,
            &default_action,
            &scope,
            graph,
        )?;
        let (hosted_zone, dns_record) = listener::declare_dns_record(
            &spec.domain,
            &spec.zone_id,
            spec.host.as_str(),
            &load_balancer,
            &scope,
            graph,
        )?;

        info!(
            endpoint = %fqdn,
            allowed_prefixes = spec.allowed_ips.len(),
            "declared ingress layer"
        );

        Ok(IngressDeclaration {
            ip_set: firewall.ip_set,
            web_acl: firewall.web_acl,
            user_pool: identity.user_pool,
            user_pool_domain: identity.domain,
            user_pool_client: identity.client,
            load_balancer_security_group: lb_security_group,
            load_balancer,
            web_acl_association: association,
            certificate,
            target_group,
            listener: https_listener,
            hosted_zone,
            dns_record,
            policy: firewall.policy,
            default_action,
            fqdn,
            callback_url: identity.callback_url,
            logout_url: identity.logout_url,
            listener_port: LISTENER_PORT,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ResourceKind;
    use crate::errors::StackError;
    use crate::graph::GraphError;
    use crate::layers::compute::{ComputeLayer, ComputeSpec};
    use crate::layers::network::{NetworkLayer, NetworkSpec};
    use crate::layers::storage::{StorageHandle, StorageLayer, StorageSpec};

    fn network_and_storage(graph: &mut ResourceGraph) -> (NetworkHandle, StorageHandle) {
        let network = NetworkLayer::declare(
            &NetworkSpec {
                name: "image-reader-vpc".to_string(),
                cidr: "10.0.0.0/16".parse().unwrap(),
                public_mask: 24,
                private_mask: 24,
                zones: 2,
                nat_gateways: 1,
            },
            graph,
        )
        .unwrap();
        let storage = StorageLayer::declare(
            &StorageSpec {
                name: "image-reader-efs".to_string(),
                access_point_path: "/app-data".to_string(),
            },
            &network,
            graph,
        )
        .unwrap();
        (network, storage)
    }

    fn upstream(graph: &mut ResourceGraph) -> (NetworkHandle, ComputeHandle) {
        let (network, storage) = network_and_storage(graph);
        let compute =
            ComputeLayer::declare(&ComputeSpec::standard("image-reader"), &network, &storage, graph)
                .unwrap();
        (network, compute)
    }

    fn spec() -> IngressSpec {
        IngressSpec {
            name: "image-reader".to_string(),
            domain: Hostname::new("example.com").unwrap(),
            host: DnsLabel::new("app").unwrap(),
            zone_id: "Z123".to_string(),
            allowed_ips: AllowList::parse(["203.0.113.0/24"]).unwrap(),
        }
    }

    #[test]
    fn test_declaration_order() {
        let mut graph = ResourceGraph::new();
        let (network, compute) = upstream(&mut graph);
        let ingress = IngressLayer::declare(&spec(), &network, &compute, &mut graph).unwrap();

        let positions: Vec<usize> = ingress
            .resources()
            .iter()
            .map(|id| graph.position(id).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(graph.verify_order().is_ok());
    }

    #[test]
    fn test_derived_values() {
        let mut graph = ResourceGraph::new();
        let (network, compute) = upstream(&mut graph);
        let ingress = IngressLayer::declare(&spec(), &network, &compute, &mut graph).unwrap();

        assert_eq!(ingress.fqdn.as_str(), "app.example.com");
        assert_eq!(ingress.endpoint(), "https://app.example.com");
        assert_eq!(ingress.callback_url, "https://app.example.com/oauth2/idpresponse");
        assert_eq!(ingress.logout_url, "https://app.example.com/logout");
        assert_eq!(ingress.listener_port, 443);
        assert!(graph.get(&ingress.hosted_zone).unwrap().imported);
        assert_eq!(graph.count(ResourceKind::LoadBalancer), 1);
    }

    #[test]
    fn test_ingress_needs_compute_service() {
        let mut graph = ResourceGraph::new();
        let (network, storage) = network_and_storage(&mut graph);

        // Compute declared elsewhere; this graph only has network and storage
        let mut elsewhere = graph.clone();
        let compute = ComputeLayer::declare(
            &ComputeSpec::standard("image-reader"),
            &network,
            &storage,
            &mut elsewhere,
        )
        .unwrap();

        let err = IngressLayer::declare(&spec(), &network, &compute, &mut graph).unwrap_err();
        match err {
            StackError::Graph(GraphError::UnknownDependency {
                resource,
                dependency,
            }) => {
                assert_eq!(resource.as_str(), "AppIngress/TargetGroup");
                assert_eq!(&dependency, compute.service());
            }
            other => panic!("expected the target group to be refused, got {other:?}"),
        }
        assert!(graph.get(&ResourceId::new("AppIngress/TargetGroup")).is_none());
        assert!(graph.get(&ResourceId::new("AppIngress/LoadBalancer")).is_some());
    }
}
