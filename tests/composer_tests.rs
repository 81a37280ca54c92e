// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stack composition scenarios
//!
//! Compose the reference deployment end to end and check the shape of every
//! layer plus the ordering guarantees between them.

mod fixtures;

use cim_app_stack::domain::{ResourceCategory, ResourceKind, SubnetTier};
use cim_app_stack::layers::compute::{ServiceProps, TaskDefinitionProps};
use cim_app_stack::layers::ingress::listener::{CnameRecordProps, ListenerProps};
use cim_app_stack::layers::network::SubnetProps;
use cim_app_stack::layers::storage::AccessPointProps;
use cim_app_stack::{LayerKind, ResourceGraph, StackComposer};
use fixtures::*;
use pretty_assertions::assert_eq;
use test_case::test_case;

fn single<'a>(graph: &'a ResourceGraph, kind: ResourceKind) -> &'a cim_app_stack::Resource {
    let mut matches = graph.of_kind(kind);
    let resource = matches.next().unwrap_or_else(|| panic!("no {kind}"));
    assert!(matches.next().is_none(), "more than one {kind}");
    resource
}

#[test]
fn test_scenario_network() {
    let stack = scenario_stack();

    assert_eq!(stack.network.subnets(SubnetTier::Public).count(), 2);
    assert_eq!(stack.network.subnets(SubnetTier::Private).count(), 2);
    assert_eq!(stack.graph.count(ResourceKind::NatGateway), 1);

    let cidrs: Vec<String> = stack
        .graph
        .of_kind(ResourceKind::Subnet)
        .map(|r| r.properties_as::<SubnetProps>().unwrap().cidr_block.to_string())
        .collect();
    assert_eq!(
        cidrs,
        vec!["10.0.0.0/24", "10.0.1.0/24", "10.0.2.0/24", "10.0.3.0/24"]
    );
}

#[test]
fn test_scenario_storage() {
    let stack = scenario_stack();

    assert_eq!(stack.graph.count(ResourceKind::FileSystem), 1);
    let access_point: AccessPointProps = single(&stack.graph, ResourceKind::AccessPoint)
        .properties_as()
        .unwrap();
    assert_eq!(access_point.path, "/app-data");
    assert_eq!(stack.storage.path(), "/app-data");
}

#[test]
fn test_scenario_compute() {
    let stack = scenario_stack();

    assert_eq!(stack.compute.port(), 8501);
    let service: ServiceProps = single(&stack.graph, ResourceKind::Service)
        .properties_as()
        .unwrap();
    assert_eq!(service.desired_count, 1);

    let task: TaskDefinitionProps = single(&stack.graph, ResourceKind::TaskDefinition)
        .properties_as()
        .unwrap();
    assert_eq!(task.containers[0].name, "image-reader-container");
    assert_eq!(task.containers[0].port_mappings[0].container_port, 8501);
    assert_eq!(task.containers[0].mount_points[0].container_path, "/image-reader/data");
}

#[test]
fn test_scenario_ingress() {
    let stack = scenario_stack();

    assert_eq!(
        stack.ingress.policy.rules[0].sources.to_strings(),
        vec!["203.0.113.0/24"]
    );

    let listener: ListenerProps = single(&stack.graph, ResourceKind::Listener)
        .properties_as()
        .unwrap();
    assert_eq!(listener.port, 443);

    let record = single(&stack.graph, ResourceKind::CnameRecord);
    let props: CnameRecordProps = record.properties_as().unwrap();
    assert_eq!(format!("{}.example.com", props.record_name), "app.example.com");
    assert_eq!(stack.ingress.fqdn.as_str(), "app.example.com");
}

#[test]
fn test_layers_declared_in_fixed_order() {
    let stack = scenario_stack();
    assert_eq!(
        stack.layers,
        vec![
            LayerKind::Network,
            LayerKind::Storage,
            LayerKind::Compute,
            LayerKind::Ingress
        ]
    );

    // Every resource of a layer precedes every resource of the next one
    let layer_of = |id: &str| {
        LayerKind::ORDER
            .iter()
            .position(|l| id.starts_with(l.scope()))
            .unwrap()
    };
    let layers: Vec<usize> = stack.graph.iter().map(|r| layer_of(r.id.as_str())).collect();
    assert!(layers.windows(2).all(|w| w[0] <= w[1]), "{layers:?}");
}

#[test_case(ResourceKind::Certificate, ResourceKind::Listener ; "certificate before listener")]
#[test_case(ResourceKind::LoadBalancer, ResourceKind::WebAclAssociation ; "load balancer before waf association")]
#[test_case(ResourceKind::WebAcl, ResourceKind::WebAclAssociation ; "web acl before waf association")]
#[test_case(ResourceKind::Service, ResourceKind::TargetGroup ; "service before target group")]
#[test_case(ResourceKind::TargetGroup, ResourceKind::Listener ; "target group before listener")]
#[test_case(ResourceKind::UserPoolClient, ResourceKind::Listener ; "client before listener")]
#[test_case(ResourceKind::MountTarget, ResourceKind::Service ; "mount target before service")]
#[test_case(ResourceKind::LoadBalancer, ResourceKind::CnameRecord ; "load balancer before record")]
fn test_dependency_precedes_dependent(first: ResourceKind, then: ResourceKind) {
    let stack = scenario_stack();
    let dependent = stack.graph.of_kind(then).next().unwrap();

    for dependency in stack.graph.of_kind(first) {
        assert!(
            dependent.depends_on.contains(&dependency.id),
            "{} does not depend on {}",
            dependent.id,
            dependency.id
        );
        assert!(stack.graph.position(&dependency.id) < stack.graph.position(&dependent.id));
    }
}

#[test]
fn test_only_load_balancer_is_public() {
    let stack = scenario_stack();
    let public: Vec<ResourceKind> = stack
        .graph
        .iter()
        .map(|r| r.kind)
        .filter(ResourceKind::is_publicly_reachable)
        .collect();
    assert_eq!(public, vec![ResourceKind::LoadBalancer]);
}

#[test]
fn test_every_category_present() {
    let stack = scenario_stack();
    for category in [
        ResourceCategory::Network,
        ResourceCategory::Storage,
        ResourceCategory::Compute,
        ResourceCategory::Security,
        ResourceCategory::Identity,
        ResourceCategory::Ingress,
        ResourceCategory::Dns,
    ] {
        assert!(
            stack.graph.iter().any(|r| r.kind.category() == category),
            "{category:?} missing"
        );
    }
}

#[test]
fn test_composition_is_deterministic() {
    let first = scenario_stack();
    let second = scenario_stack();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first.graph).unwrap(),
        serde_json::to_string(&second.graph).unwrap()
    );
}

#[test]
fn test_zero_nat_stack_still_composes() {
    let mut raw = scenario_raw();
    raw.nat_gateways = 0;
    let stack = StackComposer::new(raw.validate().unwrap()).compose().unwrap();
    assert_eq!(stack.graph.count(ResourceKind::NatGateway), 0);
    assert_eq!(stack.layers.len(), 4);
}
