//! Graph Builder and Resolver Tests

use wireup_container::graph::Requirement;
use wireup_container::{GraphBuilder, NodeKind, Policies, Registration, Resolver, ScopeManager};
use wireup_domain::{Constructor, ErrorKind, Location, Scope, Slot, TypeKey};

fn registration(name: &str, inputs: Vec<TypeKey>, outputs: Vec<TypeKey>) -> Registration {
    Registration::constructor(None, descriptor(name, inputs, outputs))
}

fn descriptor(name: &str, inputs: Vec<TypeKey>, outputs: Vec<TypeKey>) -> Constructor {
    Constructor::new(
        Location::new(name),
        inputs.into_iter().map(Slot::Key).collect(),
        outputs.into_iter().map(Slot::Key).collect(),
        |_| Ok(Vec::new()),
    )
}

fn entry(inputs: Vec<TypeKey>) -> Registration {
    Registration::entry(None, descriptor("entry", inputs, Vec::new()))
}

#[test]
fn test_scope_input_is_implicit() {
    let registrations = vec![Registration::constructor(
        Some("a".to_string()),
        descriptor("scoped", vec![TypeKey::of::<Scope>()], vec![TypeKey::of::<u8>()]),
    )];
    let graph = GraphBuilder::new(Policies::new())
        .build(&registrations, &entry(vec![TypeKey::of::<u8>()]))
        .unwrap();
    assert_eq!(graph.nodes[0].requires[0].requirement, Requirement::Scope);
    assert_eq!(graph.scopes.names(), &["a".to_string()]);
}

#[test]
fn test_order_is_stable_across_builds() {
    let registrations = vec![
        registration("c", vec![TypeKey::of::<u8>(), TypeKey::of::<u16>()], vec![TypeKey::of::<u32>()]),
        registration("b", vec![TypeKey::of::<u8>()], vec![TypeKey::of::<u16>()]),
        registration("a", Vec::new(), vec![TypeKey::of::<u8>()]),
    ];
    let orders: Vec<Vec<usize>> = (0..3)
        .map(|_| {
            let graph = GraphBuilder::new(Policies::new())
                .build(&registrations, &entry(vec![TypeKey::of::<u32>()]))
                .unwrap();
            Resolver::order(&graph)
                .unwrap()
                .nodes()
                .iter()
                .map(|id| id.0)
                .collect()
        })
        .collect();
    assert_eq!(orders[0], vec![2, 1, 0, 3]);
    assert_eq!(orders[0], orders[1]);
    assert_eq!(orders[1], orders[2]);
}

#[test]
fn test_three_node_cycle_path() {
    let registrations = vec![
        registration("a", vec![TypeKey::of::<u8>()], vec![TypeKey::of::<u16>()]),
        registration("b", vec![TypeKey::of::<u16>()], vec![TypeKey::of::<u32>()]),
        registration("c", vec![TypeKey::of::<u32>()], vec![TypeKey::of::<u8>()]),
    ];
    let graph = GraphBuilder::new(Policies::new())
        .build(&registrations, &entry(Vec::new()))
        .unwrap();
    let err = Resolver::order(&graph).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CyclicDependency);
    assert_eq!(err.to_string(), "cyclic dependency: u8 → u32 → u16 → u8");
}

#[test]
fn test_plan_places_entry_last() {
    let registrations = vec![
        registration("b", vec![TypeKey::of::<u8>()], vec![TypeKey::of::<u16>()]),
        registration("a", Vec::new(), vec![TypeKey::of::<u8>()]),
    ];
    let graph = GraphBuilder::new(Policies::new())
        .build(&registrations, &entry(vec![TypeKey::of::<u16>()]))
        .unwrap();
    let order = Resolver::order(&graph).unwrap();
    let plan = ScopeManager::new(&graph, &order).plan().unwrap();

    assert_eq!(plan.instances.len(), 3);
    assert_eq!(plan.entry, 2);
    assert_eq!(graph.node(plan.instances[plan.entry].node).kind, NodeKind::Entry);
}
