//! Scope instantiation

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use wireup_container::{Container, PerScope};
use wireup_domain::{ErrorKind, Scope};

use crate::fixtures::{KeeperA, KvStoreKey, MsgClientA, provide_kv_store_key};

#[test]
fn test_scoped_store_keys_are_distinct_instances() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    Container::new()
        .one_per_scope::<KeeperA>()
        .provide(move |scope: Scope| {
            counter.fetch_add(1, Ordering::SeqCst);
            provide_kv_store_key(scope)
        })
        .provide_in_scope("a", |key: KvStoreKey| KeeperA { key })
        .provide_in_scope("b", |key: KvStoreKey| KeeperA { key })
        .run(|keepers: PerScope<KeeperA>| {
            assert_eq!(keepers["a"].key.name, "a");
            assert_eq!(keepers["b"].key.name, "b");
        })
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_scope_instance_is_shared_within_a_scope() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    Container::new()
        .provide(move |scope: Scope| {
            counter.fetch_add(1, Ordering::SeqCst);
            provide_kv_store_key(scope)
        })
        .provide_in_scope("a", |key: KvStoreKey| KeeperA { key })
        .provide_in_scope("a", |key: KvStoreKey| key.name.len())
        .run(|keeper: KeeperA, length: usize| {
            assert_eq!(keeper.key.name, "a");
            assert_eq!(length, 1);
        })
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_scope_flows_through_unscoped_dependencies() {
    crate::fixtures::app()
        .provide_in_scope("c", |client: MsgClientA| client.key.0.len())
        .run(|length: usize| assert_eq!(length, 1))
        .unwrap();
}

#[test]
fn test_run_in_scope_receives_that_scope() {
    Container::new()
        .provide(provide_kv_store_key)
        .run_in_scope("gov", |scope: Scope, key: KvStoreKey| {
            assert_eq!(scope.name(), "gov");
            assert_eq!(key.name, "gov");
        })
        .unwrap();
}

#[test]
fn test_scope_local_provider_wins() {
    Container::new()
        .provide_in_scope("a", || 1_u8)
        .provide_in_scope("b", || 2_u8)
        .provide_in_scope("b", |x: u8| x.to_string())
        .run(|value: String| assert_eq!(value, "2"))
        .unwrap();
}

#[test]
fn test_scope_value_outside_scope_fails() {
    let err = Container::new()
        .provide(provide_kv_store_key)
        .run(|_: KvStoreKey| {})
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ScopeRequired);
    assert!(err.to_string().contains("KvStoreKey"));
}
