use std::cmp::Ordering;
use std::sync::Arc;
use std::thread;

use perm_core::{Source, TriState};
use resolver::{ProviderKind, ProviderRegistry, Registration};
use testing::{FailingProvider, InvocationLog, ScriptedOptions, ScriptedPermissions, StubSource};

#[test]
fn test_zero_providers_resolve_to_undefined() {
    testing::init_tracing();
    let registry = ProviderRegistry::new();
    let source = StubSource::new("steve");

    for key in ["fly", "build", "a.b.c"] {
        assert_eq!(
            registry.resolve_permission(&source, key).unwrap(),
            TriState::Undefined
        );
        assert_eq!(registry.resolve_option(&source, key).unwrap(), None);
    }
}

#[test]
fn test_first_definite_provider_wins_for_every_position() {
    for answering in 0..4 {
        for answer in [TriState::True, TriState::False] {
            let registry = ProviderRegistry::new();
            let providers: Vec<_> = (0..4)
                .map(|i| {
                    let state = match i.cmp(&answering) {
                        Ordering::Less => TriState::Undefined,
                        Ordering::Equal => answer,
                        Ordering::Greater => TriState::from(answer != TriState::True),
                    };
                    ScriptedPermissions::new(format!("p{i}"))
                        .otherwise(state)
                        .shared()
                })
                .collect();
            for provider in &providers {
                registry.add_provider(Registration::Permission(provider.clone()));
            }

            let resolved = registry
                .resolve_permission(&StubSource::new("steve"), "fly")
                .unwrap();
            assert_eq!(resolved, answer);

            for (i, provider) in providers.iter().enumerate() {
                let expected = usize::from(i <= answering);
                assert_eq!(
                    provider.calls(),
                    expected,
                    "provider {i} with answering provider {answering}"
                );
            }
        }
    }
}

#[test]
fn test_providers_run_in_registration_order() {
    let registry = ProviderRegistry::new();
    let log = InvocationLog::new();
    for name in ["first", "second", "third"] {
        registry.add_provider(Registration::option(ScriptedOptions::new(name).logging_to(&log)));
    }

    assert_eq!(
        registry
            .resolve_option(&StubSource::new("steve"), "prefix")
            .unwrap(),
        None
    );
    assert_eq!(log.entries(), vec!["first", "second", "third"]);
}

#[test]
fn test_provider_failure_stops_only_that_resolution() {
    let registry = ProviderRegistry::new();
    let after = ScriptedPermissions::new("after")
        .otherwise(TriState::True)
        .shared();
    registry.add_provider(Registration::permission(
        ScriptedPermissions::new("known").answer("fly", TriState::True),
    ));
    registry.add_provider(Registration::permission(FailingProvider::new("flaky")));
    registry.add_provider(Registration::Permission(after.clone()));

    let source = StubSource::new("steve");
    assert_eq!(registry.resolve_permission(&source, "fly").unwrap(), TriState::True);
    assert!(registry.resolve_permission(&source, "build").is_err());
    assert_eq!(after.calls(), 0);
}

#[test]
fn test_concurrent_registration_keeps_every_provider() {
    let registry = Arc::new(ProviderRegistry::new());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                registry.add_permission_provider(ScriptedPermissions::new(format!("p{i}")));
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(registry.provider_count(ProviderKind::Permission), 8);
}

#[test]
fn test_resolution_during_registration_sees_a_consistent_list() {
    let registry = Arc::new(ProviderRegistry::new());
    let writer = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || {
            for i in 0..100 {
                registry.add_permission_provider(ScriptedPermissions::new(format!("p{i}")));
            }
            registry.add_permission_provider(
                ScriptedPermissions::new("last").otherwise(TriState::True),
            );
        })
    };

    let source: Arc<dyn Source> = Arc::new(StubSource::new("steve"));
    loop {
        let state = registry.resolve_permission(source.as_ref(), "fly").unwrap();
        if state == TriState::True {
            break;
        }
        assert_eq!(state, TriState::Undefined);
        thread::yield_now();
    }
    writer.join().unwrap();

    assert_eq!(registry.provider_count(ProviderKind::Permission), 101);
}
