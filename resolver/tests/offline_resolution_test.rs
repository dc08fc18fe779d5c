use std::sync::Arc;
use std::time::Duration;

use errors::PermissionError;
use perm_core::{Identity, TriState};
use resolver::{Options, Permissions, ProviderRegistry, Registration};
use testing::{DelayedProvider, FailingProvider, InvocationLog, unique_identity};

fn delayed(name: &str, millis: u64, log: &InvocationLog) -> DelayedProvider {
    DelayedProvider::new(name, Duration::from_millis(millis), log)
}

#[tokio::test]
async fn test_offline_chain_runs_providers_strictly_in_order() {
    testing::init_tracing();
    let registry = Arc::new(ProviderRegistry::new());
    let log = InvocationLog::new();

    let slow = delayed("slow", 50, &log).state(TriState::Undefined).shared();
    let quick = delayed("quick", 10, &log).state(TriState::True).shared();
    let instant = delayed("instant", 0, &log).state(TriState::False).shared();
    registry.add_provider(Registration::OfflinePermission(slow.clone()));
    registry.add_provider(Registration::OfflinePermission(quick.clone()));
    registry.add_provider(Registration::OfflinePermission(instant.clone()));

    let state = registry
        .resolve_offline_permission(unique_identity(), "fly")
        .await
        .unwrap();

    assert_eq!(state, TriState::True);
    assert_eq!(
        log.entries(),
        vec!["slow:start", "slow:end", "quick:start", "quick:end"]
    );
    assert_eq!(slow.calls(), 1);
    assert_eq!(quick.calls(), 1);
    assert_eq!(instant.calls(), 0);
}

#[tokio::test]
async fn test_offline_options_short_circuit() {
    let registry = Arc::new(ProviderRegistry::new());
    let log = InvocationLog::new();

    let empty = delayed("empty", 5, &log).shared();
    let answering = delayed("answering", 5, &log).value("5").shared();
    let unused = delayed("unused", 0, &log).value("9").shared();
    registry.add_provider(Registration::OfflineOption(empty.clone()));
    registry.add_provider(Registration::OfflineOption(answering.clone()));
    registry.add_provider(Registration::OfflineOption(unused.clone()));

    let options = Options::new(registry);
    let weight = options
        .offline_get_as_or(unique_identity(), "group-weight", 0, |v| v.parse::<i32>())
        .unwrap()
        .await
        .unwrap();

    assert_eq!(weight, 5);
    assert_eq!(unused.calls(), 0);
}

#[tokio::test]
async fn test_nothing_runs_until_polled() {
    let registry = Arc::new(ProviderRegistry::new());
    let log = InvocationLog::new();
    let provider = delayed("lazy", 0, &log).state(TriState::True).shared();
    registry.add_provider(Registration::OfflinePermission(provider.clone()));

    let pending = registry.resolve_offline_permission(unique_identity(), "fly");
    tokio::task::yield_now().await;
    assert_eq!(provider.calls(), 0);

    assert_eq!(pending.await.unwrap(), TriState::True);
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_dropping_the_future_abandons_remaining_providers() {
    let registry = Arc::new(ProviderRegistry::new());
    let log = InvocationLog::new();

    let slow = delayed("slow", 200, &log).shared();
    let next = delayed("next", 0, &log).state(TriState::True).shared();
    registry.add_provider(Registration::OfflinePermission(slow.clone()));
    registry.add_provider(Registration::OfflinePermission(next.clone()));

    let pending = registry.resolve_offline_permission(unique_identity(), "fly");
    let outcome = tokio::time::timeout(Duration::from_millis(20), pending).await;
    assert!(outcome.is_err());

    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(log.entries(), vec!["slow:start"]);
    assert_eq!(next.calls(), 0);
}

#[tokio::test]
async fn test_registration_after_start_is_not_seen_by_in_flight_resolution() {
    let registry = Arc::new(ProviderRegistry::new());
    let log = InvocationLog::new();
    registry.add_provider(Registration::OfflinePermission(delayed("existing", 20, &log).shared()));

    let pending = tokio::spawn(registry.resolve_offline_permission(unique_identity(), "fly"));
    tokio::time::sleep(Duration::from_millis(5)).await;

    let late = delayed("late", 0, &log).state(TriState::True).shared();
    registry.add_provider(Registration::OfflinePermission(late.clone()));

    assert_eq!(pending.await.unwrap().unwrap(), TriState::Undefined);
    assert_eq!(late.calls(), 0);

    let state = registry
        .resolve_offline_permission(unique_identity(), "fly")
        .await
        .unwrap();
    assert_eq!(state, TriState::True);
    assert_eq!(late.calls(), 1);
}

#[tokio::test]
async fn test_offline_provider_failure_surfaces() {
    let registry = Arc::new(ProviderRegistry::new());
    registry.add_provider(Registration::offline_permission(FailingProvider::new("storage")));

    let permissions = Permissions::new(registry, Default::default());
    let err = permissions
        .offline_check(unique_identity(), "fly")
        .unwrap()
        .await
        .unwrap_err();
    assert!(matches!(err, PermissionError::Provider(_)));
}

#[tokio::test]
async fn test_invalid_offline_input_is_rejected_synchronously() {
    let registry = Arc::new(ProviderRegistry::new());
    let log = InvocationLog::new();
    let provider = delayed("never", 0, &log).shared();
    registry.add_provider(Registration::OfflinePermission(provider.clone()));
    let permissions = Permissions::new(registry, Default::default());

    let nil = "00000000-0000-0000-0000-000000000000".parse::<Identity>().unwrap();
    assert!(matches!(
        permissions.offline_check(nil, "fly"),
        Err(PermissionError::InvalidInput { .. })
    ));
    assert!(matches!(
        permissions.offline_check(unique_identity(), ""),
        Err(PermissionError::InvalidInput { .. })
    ));
    assert_eq!(provider.calls(), 0);
}
