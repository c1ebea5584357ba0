//! Integration tests for registry persistence through the JSON store.

use std::sync::Arc;

use call_core::{GuildId, RoleId};
use call_policy::{JsonPolicyStore, PolicyRegistry, PolicyStore};

#[tokio::test]
async fn test_registry_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("uncallable_roles.json");

    {
        let registry = PolicyRegistry::load(Arc::new(JsonPolicyStore::new(&path))).await;
        registry.mark_uncallable(GuildId(1), RoleId(10)).await.unwrap();
        registry.mark_uncallable(GuildId(1), RoleId(20)).await.unwrap();
        registry.set_everyone_callable(GuildId(1), true).await;
    }

    let registry = PolicyRegistry::load(Arc::new(JsonPolicyStore::new(&path))).await;
    assert_eq!(
        registry.list_uncallable(GuildId(1)).await,
        vec![RoleId(10), RoleId(20)]
    );
    // The everyone toggle does not survive a restart.
    assert!(!registry.everyone_callable(GuildId(1)).await);
}

#[tokio::test]
async fn test_persisted_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("uncallable_roles.json");

    let registry = PolicyRegistry::load(Arc::new(JsonPolicyStore::new(&path))).await;
    registry.mark_uncallable(GuildId(42), RoleId(10)).await.unwrap();
    registry.mark_uncallable(GuildId(42), RoleId(20)).await.unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(value, serde_json::json!({ "42": [10, 20] }));
}

#[tokio::test]
async fn test_corrupt_store_degrades_to_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("uncallable_roles.json");
    std::fs::write(&path, "not json").unwrap();

    let store = Arc::new(JsonPolicyStore::new(&path));
    assert!(store.load().await.is_err());

    let registry = PolicyRegistry::load(store).await;
    assert!(registry.list_uncallable(GuildId(1)).await.is_empty());
}

#[tokio::test]
async fn test_mutation_keeps_other_guilds_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("uncallable_roles.json");
    std::fs::write(&path, r#"{"1": [10, 20], "legacy-guild": [5]}"#).unwrap();

    let registry = PolicyRegistry::load(Arc::new(JsonPolicyStore::new(&path))).await;
    assert_eq!(
        registry.list_uncallable(GuildId(1)).await,
        vec![RoleId(10), RoleId(20)]
    );
    registry.mark_uncallable(GuildId(2), RoleId(30)).await.unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(
        value,
        serde_json::json!({ "1": [10, 20], "2": [30], "legacy-guild": [5] })
    );
}

#[tokio::test]
async fn test_unloaded_registry_keeps_stored_guilds() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("uncallable_roles.json");
    std::fs::write(&path, r#"{"1": [10, 20]}"#).unwrap();

    let registry = PolicyRegistry::new(Arc::new(JsonPolicyStore::new(&path)));
    registry.mark_uncallable(GuildId(2), RoleId(30)).await.unwrap();

    let snapshot = JsonPolicyStore::new(&path).load().await.unwrap();
    assert_eq!(snapshot[&GuildId(1)], vec![RoleId(10), RoleId(20)]);
    assert_eq!(snapshot[&GuildId(2)], vec![RoleId(30)]);
}

#[tokio::test]
async fn test_corrupt_store_is_not_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("uncallable_roles.json");
    std::fs::write(&path, "not json").unwrap();

    let registry = PolicyRegistry::load(Arc::new(JsonPolicyStore::new(&path))).await;
    assert!(registry.mark_uncallable(GuildId(1), RoleId(10)).await.is_err());
    assert!(registry.list_uncallable(GuildId(1)).await.is_empty());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "not json");
}
