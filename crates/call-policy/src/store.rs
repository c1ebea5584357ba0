//! Durable storage for uncallable roles.
//!
//! On disk the store is a single JSON object mapping guild ids (as strings)
//! to arrays of role ids:
//!
//! ```json
//! { "123456789": [10, 20] }
//! ```

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use call_core::{GuildId, RoleId};
use indexmap::IndexSet;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::Result;

/// Uncallable roles for every stored guild.
pub type PolicySnapshot = BTreeMap<GuildId, Vec<RoleId>>;

/// Durable guild → uncallable roles mapping.
#[async_trait]
pub trait PolicyStore: Send + Sync {
    /// Load every stored guild.
    ///
    /// Absent storage is an empty snapshot, not an error.
    async fn load(&self) -> Result<PolicySnapshot>;

    /// Replace the stored roles of one guild and flush to durable storage.
    ///
    /// Must not return until the write is durable.
    async fn save_guild(&self, guild: GuildId, roles: &[RoleId]) -> Result<()>;
}

/// Apply a guild update to a snapshot. Guilds with no roles are dropped.
fn apply(snapshot: &mut PolicySnapshot, guild: GuildId, roles: &[RoleId]) {
    if roles.is_empty() {
        snapshot.remove(&guild);
    } else {
        snapshot.insert(guild, roles.to_vec());
    }
}

/// The on-disk document, keyed by the guild id as written.
type RawDocument = BTreeMap<String, Vec<u64>>;

/// A JSON file backed policy store.
///
/// Writes go to a sibling temporary file that is renamed over the target,
/// so a crash mid-write never leaves a truncated document. Each save re-reads
/// the file and replaces only the saved guild's entry, so entries this
/// process never loaded (or could not parse) are kept as they are.
#[derive(Debug)]
pub struct JsonPolicyStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonPolicyStore {
    /// Create a store for the given file path. Nothing is read until [`PolicyStore::load`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decode the document, skipping guild keys that are not numeric ids.
    fn decode(raw: RawDocument) -> PolicySnapshot {
        let mut merged: BTreeMap<GuildId, IndexSet<RoleId>> = BTreeMap::new();
        for (key, roles) in raw {
            let Ok(guild) = key.parse::<GuildId>() else {
                warn!("Skipping invalid guild key {:?} in policy store", key);
                continue;
            };
            merged
                .entry(guild)
                .or_default()
                .extend(roles.into_iter().map(RoleId));
        }

        merged
            .into_iter()
            .map(|(guild, roles)| (guild, roles.into_iter().collect()))
            .collect()
    }

    /// Read the raw document. `None` when the file does not exist.
    async fn read(&self) -> Result<Option<RawDocument>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn write(&self, raw: &RawDocument) -> Result<()> {
        let contents = serde_json::to_string_pretty(raw)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, contents).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!("Wrote policy store {} ({} guilds)", self.path.display(), raw.len());
        Ok(())
    }
}

#[async_trait]
impl PolicyStore for JsonPolicyStore {
    async fn load(&self) -> Result<PolicySnapshot> {
        let _lock = self.lock.lock().await;

        let snapshot = match self.read().await? {
            Some(raw) => Self::decode(raw),
            None => {
                info!(
                    "Policy store {} not found, creating an empty one",
                    self.path.display()
                );
                self.write(&RawDocument::new()).await?;
                PolicySnapshot::new()
            }
        };

        info!(
            "Loaded policy store {} ({} guilds)",
            self.path.display(),
            snapshot.len()
        );
        Ok(snapshot)
    }

    async fn save_guild(&self, guild: GuildId, roles: &[RoleId]) -> Result<()> {
        let _lock = self.lock.lock().await;

        // An unreadable document is never overwritten.
        let mut raw = self.read().await?.unwrap_or_default();
        raw.retain(|key, _| key.parse::<GuildId>().ok() != Some(guild));
        if !roles.is_empty() {
            raw.insert(guild.to_string(), roles.iter().map(|r| r.get()).collect());
        }

        self.write(&raw).await
    }
}

/// An in-memory policy store, for tests and ephemeral deployments.
#[derive(Debug, Default)]
pub struct MemoryPolicyStore {
    document: Mutex<PolicySnapshot>,
}

impl MemoryPolicyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with a snapshot.
    pub fn with_snapshot(snapshot: PolicySnapshot) -> Self {
        Self {
            document: Mutex::new(snapshot),
        }
    }

    /// Current stored contents.
    pub async fn snapshot(&self) -> PolicySnapshot {
        self.document.lock().await.clone()
    }
}

#[async_trait]
impl PolicyStore for MemoryPolicyStore {
    async fn load(&self) -> Result<PolicySnapshot> {
        Ok(self.document.lock().await.clone())
    }

    async fn save_guild(&self, guild: GuildId, roles: &[RoleId]) -> Result<()> {
        apply(&mut *self.document.lock().await, guild, roles);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PolicyError;

    fn raw(json: &str) -> RawDocument {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_decode_dedupes_roles() {
        let snapshot = JsonPolicyStore::decode(raw(r#"{"1": [10, 10, 20]}"#));
        assert_eq!(snapshot[&GuildId(1)], vec![RoleId(10), RoleId(20)]);
    }

    #[test]
    fn test_decode_skips_bad_guild_key() {
        let snapshot = JsonPolicyStore::decode(raw(r#"{"guild": [10], "2": [30]}"#));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[&GuildId(2)], vec![RoleId(30)]);
    }

    #[tokio::test]
    async fn test_load_rejects_bad_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roles.json");
        std::fs::write(&path, r#"{"1": "10"}"#).unwrap();

        let err = JsonPolicyStore::new(&path).load().await.unwrap_err();
        assert!(matches!(err, PolicyError::Json(_)));
    }

    #[tokio::test]
    async fn test_save_keeps_entries_it_never_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roles.json");
        std::fs::write(&path, r#"{"1": [10, 20], "legacy": [5]}"#).unwrap();

        let store = JsonPolicyStore::new(&path);
        store.save_guild(GuildId(2), &[RoleId(30)]).await.unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "1": [10, 20], "2": [30], "legacy": [5] })
        );
    }

    #[tokio::test]
    async fn test_save_refuses_to_overwrite_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roles.json");
        std::fs::write(&path, "not json").unwrap();

        let store = JsonPolicyStore::new(&path);
        assert!(store.save_guild(GuildId(1), &[RoleId(10)]).await.is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "not json");
    }

    #[tokio::test]
    async fn test_missing_file_is_created_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("roles.json");
        let store = JsonPolicyStore::new(&path);

        let snapshot = store.load().await.unwrap();
        assert!(snapshot.is_empty());

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.trim(), "{}");
    }

    #[tokio::test]
    async fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roles.json");

        let store = JsonPolicyStore::new(&path);
        store.load().await.unwrap();
        store
            .save_guild(GuildId(1), &[RoleId(10), RoleId(20)])
            .await
            .unwrap();

        let reopened = JsonPolicyStore::new(&path);
        let snapshot = reopened.load().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[&GuildId(1)], vec![RoleId(10), RoleId(20)]);
    }

    #[tokio::test]
    async fn test_clearing_a_guild_removes_its_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roles.json");

        let store = JsonPolicyStore::new(&path);
        store.load().await.unwrap();
        store.save_guild(GuildId(1), &[RoleId(10)]).await.unwrap();
        store.save_guild(GuildId(2), &[RoleId(30)]).await.unwrap();
        store.save_guild(GuildId(1), &[]).await.unwrap();

        let snapshot = JsonPolicyStore::new(&path).load().await.unwrap();
        assert!(!snapshot.contains_key(&GuildId(1)));
        assert_eq!(snapshot[&GuildId(2)], vec![RoleId(30)]);
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryPolicyStore::new();
        store.save_guild(GuildId(5), &[RoleId(1)]).await.unwrap();
        assert_eq!(store.load().await.unwrap()[&GuildId(5)], vec![RoleId(1)]);
    }
}
