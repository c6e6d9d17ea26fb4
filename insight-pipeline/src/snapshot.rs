//! File-based snapshot store for generated insights (JSON on disk).
//!
//! Why persist?
//! - Regenerating identical insights burns model-provider quota and time.
//! - A snapshot keyed by (workspace, dataset, decision metric) makes the
//!   common repeat request O(1) as long as the dataset hash still matches.
//!
//! Key (stable across re-runs): SHA256("{workspace}:{dataset}:{metric}")
//! Layout: $INSIGHT_SNAPSHOT_DIR/<workspace_sanitized>/<dataset_sanitized>-<metric_sanitized>-<hash12>.json
//! Default root: "workspace_data/insight_snapshots".
//!
//! Snapshots are replaced wholesale (delete-then-write), never merged.
//! Concurrent regenerations of the same key are not serialized; the store
//! exhibits last-writer-wins.

use std::future::Future;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::debug;

use crate::errors::SnapshotError;
use crate::insight::ValidatedInsight;
use crate::stats::BackendStats;

/// Identifies one snapshot slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotKey {
    pub workspace_id: String,
    pub dataset_id: String,
    pub decision_metric: String,
}

/// Persisted result of one successful pipeline run.
///
/// Stores the validated, ranked insights; the sanitize/cap/dedup stages are
/// deterministic and replay on every respond path, so a snapshot read back
/// from disk produces a byte-identical response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightSnapshot {
    pub version: u32,
    pub workspace_id: String,
    pub dataset_id: String,
    pub decision_metric: String,
    pub dataset_hash: String,
    pub created_at: String,
    pub backend_stats: BackendStats,
    pub insights: Vec<ValidatedInsight>,
    #[serde(default)]
    pub data_risks: Vec<String>,
    #[serde(default)]
    pub limitations: String,
}

/// Persistence seam for snapshots. The fs implementation below is the
/// production one; tests plug in an in-memory map.
pub trait SnapshotStore: Send + Sync {
    fn load(
        &self,
        key: &SnapshotKey,
    ) -> impl Future<Output = Result<Option<InsightSnapshot>, SnapshotError>> + Send;

    fn save(
        &self,
        key: &SnapshotKey,
        snapshot: &InsightSnapshot,
    ) -> impl Future<Output = Result<(), SnapshotError>> + Send;

    /// Returns whether a snapshot existed.
    fn delete(
        &self,
        key: &SnapshotKey,
    ) -> impl Future<Output = Result<bool, SnapshotError>> + Send;
}

/// Snapshot store on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsSnapshotStore {
    root: PathBuf,
}

impl FsSnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory from `INSIGHT_SNAPSHOT_DIR` (env-overridable).
    pub fn from_env() -> Self {
        let root = std::env::var("INSIGHT_SNAPSHOT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("workspace_data/insight_snapshots"));
        Self::new(root)
    }

    /// Computes the deterministic path for a key.
    fn key_path(&self, key: &SnapshotKey) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(format!(
            "{}:{}:{}",
            key.workspace_id, key.dataset_id, key.decision_metric
        ));
        let digest = format!("{:x}", hasher.finalize());
        self.root.join(sanitize(&key.workspace_id)).join(format!(
            "{}-{}-{}.json",
            sanitize(&key.dataset_id),
            sanitize(&key.decision_metric),
            &digest[..12]
        ))
    }
}

/// Filesystem-safe replacement for id segments (separators → underscores).
fn sanitize(s: &str) -> String {
    s.replace(['/', '\\', ':'], "_")
}

impl SnapshotStore for FsSnapshotStore {
    async fn load(&self, key: &SnapshotKey) -> Result<Option<InsightSnapshot>, SnapshotError> {
        let path = self.key_path(key);
        if !Path::new(&path).exists() {
            return Ok(None);
        }
        let data = fs::read(&path).await?;
        let snapshot: InsightSnapshot = serde_json::from_slice(&data)?;
        debug!(version = snapshot.version, path = %path.display(), "snapshot loaded");
        Ok(Some(snapshot))
    }

    async fn save(
        &self,
        key: &SnapshotKey,
        snapshot: &InsightSnapshot,
    ) -> Result<(), SnapshotError> {
        let path = self.key_path(key);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).await?;
        }
        let json = serde_json::to_vec(snapshot)?;
        fs::write(&path, json).await?;
        debug!(version = snapshot.version, path = %path.display(), "snapshot written");
        Ok(())
    }

    async fn delete(&self, key: &SnapshotKey) -> Result<bool, SnapshotError> {
        let path = self.key_path(key);
        if !Path::new(&path).exists() {
            return Ok(false);
        }
        fs::remove_file(&path).await?;
        debug!(path = %path.display(), "snapshot deleted");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::Confidence;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static DIR_SEQ: AtomicUsize = AtomicUsize::new(0);

    fn scratch_store() -> FsSnapshotStore {
        let dir = std::env::temp_dir().join(format!(
            "insight-snapshots-{}-{}",
            std::process::id(),
            DIR_SEQ.fetch_add(1, Ordering::SeqCst)
        ));
        FsSnapshotStore::new(dir)
    }

    fn key() -> SnapshotKey {
        SnapshotKey {
            workspace_id: "ws-1".into(),
            dataset_id: "sales.csv".into(),
            decision_metric: "revenue".into(),
        }
    }

    fn snapshot(version: u32) -> InsightSnapshot {
        InsightSnapshot {
            version,
            workspace_id: "ws-1".into(),
            dataset_id: "sales.csv".into(),
            decision_metric: "revenue".into(),
            dataset_hash: "hash-1".into(),
            created_at: "2025-01-01T00:00:00Z".into(),
            backend_stats: BackendStats {
                decision_metric: "revenue".into(),
                total_rows: 1000,
                valid_rows: 1000,
                missing_percentage: 0.0,
                top_factors: vec![],
                all_correlations: vec![],
                all_segment_impacts: vec![],
                excluded_columns: vec![],
            },
            insights: vec![ValidatedInsight {
                rank: 1,
                factor: "marketing_spend".into(),
                why_it_matters: "tracks revenue".into(),
                evidence: "correlation 0.75".into(),
                confidence: Confidence::High,
            }],
            data_risks: vec![],
            limitations: "associations only".into(),
        }
    }

    #[tokio::test]
    async fn round_trips_a_snapshot() {
        let store = scratch_store();
        let key = key();

        assert!(store.load(&key).await.unwrap().is_none());

        store.save(&key, &snapshot(1)).await.unwrap();
        let loaded = store.load(&key).await.unwrap().unwrap();
        assert_eq!(loaded, snapshot(1));
    }

    #[tokio::test]
    async fn delete_then_write_replaces_wholesale() {
        let store = scratch_store();
        let key = key();

        store.save(&key, &snapshot(1)).await.unwrap();
        assert!(store.delete(&key).await.unwrap());
        assert!(store.load(&key).await.unwrap().is_none());

        store.save(&key, &snapshot(2)).await.unwrap();
        let loaded = store.load(&key).await.unwrap().unwrap();
        assert_eq!(loaded.version, 2);
    }

    #[tokio::test]
    async fn delete_reports_missing_snapshot() {
        let store = scratch_store();
        assert!(!store.delete(&key()).await.unwrap());
    }

    #[test]
    fn key_paths_are_deterministic_and_sanitized() {
        let store = FsSnapshotStore::new("/tmp/snaps");
        let messy = SnapshotKey {
            workspace_id: "ws/1".into(),
            dataset_id: "dir\\sales.csv".into(),
            decision_metric: "net:revenue".into(),
        };
        let a = store.key_path(&messy);
        let b = store.key_path(&messy);
        assert_eq!(a, b);
        let rendered = a.display().to_string();
        assert!(rendered.contains("ws_1"));
        assert!(!rendered["/tmp/snaps".len()..].contains(':'));
    }
}
