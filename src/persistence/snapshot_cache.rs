//! Single-file JSON store for the latest odds snapshot.
//!
//! The file always holds exactly one snapshot. Writes go to a sibling
//! `.tmp` file that is renamed over the target, so a reader never sees a
//! half-written snapshot and a failed write leaves the previous one intact.

use crate::domain::OddsSnapshot;
use crate::error::CacheError;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct SnapshotCache {
    path: PathBuf,
}

impl SnapshotCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last persisted snapshot, or `CacheError::Empty` when there is none
    pub async fn load(&self) -> Result<OddsSnapshot, CacheError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(v) => v,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(CacheError::Empty),
            Err(e) => return Err(CacheError::Io(e)),
        };

        if raw.trim().is_empty() {
            return Err(CacheError::Empty);
        }

        serde_json::from_str(&raw).map_err(|e| {
            warn!("Ignoring unreadable cache file {}: {}", self.path.display(), e);
            CacheError::Corrupt(e.to_string())
        })
    }

    /// Atomically replace the persisted snapshot
    pub async fn save(&self, snapshot: &OddsSnapshot) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let body = serde_json::to_string_pretty(snapshot)
            .map_err(|e| CacheError::Corrupt(e.to_string()))?;
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(
            "Saved odds snapshot ({} matches) to {}",
            snapshot.matches.len(),
            self.path.display()
        );
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "snapshot".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MatchOdds, OddsQuery, OutcomeOdds};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn temp_cache(tag: &str) -> SnapshotCache {
        let mut p = std::env::temp_dir();
        p.push(format!(
            "matchday_cache_{}_{}.json",
            tag,
            Utc::now().timestamp_nanos_opt().unwrap_or(0)
        ));
        SnapshotCache::new(p)
    }

    fn snapshot() -> OddsSnapshot {
        let query = OddsQuery {
            market_id: "1X2".to_string(),
            competitions: "11965".to_string(),
            category_id: "2".to_string(),
        };
        OddsSnapshot::new(
            &query,
            vec![MatchOdds::new(
                "Simba SC",
                "Young Africans",
                OutcomeOdds {
                    home: dec!(2.45),
                    draw: dec!(3.10),
                    away: dec!(2.80),
                },
                "Sun 16:00",
                "Tanzania - Premier League",
            )],
        )
    }

    #[tokio::test]
    async fn save_then_load_returns_same_snapshot() {
        let cache = temp_cache("roundtrip");
        let snap = snapshot();

        cache.save(&snap).await.unwrap();
        let loaded = cache.load().await.unwrap();
        assert_eq!(loaded, snap);

        let _ = tokio::fs::remove_file(cache.path()).await;
    }

    #[tokio::test]
    async fn missing_file_is_empty() {
        let cache = temp_cache("missing");
        assert!(matches!(cache.load().await, Err(CacheError::Empty)));
    }

    #[tokio::test]
    async fn garbage_file_is_corrupt() {
        let cache = temp_cache("corrupt");
        tokio::fs::write(cache.path(), "{ not json").await.unwrap();
        assert!(matches!(cache.load().await, Err(CacheError::Corrupt(_))));

        tokio::fs::write(cache.path(), "  \n").await.unwrap();
        assert!(matches!(cache.load().await, Err(CacheError::Empty)));

        let _ = tokio::fs::remove_file(cache.path()).await;
    }

    #[tokio::test]
    async fn save_overwrites_and_leaves_no_tmp_file() {
        let cache = temp_cache("overwrite");
        cache.save(&snapshot()).await.unwrap();

        let mut newer = snapshot();
        newer.matches.clear();
        cache.save(&newer).await.unwrap();

        assert!(cache.load().await.unwrap().matches.is_empty());
        assert!(!cache.tmp_path().exists());

        let _ = tokio::fs::remove_file(cache.path()).await;
    }

    #[test]
    fn save_creates_missing_parent_dirs() {
        let dir = std::env::temp_dir().join(format!(
            "matchday_nested_{}",
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0)
        ));
        let cache = SnapshotCache::new(dir.join("odds").join("betpawa_cache.json"));

        tokio_test::block_on(cache.save(&snapshot())).unwrap();
        assert!(cache.path().exists());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
