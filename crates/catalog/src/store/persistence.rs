//! Durable copy of the last good snapshot per league.
//!
//! One JSON document per league, `catalog-<league-slug>.json`, replaced
//! atomically (temp file + rename) after each successful refresh and read
//! once at startup. Normalized names are not stored; they are recomputed on
//! load. Every failure here is reported to the caller, who only logs it.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::PersistenceError;
use crate::models::{CatalogSnapshot, Entity, League, RateSource, ReferenceRate};

/// Current on-disk format version.
const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedEntity {
    name: String,
    value: Decimal,
    category: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedSnapshot {
    version: u32,
    league: League,
    fetched_at: DateTime<Utc>,
    reference_rate: Decimal,
    entities: Vec<PersistedEntity>,
}

impl From<&CatalogSnapshot> for PersistedSnapshot {
    fn from(snapshot: &CatalogSnapshot) -> Self {
        Self {
            version: FORMAT_VERSION,
            league: snapshot.league().clone(),
            fetched_at: snapshot.fetched_at(),
            reference_rate: snapshot.reference_rate().value(),
            entities: snapshot
                .entities()
                .iter()
                .map(|e| PersistedEntity {
                    name: e.name().to_string(),
                    value: e.value(),
                    category: e.category().to_string(),
                })
                .collect(),
        }
    }
}

/// Reads and writes snapshot files under one directory.
#[derive(Clone, Debug)]
pub struct SnapshotPersister {
    dir: PathBuf,
}

impl SnapshotPersister {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, league: &League) -> PathBuf {
        self.dir.join(format!("catalog-{}.json", league.slug()))
    }

    /// Write `snapshot`, replacing any previous file for its league.
    ///
    /// Snapshots carrying the fallback rate are not worth keeping and are skipped.
    pub async fn save(&self, snapshot: &CatalogSnapshot) -> Result<(), PersistenceError> {
        if snapshot.reference_rate().source() == RateSource::Fallback {
            return Ok(());
        }

        let bytes = serde_json::to_vec(&PersistedSnapshot::from(snapshot))?;
        let path = self.path_for(snapshot.league());
        let tmp = path.with_extension("json.tmp");

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Read the persisted snapshot for `league`. A missing file is `Ok(None)`.
    pub async fn load(&self, league: &League) -> Result<Option<CatalogSnapshot>, PersistenceError> {
        let path = self.path_for(league);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let persisted: PersistedSnapshot = serde_json::from_slice(&bytes)?;
        if persisted.version != FORMAT_VERSION {
            return Err(PersistenceError::UnsupportedVersion {
                found: persisted.version,
                expected: FORMAT_VERSION,
            });
        }
        if &persisted.league != league {
            return Err(PersistenceError::Invalid(format!(
                "file holds league '{}', expected '{}'",
                persisted.league, league
            )));
        }
        let rate = ReferenceRate::upstream(persisted.reference_rate).ok_or_else(|| {
            PersistenceError::Invalid(format!(
                "non-positive reference rate {}",
                persisted.reference_rate
            ))
        })?;

        let entities = persisted
            .entities
            .into_iter()
            .map(|e| Entity::new(e.name, e.value, e.category))
            .collect();

        Ok(Some(CatalogSnapshot::new(
            persisted.league,
            entities,
            rate,
            persisted.fetched_at,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    fn snapshot(league: &str, rate: ReferenceRate) -> CatalogSnapshot {
        CatalogSnapshot::new(
            League::new(league),
            vec![
                Entity::new("Mageblood", dec!(15000), "UniqueAccessory"),
                Entity::new("Kitava's Thirst", dec!(3.5), "UniqueArmour"),
            ],
            rate,
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let persister = SnapshotPersister::new(dir.path());
        let original = snapshot("Hardcore Mercenaries", ReferenceRate::upstream(dec!(180)).unwrap());

        persister.save(&original).await.unwrap();
        assert!(dir.path().join("catalog-hardcore-mercenaries.json").exists());

        let loaded = persister
            .load(&League::new("Hardcore Mercenaries"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.reference_rate().value(), dec!(180));
        assert_eq!(loaded.fetched_at(), original.fetched_at());
        let kitava = loaded.find_exact("kitavas thirst").unwrap();
        assert_eq!(kitava.value(), dec!(3.5));
        assert_eq!(kitava.category(), "UniqueArmour");
    }

    #[tokio::test]
    async fn test_missing_file_is_none() {
        let dir = tempdir().unwrap();
        let persister = SnapshotPersister::new(dir.path());
        assert!(persister.load(&League::new("Standard")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let persister = SnapshotPersister::new(dir.path());
        let league = League::new("Standard");
        std::fs::write(persister.path_for(&league), b"{ not json").unwrap();

        let err = persister.load(&league).await.unwrap_err();
        assert!(matches!(err, PersistenceError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_unknown_version_is_rejected() {
        let dir = tempdir().unwrap();
        let persister = SnapshotPersister::new(dir.path());
        let league = League::new("Standard");
        let body = r#"{"version": 99, "league": "Standard", "fetchedAt": "2026-01-01T00:00:00Z",
                       "referenceRate": 180.0, "entities": []}"#;
        std::fs::write(persister.path_for(&league), body).unwrap();

        let err = persister.load(&league).await.unwrap_err();
        assert!(matches!(
            err,
            PersistenceError::UnsupportedVersion { found: 99, expected: 1 }
        ));
    }

    #[tokio::test]
    async fn test_fallback_rate_snapshot_is_not_written() {
        let dir = tempdir().unwrap();
        let persister = SnapshotPersister::new(dir.path());
        persister
            .save(&snapshot("Standard", ReferenceRate::fallback(dec!(150))))
            .await
            .unwrap();
        assert!(!persister.path_for(&League::new("Standard")).exists());
    }

    #[tokio::test]
    async fn test_unwritable_directory_is_an_error() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"file, not a directory").unwrap();
        let persister = SnapshotPersister::new(blocker.join("nested"));

        let result = persister
            .save(&snapshot("Standard", ReferenceRate::upstream(dec!(180)).unwrap()))
            .await;
        assert!(matches!(result, Err(PersistenceError::Io(_))));
    }
}
