use crate::domain::errors::GateError;
use crate::domain::models::{BaselineListItem, BaselineSnapshot};
use crate::services::storage::write_atomic;
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Append-mostly store of baseline snapshots, one active file per release
/// tag. Supersession archives the old record instead of destroying it.
pub struct BaselineStore {
    dir: PathBuf,
}

impl BaselineStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn active_path(&self, tag: &str) -> PathBuf {
        self.dir.join(format!("{}.json", tag))
    }

    fn archive_path(&self, tag: &str, version: u32) -> PathBuf {
        self.dir.join(format!("{}.v{}.json", tag, version))
    }

    pub fn get(&self, tag: &str) -> anyhow::Result<BaselineSnapshot> {
        let path = self.active_path(tag);
        if !path.exists() {
            return Err(GateError::MissingBaseline(tag.to_string()).into());
        }
        read_snapshot(&path)
    }

    /// Most recently created active snapshot, with `(created_at, version,
    /// tag)` as the deterministic tie-break.
    pub fn latest(&self) -> anyhow::Result<BaselineSnapshot> {
        let mut best: Option<BaselineSnapshot> = None;
        for tag in self.active_tags()? {
            let snap = self.get(&tag)?;
            let newer = match &best {
                None => true,
                Some(b) => {
                    (snap.created_at, snap.version, snap.release_tag.clone())
                        > (b.created_at, b.version, b.release_tag.clone())
                }
            };
            if newer {
                best = Some(snap);
            }
        }
        best.ok_or_else(|| GateError::MissingBaseline("<latest>".to_string()).into())
    }

    pub fn list(&self) -> anyhow::Result<Vec<BaselineListItem>> {
        let mut items = Vec::new();
        for tag in self.active_tags()? {
            let snap = self.get(&tag)?;
            items.push(BaselineListItem {
                release_tag: snap.release_tag,
                version: snap.version,
                created_at: snap.created_at,
                symbol_count: snap.symbols.len(),
            });
        }
        items.sort_by(|a, b| a.release_tag.cmp(&b.release_tag));
        Ok(items)
    }

    /// Appends a snapshot for its tag. An existing tag is
    /// `DuplicateBaselineError` unless `update_confirmed`, in which case the
    /// old record is archived and the version bumped. The stored version is
    /// re-read immediately before commit; a mismatch means another writer
    /// won the race (`ConcurrentUpdateError`).
    pub fn create(
        &self,
        snapshot: &BaselineSnapshot,
        update_confirmed: bool,
    ) -> anyhow::Result<BaselineSnapshot> {
        std::fs::create_dir_all(&self.dir)?;
        let tag = snapshot.release_tag.clone();
        let path = self.active_path(&tag);

        if !path.exists() {
            let mut stored = snapshot.clone();
            stored.version = 1;
            write_atomic(&path, &serde_json::to_string_pretty(&stored)?)?;
            return Ok(stored);
        }

        if !update_confirmed {
            return Err(GateError::DuplicateBaseline(tag).into());
        }

        let existing = read_snapshot(&path)?;
        let expected_version = existing.version;
        std::fs::copy(&path, self.archive_path(&tag, expected_version))?;

        let current = read_snapshot(&path)?;
        if current.version != expected_version {
            return Err(GateError::ConcurrentUpdate(tag).into());
        }

        let mut stored = snapshot.clone();
        stored.version = expected_version + 1;
        write_atomic(&path, &serde_json::to_string_pretty(&stored)?)?;
        Ok(stored)
    }

    /// Tags of active (non-archived) snapshot files.
    fn active_tags(&self) -> anyhow::Result<Vec<String>> {
        let mut tags = Vec::new();
        if !self.dir.exists() {
            return Ok(tags);
        }
        for entry in std::fs::read_dir(&self.dir)? {
            let name = entry?.file_name().to_string_lossy().to_string();
            let Some(stem) = name.strip_suffix(".json") else {
                continue;
            };
            if is_archive_stem(stem) {
                continue;
            }
            tags.push(stem.to_string());
        }
        tags.sort();
        Ok(tags)
    }
}

fn is_archive_stem(stem: &str) -> bool {
    stem.rsplit_once(".v")
        .map(|(_, v)| !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(false)
}

pub fn read_snapshot(path: &Path) -> anyhow::Result<BaselineSnapshot> {
    let raw = std::fs::read_to_string(path)?;
    let snap: BaselineSnapshot = serde_json::from_str(&raw)
        .with_context(|| format!("invalid baseline snapshot '{}'", path.display()))?;
    Ok(snap)
}
