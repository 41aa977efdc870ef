use deckclimb_core::Profile;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const SAVE_SCHEMA_VERSION: u32 = 1;
pub const SLOT_COUNT: u8 = 3;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save slot {0} out of range (1..=3)")]
    InvalidSlot(u8),
    #[error("unsupported save version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SaveSlot(u8);

impl SaveSlot {
    pub fn new(number: u8) -> Result<Self, SaveError> {
        if (1..=SLOT_COUNT).contains(&number) {
            Ok(Self(number))
        } else {
            Err(SaveError::InvalidSlot(number))
        }
    }

    pub fn number(self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = SaveSlot> {
        (1..=SLOT_COUNT).map(SaveSlot)
    }

    pub fn file_name(self) -> String {
        format!("slot-{}.json", self.0)
    }
}

impl Default for SaveSlot {
    fn default() -> Self {
        Self(1)
    }
}

impl TryFrom<u8> for SaveSlot {
    type Error = SaveError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SaveSlot> for u8 {
    fn from(slot: SaveSlot) -> Self {
        slot.0
    }
}

impl fmt::Display for SaveSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SaveFile {
    version: u32,
    slot: SaveSlot,
    profile: Profile,
}

/// Reads and writes `slot-<n>.json` files under one directory.
#[derive(Debug, Clone)]
pub struct SaveManager {
    dir: PathBuf,
}

impl SaveManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `DECKCLIMB_SAVES` if set, otherwise `~/.deckclimb`.
    pub fn default_dir() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os("DECKCLIMB_SAVES") {
            return Some(PathBuf::from(path));
        }
        std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".deckclimb"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, slot: SaveSlot) -> PathBuf {
        self.dir.join(slot.file_name())
    }

    pub fn exists(&self, slot: SaveSlot) -> bool {
        self.path(slot).is_file()
    }

    pub fn save(&self, slot: SaveSlot, profile: &Profile) -> Result<(), SaveError> {
        fs::create_dir_all(&self.dir)?;
        let payload = SaveFile {
            version: SAVE_SCHEMA_VERSION,
            slot,
            profile: profile.clone(),
        };
        let body = serde_json::to_string_pretty(&payload)?;
        let path = self.path(slot);
        // Write beside the target and rename so a crash never leaves half a file.
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, body)?;
        fs::rename(&staging, &path)?;
        tracing::debug!(%slot, path = %path.display(), "profile saved");
        Ok(())
    }

    /// `Ok(None)` when the slot has never been written.
    pub fn load(&self, slot: SaveSlot) -> Result<Option<Profile>, SaveError> {
        let path = self.path(slot);
        if !path.exists() {
            return Ok(None);
        }
        let body = fs::read_to_string(&path)?;
        let payload: SaveFile = serde_json::from_str(&body)?;
        if payload.version != SAVE_SCHEMA_VERSION {
            return Err(SaveError::UnsupportedVersion {
                found: payload.version,
                expected: SAVE_SCHEMA_VERSION,
            });
        }
        if payload.slot != slot {
            tracing::warn!(%slot, stored = %payload.slot, "save file was copied between slots");
        }
        Ok(Some(payload.profile))
    }

    /// Returns whether a file was removed.
    pub fn delete(&self, slot: SaveSlot) -> Result<bool, SaveError> {
        let path = self.path(slot);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        tracing::info!(%slot, "save deleted");
        Ok(true)
    }

    pub fn occupied_slots(&self) -> Vec<SaveSlot> {
        SaveSlot::all().filter(|slot| self.exists(*slot)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> (tempfile::TempDir, SaveManager) {
        let dir = tempfile::tempdir().expect("tempdir");
        let manager = SaveManager::new(dir.path().join("saves"));
        (dir, manager)
    }

    #[test]
    fn slots_outside_one_to_three_are_rejected() {
        assert!(SaveSlot::new(0).is_err());
        assert!(SaveSlot::new(4).is_err());
        assert_eq!(SaveSlot::new(3).expect("slot").number(), 3);
        assert_eq!(SaveSlot::all().count(), 3);
    }

    #[test]
    fn profile_survives_a_save_and_load() {
        let (_dir, manager) = manager();
        let slot = SaveSlot::new(2).expect("slot");
        let mut profile = Profile::new();
        profile.level = 4;
        profile.talent_points = 2;
        profile.unlocked_talents.push("toughness".to_string());
        profile.lifetime_stats.runs_won = 1;

        manager.save(slot, &profile).expect("save");
        assert!(manager.path(slot).ends_with("slot-2.json"));
        let loaded = manager.load(slot).expect("load").expect("present");
        assert_eq!(loaded, profile);
        assert_eq!(manager.occupied_slots(), vec![slot]);
    }

    #[test]
    fn empty_slot_loads_as_none() {
        let (_dir, manager) = manager();
        let loaded = manager.load(SaveSlot::default()).expect("load");
        assert!(loaded.is_none());
        assert!(!manager.delete(SaveSlot::default()).expect("delete"));
    }

    #[test]
    fn newer_schema_is_refused() {
        let (_dir, manager) = manager();
        let slot = SaveSlot::default();
        fs::create_dir_all(manager.dir()).expect("mkdir");
        let body = serde_json::json!({
            "version": SAVE_SCHEMA_VERSION + 1,
            "slot": 1,
            "profile": {}
        });
        fs::write(manager.path(slot), body.to_string()).expect("write");

        let err = manager.load(slot).expect_err("version");
        assert!(matches!(err, SaveError::UnsupportedVersion { found: 2, expected: 1 }));
    }

    #[test]
    fn delete_removes_the_file() {
        let (_dir, manager) = manager();
        let slot = SaveSlot::new(3).expect("slot");
        manager.save(slot, &Profile::new()).expect("save");
        assert!(manager.delete(slot).expect("delete"));
        assert!(!manager.exists(slot));
    }
}
