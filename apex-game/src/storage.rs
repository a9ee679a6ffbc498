//! Numbered save slots over an opaque blob store.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;
use thiserror::Error;

use crate::SlotStorage;
use crate::constants::SAVE_SLOT_COUNT;
use crate::data::TeamCatalog;
use crate::profile::{NewDriver, PlayerProfile};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveSlot {
    pub id: u8,
    pub profile: Option<PlayerProfile>,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend failed: {0}")]
    Backend(String),
    #[error("save data could not be encoded or decoded: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("no save slot {0}")]
    UnknownSlot(u8),
    #[error("save slot {0} is empty")]
    EmptySlot(u8),
}

/// The fixed slot layout shown before anything is loaded.
#[must_use]
pub fn empty_slots() -> Vec<SaveSlot> {
    (1..=SAVE_SLOT_COUNT)
        .map(|id| SaveSlot { id, profile: None })
        .collect()
}

/// In-memory slots backed by a [`SlotStorage`]. Edits stay local until
/// [`SaveBook::persist`].
#[derive(Debug)]
pub struct SaveBook<S: SlotStorage> {
    storage: S,
    slots: Vec<SaveSlot>,
    dirty: bool,
}

impl<S: SlotStorage> SaveBook<S> {
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            slots: empty_slots(),
            dirty: false,
        }
    }

    #[must_use]
    pub fn slots(&self) -> &[SaveSlot] {
        &self.slots
    }

    #[must_use]
    pub fn profile(&self, slot_id: u8) -> Option<&PlayerProfile> {
        self.slots
            .iter()
            .find(|slot| slot.id == slot_id)
            .and_then(|slot| slot.profile.as_ref())
    }

    /// Unsaved edits exist.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Replace the in-memory slots with the stored blob. On any failure the
    /// current slots are kept.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the backend fails or the blob does not parse.
    pub fn load(&mut self) -> Result<(), StorageError> {
        let blob = match self.storage.load_slots() {
            Ok(Some(blob)) => blob,
            Ok(None) => return Ok(()),
            Err(err) => {
                log::warn!("failed to read saves, keeping current slots: {err}");
                return Err(StorageError::Backend(err.to_string()));
            }
        };
        match serde_json::from_str::<Vec<SaveSlot>>(&blob) {
            Ok(slots) => {
                self.slots = slots;
                self.dirty = false;
                Ok(())
            }
            Err(err) => {
                log::warn!("failed to parse saves, keeping current slots: {err}");
                Err(err.into())
            }
        }
    }

    /// Write every slot to the backend and clear the dirty flag.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when encoding or the backend write fails.
    pub fn persist(&mut self) -> Result<(), StorageError> {
        let blob = serde_json::to_string(&self.slots)?;
        self.storage
            .save_slots(&blob)
            .map_err(|err| StorageError::Backend(err.to_string()))?;
        self.dirty = false;
        Ok(())
    }

    /// Create a rookie in a slot and persist immediately.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for an unknown slot or a failed write.
    pub fn create_profile(
        &mut self,
        slot_id: u8,
        request: NewDriver,
        catalog: &TeamCatalog,
        entropy: u64,
        now: DateTime<Utc>,
    ) -> Result<PlayerProfile, StorageError> {
        let profile = PlayerProfile::create(request, catalog, entropy, now);
        self.slot_mut(slot_id)?.profile = Some(profile.clone());
        self.persist()?;
        Ok(profile)
    }

    /// Swap in a new snapshot for an occupied slot; marks the book dirty.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the slot is unknown or empty.
    pub fn update(&mut self, slot_id: u8, profile: PlayerProfile) -> Result<(), StorageError> {
        let slot = self.slot_mut(slot_id)?;
        if slot.profile.is_none() {
            return Err(StorageError::EmptySlot(slot_id));
        }
        slot.profile = Some(profile);
        self.dirty = true;
        Ok(())
    }

    /// Clear a slot and persist immediately.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for an unknown slot or a failed write.
    pub fn delete(&mut self, slot_id: u8) -> Result<(), StorageError> {
        self.slot_mut(slot_id)?.profile = None;
        self.persist()
    }

    /// Drop unsaved edits by reloading the stored blob.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn discard_changes(&mut self) -> Result<(), StorageError> {
        self.load()?;
        self.dirty = false;
        Ok(())
    }

    fn slot_mut(&mut self, slot_id: u8) -> Result<&mut SaveSlot, StorageError> {
        self.slots
            .iter_mut()
            .find(|slot| slot.id == slot_id)
            .ok_or(StorageError::UnknownSlot(slot_id))
    }
}

/// Blob store held in memory; clones share the same blob.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    blob: Rc<RefCell<Option<String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Rc::new(RefCell::new(Some(blob.into()))),
        }
    }

    #[must_use]
    pub fn blob(&self) -> Option<String> {
        self.blob.borrow().clone()
    }
}

impl SlotStorage for MemoryStorage {
    type Error = Infallible;

    fn save_slots(&self, blob: &str) -> Result<(), Self::Error> {
        *self.blob.borrow_mut() = Some(blob.to_string());
        Ok(())
    }

    fn load_slots(&self) -> Result<Option<String>, Self::Error> {
        Ok(self.blob.borrow().clone())
    }
}
