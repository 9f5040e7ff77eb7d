//! Card record repository
//!
//! The renderer only consumes complete [`CardRecord`]s; this module keeps them
//! between requests for the HTTP front end.

use crate::{CardRecord, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A record together with the id it was stored under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCard {
    pub id: u64,
    #[serde(flatten)]
    pub record: CardRecord,
}

pub trait RecordRepository: Send + Sync {
    /// Store a new record and return its id
    fn save(&self, record: CardRecord) -> Result<u64>;

    /// All records, newest first
    fn list(&self) -> Result<Vec<StoredCard>>;

    fn get(&self, id: u64) -> Result<Option<StoredCard>>;

    /// Remove a record; `false` if it did not exist
    fn delete(&self, id: u64) -> Result<bool>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreState {
    next_id: u64,
    cards: BTreeMap<u64, CardRecord>,
}

/// In-memory repository, optionally mirrored to a JSON file
#[derive(Debug, Default)]
pub struct CardStore {
    path: Option<PathBuf>,
    state: Mutex<StoreState>,
}

impl CardStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a store backed by `path`, loading existing records if the file exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let data = std::fs::read(&path)?;
            serde_json::from_slice(&data)?
        } else {
            StoreState::default()
        };
        log::debug!("opened card store at {:?}", path);
        Ok(Self { path: Some(path), state: Mutex::new(state) })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, StoreState>> {
        self.state
            .lock()
            .map_err(|_| Error::RepositoryError("card store lock poisoned".into()))
    }

    fn persist(&self, state: &StoreState) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        // write a sibling file, then rename it over the original
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(state)?)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}

impl RecordRepository for CardStore {
    fn save(&self, record: CardRecord) -> Result<u64> {
        if record.name.trim().is_empty() {
            return Err(Error::RepositoryError("name is required".into()));
        }
        let mut state = self.lock()?;
        state.next_id += 1;
        let id = state.next_id;
        state.cards.insert(id, record);
        self.persist(&state)?;
        Ok(id)
    }

    fn list(&self) -> Result<Vec<StoredCard>> {
        let state = self.lock()?;
        Ok(state
            .cards
            .iter()
            .rev()
            .map(|(id, record)| StoredCard { id: *id, record: record.clone() })
            .collect())
    }

    fn get(&self, id: u64) -> Result<Option<StoredCard>> {
        let state = self.lock()?;
        Ok(state.cards.get(&id).map(|record| StoredCard { id, record: record.clone() }))
    }

    fn delete(&self, id: u64) -> Result<bool> {
        let mut state = self.lock()?;
        let removed = state.cards.remove(&id).is_some();
        if removed {
            self.persist(&state)?;
        }
        Ok(removed)
    }
}
