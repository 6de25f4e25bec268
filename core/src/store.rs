//! Where a game keeps its snapshot between sessions.

use crate::snapshot::{Snapshot, SnapshotError};

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Key-value style persistence for a single game.
///
/// The game calls [`load`](Self::load) once when it is constructed and
/// [`save`](Self::save) only at settlement boundaries, never mid-move.
pub trait StateStore {
    fn load(&mut self) -> Result<Option<Snapshot>, StoreError>;
    fn save(&mut self, snapshot: &Snapshot) -> Result<(), StoreError>;
}

/// Keeps the last snapshot in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshot: Option<Snapshot>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `snapshot`, as if saved by an earlier session.
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        MemoryStore {
            snapshot: Some(snapshot),
            saves: 0,
        }
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// Number of successful saves.
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl StateStore for MemoryStore {
    fn load(&mut self) -> Result<Option<Snapshot>, StoreError> {
        Ok(self.snapshot.clone())
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<(), StoreError> {
        self.snapshot = Some(snapshot.clone());
        self.saves += 1;
        Ok(())
    }
}

impl<S: StateStore + ?Sized> StateStore for Box<S> {
    fn load(&mut self) -> Result<Option<Snapshot>, StoreError> {
        (**self).load()
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<(), StoreError> {
        (**self).save(snapshot)
    }
}
