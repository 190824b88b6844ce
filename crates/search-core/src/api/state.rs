//! Single-writer state shared by every `SearchApi` clone.

use crate::db::Database;
use crate::schema::SchemaCache;
use std::sync::{Arc, RwLock};

/// The active connection and the schema cache built from it.
///
/// `generation` is only advanced while the connection slot is write-locked,
/// so a reader that sees a connection also sees the generation it was
/// installed under.
pub(crate) struct ApiState {
    connection: RwLock<Slot>,
    pub(crate) schema: SchemaCache,
}

#[derive(Default)]
struct Slot {
    generation: u64,
    db: Option<Arc<Database>>,
}

impl ApiState {
    pub(crate) fn new() -> Self {
        Self {
            connection: RwLock::new(Slot::default()),
            schema: SchemaCache::new(),
        }
    }

    /// The active connection, if any.
    pub(crate) fn current(&self) -> Option<Arc<Database>> {
        match self.connection.read() {
            Ok(slot) => slot.db.clone(),
            Err(poisoned) => poisoned.into_inner().db.clone(),
        }
    }

    /// Detach the active connection and start a new generation.
    ///
    /// The schema cache is reset before the slot lock is released, so no
    /// reader can pair the old whitelist with a missing or newer connection.
    pub(crate) fn begin_swap(&self) -> (u64, Option<Arc<Database>>) {
        let mut slot = match self.connection.write() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        slot.generation += 1;
        self.schema.reset(slot.generation);
        (slot.generation, slot.db.take())
    }

    /// Install `db` if no newer swap began since it was opened.
    pub(crate) fn install(&self, db: &Arc<Database>) -> bool {
        let mut slot = match self.connection.write() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        if slot.generation != db.generation() {
            return false;
        }
        slot.db = Some(Arc::clone(db));
        true
    }
}
