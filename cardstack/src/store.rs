//! The panel store: ordered, append-only list of panel records.
//!
//! All writes go through [`PanelStore::apply`]. Each successful write
//! publishes a fresh [`Snapshot`] to every subscribed reader; snapshots
//! handed out earlier are never modified.

use std::sync::Arc;

use log::{trace, warn};

use crate::error::{CardError, CardResult};
use crate::panel::{HeightBounds, Panel, PanelId, PanelPatch};

/// Immutable view of the whole list at one point in time.
pub type Snapshot = Arc<Vec<Panel>>;

/// Identifier of a subscribed snapshot reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReaderId(pub u64);

/// A mutation request, the store's single update channel.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCommand {
    /// Append a batch of new records.
    Append(Vec<Panel>),
    /// Merge `patch` into the record with `id`.
    Update {
        /// Target record.
        id: PanelId,
        /// Fields to overwrite.
        patch: PanelPatch,
    },
}

type Listener = Box<dyn FnMut(&Snapshot)>;

/// Authoritative list of panel records.
pub struct PanelStore {
    panels: Snapshot,
    bounds: HeightBounds,
    version: u64,
    readers: Vec<(ReaderId, Listener)>,
    next_reader: u64,
}

impl std::fmt::Debug for PanelStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelStore")
            .field("panels", &self.panels.len())
            .field("version", &self.version)
            .field("readers", &self.readers.len())
            .finish()
    }
}

impl PanelStore {
    /// Create an empty store.
    pub fn new(bounds: HeightBounds) -> Self {
        Self {
            panels: Arc::new(Vec::new()),
            bounds,
            version: 0,
            readers: Vec::new(),
            next_reader: 0,
        }
    }

    /// Apply one command. Returns `true` if a new snapshot was published.
    pub fn apply(&mut self, cmd: StoreCommand) -> CardResult<bool> {
        match cmd {
            StoreCommand::Append(batch) => self.append(batch),
            StoreCommand::Update { id, patch } => Ok(self.update(id, &patch)),
        }
    }

    /// Append a batch. Ids must be strictly increasing and above the current
    /// maximum; otherwise nothing is appended.
    pub fn append(&mut self, batch: Vec<Panel>) -> CardResult<bool> {
        if batch.is_empty() {
            return Ok(false);
        }

        let mut max = self.max_id();
        for panel in &batch {
            if max.is_some_and(|m| panel.id <= m) {
                warn!("Rejecting append: panel {} after {:?}", panel.id.0, max);
                return Err(CardError::NonIncreasingId { id: panel.id.0, max: max.map(|m| m.0) });
            }
            max = Some(panel.id);
        }

        let bounds = self.bounds;
        let panels = Arc::make_mut(&mut self.panels);
        panels.extend(batch.into_iter().map(|mut p| {
            p.height = bounds.clamp(p.height);
            p
        }));
        self.publish();
        Ok(true)
    }

    /// Merge `patch` into the record with `id`.
    ///
    /// Unknown ids and patches that change nothing are no-ops.
    pub fn update(&mut self, id: PanelId, patch: &PanelPatch) -> bool {
        let Some(idx) = self.index_of(id) else {
            trace!("Dropping update for unknown panel {}", id.0);
            return false;
        };

        let merged = self.panels[idx].merged(patch, self.bounds);
        if merged == self.panels[idx] {
            return false;
        }

        Arc::make_mut(&mut self.panels)[idx] = merged;
        self.publish();
        true
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.panels)
    }

    /// Look up a record by id.
    pub fn get(&self, id: PanelId) -> Option<&Panel> {
        self.index_of(id).map(|idx| &self.panels[idx])
    }

    /// Largest id present.
    pub fn max_id(&self) -> Option<PanelId> {
        self.panels.last().map(|p| p.id)
    }

    /// Last record in list order.
    pub fn last(&self) -> Option<&Panel> {
        self.panels.last()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.panels.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    /// Number of snapshots published so far.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Height bounds applied to every write.
    pub fn bounds(&self) -> HeightBounds {
        self.bounds
    }

    /// Register a reader called with every newly published snapshot.
    pub fn subscribe(&mut self, listener: impl FnMut(&Snapshot) + 'static) -> ReaderId {
        let id = ReaderId(self.next_reader);
        self.next_reader += 1;
        self.readers.push((id, Box::new(listener)));
        id
    }

    /// Remove a reader. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, id: ReaderId) -> bool {
        let before = self.readers.len();
        self.readers.retain(|(rid, _)| *rid != id);
        self.readers.len() != before
    }

    /// Serialize the current snapshot for hosts that draw from JSON.
    pub fn export_json(&self) -> CardResult<String> {
        serde_json::to_string(&*self.panels)
            .map_err(|e| CardError::SerializationError(e.to_string()))
    }

    // Records are append-only with increasing ids, so the list is sorted.
    fn index_of(&self, id: PanelId) -> Option<usize> {
        self.panels.binary_search_by_key(&id, |p| p.id).ok()
    }

    fn publish(&mut self) {
        self.version += 1;
        let snapshot = Arc::clone(&self.panels);
        for (_, listener) in &mut self.readers {
            listener(&snapshot);
        }
    }
}
