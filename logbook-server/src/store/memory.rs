//! In-memory logbook store.

use std::collections::HashMap;
use std::sync::RwLock;

use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use crate::domain::FlightLeg;

use super::{LogbookStore, StoreError, StoreEvent, event_channel, sort_legs};

/// Legs keyed by id, with the create/update/delete rules shared by every store.
#[derive(Debug, Clone, Default)]
pub(super) struct Ledger {
    legs: HashMap<Uuid, FlightLeg>,
}

impl Ledger {
    pub(super) fn from_legs(legs: Vec<FlightLeg>) -> Self {
        Self {
            legs: legs.into_iter().map(|l| (l.id(), l)).collect(),
        }
    }

    pub(super) fn create(&mut self, leg: FlightLeg) -> Result<StoreEvent, StoreError> {
        let id = leg.id();
        if self.legs.contains_key(&id) {
            return Err(StoreError::Duplicate(id));
        }
        self.legs.insert(id, leg);
        Ok(StoreEvent::Created(id))
    }

    pub(super) fn update(&mut self, leg: FlightLeg) -> Result<StoreEvent, StoreError> {
        let id = leg.id();
        let slot = self.legs.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        *slot = leg;
        Ok(StoreEvent::Updated(id))
    }

    pub(super) fn delete(&mut self, id: Uuid) -> Result<(FlightLeg, StoreEvent), StoreError> {
        let leg = self.legs.remove(&id).ok_or(StoreError::NotFound(id))?;
        Ok((leg, StoreEvent::Deleted(id)))
    }

    pub(super) fn get(&self, id: Uuid) -> Option<FlightLeg> {
        self.legs.get(&id).cloned()
    }

    pub(super) fn sorted(&self) -> Vec<FlightLeg> {
        let mut legs: Vec<FlightLeg> = self.legs.values().cloned().collect();
        sort_legs(&mut legs);
        legs
    }
}

/// A store that keeps legs in memory only.
#[derive(Debug)]
pub struct MemoryStore {
    ledger: RwLock<Ledger>,
    events: broadcast::Sender<StoreEvent>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            ledger: RwLock::new(Ledger::default()),
            events: event_channel(),
        }
    }

    fn notify(&self, event: StoreEvent) {
        debug!(?event, "logbook store changed");
        // No subscribers is not an error
        let _ = self.events.send(event);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LogbookStore for MemoryStore {
    fn create(&self, leg: FlightLeg) -> Result<FlightLeg, StoreError> {
        let event = self
            .ledger
            .write()
            .map_err(|_| StoreError::Poisoned)?
            .create(leg.clone())?;
        self.notify(event);
        Ok(leg)
    }

    fn update(&self, leg: FlightLeg) -> Result<FlightLeg, StoreError> {
        let event = self
            .ledger
            .write()
            .map_err(|_| StoreError::Poisoned)?
            .update(leg.clone())?;
        self.notify(event);
        Ok(leg)
    }

    fn delete(&self, id: Uuid) -> Result<FlightLeg, StoreError> {
        let (leg, event) = self
            .ledger
            .write()
            .map_err(|_| StoreError::Poisoned)?
            .delete(id)?;
        self.notify(event);
        Ok(leg)
    }

    fn get(&self, id: Uuid) -> Result<Option<FlightLeg>, StoreError> {
        Ok(self.ledger.read().map_err(|_| StoreError::Poisoned)?.get(id))
    }

    fn query_all(&self) -> Result<Vec<FlightLeg>, StoreError> {
        Ok(self.ledger.read().map_err(|_| StoreError::Poisoned)?.sorted())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }
}
