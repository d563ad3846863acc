//! Persistence for validated legs.
//!
//! The store is an injected collaborator: callers hand it legs that have
//! already been normalized and validated. Two implementations ship with the
//! crate, an in-memory map and a JSON file.

mod error;
mod file;
mod memory;

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::domain::FlightLeg;

pub use error::StoreError;
pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// Capacity of the change-notification channel.
const EVENT_CAPACITY: usize = 64;

/// A change to the stored logbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum StoreEvent {
    Created(Uuid),
    Updated(Uuid),
    Deleted(Uuid),
}

/// Storage for flight legs.
///
/// Implementations must be safe to share between request handlers.
pub trait LogbookStore: Send + Sync {
    /// Insert a new leg. Fails if the id already exists.
    fn create(&self, leg: FlightLeg) -> Result<FlightLeg, StoreError>;

    /// Replace an existing leg. Fails if the id is unknown.
    fn update(&self, leg: FlightLeg) -> Result<FlightLeg, StoreError>;

    /// Remove a leg, returning it.
    fn delete(&self, id: Uuid) -> Result<FlightLeg, StoreError>;

    /// Fetch one leg.
    fn get(&self, id: Uuid) -> Result<Option<FlightLeg>, StoreError>;

    /// All legs, ordered by OUT instant.
    fn query_all(&self) -> Result<Vec<FlightLeg>, StoreError>;

    /// Subscribe to change notifications.
    fn subscribe(&self) -> broadcast::Receiver<StoreEvent>;
}

fn event_channel() -> broadcast::Sender<StoreEvent> {
    broadcast::channel(EVENT_CAPACITY).0
}

/// Sort legs oldest first, breaking ties by id for a stable order.
fn sort_legs(legs: &mut [FlightLeg]) {
    legs.sort_by(|a, b| {
        a.times()
            .out
            .cmp(&b.times().out)
            .then_with(|| a.id().cmp(&b.id()))
    });
}
