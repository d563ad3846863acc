//! Orchestration of validation and persistence.
//!
//! [`Logbook`] is the only place that talks to the store. It takes drafts,
//! validates them and hands the resulting legs to whichever
//! [`LogbookStore`] it was built with.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{FlightLeg, LegDraft, ValidationError};
use crate::import::{ColumnMapping, ImportRow, ImportedLeg, RowFailure, import_rows};
use crate::stats::{self, MonthKey, Totals};
use crate::store::{LogbookStore, StoreError, StoreEvent};

/// Errors from logbook operations.
#[derive(Debug, thiserror::Error)]
pub enum LogbookError {
    /// The draft failed a business rule
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The store rejected or failed the operation
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A leg that passed validation but could not be stored during import.
#[derive(Debug)]
pub struct StoreFailure {
    pub line: usize,
    pub error: StoreError,
}

/// Result of an import that was also persisted.
#[derive(Debug, Default)]
pub struct ImportOutcome {
    /// Legs that were validated and stored.
    pub saved: Vec<FlightLeg>,
    /// Rows rejected before reaching the store.
    pub rejected: Vec<RowFailure>,
    /// Valid legs the store refused.
    pub store_failures: Vec<StoreFailure>,
}

/// The user's logbook, backed by an injected store.
#[derive(Clone)]
pub struct Logbook {
    store: Arc<dyn LogbookStore>,
}

impl Logbook {
    /// Create a logbook over `store`.
    pub fn new(store: Arc<dyn LogbookStore>) -> Self {
        Self { store }
    }

    /// Validate and persist a draft.
    ///
    /// A draft whose id is already stored replaces that leg; anything else
    /// is created.
    pub fn save(&self, draft: LegDraft) -> Result<FlightLeg, LogbookError> {
        let leg = draft.commit()?;

        let saved = if self.store.get(leg.id())?.is_some() {
            self.store.update(leg)?
        } else {
            self.store.create(leg)?
        };

        info!(
            id = %saved.id(),
            flight = saved.flight_number(),
            block = %saved.durations().block,
            "saved leg"
        );
        Ok(saved)
    }

    /// Replace an existing leg. Fails if `id` is not stored.
    pub fn update(&self, id: Uuid, mut draft: LegDraft) -> Result<FlightLeg, LogbookError> {
        draft.id = Some(id);
        let leg = draft.commit()?;
        let saved = self.store.update(leg)?;
        info!(id = %saved.id(), "updated leg");
        Ok(saved)
    }

    /// Delete a leg by id.
    pub fn delete(&self, id: Uuid) -> Result<FlightLeg, LogbookError> {
        let removed = self.store.delete(id)?;
        info!(id = %id, "deleted leg");
        Ok(removed)
    }

    /// One stored leg.
    pub fn get(&self, id: Uuid) -> Result<Option<FlightLeg>, LogbookError> {
        Ok(self.store.get(id)?)
    }

    /// Every stored leg, oldest first.
    pub fn legs(&self) -> Result<Vec<FlightLeg>, LogbookError> {
        Ok(self.store.query_all()?)
    }

    /// Import tokenized rows, storing every leg that validates.
    ///
    /// Bad rows are reported in the outcome and never stop the batch.
    pub fn import(&self, rows: &[ImportRow], mapping: &ColumnMapping) -> ImportOutcome {
        let report = import_rows(rows, mapping);
        let mut outcome = ImportOutcome {
            rejected: report.failures,
            ..ImportOutcome::default()
        };

        for ImportedLeg { line, leg } in report.legs {
            match self.store.create(leg) {
                Ok(saved) => outcome.saved.push(saved),
                Err(error) => {
                    warn!(line, %error, "store refused imported leg");
                    outcome.store_failures.push(StoreFailure { line, error });
                }
            }
        }

        info!(
            saved = outcome.saved.len(),
            rejected = outcome.rejected.len(),
            store_failures = outcome.store_failures.len(),
            "import finished"
        );
        outcome
    }

    /// Totals over the whole logbook.
    pub fn all_time_totals(&self) -> Result<Totals, LogbookError> {
        Ok(stats::all_time_totals(&self.legs()?))
    }

    /// Totals per month of the flight date.
    pub fn monthly_totals(&self) -> Result<BTreeMap<MonthKey, Totals>, LogbookError> {
        Ok(stats::monthly_totals(&self.legs()?))
    }

    /// Subscribe to store changes.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.store.subscribe()
    }
}

impl std::fmt::Debug for Logbook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logbook").finish_non_exhaustive()
    }
}
