//! What one aggregation run produced, and what it silently dropped.

use petvet_providers::FetchError;
use petvet_types::{PetVetRow, RowError, VetId};

/// How the pet collection fetch went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimaryStatus {
    /// The collection decoded; `count` pets, possibly zero.
    Fetched { count: usize },
    /// The server answered without data.
    NoData,
    Failed(FetchError),
}

/// Why a pet with a vet id produced no row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    FetchFailed(FetchError),
    /// The vet fetch succeeded but had no record.
    VetMissing,
    Invalid(RowError),
    /// The fetch task ended without reporting (panicked or was cancelled).
    TaskLost,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedPet {
    /// Position in the pet collection.
    pub index: usize,
    pub vet_id: VetId,
    pub reason: DropReason,
}

/// Result of one run.
///
/// `rows` is the plain contract. The remaining fields let a caller tell
/// "nothing was eligible" apart from "everything failed".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    pub rows: Vec<PetVetRow>,
    pub primary: PrimaryStatus,
    /// Vet fetches issued, one per pet carrying a vet id.
    pub dispatched: usize,
    pub skipped_without_vet: usize,
    pub dropped: Vec<DroppedPet>,
}

impl Aggregation {
    pub(crate) fn without_fan_out(primary: PrimaryStatus) -> Self {
        Self {
            rows: Vec::new(),
            primary,
            dispatched: 0,
            skipped_without_vet: 0,
            dropped: Vec::new(),
        }
    }

    /// True when the collection fetched and every dispatched pair became a row.
    #[must_use]
    pub fn is_complete_success(&self) -> bool {
        matches!(self.primary, PrimaryStatus::Fetched { .. }) && self.dropped.is_empty()
    }

    #[must_use]
    pub fn failed_fetches(&self) -> usize {
        self.dropped
            .iter()
            .filter(|d| matches!(d.reason, DropReason::FetchFailed(_) | DropReason::TaskLost))
            .count()
    }
}
