//! Aggregation engine for petvet.
//!
//! One run fetches the pet collection, fans out one vet fetch per pet that
//! carries a vet id, joins every outcome, and delivers the validated
//! [`PetVetRow`]s exactly once.
//!
//! ```text
//! pets() ──> [pet, pet, pet(no vet), ...]
//!              │     │
//!              ▼     ▼                      one task per vet id
//!            vet(1) vet(2) ... ──Lease──> FetchGroup (single collector)
//!                                              │
//!                                              ▼
//!                           PetVetRow::try_build per pair, drops recorded
//!                                              │
//!                                              ▼
//!                                    on_complete(rows)   (once)
//! ```
//!
//! # Failure model
//!
//! Nothing propagates. A failed or empty pet fetch completes with no rows and
//! dispatches nothing. A failed, absent, or invalid vet drops only its own
//! pair. [`Aggregation`] records what was dropped for callers that care; the
//! row-only entry point [`aggregate`] does not expose it.
//!
//! # Concurrency
//!
//! Vet fetches run as independent tokio tasks, uncapped unless
//! [`AggregateOptions::max_in_flight`] is set. Outcomes funnel over a channel
//! into the one collector that owns the accumulator. Completion callbacks run
//! on the run's driver task.

mod join;
mod options;
mod report;

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::Instrument;

pub use join::{FetchGroup, JoinStats, Lease, Outcome};
pub use options::{AggregateOptions, ResultOrder};
pub use petvet_providers::{self, FetchError, PetService};
pub use petvet_types::{PetRecord, PetVetRow, RowError, VetId, VetRecord};
pub use report::{Aggregation, DropReason, DroppedPet, PrimaryStatus};

type VetOutcome = Result<Option<VetRecord>, FetchError>;

#[derive(Debug, Clone, Copy)]
struct Slot {
    index: usize,
    vet_id: VetId,
}

/// Run one aggregation in the background and hand the rows to `on_complete`.
///
/// Returns immediately. `on_complete` is called exactly once, after every
/// dispatched vet fetch has reported, with a possibly empty row set.
///
/// # Panics
///
/// Must be called from within a tokio runtime.
pub fn aggregate<S, F>(service: Arc<S>, on_complete: F) -> JoinHandle<()>
where
    S: PetService + ?Sized + 'static,
    F: FnOnce(Vec<PetVetRow>) + Send + 'static,
{
    aggregate_with(service, AggregateOptions::default(), move |aggregation| {
        on_complete(aggregation.rows);
    })
}

/// [`aggregate`] with options and the full [`Aggregation`] report.
///
/// # Panics
///
/// Must be called from within a tokio runtime.
pub fn aggregate_with<S, F>(
    service: Arc<S>,
    options: AggregateOptions,
    on_complete: F,
) -> JoinHandle<()>
where
    S: PetService + ?Sized + 'static,
    F: FnOnce(Aggregation) + Send + 'static,
{
    tokio::spawn(async move {
        let aggregation = collect(service, options).await;
        on_complete(aggregation);
    })
}

/// Await one aggregation run directly.
pub async fn collect<S>(service: Arc<S>, options: AggregateOptions) -> Aggregation
where
    S: PetService + ?Sized + 'static,
{
    let span = tracing::debug_span!(
        "aggregate",
        max_in_flight = options.max_in_flight.map(std::num::NonZeroUsize::get),
        order = options.order.as_str()
    );
    run(service, options).instrument(span).await
}

async fn run<S>(service: Arc<S>, options: AggregateOptions) -> Aggregation
where
    S: PetService + ?Sized + 'static,
{
    let pets = match service.pets().await {
        Ok(Some(pets)) => pets,
        Ok(None) => return finish_without_fan_out(PrimaryStatus::NoData),
        Err(e) => return finish_without_fan_out(PrimaryStatus::Failed(e)),
    };

    let limiter = options
        .max_in_flight
        .map(|limit| Arc::new(Semaphore::new(limit.get())));

    let mut group: FetchGroup<Slot, VetOutcome> = FetchGroup::new();
    let mut skipped_without_vet = 0;
    for (index, pet) in pets.iter().enumerate() {
        let Some(vet_id) = pet.vet_id() else {
            skipped_without_vet += 1;
            continue;
        };
        let lease = group.enter(Slot { index, vet_id });
        let service = Arc::clone(&service);
        let limiter = limiter.clone();
        tokio::spawn(
            async move {
                let _permit = match limiter {
                    Some(limiter) => limiter.acquire_owned().await.ok(),
                    None => None,
                };
                let outcome = service.vet(vet_id).await;
                lease.leave(outcome);
            }
            .in_current_span(),
        );
    }

    let dispatched = group.entered();
    tracing::debug!(
        pets = pets.len(),
        dispatched,
        skipped_without_vet,
        "Dispatched vet fetches"
    );

    let mut rows: Vec<(usize, PetVetRow)> = Vec::with_capacity(dispatched);
    let mut dropped = Vec::new();
    let stats = group
        .join(|slot, outcome| {
            let pet = &pets[slot.index];
            let reason = match outcome {
                Outcome::Left(Ok(Some(vet))) => match PetVetRow::try_build(pet, &vet) {
                    Ok(row) => {
                        rows.push((slot.index, row));
                        return;
                    }
                    Err(e) => DropReason::Invalid(e),
                },
                Outcome::Left(Ok(None)) => DropReason::VetMissing,
                Outcome::Left(Err(e)) => DropReason::FetchFailed(e),
                Outcome::Abandoned => DropReason::TaskLost,
            };
            dropped.push(DroppedPet {
                index: slot.index,
                vet_id: slot.vet_id,
                reason,
            });
        })
        .await;

    if options.order == ResultOrder::Primary {
        rows.sort_by_key(|(index, _)| *index);
        dropped.sort_by_key(|d| d.index);
    }

    tracing::info!(
        pets = pets.len(),
        dispatched,
        rows = rows.len(),
        dropped = dropped.len(),
        abandoned = stats.abandoned,
        "Aggregation complete"
    );

    Aggregation {
        rows: rows.into_iter().map(|(_, row)| row).collect(),
        primary: PrimaryStatus::Fetched { count: pets.len() },
        dispatched,
        skipped_without_vet,
        dropped,
    }
}

fn finish_without_fan_out(primary: PrimaryStatus) -> Aggregation {
    tracing::info!(
        rows = 0,
        dispatched = 0,
        "Aggregation complete without fan-out"
    );
    Aggregation::without_fan_out(primary)
}
