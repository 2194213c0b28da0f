//! Rendering of rows and the drop report.

use std::io::{self, Write};

use petvet_engine::{Aggregation, DropReason, PetVetRow, PrimaryStatus};

pub fn write_rows(out: &mut impl Write, rows: &[PetVetRow]) -> io::Result<()> {
    for row in rows {
        writeln!(out, "{}\t{}", row.pet_name(), row.vet_name_and_title())?;
    }
    Ok(())
}

pub fn write_json(out: &mut impl Write, rows: &[PetVetRow]) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, rows)?;
    writeln!(out)
}

pub fn write_report(out: &mut impl Write, aggregation: &Aggregation) -> io::Result<()> {
    match &aggregation.primary {
        PrimaryStatus::Fetched { count } => writeln!(
            out,
            "pets: {count}, vet fetches: {}, without vet: {}, rows: {}, dropped: {}",
            aggregation.dispatched,
            aggregation.skipped_without_vet,
            aggregation.rows.len(),
            aggregation.dropped.len()
        )?,
        PrimaryStatus::NoData => writeln!(out, "pets: service returned no data")?,
        PrimaryStatus::Failed(e) => writeln!(out, "pets: fetch failed: {e}")?,
    }

    for dropped in &aggregation.dropped {
        writeln!(
            out,
            "  dropped pet #{} (vet {}): {}",
            dropped.index,
            dropped.vet_id,
            describe(&dropped.reason)
        )?;
    }
    Ok(())
}

fn describe(reason: &DropReason) -> String {
    match reason {
        DropReason::FetchFailed(e) if e.retryable() => format!("{e} (transient)"),
        DropReason::FetchFailed(e) => e.to_string(),
        DropReason::VetMissing => "vet not found".to_string(),
        DropReason::Invalid(e) => e.to_string(),
        DropReason::TaskLost => "fetch task ended without a result".to_string(),
    }
}
