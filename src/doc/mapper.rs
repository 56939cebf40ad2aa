//! Mapping of measurement records onto a drawing's table and placeholder texts

use tracing::{debug, info};

use crate::core::host::{CadHost, HostError};
use crate::core::inspection::InspectionKind;
use crate::doc::table::{DocTable, LookupError, BALANCE_DRUM_RECORD};
use crate::entities::measurement::{Measurement, CONTROL_3D_DISTANCE};

/// Records split by where they land in the layout
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutRecords {
    pub table: Vec<Measurement>,
    pub text: Vec<Measurement>,
}

/// Split results into table and placeholder-text records
///
/// Axial results keep only 3D distances that are not reference features.
/// Table records exclude "To Distance" names and generic widths ("Width "
/// but not "G.P. Width"); text records are names without a `-`, renamed to
/// their last word so they match the placeholder text. Other inspections
/// are text only.
pub fn split_for_layout(records: &[Measurement], kind: InspectionKind) -> LayoutRecords {
    if !kind.has_doc_table() {
        return LayoutRecords {
            table: Vec::new(),
            text: records.to_vec(),
        };
    }

    let measured: Vec<&Measurement> = records
        .iter()
        .filter(|m| m.control.as_deref() == Some(CONTROL_3D_DISTANCE))
        .filter(|m| !m.name.contains("Ref"))
        .collect();

    let table = measured
        .iter()
        .filter(|m| !m.name.contains("To Distance") && !m.name.contains("Width "))
        .map(|m| (*m).clone())
        .collect();

    let text = measured
        .iter()
        .filter(|m| !m.name.contains('-'))
        .map(|m| {
            let mut record = (*m).clone();
            if let Some(last) = m.name.split(' ').next_back() {
                record.name = last.to_string();
            }
            record
        })
        .collect();

    LayoutRecords { table, text }
}

pub fn has_balance_drum(records: &[Measurement]) -> bool {
    records.iter().any(|m| m.name == BALANCE_DRUM_RECORD)
}

/// Outcome of filling a table
#[derive(Debug, Default)]
pub struct PopulateReport {
    pub filled: usize,
    /// Records that could not be placed; the run continues without them
    pub skipped: Vec<LookupError>,
}

pub fn populate_table(table: &mut DocTable, records: &[Measurement]) -> PopulateReport {
    let mut report = PopulateReport::default();
    for record in records {
        match table.position(&record.name) {
            Ok((row, col)) => {
                table.set(row, col, record.meas_text());
                report.filled += 1;
            }
            Err(e) => {
                debug!(error = %e, "skipping record");
                report.skipped.push(e);
            }
        }
    }
    report
}

/// Overwrite placeholder texts whose content equals a record name
///
/// The first record with a matching name wins. Placeholders without a
/// matching record are left alone.
pub fn replace_text<H: CadHost + ?Sized>(
    host: &mut H,
    records: &[Measurement],
) -> Result<usize, HostError> {
    let mut replaced = 0;
    for object in host.text_objects()? {
        if let Some(record) = records.iter().find(|m| m.name == object.text) {
            host.set_text(&object.id, &record.meas_text())?;
            replaced += 1;
        }
    }
    info!(replaced, "replaced placeholder texts");
    Ok(replaced)
}
