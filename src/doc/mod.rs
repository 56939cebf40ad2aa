//! Inspection documentation - filling the CAD layout from a results file

pub mod drawing;
pub mod mapper;
pub mod table;

pub use drawing::DrawingSnapshot;
pub use mapper::{has_balance_drum, populate_table, replace_text, split_for_layout, LayoutRecords};
pub use table::{DocTable, LookupError};

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::core::host::{CadHost, HostError};
use crate::core::inspection::InspectionKind;
use crate::entities::machine::{MachineType, ProbeRules};
use crate::entities::measurement::{MeasurementError, MeasurementSet};
use crate::entities::scope::ScopeModel;

/// Project data a documentation run needs
#[derive(Debug, Clone, Copy)]
pub struct DocContext<'a> {
    pub workspace: &'a Path,
    pub machine: &'a MachineType,
    pub scope: &'a ScopeModel,
}

#[derive(Debug)]
pub struct DocReport {
    pub kind: InspectionKind,
    /// Cells filled, when the layout carries a table
    pub table_cells: Option<usize>,
    pub skipped: Vec<LookupError>,
    pub texts_replaced: usize,
    pub doc_trail: PathBuf,
}

#[derive(Debug, Error)]
pub enum DocError {
    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Measurements(#[from] MeasurementError),

    #[error("cannot write doc trail {path:?}: {message}")]
    Trail { path: PathBuf, message: String },
}

/// Document one inspection
///
/// The doc trail is only written after the drawing was regenerated, so a
/// host failure leaves the inspection undocumented.
pub fn document<H: CadHost + ?Sized>(
    host: &mut H,
    kind: InspectionKind,
    ctx: DocContext<'_>,
) -> Result<DocReport, DocError> {
    host.set_active_layout(kind.layout_name())?;

    let results = ctx.workspace.join(kind.output_file());
    let set = MeasurementSet::read(&results)?;
    let split = split_for_layout(&set.records, kind);

    let mut table_cells = None;
    let mut skipped = Vec::new();
    if kind.has_doc_table() {
        let rows = ctx.machine.feature_rows(ctx.scope);
        if rows.is_empty() {
            warn!(machine = ctx.machine.name(), "no table rows for this scope");
        } else {
            let stages = ctx.scope.labels().map(|l| l.stage_name());
            let mut table = DocTable::new(rows, stages, has_balance_drum(&split.table));
            let report = populate_table(&mut table, &split.table);
            host.insert_table(table.to_cad_table())?;
            table_cells = Some(report.filled);
            skipped = report.skipped;
        }
    }

    let texts_replaced = replace_text(host, &split.text)?;
    host.regen()?;

    let doc_trail = ctx.workspace.join(kind.doc_trail());
    std::fs::File::create(&doc_trail).map_err(|e| DocError::Trail {
        path: doc_trail.clone(),
        message: e.to_string(),
    })?;
    info!(kind = kind.name(), trail = %doc_trail.display(), "documented inspection");

    Ok(DocReport {
        kind,
        table_cells,
        skipped,
        texts_replaced,
        doc_trail,
    })
}
