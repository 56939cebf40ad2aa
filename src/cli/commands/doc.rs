//! `rotoworks doc` command - Document results on the CAD drawing

use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{load_config, open_project};
use crate::cli::GlobalOpts;
use crate::core::inspection::InspectionKind;
use crate::doc::{self, DocContext, DrawingSnapshot};

#[derive(clap::Args, Debug)]
pub struct DocArgs {
    /// Inspection to document
    #[arg(value_enum)]
    pub kind: InspectionKind,

    /// Drawing export to update (default: `drawing` from the config)
    #[arg(long)]
    pub drawing: Option<PathBuf>,
}

pub fn run(args: DocArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let drawing = match args.drawing {
        Some(path) => path,
        None => load_config(&project).drawing.ok_or_else(|| {
            miette::miette!(
                "No drawing configured (use --drawing or set 'drawing' in rotoworks.yaml)"
            )
        })?,
    };

    let mut host = DrawingSnapshot::open(&drawing).map_err(|e| miette::miette!("{}", e))?;
    let ctx = DocContext {
        workspace: project.workspace(),
        machine: project.machine(),
        scope: project.scope(),
    };
    let report = doc::document(&mut host, args.kind, ctx).map_err(|e| miette::miette!("{}", e))?;

    if !global.quiet {
        if let Some(cells) = report.table_cells {
            println!("  {} table cell(s) filled", cells);
        }
        for skipped in &report.skipped {
            println!("  {} {}", style("skipped").yellow(), skipped);
        }
        println!("  {} placeholder text(s) replaced", report.texts_replaced);
        println!(
            "{} Documented {} on {}",
            style("✓").green(),
            report.kind.label(),
            style(drawing.display()).cyan()
        );
    }
    Ok(())
}
