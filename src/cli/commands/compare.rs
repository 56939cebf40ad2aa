//! `rotoworks compare` command - Compare results against a reference job

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::{Path, PathBuf};

use crate::cli::helpers::{open_project, render_table};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::fs::write_atomic;
use crate::core::inspection::InspectionKind;
use crate::core::project::Project;
use crate::entities::measurement::{Comparison, MeasurementSet};

#[derive(clap::Args, Debug)]
pub struct CompareArgs {
    /// Reference project file or workspace
    #[arg(long, short = 'r')]
    pub reference: PathBuf,

    /// Inspection whose results are compared
    #[arg(long, short = 'k', value_enum)]
    pub inspection: InspectionKind,

    /// Write the comparison as CSV instead of printing it
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: CompareArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let reference = Project::open_in(&args.reference).map_err(|e| miette::miette!("{}", e))?;

    let results = |workspace: &Path| -> Result<_> {
        let set = MeasurementSet::read(&workspace.join(args.inspection.output_file()))
            .map_err(|e| miette::miette!("{}", e))?;
        Ok(set.normalized())
    };
    let current = results(project.workspace())?;
    let previous = results(reference.workspace())?;

    let comparison = Comparison::build(
        &project.definition().job_number,
        &reference.definition().job_number,
        &current,
        &previous,
    );

    if let Some(path) = &args.output {
        let mut buffer = Vec::new();
        comparison
            .write_csv(&mut buffer)
            .map_err(|e| miette::miette!("{}", e))?;
        write_atomic(path, buffer).into_diagnostic()?;
        println!(
            "{} Comparison written to {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
        return Ok(());
    }

    match global.format {
        OutputFormat::Json => {
            let rows: Vec<_> = comparison
                .rows
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "name": r.name,
                        "meas": r.meas,
                        "reference": r.reference,
                        "deviation": r.deviation,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows).into_diagnostic()?);
        }
        format => {
            let rows = comparison.string_rows().into_iter().map(Vec::from);
            print!("{}", render_table(format, comparison.headers(), rows)?);
            let unmatched = comparison.rows.iter().filter(|r| r.reference.is_none()).count();
            if unmatched > 0 && !global.quiet {
                println!(
                    "{} {} measurement(s) have no reference value",
                    style("!").yellow(),
                    unmatched
                );
            }
        }
    }
    Ok(())
}
