//! `rotoworks status` command - Project and inspection status

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{open_project, render_table};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::inspection::workspace_status;
use crate::core::project::Project;
use crate::session::{self, AxialSession, DiameterSession};

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    /// Also list queued session targets
    #[arg(long)]
    pub detailed: bool,
}

pub fn run(args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let definition = project.definition();
    let inspections = workspace_status(project.workspace());
    let (axial, diameter) = sessions(&project)?;

    match global.format {
        OutputFormat::Json => {
            let status = serde_json::json!({
                "project": definition,
                "stages": project.scope().len(),
                "inspections": inspections,
                "queued": {
                    "axial": axial.targets.iter().map(|t| t.to_string()).collect::<Vec<_>>(),
                    "diameter": diameter.labels,
                },
            });
            println!("{}", serde_json::to_string_pretty(&status).into_diagnostic()?);
        }
        format => {
            println!("{}", style(&definition.filename).bold().underlined());
            println!("  Job:      {}", definition.job_number);
            println!("  Phase:    {}", definition.phase);
            match &definition.sub_type {
                Some(sub) => println!("  Machine:  {} ({})", definition.machine_type, sub),
                None => println!("  Machine:  {}", definition.machine_type),
            }
            if definition.is_curtis {
                println!("  Curtis:   yes");
            }
            if let Some(author) = &definition.created_by {
                println!("  Created:  {}", author);
            }
            if let Some(reference) = &definition.ref_filename {
                println!("  Template: {}", reference);
            }
            println!("  Stages:   {}", project.scope().len());
            println!();

            let check = |done: bool| if done { "✓" } else { "-" };
            let rows = inspections.iter().map(|s| {
                vec![
                    s.kind.label().to_string(),
                    check(s.measured).to_string(),
                    check(s.documented).to_string(),
                ]
            });
            print!(
                "{}",
                render_table(format, ["Inspection", "Measured", "Documented"], rows)?
            );

            if args.detailed || !global.quiet {
                println!();
                println!("Queued axial targets: {}", axial.targets.len());
                if args.detailed {
                    for target in &axial.targets {
                        println!("  {}", target);
                    }
                }
                println!("Queued diameter labels: {}", diameter.labels.len());
                if args.detailed && !diameter.labels.is_empty() {
                    println!("  {}", diameter.labels.join(", "));
                }
            }
        }
    }
    Ok(())
}

fn sessions(project: &Project) -> Result<(AxialSession, DiameterSession)> {
    let axial = session::load(&project.workspace_file(session::AXIAL_SESSION_FILE))
        .map_err(|e| miette::miette!("{}", e))?;
    let diameter = session::load(&project.workspace_file(session::DIAMETER_SESSION_FILE))
        .map_err(|e| miette::miette!("{}", e))?;
    Ok((axial, diameter))
}
