//! `rotoworks thermal-gap` and `rotoworks weights` - hand-entered inspections

use console::style;
use miette::Result;

use crate::cli::helpers::{open_project, write_buffered};
use crate::cli::GlobalOpts;
use crate::core::inspection::InspectionKind;
use crate::entities::measurement::write_name_meas;
use crate::session::manual::{parse_weight, rotor_weight_rows, thermal_gap_rows};

#[derive(clap::Args, Debug)]
pub struct ThermalGapArgs {
    /// Gap values in order (TG1, TG2, ...), each between 0.0 and 1.0
    #[arg(required = true, allow_hyphen_values = true)]
    pub values: Vec<f64>,
}

#[derive(clap::Args, Debug)]
pub struct WeightsArgs {
    /// Thrust end journal weight (blank counts as 0)
    #[arg(long = "te", default_value = "")]
    pub te: String,

    /// Non-thrust end journal weight (blank counts as 0)
    #[arg(long = "nte", default_value = "")]
    pub nte: String,
}

pub fn run_thermal_gap(args: ThermalGapArgs, global: &GlobalOpts) -> Result<()> {
    let rows = thermal_gap_rows(&args.values).map_err(|e| miette::miette!("{}", e))?;
    write_rows(InspectionKind::ThermalGap, &rows, global)
}

pub fn run_weights(args: WeightsArgs, global: &GlobalOpts) -> Result<()> {
    let te = parse_weight("TEW", &args.te).map_err(|e| miette::miette!("{}", e))?;
    let nte = parse_weight("NTEW", &args.nte).map_err(|e| miette::miette!("{}", e))?;
    let rows = rotor_weight_rows(te, nte).map_err(|e| miette::miette!("{}", e))?;
    write_rows(InspectionKind::RotorWeight, &rows, global)
}

fn write_rows(kind: InspectionKind, rows: &[(String, String)], global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let path = project.workspace_file(&kind.output_file());
    write_buffered(&path, |buffer| {
        write_name_meas(buffer, rows).map_err(|e| miette::miette!("{}", e))
    })?;

    if !global.quiet {
        for (name, meas) in rows {
            println!("  {} = {}", style(name).cyan(), meas);
        }
        println!(
            "{} Saved {} to {}",
            style("✓").green(),
            kind.label(),
            style(path.display()).cyan()
        );
    }
    Ok(())
}
