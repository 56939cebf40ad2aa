//! `rotoworks scope` command - Per-stage feature scope

use clap::{Subcommand, ValueEnum};
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::{Path, PathBuf};

use crate::cli::helpers::{open_project, render_table};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::project::Project;
use crate::entities::machine::{MachineType, StageLabel};
use crate::entities::scope::ScopeError;

#[derive(Subcommand, Debug)]
pub enum ScopeCommands {
    /// Show the scope grid
    Show,

    /// Set the number of stages, keeping flags of stages that remain
    Resize {
        /// New stage count
        #[arg(allow_hyphen_values = true)]
        count: String,
    },

    /// Turn one feature of one stage on or off
    Set {
        /// Stage label ("1", "Stage 2", "C1")
        stage: String,

        /// Feature name or 1-based column number
        feature: String,

        /// New state
        #[arg(value_enum)]
        state: FlagState,
    },

    /// Replace the whole grid from a CSV file (stage label, then 0/1 per feature)
    ApplyGrid {
        /// CSV file, optionally with a "Stage,..." header row
        file: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlagState {
    On,
    Off,
}

pub fn run(cmd: ScopeCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ScopeCommands::Show => run_show(global),
        ScopeCommands::Resize { count } => run_resize(&count, global),
        ScopeCommands::Set {
            stage,
            feature,
            state,
        } => run_set(&stage, &feature, state, global),
        ScopeCommands::ApplyGrid { file } => run_apply_grid(&file, global),
    }
}

fn run_show(global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let machine = project.machine();
    let scope = project.scope();

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(scope).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(scope).into_diagnostic()?);
        }
        format => {
            if machine.scope_width() == 0 {
                println!("{} machines have no feature scope", machine.name());
                return Ok(());
            }
            let mark = if format == OutputFormat::Csv { "1" } else { "x" };
            let blank = if format == OutputFormat::Csv { "0" } else { "" };
            let rows = scope.iter().map(|(label, flags)| {
                std::iter::once(label.to_string())
                    .chain(flags.iter().map(|f| (if *f == 1 { mark } else { blank }).to_string()))
                    .collect::<Vec<_>>()
            });
            print!("{}", render_table(format, machine.feature_list(), rows)?);
            if format == OutputFormat::Auto && !global.quiet {
                println!("{} stage(s)", scope.len());
            }
        }
    }
    Ok(())
}

fn run_resize(count: &str, global: &GlobalOpts) -> Result<()> {
    let mut project = open_project(global)?;
    let shape = project.scope_shape();
    let count = project
        .scope_mut()
        .resize_from_input(shape, count)
        .map_err(|e| miette::miette!("{}", e))?;
    save(&project)?;

    if !global.quiet {
        println!("{} Scope now has {} stage(s)", style("✓").green(), count);
    }
    Ok(())
}

fn run_set(stage: &str, feature: &str, state: FlagState, global: &GlobalOpts) -> Result<()> {
    let mut project = open_project(global)?;
    let column = feature_column(project.machine(), feature)?;
    let label = StageLabel::from_stage_name(stage);
    project
        .scope_mut()
        .set_flag(&label, column, state == FlagState::On)
        .map_err(|e| miette::miette!("{}", e))?;
    save(&project)?;

    if !global.quiet {
        println!(
            "{} {} {} {}",
            style("✓").green(),
            label.stage_name(),
            style(project.machine().scope_columns[column]).cyan(),
            if state == FlagState::On { "on" } else { "off" }
        );
    }
    Ok(())
}

/// Resolve a feature by name (case-insensitive) or 1-based column number
fn feature_column(machine: &MachineType, feature: &str) -> Result<usize> {
    let wanted = feature.trim();
    if let Some(index) = machine
        .scope_columns
        .iter()
        .position(|c| c.eq_ignore_ascii_case(wanted))
    {
        return Ok(index);
    }
    match wanted.parse::<usize>() {
        Ok(n) if (1..=machine.scope_width()).contains(&n) => Ok(n - 1),
        _ => Err(miette::miette!(
            "unknown feature '{}' for {} (features: {})",
            wanted,
            machine.name(),
            machine.scope_columns.join(", ")
        )),
    }
}

fn run_apply_grid(file: &Path, global: &GlobalOpts) -> Result<()> {
    let mut project = open_project(global)?;
    let contents = std::fs::read_to_string(file).into_diagnostic()?;
    let grid = parse_grid(&contents, project.scope().labels().cloned().collect())?;
    project
        .scope_mut()
        .apply_editable_grid(&grid)
        .map_err(|e| miette::miette!("{}", e))?;
    save(&project)?;

    if !global.quiet {
        println!("{} Applied grid for {} stage(s)", style("✓").green(), grid.len());
    }
    Ok(())
}

/// Parse grid rows, checking each row's stage label against the scope
fn parse_grid(contents: &str, labels: Vec<StageLabel>) -> Result<Vec<Vec<bool>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(contents.as_bytes());

    let mut grid = Vec::new();
    let mut expected = labels.iter();
    for record in reader.records() {
        let record = record.into_diagnostic()?;
        let Some(first) = record.get(0) else {
            continue;
        };
        if grid.is_empty() && first.eq_ignore_ascii_case("stage") {
            continue;
        }

        let found = StageLabel::from_stage_name(first);
        let wanted = expected.next().ok_or_else(|| {
            miette::miette!(
                "{}",
                ScopeError::GridShape {
                    expected: labels.len(),
                    found: labels.len() + 1,
                }
            )
        })?;
        if &found != wanted {
            return Err(miette::miette!(
                "{}",
                ScopeError::UnexpectedStage {
                    found: found.to_string(),
                    expected: wanted.to_string(),
                }
            ));
        }

        let flags = record
            .iter()
            .skip(1)
            .map(|cell| match cell {
                "1" | "x" | "X" => Ok(true),
                "0" | "" => Ok(false),
                other => Err(miette::miette!("grid cell '{}' must be 0 or 1", other)),
            })
            .collect::<Result<Vec<bool>>>()?;
        grid.push(flags);
    }
    Ok(grid)
}

fn save(project: &Project) -> Result<()> {
    project.save().map_err(|e| miette::miette!("{}", e))
}
