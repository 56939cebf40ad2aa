//! Shared helper functions for CLI commands
//!
//! Project lookup, host wiring and table output used by several command
//! modules.

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::{Path, PathBuf};
use tabled::{builder::Builder, settings::Style};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::Config;
use crate::core::fs::write_atomic;
use crate::core::host::{macro_path, CmmHost, MacroCommand, SpoolCmm};
use crate::core::inspection::{InspectionKind, MACRO_OUT};
use crate::core::project::{Project, ProjectError};

/// Open the project named by `--project`, or discover one from the current directory
pub fn open_project(global: &GlobalOpts) -> Result<Project> {
    let project = match &global.project {
        Some(path) => Project::discover_from(path),
        None => Project::discover(),
    };
    project.map_err(|e| miette::miette!("{}", e))
}

pub fn load_config(project: &Project) -> Config {
    Config::load(Some(project.workspace()))
}

/// Send the inspection's scope file to the CMM
///
/// Runs the inspection's input macro with the scope file and, when
/// configured, the macro directory.
pub fn send_scope(project: &Project, kind: InspectionKind, config: &Config) -> Result<()> {
    let Some(macro_in) = kind.macro_in() else {
        return Err(miette::miette!("{} inspections are not run on the CMM", kind.label()));
    };
    let command = build_command(
        config.macros.as_deref(),
        macro_in,
        project.workspace_file(&kind.scope_file()),
    );
    execute(config, &command)
}

/// Ask the CMM to export the inspection results into the workspace
pub fn send_finish(project: &Project, kind: InspectionKind, config: &Config) -> Result<()> {
    let command = build_command(
        config.macros.as_deref(),
        MACRO_OUT,
        project.workspace_file(&kind.output_file()),
    );
    execute(config, &command)
}

fn build_command(macros: Option<&Path>, file: &str, target: PathBuf) -> MacroCommand {
    let command = MacroCommand::new(macro_path(macros, file)).arg(target);
    match macros {
        Some(dir) => command.arg(dir),
        None => command,
    }
}

fn execute(config: &Config, command: &MacroCommand) -> Result<()> {
    let mut cmm = SpoolCmm::new(config.cmm_spool.clone());
    cmm.execute(command).map_err(|e| miette::miette!("{}", e))?;
    if let Some(spool) = &config.cmm_spool {
        println!(
            "{} Sent {} to {}",
            style("✓").green(),
            style(command.render()).dim(),
            style(spool.display()).cyan()
        );
    }
    Ok(())
}

/// Copy a template's scope file from a reference project into this workspace
///
/// `from` may be a project file or a directory holding one. When it resolves
/// to a project, its filename is recorded as this project's reference.
pub fn import_template(project: &mut Project, kind: InspectionKind, from: &Path) -> Result<PathBuf> {
    let source_dir = if from.is_file() {
        from.parent().map(Path::to_path_buf).unwrap_or_default()
    } else {
        from.to_path_buf()
    };
    let source = source_dir.join(kind.scope_file());
    if !source.is_file() {
        return Err(miette::miette!(
            "no {} in {}",
            kind.scope_file(),
            source_dir.display()
        ));
    }

    let target = project.workspace_file(&kind.scope_file());
    std::fs::copy(&source, &target).into_diagnostic()?;
    tracing::info!(from = %source.display(), to = %target.display(), "imported template");

    match Project::open_in(from) {
        Ok(reference) => {
            project.definition_mut().ref_filename = Some(reference.definition().filename.clone());
            project.save().map_err(|e| miette::miette!("{}", e))?;
        }
        Err(ProjectError::NotFound { .. }) => {}
        Err(e) => tracing::warn!(error = %e, "template source has no readable project"),
    }
    Ok(target)
}

/// Build the contents in memory, then replace the file atomically
pub fn write_buffered<F>(path: &Path, build: F) -> Result<()>
where
    F: FnOnce(&mut Vec<u8>) -> Result<()>,
{
    let mut buffer = Vec::new();
    build(&mut buffer)?;
    write_atomic(path, buffer).into_diagnostic()?;
    tracing::debug!(path = %path.display(), "wrote file");
    Ok(())
}

/// Render rows as a table in the requested format
pub fn render_table<H, R>(format: OutputFormat, headers: H, rows: R) -> Result<String>
where
    H: IntoIterator,
    H::Item: Into<String>,
    R: IntoIterator,
    R::Item: IntoIterator,
    <R::Item as IntoIterator>::Item: Into<String>,
{
    let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
    let rows: Vec<Vec<String>> = rows
        .into_iter()
        .map(|r| r.into_iter().map(Into::into).collect())
        .collect();

    if format == OutputFormat::Csv {
        let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(Vec::new());
        wtr.write_record(&headers).into_diagnostic()?;
        for row in &rows {
            wtr.write_record(row).into_diagnostic()?;
        }
        let bytes = wtr.into_inner().map_err(|e| miette::miette!("{}", e))?;
        return String::from_utf8(bytes).into_diagnostic();
    }

    let mut builder = Builder::default();
    builder.push_record(headers);
    for row in rows {
        builder.push_record(row);
    }
    let mut table = builder.build();
    let rendered = match format {
        OutputFormat::Md => table.with(Style::markdown()).to_string(),
        _ => table.with(Style::sharp()).to_string(),
    };
    Ok(format!("{}\n", rendered))
}
