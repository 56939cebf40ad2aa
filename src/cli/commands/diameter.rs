//! `rotoworks diameter` command - Build and publish the diameter workscope

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::helpers::{
    import_template, load_config, open_project, render_table, send_finish, send_scope,
    write_buffered,
};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::inspection::InspectionKind;
use crate::core::project::Project;
use crate::session::{self, DiameterSession, SessionState};

#[derive(Subcommand, Debug)]
pub enum DiameterCommands {
    /// Show the queued labels
    List,

    /// Queue labels or label ranges ("B", "C*P", "A-D", "A-C*H")
    Add {
        #[arg(required = true)]
        input: Vec<String>,
    },

    /// Remove queued labels
    Rm {
        #[arg(required = true)]
        items: Vec<String>,
    },

    /// Write DiameterScope.csv, send it to the CMM and clear the queue
    Publish {
        /// Write the scope file without sending it
        #[arg(long)]
        no_send: bool,
    },

    /// Ask the CMM to export the diameter results
    Finish,

    /// Copy DiameterScope.csv from a reference project and send it
    Import {
        /// Reference project file or workspace
        #[arg(long)]
        from: PathBuf,

        /// Copy without sending
        #[arg(long)]
        no_send: bool,
    },
}

pub fn run(cmd: DiameterCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        DiameterCommands::List => run_list(global),
        DiameterCommands::Add { input } => run_add(&input, global),
        DiameterCommands::Rm { items } => run_rm(&items, global),
        DiameterCommands::Publish { no_send } => run_publish(no_send, global),
        DiameterCommands::Finish => {
            let project = open_project(global)?;
            send_finish(&project, InspectionKind::Diameter, &load_config(&project))
        }
        DiameterCommands::Import { from, no_send } => {
            let mut project = open_project(global)?;
            let target = import_template(&mut project, InspectionKind::Diameter, &from)?;
            if !global.quiet {
                println!("{} Imported {}", style("✓").green(), style(target.display()).cyan());
            }
            if !no_send {
                send_scope(&project, InspectionKind::Diameter, &load_config(&project))?;
            }
            Ok(())
        }
    }
}

fn session_path(project: &Project) -> PathBuf {
    project.workspace_file(session::DIAMETER_SESSION_FILE)
}

fn load_session(project: &Project) -> Result<DiameterSession> {
    session::load(&session_path(project)).map_err(|e| miette::miette!("{}", e))
}

fn save_session(project: &Project, session: &DiameterSession) -> Result<()> {
    session::save(&session_path(project), session).map_err(|e| miette::miette!("{}", e))
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let session = load_session(&project)?;

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&session.labels).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&session).into_diagnostic()?);
        }
        format => {
            if session.state() == SessionState::Empty {
                if !global.quiet {
                    println!("No diameter labels queued");
                }
                return Ok(());
            }
            let rows = session.labels.iter().map(|l| vec![l.clone()]);
            print!("{}", render_table(format, ["Label"], rows)?);
        }
    }
    Ok(())
}

fn run_add(input: &[String], global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let mut session = load_session(&project)?;

    // Validate every entry before touching the saved session
    let mut added = Vec::new();
    let mut duplicates = Vec::new();
    for raw in input {
        let outcome = session
            .enter(raw)
            .map_err(|e| miette::miette!("'{}': {}", raw.trim(), e))?;
        if outcome.added.is_empty() && outcome.duplicates.is_empty() {
            println!("{} '{}' does not describe an increasing range", style("!").yellow(), raw.trim());
        }
        added.extend(outcome.added);
        duplicates.extend(outcome.duplicates);
    }
    save_session(&project, &session)?;

    if !global.quiet {
        if !added.is_empty() {
            println!("{} Queued {}", style("✓").green(), style(added.join(", ")).cyan());
        }
        if !duplicates.is_empty() {
            println!("{} Already queued: {}", style("!").yellow(), duplicates.join(", "));
        }
    }
    Ok(())
}

fn run_rm(items: &[String], global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let mut session = load_session(&project)?;
    let removed = session.remove_selected(items);
    save_session(&project, &session)?;

    if !global.quiet {
        println!("{} Removed {} label(s)", style("✓").green(), removed);
    }
    Ok(())
}

fn run_publish(no_send: bool, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let mut session = load_session(&project)?;
    if session.state() == SessionState::Empty {
        return Err(miette::miette!(
            "No diameter labels queued (use 'rotoworks diameter add')"
        ));
    }

    let kind = InspectionKind::Diameter;
    let path = project.workspace_file(&kind.scope_file());
    let mut count = 0;
    write_buffered(&path, |buffer| {
        count = session.publish(buffer).map_err(|e| miette::miette!("{}", e))?;
        Ok(())
    })?;
    save_session(&project, &session)?;

    if !global.quiet {
        println!(
            "{} Wrote {} label(s) to {}",
            style("✓").green(),
            count,
            style(path.display()).cyan()
        );
    }
    if !no_send {
        send_scope(&project, kind, &load_config(&project))?;
    }
    Ok(())
}
