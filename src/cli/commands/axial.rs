//! `rotoworks axial` command - Build and publish the axial workscope

use clap::Subcommand;
use console::style;
use dialoguer::{theme::ColorfulTheme, Input};
use miette::{IntoDiagnostic, Result};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use crate::cli::helpers::{
    import_template, load_config, open_project, render_table, send_finish, send_scope,
    write_buffered,
};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::inspection::InspectionKind;
use crate::core::project::Project;
use crate::session::{self, AxialOption, AxialSession, AxialTarget, DimensionKind, SessionState};

#[derive(Subcommand, Debug)]
pub enum AxialCommands {
    /// List the options that can be queued for this project
    Options,

    /// Show the queued targets
    List,

    /// Queue stages, the balance drum and labelled distances/widths
    Add(AddArgs),

    /// Remove queued targets ("Stage 2", "Distance A")
    Rm {
        /// Targets to remove
        #[arg(required = true)]
        items: Vec<String>,
    },

    /// Write AxialScope.csv, send it to the CMM and clear the queue
    Publish {
        /// Write the scope file without sending it
        #[arg(long)]
        no_send: bool,
    },

    /// Ask the CMM to export the axial results
    Finish,

    /// Copy AxialScope.csv from a reference project and send it
    Import {
        /// Reference project file or workspace
        #[arg(long)]
        from: PathBuf,

        /// Copy without sending
        #[arg(long)]
        no_send: bool,
    },
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Options or targets: "Stage 1", "Balance Drum", "Distance", "Distance A", "Width B*H"
    pub targets: Vec<String>,

    /// Distance label (repeatable)
    #[arg(long, short = 'd')]
    pub distance: Vec<String>,

    /// Width label (repeatable)
    #[arg(long, short = 'w')]
    pub width: Vec<String>,

    /// Prompt for distance and width labels
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

pub fn run(cmd: AxialCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        AxialCommands::Options => run_options(global),
        AxialCommands::List => run_list(global),
        AxialCommands::Add(args) => run_add(args, global),
        AxialCommands::Rm { items } => run_rm(&items, global),
        AxialCommands::Publish { no_send } => run_publish(no_send, global),
        AxialCommands::Finish => run_finish(global),
        AxialCommands::Import { from, no_send } => run_import(&from, no_send, global),
    }
}

fn session_path(project: &Project) -> PathBuf {
    project.workspace_file(session::AXIAL_SESSION_FILE)
}

fn load_session(project: &Project) -> Result<AxialSession> {
    session::load(&session_path(project)).map_err(|e| miette::miette!("{}", e))
}

fn save_session(project: &Project, session: &AxialSession) -> Result<()> {
    session::save(&session_path(project), session).map_err(|e| miette::miette!("{}", e))
}

fn run_options(global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let session = load_session(&project)?;
    let options = AxialOption::all(project.scope().labels());

    let queued = |option: &AxialOption| match option {
        AxialOption::Stage(label) => session.targets.contains(&AxialTarget::Stage(label.clone())),
        AxialOption::BalanceDrum => session.targets.contains(&AxialTarget::BalanceDrum),
        AxialOption::Dimension(_) => false,
    };

    match global.format {
        OutputFormat::Json => {
            let list: Vec<_> = options
                .iter()
                .map(|o| serde_json::json!({ "option": o.to_string(), "queued": queued(o) }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&list).into_diagnostic()?);
        }
        _ => {
            for option in &options {
                if queued(option) {
                    println!("{} {}", option, style("(queued)").dim());
                } else {
                    println!("{}", option);
                }
            }
        }
    }
    Ok(())
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let session = load_session(&project)?;

    match global.format {
        OutputFormat::Json => {
            let targets: Vec<String> = session.targets.iter().map(|t| t.to_string()).collect();
            println!("{}", serde_json::to_string_pretty(&targets).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&session).into_diagnostic()?);
        }
        format => {
            if session.state() == SessionState::Empty {
                if !global.quiet {
                    println!("No axial targets queued");
                }
                return Ok(());
            }
            let rows = session.targets.iter().map(|t| vec![t.to_string()]);
            print!("{}", render_table(format, ["Target"], rows)?);
        }
    }
    Ok(())
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let mut session = load_session(&project)?;

    let mut options = Vec::new();
    let mut distances = args.distance;
    let mut widths = args.width;

    for raw in &args.targets {
        let option = match raw.parse::<AxialOption>() {
            Ok(option) => option,
            Err(_) => match raw.parse::<AxialTarget>().map_err(|e| miette::miette!("{}", e))? {
                AxialTarget::Dimension(kind, label) => {
                    match kind {
                        DimensionKind::Distance => distances.push(label.to_string()),
                        DimensionKind::Width => widths.push(label.to_string()),
                    }
                    continue;
                }
                AxialTarget::Stage(label) => AxialOption::Stage(label),
                AxialTarget::BalanceDrum => AxialOption::BalanceDrum,
            },
        };
        if let AxialOption::Stage(label) = &option {
            if project.scope().get(label).is_none() {
                return Err(miette::miette!(
                    "{} is not in the project scope (run 'rotoworks scope resize')",
                    label.stage_name()
                ));
            }
        }
        if !options.contains(&option) {
            options.push(option);
        }
    }

    let prompt_allowed = args.interactive || std::io::stdin().is_terminal();
    for (kind, labels) in [
        (DimensionKind::Distance, &mut distances),
        (DimensionKind::Width, &mut widths),
    ] {
        let option = AxialOption::Dimension(kind);
        let requested = options.contains(&option);
        if labels.is_empty() && (requested || args.interactive) {
            if !prompt_allowed {
                return Err(miette::miette!(
                    "{} needs labels (use --{})",
                    kind.as_str(),
                    kind.as_str().to_lowercase()
                ));
            }
            labels.extend(prompt_labels(kind, &session.labels)?);
        }
        if !labels.is_empty() && !requested {
            options.push(option);
        }
    }

    let outcome = session.add_targets(&options, |kind, _| match kind {
        DimensionKind::Distance => distances.clone(),
        DimensionKind::Width => widths.clone(),
    });

    save_session(&project, &session)?;

    if !global.quiet {
        for target in &outcome.added {
            println!("{} Queued {}", style("✓").green(), style(target).cyan());
        }
        for duplicate in &outcome.duplicates {
            println!("{} {} is already queued", style("!").yellow(), duplicate);
        }
    }
    for (raw, error) in &outcome.rejected {
        eprintln!("{} '{}': {}", style("✗").red(), raw, error);
    }
    if !outcome.rejected.is_empty() && outcome.added.is_empty() {
        return Err(miette::miette!("no targets were queued"));
    }
    Ok(())
}

fn prompt_labels(kind: DimensionKind, used: &[String]) -> Result<Vec<String>> {
    if !used.is_empty() {
        println!("Labels in use: {}", style(used.join(", ")).dim());
    }
    let input: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("{} labels (comma separated, e.g. A, B*H)", kind.as_str()))
        .allow_empty(true)
        .interact_text()
        .into_diagnostic()?;
    Ok(input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect())
}

fn run_rm(items: &[String], global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let mut session = load_session(&project)?;
    let removed = session.remove_targets(items);
    save_session(&project, &session)?;

    if !global.quiet {
        for target in &removed {
            println!("{} Removed {}", style("✓").green(), style(target).cyan());
        }
        if removed.is_empty() {
            println!("{} Nothing matched", style("!").yellow());
        }
    }
    Ok(())
}

fn run_publish(no_send: bool, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let mut session = load_session(&project)?;
    if session.state() == SessionState::Empty {
        return Err(miette::miette!(
            "No axial targets queued (use 'rotoworks axial add')"
        ));
    }

    let kind = InspectionKind::Axial;
    let path = project.workspace_file(&kind.scope_file());
    let mut rows = 0;
    write_buffered(&path, |buffer| {
        let table = session
            .publish(project.machine(), project.scope(), buffer)
            .map_err(|e| miette::miette!("{}", e))?;
        rows = table.rows.len();
        Ok(())
    })?;
    save_session(&project, &session)?;

    if !global.quiet {
        println!(
            "{} Wrote {} row(s) to {}",
            style("✓").green(),
            rows,
            style(path.display()).cyan()
        );
    }
    if !no_send {
        send_scope(&project, kind, &load_config(&project))?;
    }
    Ok(())
}

fn run_finish(global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    send_finish(&project, InspectionKind::Axial, &load_config(&project))
}

fn run_import(from: &Path, no_send: bool, global: &GlobalOpts) -> Result<()> {
    let mut project = open_project(global)?;
    let kind = InspectionKind::Axial;
    let target = import_template(&mut project, kind, from)?;

    if !global.quiet {
        println!(
            "{} Imported {}",
            style("✓").green(),
            style(target.display()).cyan()
        );
    }
    if !no_send {
        send_scope(&project, kind, &load_config(&project))?;
    }
    Ok(())
}
