//! `rotoworks init` command - Create a new inspection project

use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::core::config::Config;
use crate::core::project::{Phase, Project, ProjectDefinition, ProjectError};
use crate::entities::machine::{self, MachineKind};
use crate::entities::scope::parse_stage_count;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Job number (up to 6 digits)
    #[arg(long, short = 'j')]
    pub job: Option<String>,

    /// Inspection phase
    #[arg(long, short = 'p', value_enum)]
    pub phase: Option<Phase>,

    /// Machine type (e.g. "centrifugal-compressor", "Steam Turbine")
    #[arg(long, short = 'm')]
    pub machine: Option<String>,

    /// Sub type (e.g. Bull, Pinion)
    #[arg(long)]
    pub sub: Option<String>,

    /// Short name added to the project filename
    #[arg(long, default_value = "")]
    pub nickname: String,

    /// Rotor carries a Curtis stage (steam turbines only)
    #[arg(long)]
    pub curtis: bool,

    /// Number of stages to scope right away
    #[arg(long)]
    pub stages: Option<String>,

    /// Workspace directory (default: current directory)
    #[arg(long, short = 'd', default_value = ".")]
    pub dir: PathBuf,

    /// Overwrite an existing project file
    #[arg(long)]
    pub force: bool,

    /// Prompt for anything not given on the command line
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let dir = if args.dir.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.dir.clone()
    };

    let theme = ColorfulTheme::default();

    let job = match (args.job, args.interactive) {
        (Some(job), _) => job,
        (None, true) => Input::with_theme(&theme)
            .with_prompt("Job number")
            .interact_text()
            .into_diagnostic()?,
        (None, false) => {
            return Err(miette::miette!(
                "Job number is required (use --job or -i for interactive)"
            ))
        }
    };

    let phase = match (args.phase, args.interactive) {
        (Some(phase), _) => phase,
        (None, true) => {
            let phases = [Phase::Phase1, Phase::Phase2, Phase::Final];
            let names: Vec<&str> = phases.iter().map(|p| p.as_str()).collect();
            let selection = Select::with_theme(&theme)
                .with_prompt("Phase")
                .items(&names)
                .default(0)
                .interact()
                .into_diagnostic()?;
            phases[selection]
        }
        (None, false) => {
            return Err(miette::miette!(
                "Phase is required (use --phase or -i for interactive)"
            ))
        }
    };

    let kind = match (args.machine, args.interactive) {
        (Some(name), _) => {
            machine::resolve(&name)
                .map_err(|e| miette::miette!("{}", e))?
                .kind
        }
        (None, true) => {
            let types = machine::list_types();
            let selection = Select::with_theme(&theme)
                .with_prompt("Machine type")
                .items(&types)
                .default(0)
                .interact()
                .into_diagnostic()?;
            types[selection]
                .parse::<MachineKind>()
                .map_err(|e| miette::miette!("{}", e))?
        }
        (None, false) => {
            return Err(miette::miette!(
                "Machine type is required (use --machine or -i for interactive)"
            ))
        }
    };

    let machine = kind.machine();
    let sub = match (args.sub, args.interactive) {
        (None, true) if !machine.sub_types.is_empty() => {
            let mut items = vec!["(none)"];
            items.extend(machine.sub_types.iter().copied());
            let selection = Select::with_theme(&theme)
                .with_prompt("Sub type")
                .items(&items)
                .default(0)
                .interact()
                .into_diagnostic()?;
            (selection > 0).then(|| items[selection].to_string())
        }
        (sub, _) => sub,
    };

    let nickname = if args.interactive && args.nickname.is_empty() {
        Input::with_theme(&theme)
            .with_prompt("Nickname")
            .allow_empty(true)
            .interact_text()
            .into_diagnostic()?
    } else {
        args.nickname
    };

    let curtis = if args.interactive && !args.curtis && machine.supports_curtis() {
        Confirm::with_theme(&theme)
            .with_prompt("Curtis stage?")
            .default(false)
            .interact()
            .into_diagnostic()?
    } else {
        args.curtis
    };
    if curtis && !machine.supports_curtis() {
        println!(
            "{} Curtis stages only apply to steam turbines; ignoring --curtis",
            style("!").yellow()
        );
    }

    let stages = args
        .stages
        .as_deref()
        .map(parse_stage_count)
        .transpose()
        .map_err(|e| miette::miette!("{}", e))?;

    let mut definition =
        ProjectDefinition::new(&job, phase, kind, sub.as_deref(), &nickname, curtis, &dir)
            .map_err(|e| miette::miette!("{}", e))?;
    definition.created_by = Some(Config::load(Some(&dir)).author());

    let mut project = match Project::create(&dir, definition, args.force) {
        Ok(project) => project,
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} Project already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!("Use {} to overwrite it", style("rotoworks init --force").yellow());
            return Ok(());
        }
        Err(e) => return Err(miette::miette!("{}", e)),
    };

    if let Some(count) = stages {
        let shape = project.scope_shape();
        project.scope_mut().resize(shape, count);
        project.save().map_err(|e| miette::miette!("{}", e))?;
    }

    println!(
        "{} Created project {}",
        style("✓").green(),
        style(project.file().display()).cyan()
    );
    println!();
    println!("Next steps:");
    if machine.scope_width() > 0 {
        println!(
            "  {} Set the number of stages",
            style("rotoworks scope resize <N>").yellow()
        );
        println!(
            "  {} Queue axial targets",
            style("rotoworks axial add").yellow()
        );
    }
    println!(
        "  {} Queue diameter labels",
        style("rotoworks diameter add A-D").yellow()
    );
    Ok(())
}
