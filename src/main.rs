use clap::Parser;
use miette::Result;
use rotoworks::cli::commands;
use rotoworks::cli::{Cli, Commands};
use rotoworks::logging;

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    logging::init(logging::level_for(global.quiet, global.verbose));

    match cli.command {
        Commands::Init(args) => commands::init::run(args),
        Commands::Machines => commands::machines::run(&global),
        Commands::Scope(cmd) => commands::scope::run(cmd, &global),
        Commands::Axial(cmd) => commands::axial::run(cmd, &global),
        Commands::Diameter(cmd) => commands::diameter::run(cmd, &global),
        Commands::ThermalGap(args) => commands::manual::run_thermal_gap(args, &global),
        Commands::Weights(args) => commands::manual::run_weights(args, &global),
        Commands::Doc(args) => commands::doc::run(args, &global),
        Commands::Compare(args) => commands::compare::run(args, &global),
        Commands::Status(args) => commands::status::run(args, &global),
        Commands::Completions(args) => commands::completions::run(args),
    }
}
