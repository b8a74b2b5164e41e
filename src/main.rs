use anyhow::Result;
use clap::{Arg, ArgAction, Command};

use jobwatch::commands;

fn config_arg() -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .value_name("PATH")
        .help("Configuration file (defaults to the per-user config.json)")
}

fn main() -> Result<()> {
    jobwatch::init_logging();

    let matches = Command::new("jobwatch")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Watch a long-running job and report when it completes")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("run")
                .about("Watch until a probe confirms completion")
                .arg(config_arg())
                .arg(
                    Arg::new("interval")
                        .short('i')
                        .long("interval")
                        .value_name("DURATION")
                        .help("Time between checks, e.g. 30, 45s, 2m"),
                )
                .arg(
                    Arg::new("timeout")
                        .short('t')
                        .long("timeout")
                        .value_name("DURATION")
                        .help("Give up after this long, e.g. 12h or 1h30m (0 disables)"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print completion events as JSON lines")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Poll every enabled probe once and show the results")
                .arg(config_arg()),
        )
        .subcommand(Command::new("gpu").about("Show current GPU power draw"))
        .subcommand(
            Command::new("config")
                .about("Print the effective configuration as JSON")
                .arg(config_arg()),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("run", sub_matches)) => commands::run::execute(sub_matches)?,
        Some(("check", sub_matches)) => commands::check::execute(sub_matches)?,
        Some(("gpu", _)) => commands::gpu::execute()?,
        Some(("config", sub_matches)) => commands::config::execute(sub_matches)?,
        _ => {
            println!("Use 'jobwatch --help' for more information.");
        }
    }

    Ok(())
}
