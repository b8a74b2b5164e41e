use anyhow::Result;
use colored::Colorize;

use crate::core::ProbeManager;
use crate::platform::default_telemetry;

/// Poll every enabled probe once and print what each one sees
pub fn execute(matches: &clap::ArgMatches) -> Result<()> {
    let config = super::load_config(matches)?;
    let mut manager = ProbeManager::from_config(&config, default_telemetry());

    let results = manager.check_all();
    if results.is_empty() {
        println!("{}", "No probes enabled.".yellow());
        return Ok(());
    }

    println!("{} {}", "Project:".white(), config.project_name.cyan().bold());
    println!();

    for (name, result) in results {
        let status = if result.triggered {
            result.method.green().bold()
        } else {
            result.method.dimmed()
        };
        println!("  {:<10} {}", name.white().bold(), status);
        if let Some(detail) = result.detail {
            for line in detail.lines() {
                println!("             {}", line.dimmed());
            }
        }
    }

    Ok(())
}
