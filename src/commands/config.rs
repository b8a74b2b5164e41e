use anyhow::Result;
use colored::Colorize;

use crate::core::Config;

/// Print the effective configuration as JSON
pub fn execute(matches: &clap::ArgMatches) -> Result<()> {
    let config = super::load_config(matches)?;

    let source = match matches.get_one::<String>("config") {
        Some(path) => path.clone(),
        None => match Config::default_path() {
            Some(path) if path.exists() => path.display().to_string(),
            _ => "built-in defaults".to_string(),
        },
    };

    eprintln!("{} {}", "Configuration from:".white(), source.cyan());
    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}
