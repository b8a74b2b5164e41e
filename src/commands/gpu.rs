use anyhow::Result;
use colored::Colorize;

use crate::platform::default_telemetry;

/// Print the current power draw of every visible GPU
pub fn execute() -> Result<()> {
    let mut telemetry = default_telemetry();

    match telemetry.power_draw() {
        Ok(readings) if readings.is_empty() => {
            println!("{}", "No GPUs reported by telemetry.".yellow());
        }
        Ok(readings) => {
            println!(
                "{} {}",
                "GPU power draw".white().bold(),
                format!("(via {})", telemetry.source()).dimmed()
            );
            println!();
            for (index, watts) in &readings {
                println!("  GPU {}: {}", index, format!("{:.1} W", watts).yellow().bold());
            }
        }
        Err(e) => {
            println!("{} {}", "GPU telemetry unavailable:".yellow().bold(), e);
        }
    }

    Ok(())
}
