use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::core::duration::{format_duration, parse_duration};
use crate::core::{Completion, ProbeManager, WatchOutcome, Watcher};
use crate::platform::default_telemetry;
use crate::ui::format_datetime;

/// Handle 'run' command - watch the job until a probe confirms completion
pub fn execute(matches: &clap::ArgMatches) -> Result<()> {
    let mut config = super::load_config(matches)?;

    if let Some(interval) = matches.get_one::<String>("interval") {
        config.check_interval = parse_duration(interval)
            .with_context(|| format!("Invalid --interval '{}'", interval))?;
    }
    if let Some(timeout) = matches.get_one::<String>("timeout") {
        let timeout = parse_duration(timeout)
            .with_context(|| format!("Invalid --timeout '{}'", timeout))?;
        config.timeout = (!timeout.is_zero()).then_some(timeout);
    }
    config.validate()?;

    let json = matches.get_flag("json");

    // Create shared cancellation flag
    let cancel_flag = Arc::new(AtomicBool::new(false));
    let cancel_flag_clone = cancel_flag.clone();

    // Setup Ctrl+C handler
    ctrlc::set_handler(move || {
        eprintln!();
        eprintln!("{}", "Stop requested, finishing current check...".yellow().bold());
        cancel_flag_clone.store(true, Ordering::Relaxed);
    })
    .map_err(|e| anyhow!("Failed to set Ctrl+C handler: {}", e))?;

    let manager = ProbeManager::from_config(&config, default_telemetry());
    let enabled = manager.enabled_names();
    if enabled.is_empty() {
        return Err(anyhow!(
            "No probes enabled; enable at least one of file, log, gpu_power or directory"
        ));
    }

    if !json {
        println!("{} {}", "Watching".cyan().bold(), config.project_name.white().bold());
        println!("{} {}", "Probes:".white(), enabled.join(", ").cyan());
        println!(
            "{} every {}",
            "Checking".white(),
            format_duration(config.check_interval).yellow()
        );
        if let Some(timeout) = config.timeout {
            println!("{} {}", "Timeout:".white(), format_duration(timeout).yellow());
        }
        println!("{}", "Press Ctrl+C at any time to stop".dimmed());
        println!();
    }

    let mut watcher = Watcher::new(manager, &config).with_cancel_flag(cancel_flag);

    let outcome = watcher.run(|completion| {
        if json {
            match serde_json::to_string(completion) {
                Ok(line) => println!("{}", line),
                Err(e) => log::error!("Failed to serialize completion: {}", e),
            }
        } else {
            print_completion(completion);
        }
    });

    match outcome {
        WatchOutcome::Completed(_) => Ok(()),
        WatchOutcome::Cancelled => {
            if !json {
                println!("{}", "Watch cancelled.".yellow());
            }
            Ok(())
        }
        WatchOutcome::TimedOut => Err(anyhow!(
            "No completion detected for {} before the timeout",
            config.project_name
        )),
    }
}

fn print_completion(completion: &Completion) {
    println!("{}", "─".repeat(50));
    println!(
        "{} {}",
        "Job finished:".green().bold(),
        completion.project_name.white().bold()
    );
    println!("{}", "─".repeat(50));
    println!("{} {}", "Detected by:".white(), completion.method.cyan());
    println!(
        "{} {}",
        "Started:".white(),
        format_datetime(&completion.started_at).dimmed()
    );
    println!(
        "{} {}",
        "Finished:".white(),
        format_datetime(&completion.finished_at).dimmed()
    );
    println!(
        "{} {}",
        "Duration:".white(),
        completion.elapsed_display().yellow().bold()
    );

    match (&completion.report, &completion.detail) {
        (Some(report), _) => {
            println!("{} {}", "Changes:".white(), report.summary().yellow());
            for change in report.all_changes() {
                let line = format!("  [{}] {}", change.kind.as_str(), change.path);
                if change.action.is_empty() {
                    println!("{}", line);
                } else {
                    println!("{} {}", line, format!("-> {}", change.action).magenta());
                }
            }
        }
        (None, Some(detail)) => println!("{} {}", "Detail:".white(), detail),
        (None, None) => {}
    }

    println!();
}
