use super::{PowerReadings, PowerTelemetry};
use crate::error::{Result, WatchError};
use std::path::PathBuf;
use std::process::Command;

/// Power telemetry from the `nvidia-smi` command line tool
pub struct NvidiaSmiTelemetry {
    program: PathBuf,
}

impl NvidiaSmiTelemetry {
    /// Locate `nvidia-smi` on the PATH
    pub fn new() -> Result<Self> {
        let program = which::which("nvidia-smi")
            .map_err(|e| WatchError::gpu_not_available(format!("nvidia-smi not found: {}", e)))?;
        Ok(Self { program })
    }

    /// Use an explicit `nvidia-smi` binary
    pub fn with_program(program: PathBuf) -> Self {
        Self { program }
    }
}

impl PowerTelemetry for NvidiaSmiTelemetry {
    fn source(&self) -> &'static str {
        "nvidia-smi"
    }

    fn power_draw(&mut self) -> Result<PowerReadings> {
        let output = Command::new(&self.program)
            .args([
                "--query-gpu=index,power.draw",
                "--format=csv,noheader,nounits",
            ])
            .output()
            .map_err(|e| WatchError::gpu_not_available(format!("Failed to run nvidia-smi: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(WatchError::telemetry(format!(
                "nvidia-smi exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        parse_power_csv(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse `index, power.draw` CSV lines as printed by
/// `nvidia-smi --query-gpu=index,power.draw --format=csv,noheader,nounits`.
///
/// Lines without a comma are ignored; a malformed value fails the whole sample.
pub fn parse_power_csv(output: &str) -> Result<PowerReadings> {
    let mut readings = PowerReadings::new();

    for line in output.lines() {
        let Some((index, power)) = line.split_once(',') else {
            continue;
        };

        let index = index
            .trim()
            .parse::<u32>()
            .map_err(|_| WatchError::telemetry(format!("Invalid GPU index in {:?}", line)))?;
        let power = power
            .trim()
            .parse::<f32>()
            .map_err(|_| WatchError::telemetry(format!("Invalid power draw in {:?}", line)))?;

        readings.insert(index, power);
    }

    Ok(readings)
}
