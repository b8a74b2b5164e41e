//! Human-friendly duration parsing for configuration values.
//!
//! Accepts plain seconds (`300`, `"300"`, `"2.5"`) or compact unit strings
//! such as `"1h30m"`, `"30m5s"`, `"2h"` and `"45s"`. Fractions are allowed
//! in every unit and the total is truncated to whole seconds.

use crate::error::{Result, WatchError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;

static UNIT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(\d+(?:\.\d+)?)\s*h)?\s*(?:(\d+(?:\.\d+)?)\s*m)?\s*(?:(\d+(?:\.\d+)?)\s*s)?$",
    )
    .expect("duration pattern is valid")
});

/// Parse a duration string into whole seconds.
///
/// An empty string is a zero duration.
pub fn parse_duration(input: &str) -> Result<Duration> {
    let text = input.trim().to_lowercase();

    if text.is_empty() {
        return Ok(Duration::ZERO);
    }

    if let Ok(seconds) = text.parse::<f64>() {
        return seconds_to_duration(seconds).ok_or_else(|| WatchError::invalid_duration(input));
    }

    let captures = UNIT_PATTERN
        .captures(&text)
        .ok_or_else(|| WatchError::invalid_duration(input))?;

    let mut total = 0.0;
    let mut matched = false;
    for (index, scale) in [(1, 3600.0), (2, 60.0), (3, 1.0)] {
        if let Some(value) = captures.get(index) {
            let value: f64 = value
                .as_str()
                .parse()
                .map_err(|_| WatchError::invalid_duration(input))?;
            total += (value * scale).trunc();
            matched = true;
        }
    }

    if !matched {
        return Err(WatchError::invalid_duration(input));
    }

    seconds_to_duration(total).ok_or_else(|| WatchError::invalid_duration(input))
}

fn seconds_to_duration(seconds: f64) -> Option<Duration> {
    if seconds.is_finite() && seconds >= 0.0 {
        Some(Duration::from_secs(seconds.trunc() as u64))
    } else {
        None
    }
}

/// Format a duration as `1h 02m 03s`, dropping leading zero units.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{}h {:02}m {:02}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {:02}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Serde adapter storing a `Duration` as whole seconds and reading either a
/// number or a duration string.
pub mod secs {
    use super::parse_duration;
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    #[derive(Deserialize)]
    #[serde(untagged)]
    pub(super) enum RawDuration {
        Seconds(f64),
        Text(String),
    }

    impl RawDuration {
        pub(super) fn into_duration<E: de::Error>(self) -> Result<Duration, E> {
            match self {
                RawDuration::Seconds(value) => super::seconds_to_duration(value)
                    .ok_or_else(|| E::custom(format!("invalid duration: {}", value))),
                RawDuration::Text(text) => parse_duration(&text).map_err(E::custom),
            }
        }
    }

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        RawDuration::deserialize(deserializer)?.into_duration()
    }
}

/// Like [`secs`] for optional values; `null` and `0` both mean "no limit".
pub mod opt_secs {
    use super::secs::RawDuration;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_some(&duration.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        let raw = Option::<RawDuration>::deserialize(deserializer)?;
        match raw {
            Some(raw) => {
                let duration = raw.into_duration()?;
                Ok((!duration.is_zero()).then_some(duration))
            }
            None => Ok(None),
        }
    }
}
