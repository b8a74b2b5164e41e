use crate::core::duration;
use crate::error::{Result, WatchError};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Watch session configuration.
///
/// Every section is optional in the file; missing values fall back to the
/// defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub project_name: String,
    /// Time between two polls of the probe manager
    #[serde(with = "duration::secs")]
    pub check_interval: Duration,
    /// Give up after this long without a trigger (`None` = never)
    #[serde(with = "duration::opt_secs")]
    pub timeout: Option<Duration>,
    /// Time between two "still waiting" log lines
    #[serde(with = "duration::secs")]
    pub status_interval: Duration,
    pub file: FileProbeConfig,
    pub log: LogProbeConfig,
    pub gpu_power: GpuPowerConfig,
    pub directory: DirectoryProbeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_name: "training job".to_string(),
            check_interval: Duration::from_secs(5),
            timeout: None,
            status_interval: Duration::from_secs(60),
            file: FileProbeConfig::default(),
            log: LogProbeConfig::default(),
            gpu_power: GpuPowerConfig::default(),
            directory: DirectoryProbeConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProbeConfig {
    pub enabled: bool,
    pub path: PathBuf,
    /// Also report the target disappearing
    pub detect_deletion: bool,
    #[serde(with = "duration::secs")]
    pub confirm_delay: Duration,
}

impl Default for FileProbeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: PathBuf::from("./output/model_final.pth"),
            detect_deletion: false,
            confirm_delay: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogMode {
    /// Reread the whole file on every poll
    #[default]
    Full,
    /// Only look at bytes appended since the previous poll
    Incremental,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogProbeConfig {
    pub enabled: bool,
    pub path: PathBuf,
    pub markers: Vec<String>,
    pub mode: LogMode,
}

impl Default for LogProbeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: PathBuf::from("./logs/training.log"),
            markers: vec!["Training completed".to_string()],
            mode: LogMode::Full,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerMode {
    #[default]
    Below,
    Above,
}

impl TriggerMode {
    /// Strict comparison of a sample against the threshold
    pub fn is_satisfied(self, watts: f32, threshold: f32) -> bool {
        match self {
            TriggerMode::Below => watts < threshold,
            TriggerMode::Above => watts > threshold,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            TriggerMode::Below => "below",
            TriggerMode::Above => "above",
        }
    }
}

/// Which GPUs the power probe evaluates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeviceSelector {
    /// Every device reported by telemetry
    #[default]
    All,
    /// Only these ids, when telemetry reports them
    Ids(Vec<u32>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDeviceSelector {
    Single(u32),
    List(Vec<u32>),
    Keyword(String),
}

impl<'de> Deserialize<'de> for DeviceSelector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match RawDeviceSelector::deserialize(deserializer)? {
            RawDeviceSelector::Single(id) => Ok(DeviceSelector::Ids(vec![id])),
            RawDeviceSelector::List(ids) => Ok(DeviceSelector::Ids(ids)),
            RawDeviceSelector::Keyword(text) => {
                let text = text.trim();
                if text.eq_ignore_ascii_case("all") {
                    return Ok(DeviceSelector::All);
                }
                text.split(',')
                    .map(|part| part.trim().parse::<u32>())
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map(DeviceSelector::Ids)
                    .map_err(|_| de::Error::custom(format!("invalid device selector: {}", text)))
            }
        }
    }
}

impl Serialize for DeviceSelector {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            DeviceSelector::All => serializer.serialize_str("all"),
            DeviceSelector::Ids(ids) => ids.serialize(serializer),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpuPowerConfig {
    pub enabled: bool,
    /// Threshold in watts
    pub threshold: f32,
    pub devices: DeviceSelector,
    pub consecutive_checks: u32,
    pub trigger_mode: TriggerMode,
}

impl Default for GpuPowerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold: 50.0,
            devices: DeviceSelector::All,
            consecutive_checks: 3,
            trigger_mode: TriggerMode::Below,
        }
    }
}

/// One action suggestion and the file-name keywords that select it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRule {
    pub action: String,
    pub keywords: Vec<String>,
}

/// Ordered action → keywords mapping.
///
/// Stored as a list so the order of the configuration file is the matching
/// order; serialized as a JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActionKeywords(pub Vec<ActionRule>);

impl ActionKeywords {
    pub fn rules(&self) -> &[ActionRule] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Vec<String>)> for ActionKeywords {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        ActionKeywords(
            iter.into_iter()
                .map(|(action, keywords)| ActionRule { action, keywords })
                .collect(),
        )
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum KeywordList {
    One(String),
    Many(Vec<String>),
}

struct ActionKeywordsVisitor;

impl<'de> Visitor<'de> for ActionKeywordsVisitor {
    type Value = ActionKeywords;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of action names to a keyword or keyword list")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
        let mut rules = Vec::new();
        while let Some((action, keywords)) = map.next_entry::<String, KeywordList>()? {
            let keywords = match keywords {
                KeywordList::One(keyword) => vec![keyword],
                KeywordList::Many(keywords) => keywords,
            };
            rules.push(ActionRule { action, keywords });
        }
        Ok(ActionKeywords(rules))
    }
}

impl<'de> Deserialize<'de> for ActionKeywords {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(ActionKeywordsVisitor)
    }
}

impl Serialize for ActionKeywords {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for rule in &self.0 {
            map.serialize_entry(&rule.action, &rule.keywords)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryProbeConfig {
    pub enabled: bool,
    pub path: PathBuf,
    /// Track directories as entries, not only files
    pub include_folders: bool,
    pub exclude_keywords: Vec<String>,
    /// Defaults to `jobwatch_report.txt` inside the watched directory
    pub report_path: Option<PathBuf>,
    #[serde(with = "duration::secs")]
    pub confirm_delay: Duration,
    pub detect_added: bool,
    pub detect_removed: bool,
    pub detect_modified: bool,
    /// Keep watching after a directory trigger instead of ending the session
    pub continuous: bool,
    pub action_keywords: ActionKeywords,
}

impl Default for DirectoryProbeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: PathBuf::new(),
            include_folders: false,
            exclude_keywords: Vec::new(),
            report_path: None,
            confirm_delay: Duration::from_secs(5),
            detect_added: true,
            detect_removed: true,
            detect_modified: false,
            continuous: false,
            action_keywords: ActionKeywords::default(),
        }
    }
}

impl Config {
    /// Load a configuration file (JSON) and validate it
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).map_err(|e| {
            WatchError::config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config: Config = if data.trim().is_empty() {
            Config::default()
        } else {
            serde_json::from_str(&data)?
        };

        config.validate()?;
        log::debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Load the per-user configuration, or defaults when there is none
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => {
                log::debug!("No configuration file found, using defaults");
                Ok(Config::default())
            }
        }
    }

    /// `<config dir>/jobwatch/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("jobwatch").join("config.json"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.check_interval.is_zero() {
            return Err(WatchError::config("check_interval must be greater than zero"));
        }
        if self.gpu_power.enabled && self.gpu_power.consecutive_checks == 0 {
            return Err(WatchError::config(
                "gpu_power.consecutive_checks must be at least 1",
            ));
        }
        Ok(())
    }
}
