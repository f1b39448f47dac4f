use crate::table::DEFAULT_OFF_MARKERS;
use chrono_tz::Tz;
use config as config_crate;
use serde::Deserialize;
use std::fmt;

/// Operational configuration of the service.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Seconds between refreshes of every worker.
    #[serde(default = "default_scan_interval_secs")]
    pub scan_interval_secs: u64,
    /// Timeout in seconds for one refresh, network included.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// IANA timezone the provider publishes schedules in.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// One entry per household to watch.
    pub workers: Vec<SourceConfig>,
}

/// Where a worker reads its schedule from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceConfig {
    /// Per-address HTML grid, queue resolved from the address.
    Table {
        #[serde(default = "default_table_url")]
        base_url: String,
        #[serde(flatten)]
        address: Address,
        #[serde(default = "default_markers")]
        markers: Vec<String>,
    },
    /// Shared regional JSON schedule, filtered by group.
    Region {
        #[serde(default = "default_region_url")]
        api_url: String,
        /// Display name, used as the payload address.
        region: String,
        /// Key of the region inside `dailySchedule`.
        region_code: String,
        /// `"main.subgroup"`, e.g. `"4.1"`.
        group: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Address {
    pub city: String,
    pub street: String,
    pub house: String,
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.city, self.street, self.house)
    }
}

impl SourceConfig {
    /// Short label for logs.
    pub fn label(&self) -> String {
        match self {
            SourceConfig::Table { address, .. } => address.to_string(),
            SourceConfig::Region { region, group, .. } => format!("{region} {group}"),
        }
    }
}

fn default_scan_interval_secs() -> u64 {
    300
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_timezone() -> String {
    "Europe/Kyiv".to_owned()
}

fn default_table_url() -> String {
    "https://www.dtek-krem.com.ua".to_owned()
}

fn default_region_url() -> String {
    "https://api.yasno.com.ua/api/v1/pages/home/schedule-turn-off-electricity".to_owned()
}

fn default_markers() -> Vec<String> {
    DEFAULT_OFF_MARKERS.iter().map(|m| (*m).to_owned()).collect()
}

impl Config {
    /// Reads `config.toml` (or any format `config` understands), overlaid by `SVITLO__*` variables.
    pub fn load() -> anyhow::Result<Self> {
        let settings = config_crate::Config::builder()
            .add_source(config_crate::File::with_name("config"))
            .add_source(config_crate::Environment::with_prefix("SVITLO").separator("__"))
            .build()?;
        let config: Config = settings.try_deserialize()?;
        Ok(config)
    }

    pub fn tz(&self) -> Result<Tz, String> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| format!("invalid timezone '{}': {}", self.timezone, e))
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.scan_interval_secs == 0 {
            return Err("scan_interval_secs must be greater than zero".into());
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than zero".into());
        }
        if self.workers.is_empty() {
            return Err("at least one worker must be configured".into());
        }
        self.tz()?;
        for source in &self.workers {
            match source {
                SourceConfig::Table { markers, .. } if markers.is_empty() => {
                    return Err(format!("worker {} has no outage markers", source.label()));
                }
                SourceConfig::Region { group, .. } if group.trim().is_empty() => {
                    return Err(format!("worker {} has an empty group", source.label()));
                }
                _ => {}
            }
        }
        Ok(())
    }
}
