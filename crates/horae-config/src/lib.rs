use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Where the almanac is observed from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ObserverToml {
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    #[serde(default = "default_height")]
    pub height_meters: f64,
}

impl Default for ObserverToml {
    fn default() -> Self {
        Self {
            latitude: default_latitude(),
            longitude: default_longitude(),
            height_meters: default_height(),
        }
    }
}

// Chicago
fn default_latitude() -> f64 {
    41.8781
}

fn default_longitude() -> f64 {
    -87.6298
}

fn default_height() -> f64 {
    180.0
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EphemerisToml {
    /// Directory of Swiss Ephemeris data files; the built-in Moshier
    /// ephemeris is used when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AlmanacToml {
    /// Offset of local civil time from UTC, used for dates and weekdays
    #[serde(default)]
    pub utc_offset_minutes: i32,
    #[serde(default = "default_body_timeout_ms")]
    pub body_timeout_ms: u64,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for AlmanacToml {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            body_timeout_ms: default_body_timeout_ms(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

fn default_body_timeout_ms() -> u64 {
    2_000
}

fn default_poll_interval_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AlmanacConfig {
    #[serde(default)]
    pub observer: ObserverToml,
    #[serde(default)]
    pub ephemeris: EphemerisToml,
    #[serde(default)]
    pub almanac: AlmanacToml,
}

const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

impl AlmanacConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        let ObserverToml {
            latitude,
            longitude,
            height_meters,
        } = self.observer;
        if !(-90.0..=90.0).contains(&latitude) {
            anyhow::bail!("observer.latitude must be within [-90, 90], got {latitude}");
        }
        if !(-180.0..=180.0).contains(&longitude) {
            anyhow::bail!("observer.longitude must be within [-180, 180], got {longitude}");
        }
        if !(height_meters.is_finite() && height_meters >= 0.0) {
            anyhow::bail!("observer.height_meters must be non-negative, got {height_meters}");
        }
        if self.almanac.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            anyhow::bail!(
                "almanac.utc_offset_minutes must be within ±{MAX_UTC_OFFSET_MINUTES}, got {}",
                self.almanac.utc_offset_minutes
            );
        }
        if self.almanac.body_timeout_ms == 0 {
            anyhow::bail!("almanac.body_timeout_ms must be positive");
        }
        Ok(())
    }
}

pub fn parse_almanac_config(text: &str) -> anyhow::Result<AlmanacConfig> {
    let cfg: AlmanacConfig =
        toml::from_str(text).map_err(|e| anyhow::anyhow!("Failed to parse almanac.toml: {e}"))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Try common relative paths for `configs/almanac.toml`.
pub fn read_almanac_toml_text() -> Option<(PathBuf, String)> {
    let paths = ["configs/almanac.toml", "../../configs/almanac.toml"];
    paths.iter().find_map(|p| {
        fs::read_to_string(p)
            .ok()
            .map(|text| (PathBuf::from(p), text))
    })
}

/// Load the config from `explicit` if given (it must exist), otherwise from
/// the common locations, otherwise the defaults.
pub fn load_almanac_config(explicit: Option<&Path>) -> anyhow::Result<AlmanacConfig> {
    let text = match explicit {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Could not read {}: {e}", path.display()))?,
        None => match read_almanac_toml_text() {
            Some((_, text)) => text,
            None => return Ok(AlmanacConfig::default()),
        },
    };
    parse_almanac_config(&text)
}
