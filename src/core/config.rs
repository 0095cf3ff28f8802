//! Ranch configuration with documented constants
//!
//! All tuning numbers are collected here with explanations of their purpose
//! and how they interact with each other. Values can be overridden from a TOML
//! file; missing keys keep their defaults.

use crate::core::error::{RanchError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the enclosure, the daily pass and the emitter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RanchConfig {
    // === CAPACITY ===
    /// Capacity limit a freshly placed enclosure starts with
    pub default_capacity: u32,

    /// Largest capacity limit a user may set
    ///
    /// User input is clamped into `0..=max_capacity`.
    pub max_capacity: u32,

    // === DETECTION ===
    /// Horizontal reach of the capture scan on each side of the cavity cell
    ///
    /// The scan window is `(2 * half_width + 1)` cells wide. At 4 this is 9
    /// cells, enough to cover a standard pen room.
    pub scan_half_width: i32,

    /// Vertical extent of the capture scan, starting one row below the cavity cell
    pub scan_height: i32,

    /// Records ejected per tick after the filter changes
    ///
    /// Keeps a filter edit from dumping the whole enclosure at once.
    pub filter_release_batch: usize,

    /// Room type the containment region must have for any capture/release
    pub required_room: String,

    // === SPECIES CACHE ===
    /// Registry sweeps allowed per process before misses stay absent
    pub max_registry_sweeps: u32,

    /// Schema version stamped into the species side-store
    ///
    /// Bump this when `SpeciesEntry` changes shape; older stores are discarded.
    pub schema_version: String,

    /// Multiplier turning a registry incubation rate into percent per day
    ///
    /// The registry reports incubation as a fraction per second; one day is
    /// 600 seconds, so a rate of 0.01 becomes 6 percent per day.
    pub incubation_rate_scale: f32,

    // === DAILY PASS ===
    /// Incubation bonus per day at full uptime
    ///
    /// The applied bonus is `ceil(incubation_uptime_bonus * uptime)`.
    pub incubation_uptime_bonus: f32,

    // === PRODUCTION ===
    /// Productivity multiplier reached at full uptime
    ///
    /// The multiplier is `max(1, productivity_ceiling * clamp01(uptime))`, so it
    /// never drops below 1 and saturates at the ceiling.
    pub productivity_ceiling: f32,

    /// Damping applied to calorie-derived daily yields
    pub calorie_yield_damping: f32,

    /// Secondary drop success chance at zero uptime
    pub secondary_drop_chance_min: f32,

    /// Secondary drop success chance at full uptime
    pub secondary_drop_chance_max: f32,

    /// Secondary drop mass is `ceil(drop_mass * count / divisor)`
    pub secondary_drop_divisor: f32,

    /// User multiplier on daily production yields
    pub daily_output_multiplier: f32,

    /// User multiplier on secondary drop mass
    pub secondary_drop_multiplier: f32,
}

impl Default for RanchConfig {
    fn default() -> Self {
        Self {
            default_capacity: 20,
            max_capacity: 20,

            scan_half_width: 4,
            scan_height: 8,
            filter_release_batch: 8,
            required_room: "creature_pen".into(),

            max_registry_sweeps: 3,
            schema_version: "100005".into(),
            incubation_rate_scale: 600.0,

            incubation_uptime_bonus: 40.0,

            productivity_ceiling: 4.0,
            calorie_yield_damping: 0.5,
            secondary_drop_chance_min: 0.1,
            secondary_drop_chance_max: 0.8,
            secondary_drop_divisor: 10.0,
            daily_output_multiplier: 1.0,
            secondary_drop_multiplier: 1.0,
        }
    }
}

impl RanchConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config from a TOML file
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse a config from a TOML string and validate it
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: RanchConfig =
            toml::from_str(content).map_err(|e| RanchError::ConfigParse(e.to_string()))?;
        config.sanitize_user_multipliers();
        config.validate()?;
        Ok(config)
    }

    /// User multipliers must be positive; anything else falls back to the default
    fn sanitize_user_multipliers(&mut self) {
        let defaults = Self::default();
        if !(self.daily_output_multiplier > 0.0) {
            tracing::warn!(
                "daily_output_multiplier {} is not positive, using {}",
                self.daily_output_multiplier,
                defaults.daily_output_multiplier
            );
            self.daily_output_multiplier = defaults.daily_output_multiplier;
        }
        if !(self.secondary_drop_multiplier > 0.0) {
            tracing::warn!(
                "secondary_drop_multiplier {} is not positive, using {}",
                self.secondary_drop_multiplier,
                defaults.secondary_drop_multiplier
            );
            self.secondary_drop_multiplier = defaults.secondary_drop_multiplier;
        }
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.max_capacity == 0 {
            return Err(RanchError::InvalidConfig("max_capacity must be at least 1".into()));
        }

        if self.default_capacity > self.max_capacity {
            return Err(RanchError::InvalidConfig(format!(
                "default_capacity ({}) exceeds max_capacity ({})",
                self.default_capacity, self.max_capacity
            )));
        }

        if self.scan_half_width < 0 || self.scan_height <= 0 {
            return Err(RanchError::InvalidConfig(format!(
                "scan window {}x{} is empty",
                self.scan_half_width * 2 + 1,
                self.scan_height
            )));
        }

        let (lo, hi) = (self.secondary_drop_chance_min, self.secondary_drop_chance_max);
        if !(0.0..=1.0).contains(&lo) || !(0.0..=1.0).contains(&hi) || lo > hi {
            return Err(RanchError::InvalidConfig(format!(
                "secondary drop chance bounds [{}, {}] must be ordered within [0, 1]",
                lo, hi
            )));
        }

        if self.calorie_yield_damping <= 0.0 || self.secondary_drop_divisor <= 0.0 {
            return Err(RanchError::InvalidConfig(
                "calorie_yield_damping and secondary_drop_divisor must be positive".into(),
            ));
        }

        if self.max_registry_sweeps == 0 {
            return Err(RanchError::InvalidConfig("max_registry_sweeps must be at least 1".into()));
        }

        Ok(())
    }

    /// Environmental incubation bonus for a given uptime fraction
    pub fn incubation_bonus(&self, uptime: f32) -> f32 {
        (self.incubation_uptime_bonus * uptime.clamp(0.0, 1.0)).ceil()
    }

    /// Daily production multiplier for a given uptime fraction
    pub fn productivity_multiplier(&self, uptime: f32) -> f32 {
        (self.productivity_ceiling * uptime.clamp(0.0, 1.0)).max(1.0)
    }

    /// Secondary drop success chance, linear in uptime
    pub fn secondary_drop_chance(&self, uptime: f32) -> f32 {
        let t = uptime.clamp(0.0, 1.0);
        let lo = self.secondary_drop_chance_min;
        (lo + (self.secondary_drop_chance_max - lo) * t).clamp(0.0, 1.0)
    }
}
