use crate::error::{GeosampleError, Result};
use crate::integrity::{DesignationProposer, EnforcerConfig};
use crate::sampling::{OrchestratorConfig, SamplerConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Default neighbor radius for the consistency check, in meters
pub const DEFAULT_NEIGHBOR_RADIUS_M: f64 = 1000.0;

/// Layered configuration for the sample integrity engine
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub neighbor_radius_m: ConfigValue<f64>,
    pub same_field_radius_m: ConfigValue<Option<f64>>,
    pub validation_weight: ConfigValue<f64>,
    pub lock_weight: ConfigValue<f64>,
    pub neighbor_timeout_ms: ConfigValue<u64>,
    pub seam_buffer_deg: ConfigValue<f64>,
    pub sampler_workers: ConfigValue<usize>,
    pub seed: ConfigValue<Option<u64>>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            neighbor_radius_m: ConfigValue::new(DEFAULT_NEIGHBOR_RADIUS_M, ConfigSource::Default),
            same_field_radius_m: ConfigValue::new(None, ConfigSource::Default),
            validation_weight: ConfigValue::new(1.0 / 3.0, ConfigSource::Default),
            lock_weight: ConfigValue::new(0.5, ConfigSource::Default),
            neighbor_timeout_ms: ConfigValue::new(5000, ConfigSource::Default),
            seam_buffer_deg: ConfigValue::new(0.01, ConfigSource::Default),
            sampler_workers: ConfigValue::new(8, ConfigSource::Default),
            seed: ConfigValue::new(None, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| GeosampleError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| GeosampleError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(radius) = file_config.neighbor_radius_m {
            self.neighbor_radius_m.update(radius, ConfigSource::File);
        }

        if let Some(radius) = file_config.same_field_radius_m {
            self.same_field_radius_m.update(Some(radius), ConfigSource::File);
        }

        if let Some(weight) = file_config.validation_weight {
            self.validation_weight.update(weight, ConfigSource::File);
        }

        if let Some(weight) = file_config.lock_weight {
            self.lock_weight.update(weight, ConfigSource::File);
        }

        if let Some(timeout) = file_config.neighbor_timeout_ms {
            self.neighbor_timeout_ms.update(timeout, ConfigSource::File);
        }

        if let Some(buffer) = file_config.seam_buffer_deg {
            self.seam_buffer_deg.update(buffer, ConfigSource::File);
        }

        if let Some(workers) = file_config.sampler_workers {
            self.sampler_workers.update(workers, ConfigSource::File);
        }

        if let Some(seed) = file_config.seed {
            self.seed.update(Some(seed), ConfigSource::File);
        }

        self.validate()?;
        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        if let Some(radius) = env_value::<f64>("GEOSAMPLE_NEIGHBOR_RADIUS_M", "meters") {
            self.neighbor_radius_m.update(radius, ConfigSource::Environment);
        }

        if let Some(radius) = env_value::<f64>("GEOSAMPLE_SAME_FIELD_RADIUS_M", "meters") {
            self.same_field_radius_m.update(Some(radius), ConfigSource::Environment);
        }

        if let Some(weight) = env_value::<f64>("GEOSAMPLE_VALIDATION_WEIGHT", "a number in [0, 1]")
        {
            self.validation_weight.update(weight, ConfigSource::Environment);
        }

        if let Some(weight) = env_value::<f64>("GEOSAMPLE_LOCK_WEIGHT", "a number in [0, 1]") {
            self.lock_weight.update(weight, ConfigSource::Environment);
        }

        if let Some(timeout) = env_value::<u64>("GEOSAMPLE_NEIGHBOR_TIMEOUT_MS", "milliseconds") {
            self.neighbor_timeout_ms.update(timeout, ConfigSource::Environment);
        }

        if let Some(buffer) = env_value::<f64>("GEOSAMPLE_SEAM_BUFFER_DEG", "degrees") {
            self.seam_buffer_deg.update(buffer, ConfigSource::Environment);
        }

        if let Some(workers) = env_value::<usize>("GEOSAMPLE_SAMPLER_WORKERS", "a worker count") {
            self.sampler_workers.update(workers, ConfigSource::Environment);
        }

        if let Some(seed) = env_value::<u64>("GEOSAMPLE_SEED", "an unsigned integer") {
            self.seed.update(Some(seed), ConfigSource::Environment);
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(radius) = overrides.neighbor_radius_m {
            self.neighbor_radius_m.update(radius, ConfigSource::Cli);
        }

        if let Some(radius) = overrides.same_field_radius_m {
            self.same_field_radius_m.update(Some(radius), ConfigSource::Cli);
        }

        if let Some(workers) = overrides.sampler_workers {
            self.sampler_workers.update(workers, ConfigSource::Cli);
        }

        if let Some(seed) = overrides.seed {
            self.seed.update(Some(seed), ConfigSource::Cli);
        }
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        let invalid = |key: &str, reason: &str| GeosampleError::ConfigInvalid {
            key: key.to_string(),
            reason: reason.to_string(),
        };

        if !(self.neighbor_radius_m.value > 0.0) {
            return Err(invalid("neighbor_radius_m", "must be greater than 0"));
        }
        if let Some(radius) = self.same_field_radius_m.value {
            if !(radius > 0.0) {
                return Err(invalid("same_field_radius_m", "must be greater than 0"));
            }
        }
        if !(0.0..=1.0).contains(&self.validation_weight.value) {
            return Err(invalid("validation_weight", "must be within [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.lock_weight.value) {
            return Err(invalid("lock_weight", "must be within [0, 1]"));
        }
        if self.neighbor_timeout_ms.value == 0 {
            return Err(invalid("neighbor_timeout_ms", "must be greater than 0"));
        }
        if !(self.seam_buffer_deg.value >= 0.0) {
            return Err(invalid("seam_buffer_deg", "must not be negative"));
        }
        if self.sampler_workers.value == 0 {
            return Err(invalid("sampler_workers", "must be at least 1"));
        }
        Ok(())
    }

    /// Settings for the consistency enforcer
    pub fn enforcer(&self) -> EnforcerConfig {
        EnforcerConfig {
            radius_m: self.neighbor_radius_m.value,
            same_field_radius_m: self.same_field_radius_m.value,
            timeout: Duration::from_millis(self.neighbor_timeout_ms.value),
        }
    }

    /// Designation weighting for new samples
    pub fn proposer(&self) -> DesignationProposer {
        DesignationProposer::new(self.validation_weight.value, self.lock_weight.value)
    }

    /// Settings for a single polygon sampler
    pub fn sampler(&self) -> SamplerConfig {
        SamplerConfig { seam_buffer_deg: self.seam_buffer_deg.value, ..SamplerConfig::default() }
    }

    /// Settings for a generation run
    pub fn orchestrator(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            workers: self.sampler_workers.value,
            seed: self.seed.value,
            sampler: self.sampler(),
        }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "neighbor_radius_m".to_string(),
            (format!("{} m", self.neighbor_radius_m.value), self.neighbor_radius_m.source),
        );

        map.insert(
            "same_field_radius_m".to_string(),
            (
                self.same_field_radius_m
                    .value
                    .map(|r| format!("{} m", r))
                    .unwrap_or_else(|| "disabled".to_string()),
                self.same_field_radius_m.source,
            ),
        );

        map.insert(
            "validation_weight".to_string(),
            (format!("{:.4}", self.validation_weight.value), self.validation_weight.source),
        );

        map.insert(
            "lock_weight".to_string(),
            (format!("{:.4}", self.lock_weight.value), self.lock_weight.source),
        );

        map.insert(
            "neighbor_timeout_ms".to_string(),
            (format!("{} ms", self.neighbor_timeout_ms.value), self.neighbor_timeout_ms.source),
        );

        map.insert(
            "seam_buffer_deg".to_string(),
            (format!("{}°", self.seam_buffer_deg.value), self.seam_buffer_deg.source),
        );

        map.insert(
            "sampler_workers".to_string(),
            (self.sampler_workers.value.to_string(), self.sampler_workers.source),
        );

        map.insert(
            "seed".to_string(),
            (
                self.seed.value.map(|s| s.to_string()).unwrap_or_else(|| "entropy".to_string()),
                self.seed.source,
            ),
        );

        map
    }
}

impl Default for LayeredConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Read and parse an environment variable, warning on malformed values
fn env_value<T: std::str::FromStr>(key: &str, expected: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Invalid {} value '{}': expected {}", key, raw, expected);
            None
        }
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    neighbor_radius_m: Option<f64>,
    same_field_radius_m: Option<f64>,
    validation_weight: Option<f64>,
    lock_weight: Option<f64>,
    neighbor_timeout_ms: Option<u64>,
    seam_buffer_deg: Option<f64>,
    sampler_workers: Option<usize>,
    seed: Option<u64>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub neighbor_radius_m: Option<f64>,
    pub same_field_radius_m: Option<f64>,
    pub sampler_workers: Option<usize>,
    pub seed: Option<u64>,
}
