use crate::probability::Probability;
use crate::sim_params::{self, SimParams};
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("[{section}] {key} is required")]
    Missing { section: &'static str, key: &'static str },
    #[error("[{section}] {key}: {reason}")]
    Invalid {
        section: &'static str,
        key: &'static str,
        reason: String,
    },
}

// Field shape and initial population, loaded from the [field] section
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct FieldConfig {
    pub radius: u32,
    pub init_bacteria: u32,
    pub init_predators: u32,
    pub state_file: Option<PathBuf>, // Start from a saved snapshot instead of generating
}

impl Default for FieldConfig {
    fn default() -> Self {
        FieldConfig {
            radius: 15,
            init_bacteria: 200,
            init_predators: 20,
            state_file: None,
        }
    }
}

// Run length and reproducibility, loaded from the [run] section
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub max_steps: u32,
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            max_steps: 1000,
            seed: None,
        }
    }
}

// Trace and final state output, loaded from the [output] section
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct OutputConfig {
    pub write_trace: bool,
    pub trace_file_prefix: String,
    pub save_final_state: bool,
    pub state_output: String, // Base filename; the extension follows the format
    pub format: Option<String>, // "json", "bincode", "messagepack"
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            write_trace: false,
            trace_file_prefix: "bacterio".to_string(),
            save_final_state: false,
            state_output: "final_state".to_string(),
            format: None,
        }
    }
}

/// Main configuration, loaded from a TOML file.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct BacterioConfig {
    pub field: FieldConfig,
    pub model: SimParams,
    pub run: RunConfig,
    pub output: OutputConfig,
}

impl BacterioConfig {
    /// Loads the configuration from a TOML file.
    ///
    /// Optional entries that are missing or malformed fall back to their
    /// defaults with a warning. Energy and radius entries have no sensible
    /// default once a file is given, so their absence is an error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let config_str = std::fs::read_to_string(path_ref).map_err(|source| ConfigError::Io {
            path: path_ref.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&config_str)
    }

    pub fn from_toml_str(config_str: &str) -> Result<Self, ConfigError> {
        let root: toml::Table = toml::from_str(config_str)?;

        let field_section = Section::new(&root, "field");
        let state_file = field_section.string("state_file").map(PathBuf::from);
        // A snapshot carries its own field, so the radius only matters when generating.
        let radius = match state_file {
            Some(_) => field_section.u32_or("radius", FieldConfig::default().radius),
            None => field_section.require_u32("radius")?,
        };
        let field = FieldConfig {
            radius,
            init_bacteria: field_section.u32_or("init_bacteria", 0),
            init_predators: field_section.u32_or("init_predators", 0),
            state_file,
        };

        let m = Section::new(&root, "model");
        let model = SimParams {
            p_bact_divide: m.probability_or("p_bact_divide", sim_params::DEFAULT_P_BACT_DIVIDE),
            p_bact_stay: m.probability_or("p_bact_stay", sim_params::DEFAULT_P_BACT_STAY),
            bact_overcrowd: m.i32_or("bact_overcrowd", sim_params::DEFAULT_BACT_OVERCROWD),
            bact_overcrowd_radius: m.require_u32("bact_overcrowd_radius")?,
            bact_velocity: m.u32_or("bact_velocity", sim_params::DEFAULT_BACT_VELOCITY),
            pr_init_energy: m.require_i32("pr_init_energy")?,
            pr_max_energy: m.require_i32("pr_max_energy")?,
            pr_divide_energy: m.require_i32("pr_divide_energy")?,
            pr_divide_cost: m.require_i32("pr_divide_cost")?,
            pr_turn_cost: m.require_i32("pr_turn_cost")?,
            pr_feed_value: m.require_i32("pr_feed_value")?,
            pr_sight: m.require_u32("pr_sight")?,
            p_pr_divide: m.probability_or("p_pr_divide", sim_params::DEFAULT_P_PR_DIVIDE),
            p_pr_stay: m.probability_or("p_pr_stay", sim_params::DEFAULT_P_PR_STAY),
            pr_overcrowd: m.i32_or("pr_overcrowd", sim_params::DEFAULT_PR_OVERCROWD),
            pr_overcrowd_radius: m.require_u32("pr_overcrowd_radius")?,
        };

        let run_section = Section::new(&root, "run");
        let run_defaults = RunConfig::default();
        let run = RunConfig {
            max_steps: run_section.u32_or("max_steps", run_defaults.max_steps),
            seed: run_section.u64("seed"),
        };

        let o = Section::new(&root, "output");
        let out_defaults = OutputConfig::default();
        let output = OutputConfig {
            write_trace: o.bool_or("write_trace", out_defaults.write_trace),
            trace_file_prefix: o.string("trace_file_prefix").unwrap_or(out_defaults.trace_file_prefix),
            save_final_state: o.bool_or("save_final_state", out_defaults.save_final_state),
            state_output: o.string("state_output").unwrap_or(out_defaults.state_output),
            format: o.string("format"),
        };

        Ok(BacterioConfig { field, model, run, output })
    }

    /// Converts the configuration into the parameters used at runtime.
    pub fn get_sim_params(&self) -> SimParams {
        self.model.clone()
    }
}

/// Typed lookups into one TOML table. A missing table behaves like an empty one.
struct Section<'a> {
    name: &'static str,
    table: Option<&'a toml::Table>,
}

impl<'a> Section<'a> {
    fn new(root: &'a toml::Table, name: &'static str) -> Self {
        Section {
            name,
            table: root.get(name).and_then(|v| v.as_table()),
        }
    }

    fn get(&self, key: &str) -> Option<&'a toml::Value> {
        self.table.and_then(|t| t.get(key))
    }

    fn fallback<T: std::fmt::Display>(&self, key: &str, value: &toml::Value, default: T) -> T {
        warn!("[{}] {} = {} is malformed, using default {}", self.name, key, value, default);
        default
    }

    fn integer(&self, key: &'static str) -> Result<Option<i64>, ConfigError> {
        match self.get(key) {
            None => Ok(None),
            Some(toml::Value::Integer(v)) => Ok(Some(*v)),
            Some(other) => Err(ConfigError::Invalid {
                section: self.name,
                key,
                reason: format!("expected an integer, found {}", other.type_str()),
            }),
        }
    }

    fn require_i32(&self, key: &'static str) -> Result<i32, ConfigError> {
        let v = self.integer(key)?.ok_or(ConfigError::Missing { section: self.name, key })?;
        i32::try_from(v).map_err(|_| ConfigError::Invalid {
            section: self.name,
            key,
            reason: format!("{} does not fit in 32 bits", v),
        })
    }

    fn require_u32(&self, key: &'static str) -> Result<u32, ConfigError> {
        let v = self.integer(key)?.ok_or(ConfigError::Missing { section: self.name, key })?;
        u32::try_from(v).map_err(|_| ConfigError::Invalid {
            section: self.name,
            key,
            reason: format!("{} is not a non-negative 32-bit value", v),
        })
    }

    fn i32_or(&self, key: &'static str, default: i32) -> i32 {
        match self.get(key) {
            None => default,
            Some(value) => value
                .as_integer()
                .and_then(|v| i32::try_from(v).ok())
                .unwrap_or_else(|| self.fallback(key, value, default)),
        }
    }

    fn u32_or(&self, key: &'static str, default: u32) -> u32 {
        match self.get(key) {
            None => default,
            Some(value) => value
                .as_integer()
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or_else(|| self.fallback(key, value, default)),
        }
    }

    fn u64(&self, key: &'static str) -> Option<u64> {
        let value = self.get(key)?;
        match value.as_integer().and_then(|v| u64::try_from(v).ok()) {
            Some(v) => Some(v),
            None => {
                warn!("[{}] {} = {} is malformed, ignoring it", self.name, key, value);
                None
            }
        }
    }

    fn bool_or(&self, key: &'static str, default: bool) -> bool {
        match self.get(key) {
            None => default,
            Some(value) => value.as_bool().unwrap_or_else(|| self.fallback(key, value, default)),
        }
    }

    fn string(&self, key: &'static str) -> Option<String> {
        let value = self.get(key)?;
        match value.as_str() {
            Some(s) => Some(s.to_string()),
            None => {
                warn!("[{}] {} = {} is not a string, ignoring it", self.name, key, value);
                None
            }
        }
    }

    fn probability_or(&self, key: &'static str, default: Probability) -> Probability {
        let Some(value) = self.get(key) else {
            return default;
        };
        let parsed = match value {
            toml::Value::String(s) => s.parse().ok(),
            toml::Value::Float(f) => Probability::from_f64(*f).ok(),
            toml::Value::Integer(i) => Probability::from_f64(*i as f64).ok(),
            _ => None,
        };
        parsed.unwrap_or_else(|| self.fallback(key, value, default))
    }
}
