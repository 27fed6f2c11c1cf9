pub mod config;
pub mod hex;
pub mod probability;
pub mod sim_params;
pub mod snapshot;

// Re-export key types for easier use by dependent crates
pub use config::{BacterioConfig, ConfigError, FieldConfig, OutputConfig, RunConfig};
pub use hex::{round_half_away, HexConverter, HexCoord, DIRECTIONS, SQRT3_HALF};
pub use probability::{Probability, ProbabilityError};
pub use sim_params::SimParams;
pub use snapshot::{BacteriaCell, PredatorCell, StateSnapshot};
