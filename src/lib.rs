//! Predator/prey cellular simulation on a hexagonal field.
//!
//! Bacteria drift and divide; predators hunt them within sight, spend energy
//! every tick and divide when well fed. [`Simulation`] owns the state and
//! advances it one tick at a time.

pub mod error;
pub mod field;
pub mod generator;
pub mod persistence;
pub mod population;
pub mod simulation;
pub mod trace;

pub use bacterio_common::{BacterioConfig, HexCoord, Probability, SimParams, StateSnapshot};
pub use error::InvalidStateError;
pub use field::HexField;
pub use generator::generate_population;
pub use persistence::{load_state, save_state, SnapshotFormat};
pub use population::{Bacteria, Population, Predator};
pub use simulation::{HaltReason, RunOutcome, Simulation, TickSummary};
pub use trace::{CsvTraceWriter, TraceRecord, TraceSink};

/// Common imports for driving a simulation.
pub mod prelude {
    pub use crate::field::HexField;
    pub use crate::population::Population;
    pub use crate::simulation::{HaltReason, Simulation, TickSummary};
    pub use bacterio_common::{HexCoord, SimParams};
}
