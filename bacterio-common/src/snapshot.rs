use crate::hex::HexCoord;
use serde::{Deserialize, Serialize};

/// Bacteria sharing one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacteriaCell {
    pub cell: HexCoord,
    pub count: u32,
}

/// Predators sharing one cell, in processing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredatorCell {
    pub cell: HexCoord,
    pub energies: Vec<i32>,
}

/// A saved population: the playable field plus both occupancy maps.
///
/// Occupancy is stored as lists rather than maps so every serde format
/// (including JSON, which only allows string keys) can carry it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Every cell of the field, occupied or not.
    pub cells: Vec<HexCoord>,
    pub bacteria: Vec<BacteriaCell>,
    pub predators: Vec<PredatorCell>,
}

impl StateSnapshot {
    pub fn bacteria_count(&self) -> u64 {
        self.bacteria.iter().map(|b| b.count as u64).sum()
    }

    pub fn predator_count(&self) -> u64 {
        self.predators.iter().map(|p| p.energies.len() as u64).sum()
    }
}
