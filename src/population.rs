use crate::error::InvalidStateError;
use crate::field::HexField;
use bacterio_common::{BacteriaCell, HexCoord, PredatorCell, StateSnapshot};
use std::collections::BTreeMap;

/// A single prey unit. Carries no state beyond its existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bacteria;

/// A predator and its remaining energy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Predator {
    pub energy: i32,
}

impl Predator {
    pub fn new(energy: i32) -> Self {
        Self { energy }
    }

    pub fn is_alive(&self) -> bool {
        self.energy > 0
    }
}

/// Who sits where at one tick.
///
/// Only occupied cells are keyed: removing the last occupant of a cell drops
/// its key. Every key is a member of the field the population belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Population {
    pub(crate) bacteria: BTreeMap<HexCoord, Vec<Bacteria>>,
    pub(crate) predators: BTreeMap<HexCoord, Vec<Predator>>,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the population stored in a snapshot, rejecting occupants
    /// placed outside the snapshot's field.
    pub fn from_snapshot(snapshot: &StateSnapshot, field: &HexField) -> Result<Self, InvalidStateError> {
        let mut population = Population::new();
        for entry in &snapshot.bacteria {
            if !field.contains(entry.cell) {
                return Err(InvalidStateError::BacteriaOutsideField(entry.cell));
            }
            for _ in 0..entry.count {
                population.push_bacteria(entry.cell, Bacteria);
            }
        }
        for entry in &snapshot.predators {
            if !field.contains(entry.cell) {
                return Err(InvalidStateError::PredatorOutsideField(entry.cell));
            }
            for &energy in &entry.energies {
                population.push_predator(entry.cell, Predator::new(energy));
            }
        }
        Ok(population)
    }

    /// Serializable form of this population together with its field.
    pub fn to_snapshot(&self, field: &HexField) -> StateSnapshot {
        StateSnapshot {
            cells: field.sorted_cells(),
            bacteria: self
                .bacteria
                .iter()
                .map(|(&cell, units)| BacteriaCell {
                    cell,
                    count: units.len() as u32,
                })
                .collect(),
            predators: self
                .predators
                .iter()
                .map(|(&cell, preds)| PredatorCell {
                    cell,
                    energies: preds.iter().map(|p| p.energy).collect(),
                })
                .collect(),
        }
    }

    /// Checks that every occupied cell belongs to `field`.
    pub fn validate(&self, field: &HexField) -> Result<(), InvalidStateError> {
        if let Some(&cell) = self.bacteria.keys().find(|&&c| !field.contains(c)) {
            return Err(InvalidStateError::BacteriaOutsideField(cell));
        }
        if let Some(&cell) = self.predators.keys().find(|&&c| !field.contains(c)) {
            return Err(InvalidStateError::PredatorOutsideField(cell));
        }
        Ok(())
    }

    pub fn count_bacteria(&self) -> usize {
        self.bacteria.values().map(Vec::len).sum()
    }

    pub fn count_predators(&self) -> usize {
        self.predators.values().map(Vec::len).sum()
    }

    pub fn bacteria_at(&self, c: HexCoord) -> usize {
        self.bacteria.get(&c).map_or(0, Vec::len)
    }

    pub fn predators_at(&self, c: HexCoord) -> &[Predator] {
        self.predators.get(&c).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn bacteria_cells(&self) -> impl Iterator<Item = &HexCoord> {
        self.bacteria.keys()
    }

    pub fn predator_cells(&self) -> impl Iterator<Item = &HexCoord> {
        self.predators.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.bacteria.is_empty() && self.predators.is_empty()
    }

    pub(crate) fn push_bacteria(&mut self, c: HexCoord, unit: Bacteria) {
        self.bacteria.entry(c).or_default().push(unit);
    }

    pub(crate) fn push_predator(&mut self, c: HexCoord, predator: Predator) {
        self.predators.entry(c).or_default().push(predator);
    }

    // --- Manual edits: out-of-field cells are ignored, never an error ---

    /// Adds one bacteria to `c`. Returns whether anything changed.
    pub fn add_bacteria(&mut self, field: &HexField, c: HexCoord) -> bool {
        if !field.contains(c) {
            return false;
        }
        self.push_bacteria(c, Bacteria);
        true
    }

    /// Adds one predator with `energy` to `c`. Returns whether anything changed.
    pub fn add_predator(&mut self, field: &HexField, c: HexCoord, energy: i32) -> bool {
        if !field.contains(c) {
            return false;
        }
        self.push_predator(c, Predator::new(energy));
        true
    }

    /// Removes every occupant of `c`.
    pub fn clear_cell(&mut self, c: HexCoord) {
        self.bacteria.remove(&c);
        self.predators.remove(&c);
    }

    pub fn clear(&mut self) {
        self.bacteria.clear();
        self.predators.clear();
    }
}
