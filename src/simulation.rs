use crate::error::InvalidStateError;
use crate::field::HexField;
use crate::population::{Bacteria, Population, Predator};
use bacterio_common::{HexCoord, SimParams, StateSnapshot};
use log::{debug, info, trace};
use rand::prelude::*;
use rand::rngs::StdRng;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;

type BacteriaMap = BTreeMap<HexCoord, Vec<Bacteria>>;
type PredatorMap = BTreeMap<HexCoord, Vec<Predator>>;

/// Counters describing what happened during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickSummary {
    /// Index of the tick just completed (the first tick is 1).
    pub tick: u64,
    pub bacteria: usize,
    pub predators: usize,
    pub bacteria_divided: usize,
    pub bacteria_eaten: usize,
    pub predators_divided: usize,
    pub predators_starved: usize,
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    NoPredators,
    NoBacteria,
    StepLimit,
    Interrupted,
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            HaltReason::NoPredators => "no more predators left",
            HaltReason::NoBacteria => "no more bacteria left",
            HaltReason::StepLimit => "step limit reached",
            HaltReason::Interrupted => "interrupted",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// Ticks executed by this run.
    pub steps: u64,
    pub halt: HaltReason,
}

/// Advances a predator/bacteria population on a hex field one tick at a time.
///
/// Each tick builds a fresh population and swaps it in whole, so anything
/// read between calls to [`Simulation::step`] is either entirely the old
/// state or entirely the new one.
pub struct Simulation {
    params: SimParams,
    field: Arc<HexField>,
    population: Population,
    rng: StdRng,
    tick: u64,
}

impl Simulation {
    /// Creates a simulation over `field` starting from `population`.
    pub fn new(params: SimParams, field: Arc<HexField>, population: Population) -> Result<Self, InvalidStateError> {
        population.validate(&field)?;
        Ok(Self {
            params,
            field,
            population,
            rng: StdRng::from_os_rng(),
            tick: 0,
        })
    }

    /// Creates a simulation from a saved snapshot.
    pub fn from_snapshot(params: SimParams, snapshot: &StateSnapshot) -> Result<Self, InvalidStateError> {
        let (field, population) = unpack_snapshot(snapshot)?;
        Self::new(params, field, population)
    }

    /// Reseeds the random source so a run can be reproduced exactly.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn field(&self) -> &Arc<HexField> {
        &self.field
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Number of ticks completed since construction or the last state replacement.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn count_bacteria(&self) -> usize {
        self.population.count_bacteria()
    }

    pub fn count_predators(&self) -> usize {
        self.population.count_predators()
    }

    pub fn bacteria_at(&self, c: HexCoord) -> usize {
        self.population.bacteria_at(c)
    }

    pub fn predator_energies_at(&self, c: HexCoord) -> Vec<i32> {
        self.population.predators_at(c).iter().map(|p| p.energy).collect()
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.population.to_snapshot(&self.field)
    }

    /// Swaps in a different field and population, e.g. a loaded snapshot.
    pub fn replace_state(&mut self, field: Arc<HexField>, population: Population) -> Result<(), InvalidStateError> {
        population.validate(&field)?;
        info!(
            "Replacing state: {} cells, {} bacteria, {} predators.",
            field.len(),
            population.count_bacteria(),
            population.count_predators()
        );
        self.field = field;
        self.population = population;
        self.tick = 0;
        Ok(())
    }

    pub fn replace_from_snapshot(&mut self, snapshot: &StateSnapshot) -> Result<(), InvalidStateError> {
        let (field, population) = unpack_snapshot(snapshot)?;
        self.replace_state(field, population)
    }

    // --- Manual edits, applied between ticks ---

    pub fn add_bacteria(&mut self, c: HexCoord) -> bool {
        let added = self.population.add_bacteria(&self.field, c);
        if !added {
            debug!("Ignoring bacteria added outside the field at ({}, {}).", c.q, c.r);
        }
        added
    }

    /// Adds a predator carrying the initial energy.
    pub fn add_predator(&mut self, c: HexCoord) -> bool {
        let added = self.population.add_predator(&self.field, c, self.params.pr_init_energy);
        if !added {
            debug!("Ignoring predator added outside the field at ({}, {}).", c.q, c.r);
        }
        added
    }

    pub fn clear_cell(&mut self, c: HexCoord) {
        self.population.clear_cell(c);
    }

    pub fn clear_all(&mut self) {
        self.population.clear();
    }

    /// The condition under which interactive play stops, if it holds now.
    pub fn halt_reason(&self) -> Option<HaltReason> {
        if self.population.predators.is_empty() {
            Some(HaltReason::NoPredators)
        } else if self.population.bacteria.is_empty() {
            Some(HaltReason::NoBacteria)
        } else {
            None
        }
    }

    /// Advances the simulation by one tick: predators first, then bacteria.
    pub fn step(&mut self) -> TickSummary {
        let mut summary = TickSummary::default();
        let mut bacteria = std::mem::take(&mut self.population.bacteria);
        let predators = predator_phase(
            &self.params,
            &self.field,
            &self.population.predators,
            &mut bacteria,
            &mut self.rng,
            &mut summary,
        );
        let bacteria = bacteria_phase(&self.params, &self.field, &bacteria, &mut self.rng, &mut summary);

        self.population = Population { bacteria, predators };
        self.tick += 1;

        summary.tick = self.tick;
        summary.bacteria = self.population.count_bacteria();
        summary.predators = self.population.count_predators();
        debug!(
            "Tick {} | bacteria: {} (+{} divided, -{} eaten) | predators: {} (+{} divided, -{} starved)",
            summary.tick,
            summary.bacteria,
            summary.bacteria_divided,
            summary.bacteria_eaten,
            summary.predators,
            summary.predators_divided,
            summary.predators_starved
        );
        summary
    }

    /// Plays up to `max_steps` ticks.
    ///
    /// Stops early when either species dies out, or when `on_tick` breaks.
    /// Interruption only ever happens between ticks.
    pub fn run<F>(&mut self, max_steps: u64, mut on_tick: F) -> RunOutcome
    where
        F: FnMut(&TickSummary) -> ControlFlow<()>,
    {
        let mut steps = 0;
        while steps < max_steps {
            let summary = self.step();
            steps += 1;
            if on_tick(&summary).is_break() {
                return RunOutcome {
                    steps,
                    halt: HaltReason::Interrupted,
                };
            }
            if let Some(halt) = self.halt_reason() {
                return RunOutcome { steps, halt };
            }
        }
        RunOutcome {
            steps,
            halt: HaltReason::StepLimit,
        }
    }
}

fn unpack_snapshot(snapshot: &StateSnapshot) -> Result<(Arc<HexField>, Population), InvalidStateError> {
    if snapshot.cells.is_empty() {
        return Err(InvalidStateError::EmptyField);
    }
    let field = HexField::from_cells(snapshot.cells.iter().copied());
    let population = Population::from_snapshot(snapshot, &field)?;
    Ok((Arc::new(field), population))
}

/// Crowding check shared by both species; a threshold of zero or below disables it.
#[inline]
fn not_overcrowded(count: usize, threshold: i32) -> bool {
    threshold <= 0 || count < threshold as usize
}

fn occupants<T>(map: &BTreeMap<HexCoord, Vec<T>>, c: HexCoord) -> usize {
    map.get(&c).map_or(0, Vec::len)
}

/// Adds a predator to the next-tick map unless it has run out of energy.
fn place_predator(next: &mut PredatorMap, cell: HexCoord, energy: i32, summary: &mut TickSummary) {
    let predator = Predator::new(energy);
    if predator.is_alive() {
        next.entry(cell).or_default().push(predator);
    } else {
        trace!("Predator at ({}, {}) starved with energy {}.", cell.q, cell.r, energy);
        summary.predators_starved += 1;
    }
}

/// Looks for bacteria at `from`, then ring by ring out to `sight`, picking
/// uniformly among the occupied cells of the first ring that has any.
/// Rings past the field's reach are empty, so the scan stops there.
fn nearest_bacteria<R: Rng>(
    field: &HexField,
    bacteria: &BacteriaMap,
    from: HexCoord,
    sight: u32,
    rng: &mut R,
) -> Option<HexCoord> {
    if bacteria.contains_key(&from) {
        return Some(from);
    }
    for radius in 1..=sight.min(field.reach(from)) {
        let hits: Vec<HexCoord> = field
            .exact_ring(from, radius)
            .into_iter()
            .filter(|c| bacteria.contains_key(c))
            .collect();
        if let Some(&target) = hits.choose(rng) {
            return Some(target);
        }
    }
    None
}

/// One step from `from` toward `target` that stays on the field.
fn field_step(field: &HexField, from: HexCoord, target: HexCoord) -> HexCoord {
    let step = from.step_toward(target);
    if field.contains(step) {
        return step;
    }
    // Irregular fields can cut the straight path; take any member that still closes in.
    let remaining = from.distance(target);
    field
        .neighbors(from, 1)
        .into_iter()
        .filter(|n| n.distance(target) < remaining)
        .min()
        .unwrap_or(from)
}

fn predator_phase<R: Rng>(
    params: &SimParams,
    field: &HexField,
    current: &PredatorMap,
    bacteria: &mut BacteriaMap,
    rng: &mut R,
    summary: &mut TickSummary,
) -> PredatorMap {
    let mut next = PredatorMap::new();

    // Earlier cells win contested bacteria, so shuffle who goes first.
    let mut cells: Vec<HexCoord> = current.keys().copied().collect();
    cells.shuffle(rng);

    for cell in cells {
        let crowd = field.count_within(cell, params.pr_overcrowd_radius, |h| occupants(current, h));
        let may_divide = not_overcrowded(crowd, params.pr_overcrowd);

        for predator in &current[&cell] {
            let mut energy = predator.energy;

            if may_divide && energy >= params.pr_divide_energy && params.p_pr_divide.sample(rng) {
                let child_energy = (energy - params.pr_divide_cost).div_euclid(2);
                trace!("Predator at ({}, {}) divided, children get {}.", cell.q, cell.r, child_energy);
                summary.predators_divided += 1;
                place_predator(&mut next, cell, child_energy, summary);
                place_predator(&mut next, cell, child_energy, summary);
                continue;
            }

            let destination = if energy >= params.pr_max_energy {
                // Well fed: idle around.
                let dest = if params.p_pr_stay.sample(rng) {
                    cell
                } else {
                    field.random_neighbor(cell, rng).unwrap_or(cell)
                };
                energy -= params.pr_turn_cost;
                dest
            } else {
                energy -= params.pr_turn_cost;
                if energy <= 0 {
                    cell
                } else {
                    match nearest_bacteria(field, bacteria, cell, params.pr_sight, rng) {
                        Some(target) => {
                            let step = field_step(field, cell, target);
                            if take_bacteria(bacteria, step) {
                                energy += params.pr_feed_value;
                                summary.bacteria_eaten += 1;
                            }
                            step
                        }
                        None => field.random_neighbor(cell, rng).unwrap_or(cell),
                    }
                }
            };
            place_predator(&mut next, destination, energy, summary);
        }
    }
    next
}

fn take_bacteria(bacteria: &mut BacteriaMap, c: HexCoord) -> bool {
    let Some(units) = bacteria.get_mut(&c) else {
        return false;
    };
    units.pop();
    if units.is_empty() {
        bacteria.remove(&c);
    }
    true
}

fn bacteria_phase<R: Rng>(
    params: &SimParams,
    field: &HexField,
    current: &BacteriaMap,
    rng: &mut R,
    summary: &mut TickSummary,
) -> BacteriaMap {
    let mut next = BacteriaMap::new();

    let mut cells: Vec<HexCoord> = current.keys().copied().collect();
    cells.shuffle(rng);

    for cell in cells {
        let units = &current[&cell];
        let crowd = field.count_within(cell, params.bact_overcrowd_radius, |h| occupants(current, h));
        let may_divide = not_overcrowded(crowd, params.bact_overcrowd);
        let targets = field.exact_ring(cell, params.bact_velocity);

        for _ in units {
            if may_divide && params.p_bact_divide.sample(rng) {
                summary.bacteria_divided += 1;
                next.entry(cell).or_default().extend([Bacteria, Bacteria]);
            } else if params.p_bact_stay.sample(rng) {
                next.entry(cell).or_default().push(Bacteria);
            } else {
                let dest = targets.choose(rng).copied().unwrap_or(cell);
                next.entry(dest).or_default().push(Bacteria);
            }
        }
    }
    next
}
