use bacterio::prelude::*;
use bacterio::{generate_population, Probability};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::ops::ControlFlow;
use std::sync::Arc;

fn params() -> SimParams {
    SimParams {
        p_bact_divide: Probability::NEVER,
        p_bact_stay: Probability::NEVER,
        bact_overcrowd: 0,
        p_pr_divide: Probability::NEVER,
        p_pr_stay: Probability::NEVER,
        pr_overcrowd: 0,
        pr_init_energy: 10,
        pr_max_energy: 50,
        pr_divide_energy: 40,
        pr_divide_cost: 0,
        pr_turn_cost: 1,
        pr_feed_value: 4,
        pr_sight: 4,
        ..SimParams::default()
    }
}

fn empty_sim(params: SimParams, radius: u32, seed: u64) -> Simulation {
    let field = Arc::new(HexField::circle(radius));
    Simulation::new(params, field, Population::new()).unwrap().with_seed(seed)
}

#[test]
fn lone_prey_divides_in_place() {
    let mut params = params();
    params.p_bact_divide = Probability::ALWAYS;
    let mut sim = empty_sim(params, 1, 3);
    sim.add_bacteria(HexCoord::origin());

    sim.step();

    assert_eq!(sim.bacteria_at(HexCoord::origin()), 2);
    assert_eq!(sim.count_bacteria(), 2);
    assert_eq!(sim.population().bacteria_cells().count(), 1);
}

#[test]
fn predator_closes_in_on_prey_in_sight() {
    let prey = HexCoord::new(3, -1);
    for seed in 0..20 {
        let mut sim = empty_sim(params(), 10, seed);
        sim.add_predator(HexCoord::origin());
        sim.add_bacteria(prey);
        assert_eq!(HexCoord::origin().distance(prey), 3);

        sim.step();

        let cells: Vec<HexCoord> = sim.population().predator_cells().copied().collect();
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].distance(prey), 2, "seed {}", seed);
        assert_eq!(sim.predator_energies_at(cells[0]), vec![9]);
    }
}

#[test]
fn even_energy_splits_evenly() {
    let mut params = params();
    params.p_pr_divide = Probability::ALWAYS;
    params.pr_divide_energy = 12;
    params.pr_init_energy = 12;
    let mut sim = empty_sim(params, 3, 1);
    sim.add_predator(HexCoord::new(1, 1));

    sim.step();

    assert_eq!(sim.predator_energies_at(HexCoord::new(1, 1)), vec![6, 6]);
}

#[test]
fn division_cost_comes_off_before_split() {
    let mut params = params();
    params.p_pr_divide = Probability::ALWAYS;
    params.pr_divide_energy = 12;
    params.pr_init_energy = 15;
    params.pr_divide_cost = 4;
    let mut sim = empty_sim(params, 3, 1);
    sim.add_predator(HexCoord::origin());

    sim.step();

    let energies = sim.predator_energies_at(HexCoord::origin());
    assert_eq!(energies, vec![5, 5]);
    assert_eq!(energies.iter().sum::<i32>(), (15 - 4) / 2 * 2);
}

#[test]
fn starving_predator_dies_on_schedule() {
    for (energy, cost) in [(10, 3), (10, 2), (1, 1), (7, 7)] {
        let mut params = params();
        params.pr_init_energy = energy;
        params.pr_turn_cost = cost;
        let mut sim = empty_sim(params, 5, 8);
        sim.add_predator(HexCoord::origin());

        let death_tick = (energy + cost - 1) / cost;
        for _ in 1..death_tick {
            sim.step();
        }
        assert_eq!(sim.count_predators(), 1, "E={} K={} died early", energy, cost);
        sim.step();
        assert_eq!(sim.count_predators(), 0, "E={} K={} outlived tick {}", energy, cost, death_tick);
    }
}

#[test]
fn seeded_runs_repeat_exactly() {
    let field = Arc::new(HexField::circle(8));
    let run = |seed: u64| {
        let mut rng = StdRng::seed_from_u64(seed);
        let population = generate_population(&field, 60, 8, 12, &mut rng);
        let mut sim = Simulation::new(SimParams::default(), field.clone(), population)
            .unwrap()
            .with_seed(seed);
        sim.run(40, |_| ControlFlow::Continue(()));
        sim.snapshot()
    };
    assert_eq!(run(5), run(5));
}

#[test]
fn long_run_keeps_population_on_field() {
    let field = Arc::new(HexField::circle(6));
    let mut rng = StdRng::seed_from_u64(77);
    let population = generate_population(&field, 40, 6, 12, &mut rng);
    let mut sim = Simulation::new(SimParams::default(), field.clone(), population)
        .unwrap()
        .with_seed(77);

    let mut ticks = 0;
    let outcome = sim.run(200, |summary| {
        ticks += 1;
        assert_eq!(summary.tick, ticks);
        ControlFlow::Continue(())
    });
    assert_eq!(outcome.steps, ticks);
    assert!(outcome.steps <= 200);

    let snapshot = sim.snapshot();
    assert!(snapshot.bacteria.iter().all(|b| field.contains(b.cell) && b.count > 0));
    for cell in &snapshot.predators {
        assert!(field.contains(cell.cell));
        assert!(cell.energies.iter().all(|&e| e > 0));
    }
    assert_eq!(snapshot.bacteria_count() as usize, sim.count_bacteria());
}

#[test]
fn halt_reasons_are_reported() {
    let mut sim = empty_sim(params(), 3, 2);
    sim.add_bacteria(HexCoord::origin());
    let outcome = sim.run(10, |_| ControlFlow::Continue(()));
    assert_eq!(outcome.steps, 1);
    assert_eq!(outcome.halt, HaltReason::NoPredators);
}
