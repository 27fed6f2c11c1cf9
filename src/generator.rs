use crate::field::HexField;
use crate::population::{Bacteria, Population, Predator};
use log::{info, warn};
use rand::seq::SliceRandom;
use rand::Rng;

/// Scatters a fresh population over `field`, one agent per cell.
///
/// Bacteria are placed first, then predators carrying `init_energy`, each
/// on a uniformly chosen cell that is still empty. Placement stops once
/// the field is full, so asking for more agents than cells is not an error.
pub fn generate_population<R: Rng>(
    field: &HexField,
    num_bacteria: u32,
    num_predators: u32,
    init_energy: i32,
    rng: &mut R,
) -> Population {
    let mut free = field.sorted_cells();
    free.shuffle(rng);
    let mut free = free.into_iter();

    let mut population = Population::new();
    let mut placed_bacteria = 0usize;
    for c in free.by_ref().take(num_bacteria as usize) {
        population.push_bacteria(c, Bacteria);
        placed_bacteria += 1;
    }
    let mut placed_predators = 0usize;
    for c in free.take(num_predators as usize) {
        population.push_predator(c, Predator::new(init_energy));
        placed_predators += 1;
    }

    let requested = num_bacteria as usize + num_predators as usize;
    if placed_bacteria + placed_predators < requested {
        warn!(
            "Field of {} cells is full: placed {} of {} bacteria and {} of {} predators.",
            field.len(),
            placed_bacteria,
            num_bacteria,
            placed_predators,
            num_predators
        );
    }
    info!(
        "Generated {} bacteria and {} predators on {} cells.",
        placed_bacteria,
        placed_predators,
        field.len()
    );
    population
}

#[cfg(test)]
mod tests {
    use super::*;
    use bacterio_common::HexCoord;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn one_agent_per_cell() {
        let field = HexField::circle(4);
        let mut rng = StdRng::seed_from_u64(42);
        let pop = generate_population(&field, 20, 10, 8, &mut rng);
        assert_eq!(pop.count_bacteria(), 20);
        assert_eq!(pop.count_predators(), 10);
        assert_eq!(pop.bacteria_cells().count(), 20);
        assert_eq!(pop.predator_cells().count(), 10);
        for c in pop.predator_cells() {
            assert_eq!(pop.bacteria_at(*c), 0);
            assert_eq!(pop.predators_at(*c), &[Predator::new(8)]);
        }
        assert!(pop.validate(&field).is_ok());
    }

    #[test]
    fn bacteria_take_priority_when_field_fills() {
        let field = HexField::circle(1);
        let mut rng = StdRng::seed_from_u64(1);
        let pop = generate_population(&field, 5, 3, 8, &mut rng);
        assert_eq!((pop.count_bacteria(), pop.count_predators()), (5, 2));

        let pop = generate_population(&field, 15, 3, 8, &mut rng);
        assert_eq!((pop.count_bacteria(), pop.count_predators()), (7, 0));
    }

    #[test]
    fn same_seed_same_layout() {
        let field = HexField::circle(6);
        let a = generate_population(&field, 30, 5, 4, &mut StdRng::seed_from_u64(9));
        let b = generate_population(&field, 30, 5, 4, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn empty_request_is_empty() {
        let field = HexField::circle(2);
        let pop = generate_population(&field, 0, 0, 4, &mut StdRng::seed_from_u64(0));
        assert!(pop.is_empty());
        assert_eq!(pop.bacteria_at(HexCoord::origin()), 0);
    }
}
