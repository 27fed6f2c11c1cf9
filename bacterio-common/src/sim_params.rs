use crate::probability::Probability;
use serde::{Deserialize, Serialize};

/// Rule parameters consumed by the engine on every tick.
///
/// Crowding thresholds of zero or below switch the crowding check off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimParams {
    // Bacteria
    pub p_bact_divide: Probability,
    pub p_bact_stay: Probability,
    pub bact_overcrowd: i32,
    pub bact_overcrowd_radius: u32,
    pub bact_velocity: u32, // Exact distance of a single move; 1 is a plain neighbour step

    // Predators
    pub pr_init_energy: i32,
    pub pr_max_energy: i32,
    pub pr_divide_energy: i32,
    pub pr_divide_cost: i32,
    pub pr_turn_cost: i32,
    pub pr_feed_value: i32,
    pub pr_sight: u32,
    pub p_pr_divide: Probability,
    pub p_pr_stay: Probability,
    pub pr_overcrowd: i32,
    pub pr_overcrowd_radius: u32,
}

impl Default for SimParams {
    fn default() -> Self {
        SimParams {
            p_bact_divide: DEFAULT_P_BACT_DIVIDE,
            p_bact_stay: DEFAULT_P_BACT_STAY,
            bact_overcrowd: DEFAULT_BACT_OVERCROWD,
            bact_overcrowd_radius: 1,
            bact_velocity: DEFAULT_BACT_VELOCITY,
            pr_init_energy: 12,
            pr_max_energy: 20,
            pr_divide_energy: 16,
            pr_divide_cost: 2,
            pr_turn_cost: 1,
            pr_feed_value: 4,
            pr_sight: 3,
            p_pr_divide: DEFAULT_P_PR_DIVIDE,
            p_pr_stay: DEFAULT_P_PR_STAY,
            pr_overcrowd: DEFAULT_PR_OVERCROWD,
            pr_overcrowd_radius: 1,
        }
    }
}

pub const DEFAULT_BACT_OVERCROWD: i32 = 6;
pub const DEFAULT_BACT_VELOCITY: u32 = 1;
pub const DEFAULT_PR_OVERCROWD: i32 = 4;

pub const DEFAULT_P_BACT_DIVIDE: Probability = Probability::from_scaled(1, 1); // 0.1
pub const DEFAULT_P_BACT_STAY: Probability = Probability::from_scaled(2, 1); // 0.2
pub const DEFAULT_P_PR_DIVIDE: Probability = Probability::from_scaled(2, 1); // 0.2
pub const DEFAULT_P_PR_STAY: Probability = Probability::from_scaled(5, 1); // 0.5
