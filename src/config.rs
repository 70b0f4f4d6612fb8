//! Tunable thresholds for the purchase pipeline.
//!
//! Defaults reproduce the stock behavior. A scenario file may override any
//! subset through its `config` section; the binary and `Engine::set_option`
//! apply further overrides on top.

use serde::{Deserialize, Serialize};

/// Attacker win percentage at which a territory counts as lost.
pub const WIN_PERCENTAGE: f64 = 95.0;

/// Configuration for one purchase phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PurchaseConfig {
    /// Attacker win percentage treated as a certain loss.
    pub win_percentage: f64,
    /// Minimum strategic value for land purchases and land factory sites.
    pub min_strategic_value: f64,
    /// Factory sites need production strictly above this.
    pub factory_production_floor: u32,
    /// Radius of the local land superiority check for factory sites.
    pub factory_superiority_radius: u32,
    /// Radius scanned for naval strength around a sea zone.
    pub naval_radius: u32,
    /// Enemy-vs-own strength difference below which a zone counts as safe.
    pub naval_defense_threshold: f64,
    /// Own-vs-enemy strength difference above which a zone counts as dominated.
    pub naval_attack_threshold: f64,
    /// At most `production / divisor` placed units are traded for attackers.
    pub surplus_substitution_divisor: u32,
    /// Weight applied to air units when ranking long-range attackers.
    pub air_attack_preference: f64,
    /// Pause after each placement submission, in milliseconds.
    pub placement_pause_ms: u64,
    /// Battles simulated per estimate by the reference combat estimator.
    pub simulation_trials: u32,
    /// Seed for the reference combat estimator.
    pub seed: u64,
}

impl Default for PurchaseConfig {
    fn default() -> Self {
        PurchaseConfig {
            win_percentage: WIN_PERCENTAGE,
            min_strategic_value: 0.25,
            factory_production_floor: 2,
            factory_superiority_radius: 3,
            naval_radius: 4,
            naval_defense_threshold: 50.0,
            naval_attack_threshold: 50.0,
            surplus_substitution_divisor: 3,
            air_attack_preference: 10.0,
            placement_pause_ms: 0,
            simulation_trials: crate::eval::combat::DEFAULT_TRIALS,
            seed: 0,
        }
    }
}

impl PurchaseConfig {
    /// Largest attacker win percentage the capital may be left exposed to.
    #[inline]
    pub fn capital_risk_percentage(&self) -> f64 {
        100.0 - self.win_percentage
    }

    /// Applies a named override. Returns false for unknown names or values
    /// that do not parse.
    pub fn set(&mut self, name: &str, value: &str) -> bool {
        fn parse<T: std::str::FromStr>(slot: &mut T, value: &str) -> bool {
            match value.trim().parse() {
                Ok(v) => {
                    *slot = v;
                    true
                }
                Err(_) => false,
            }
        }
        match name {
            "WinPercentage" => parse(&mut self.win_percentage, value),
            "MinStrategicValue" => parse(&mut self.min_strategic_value, value),
            "FactoryProductionFloor" => parse(&mut self.factory_production_floor, value),
            "NavalRadius" => parse(&mut self.naval_radius, value),
            "PlacementPause" => parse(&mut self.placement_pause_ms, value),
            "Trials" => parse(&mut self.simulation_trials, value),
            "Seed" => parse(&mut self.seed, value),
            _ => false,
        }
    }
}
