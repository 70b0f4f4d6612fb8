//! Combat, threat, and value estimation.
//!
//! Declares the estimator traits the purchase pipeline consults, the value
//! types they exchange, and the reference implementations: a seeded
//! Monte-Carlo battle simulator and a distance-weighted territory value
//! model.

pub mod combat;
pub mod value;

use std::collections::HashMap;

use crate::board::{PlayerId, TerritoryId, Unit, UnitTypeId};

pub use combat::SimulatedCombat;
pub use value::DistanceValueModel;

/// Estimated result of one engagement, seen from the attacker.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BattleOutcome {
    /// Expected defender loss value minus attacker loss value. Positive
    /// numbers favour the attacker.
    pub tuv_swing: f64,
    /// Chance, in percent, that the attacker wipes out the defenders.
    pub attacker_win_percentage: f64,
    /// True if an attacking land unit is expected to survive and take the
    /// territory. The defender keeps its land presence when this is false.
    pub attacker_land_remaining: bool,
}

impl BattleOutcome {
    /// Returns true if the defender holds the territory without losing value.
    #[inline]
    pub fn defender_holds(&self) -> bool {
        !self.attacker_land_remaining && self.tuv_swing <= 0.0
    }
}

/// Largest enemy force that can reach a territory next enemy turn.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ThreatEstimate {
    /// Units able to attack by moving directly.
    pub max_units: Vec<Unit>,
    /// Land units able to attack by sea transport.
    pub max_amphib_units: Vec<Unit>,
}

impl ThreatEstimate {
    /// Direct and amphibious attackers combined into one force.
    pub fn all_attackers(&self) -> Vec<Unit> {
        let mut units = self.max_units.clone();
        units.extend_from_slice(&self.max_amphib_units);
        units
    }

    /// Returns true if no enemy unit can reach the territory.
    pub fn is_empty(&self) -> bool {
        self.max_units.is_empty() && self.max_amphib_units.is_empty()
    }
}

/// Battle and threat estimation for one game state.
pub trait CombatEstimator {
    /// Maximum enemy force able to attack `t`, or `None` when no enemy unit
    /// can reach it (or the territory cannot be resolved).
    fn max_enemy_attack(&self, player: PlayerId, t: TerritoryId) -> Option<ThreatEstimate>;

    /// Estimates `attackers` assaulting `defenders` at `t`, where `player`
    /// owns the defending side.
    fn estimate_battle(
        &self,
        player: PlayerId,
        t: TerritoryId,
        attackers: &[Unit],
        defenders: &[Unit],
    ) -> BattleOutcome;

    /// Relative strength of `attackers` against `defenders` on a 0..=100
    /// scale where 50 means evenly matched.
    fn strength_difference(&self, t: TerritoryId, attackers: &[Unit], defenders: &[Unit]) -> f64;

    /// Returns true if the player's land forces within `radius` of `t`
    /// outmatch the enemy's.
    fn has_local_land_superiority(&self, player: PlayerId, t: TerritoryId, radius: u32) -> bool;
}

/// Strategic value per territory. Missing entries count as 0.
pub type TerritoryValues = HashMap<TerritoryId, f64>;

/// Long-term territory worth for a player.
pub trait ValueModel {
    /// Values every territory, treating `unholdable` territories as lost.
    fn territory_values(&self, player: PlayerId, unholdable: &[TerritoryId]) -> TerritoryValues;
}

/// Unit cost lookup used to price defender stacks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CostTable {
    costs: HashMap<UnitTypeId, u32>,
}

impl CostTable {
    /// Wraps a per-type cost map.
    pub fn new(costs: HashMap<UnitTypeId, u32>) -> Self {
        CostTable { costs }
    }

    /// Cost of one unit of a type; unknown types cost 0.
    #[inline]
    pub fn cost(&self, unit_type: UnitTypeId) -> u32 {
        self.costs.get(&unit_type).copied().unwrap_or(0)
    }

    /// Total unit value of a unit list.
    pub fn tuv(&self, units: &[Unit]) -> u32 {
        units.iter().map(|u| self.cost(u.unit_type)).sum()
    }
}

/// Source of the per-player cost table.
pub trait UnitValuation {
    fn unit_costs(&self, player: PlayerId) -> CostTable;
}
