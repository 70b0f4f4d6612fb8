//! Land allocator: fills valuable land territories with a unit mix shaped
//! by how far away the nearest enemy is.

use tracing::{debug, trace};

use super::context::{greedy_commit, AllocationContext, PlaceId};
use super::option::{best_by, PurchaseOption, PurchaseOptions};
use crate::board::TerritoryGraph;
use crate::config::PurchaseConfig;

/// Share of remaining production per role, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitMix {
    pub durability: u32,
    pub attack: u32,
    pub two_move: u32,
    pub three_move: u32,
}

impl UnitMix {
    /// Baseline 65/35 durability/attack. Distant fronts take half in 3-move
    /// units; otherwise 10% per step of distance (at most 50%) goes to
    /// 2-move units. Mobility is carved out of the attack share, or replaces
    /// it entirely and eats into durability when it is larger.
    pub fn for_distance(distance: u32, has_two_move: bool, has_three_move: bool) -> Self {
        let mut mix = UnitMix { durability: 65, attack: 35, two_move: 0, three_move: 0 };
        if has_three_move && distance > 4 {
            mix.three_move = 50;
        } else if has_two_move {
            mix.two_move = distance.saturating_mul(10).min(50);
        }

        let mobility = mix.two_move + mix.three_move;
        if mobility > mix.attack {
            mix.durability = 100 - mobility;
            mix.attack = 0;
        } else {
            mix.attack -= mobility;
        }
        mix
    }

    /// Unit targets for `production`, rounding each share up.
    pub fn targets(&self, production: u32) -> [u32; 4] {
        let share = |percent: u32| (percent * production).div_ceil(100);
        [share(self.durability), share(self.three_move), share(self.two_move), share(self.attack)]
    }
}

/// Land entries worth at least the minimum strategic value, most valuable
/// first. Equal values keep encounter order.
pub fn prioritize(ctx: &AllocationContext, config: &PurchaseConfig) -> Vec<PlaceId> {
    let mut prioritized: Vec<PlaceId> = ctx
        .place_ids()
        .into_iter()
        .filter(|&id| {
            let place = ctx.place(id);
            !place.is_water && place.strategic_value >= config.min_strategic_value
        })
        .collect();
    prioritized.sort_by(|a, b| {
        ctx.place(*b)
            .strategic_value
            .total_cmp(&ctx.place(*a).strategic_value)
    });
    debug!(count = prioritized.len(), "land territories prioritized");
    prioritized
}

/// Buys the distance-weighted mix for each prioritized territory.
///
/// Batches are bought in strict role order: durability, 3-move, 2-move,
/// attack, each until its target, the budget, or production runs out.
pub fn purchase_land_units(
    ctx: &mut AllocationContext,
    prioritized: &[PlaceId],
    options: &PurchaseOptions,
    graph: &dyn TerritoryGraph,
) {
    debug!(budget = ctx.remaining_budget(), "purchase land units");

    for &id in prioritized {
        let t = ctx.place(id).territory;
        let territory = graph.territory(t);
        let has_factory = graph.has_factory(t);
        let budget = ctx.remaining_budget();
        let usable: Vec<&PurchaseOption> = options
            .land
            .iter()
            .filter(|o| o.usable_at(territory, has_factory) && o.cost <= budget)
            .collect();

        let hit_points = best_by(usable.iter().copied(), |o| o.hit_point_efficiency);
        let attack = best_by(usable.iter().copied(), |o| o.attack_efficiency);
        let two_move = best_by(usable.iter().copied().filter(|o| o.movement >= 2), |o| o.attack_efficiency);
        let three_move = best_by(usable.iter().copied().filter(|o| o.movement >= 3), |o| o.attack_efficiency);
        let (Some(hit_points), Some(attack)) = (hit_points, attack) else {
            continue;
        };

        let distance = match graph.nearest_enemy_land_distance(ctx.player, t) {
            Some(d) if d > 0 => d,
            _ => continue,
        };
        let mix = UnitMix::for_distance(distance, two_move.is_some(), three_move.is_some());
        let targets = mix.targets(ctx.remaining_production_for(id));
        trace!(territory = %territory.name, distance, ?mix, ?targets, "land mix");

        let roles = [Some(hit_points), three_move, two_move, Some(attack)];
        let mut added = [0u32; 4];
        let mut ledger = ctx.ledger(ctx.remaining_production_for(id));
        greedy_commit(&mut ledger, |l| {
            for (slot, role) in roles.iter().enumerate() {
                if let Some(option) = role {
                    if added[slot] < targets[slot] && l.can_afford(option) {
                        added[slot] += option.quantity;
                        return Some(*option);
                    }
                }
            }
            None
        });

        trace!(territory = %territory.name, bought = ledger.units().len(), spent = ledger.spent(), "land units");
        ctx.commit(id, ledger);
    }
}
