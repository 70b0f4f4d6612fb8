//! Defense prioritizer and defender purchaser.
//!
//! Land placement entries that would fall to their worst-case threat are
//! ranked, capital first, and then reinforced one batch at a time with the
//! most cost-efficient defender until they hold. Defender purchases are
//! best effort: batches bought for a territory that still falls are kept.

use tracing::{debug, trace};

use super::context::{greedy_commit, AllocationContext, PlaceId};
use super::option::{best_by, PurchaseOptions};
use super::Collaborators;
use crate::config::PurchaseConfig;
use crate::eval::{BattleOutcome, CostTable};

/// Flags the land entries that cannot survive their threat and returns
/// them sorted by defense priority, highest first.
///
/// Priority is `(2 * production + 5 * factory + 0.5 * defender value)`,
/// multiplied by 11 for the capital. Equal scores keep encounter order.
pub fn prioritize(
    ctx: &mut AllocationContext,
    deps: &Collaborators,
    costs: &CostTable,
    config: &PurchaseConfig,
) -> Vec<PlaceId> {
    let mut needs_defense = Vec::new();

    for id in ctx.place_ids() {
        let place = ctx.place(id);
        let t = place.territory;
        if place.is_water {
            continue;
        }
        let Some(threat) = ctx.threats.get(&t) else {
            continue;
        };

        let attackers = threat.all_attackers();
        let outcome = deps.combat.estimate_battle(ctx.player, t, &attackers, &place.defenders);
        let is_capital = ctx.capital == Some(t);
        let falls = outcome.attacker_land_remaining
            || outcome.tuv_swing > 0.0
            || (is_capital && outcome.attacker_win_percentage > config.capital_risk_percentage());

        let territory = deps.graph.territory(t);
        let factory = if deps.graph.has_factory(t) { 1.0 } else { 0.0 };
        let capital = if is_capital { 1.0 } else { 0.0 };
        let score = (2.0 * f64::from(territory.production)
            + 5.0 * factory
            + 0.5 * f64::from(costs.tuv(&place.defenders)))
            * (1.0 + 10.0 * capital);

        let place = ctx.place_mut(id);
        place.last_outcome = Some(outcome);
        if falls {
            place.defense_value = score;
            needs_defense.push(id);
        }
    }

    needs_defense.sort_by(|a, b| {
        ctx.place(*b)
            .defense_value
            .total_cmp(&ctx.place(*a).defense_value)
    });

    for &id in &needs_defense {
        let place = ctx.place(id);
        trace!(territory = %deps.graph.territory(place.territory).name, value = place.defense_value, "needs defense");
    }
    debug!(count = needs_defense.len(), "defense prioritized");
    needs_defense
}

/// Returns true if a defended territory counts as held after `outcome`.
/// The capital must also keep the attacker's win chance under the risk limit.
pub fn holds(outcome: &BattleOutcome, is_capital: bool, config: &PurchaseConfig) -> bool {
    outcome.defender_holds()
        && (!is_capital || outcome.attacker_win_percentage < config.capital_risk_percentage())
}

/// Buys defenders for each prioritized territory in order.
pub fn purchase_defenders(
    ctx: &mut AllocationContext,
    prioritized: &[PlaceId],
    options: &PurchaseOptions,
    deps: &Collaborators,
    config: &PurchaseConfig,
) {
    debug!(budget = ctx.remaining_budget(), "purchase defenders");

    for &id in prioritized {
        let t = ctx.place(id).territory;
        let Some(threat) = ctx.threats.get(&t) else {
            continue;
        };
        let attackers = threat.all_attackers();
        let territory = deps.graph.territory(t);
        let has_factory = deps.graph.has_factory(t);

        let budget = ctx.remaining_budget();
        let usable = options
            .land
            .iter()
            .filter(|o| o.usable_at(territory, has_factory) && o.cost <= budget);
        let Some(best) = best_by(usable, |o| o.defense_efficiency) else {
            continue;
        };
        trace!(territory = %territory.name, option = %best.name, attackers = attackers.len(), "best defender");

        let is_capital = ctx.capital == Some(t);
        let defenders = ctx.place(id).all_defenders();
        let mut last: Option<BattleOutcome> = None;
        let mut ledger = ctx.ledger(ctx.remaining_production_for(id));
        greedy_commit(&mut ledger, |l| {
            if !l.units().is_empty() {
                let mut all = defenders.clone();
                all.extend_from_slice(l.units());
                let outcome = deps.combat.estimate_battle(ctx.player, t, &attackers, &all);
                last = Some(outcome);
                if holds(&outcome, is_capital, config) {
                    return None;
                }
            }
            Some(best)
        });

        trace!(territory = %territory.name, bought = ledger.units().len(), spent = ledger.spent(), "defenders");
        ctx.commit(id, ledger);
        if let Some(outcome) = last {
            ctx.place_mut(id).last_outcome = Some(outcome);
        }
    }
}
