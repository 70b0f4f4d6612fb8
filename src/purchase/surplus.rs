//! Surplus allocator: turns leftover budget into long-range attackers.
//!
//! Cheap units already placed at a factory are swapped one for one for the
//! best long-range attacker, then remaining production buys it outright.

use tracing::{debug, trace};

use super::context::{greedy_commit, AllocationContext, PlaceId};
use super::option::{best_by, PurchaseOption, PurchaseOptions};
use crate::board::{TerritoryGraph, Unit};
use crate::config::PurchaseConfig;

/// Spends the remaining budget at every land purchase territory, in id order.
pub fn spend_remaining(
    ctx: &mut AllocationContext,
    options: &PurchaseOptions,
    graph: &dyn TerritoryGraph,
    config: &PurchaseConfig,
) {
    debug!(budget = ctx.remaining_budget(), "spend surplus");

    let suppliers: Vec<_> = ctx.purchase_territories().map(|p| (p.territory, p.production)).collect();
    for (t, production) in suppliers {
        if ctx.remaining_budget() == 0 {
            break;
        }
        let Some(home) = ctx.entry(t, t) else {
            continue;
        };
        if ctx.place(home).is_water {
            continue;
        }

        let credit = cheapest_trade_in(ctx, home, options);
        let limit = ctx.remaining_budget() + credit;
        let territory = graph.territory(t);
        let has_factory = graph.has_factory(t);
        let usable = options
            .land
            .iter()
            .chain(options.air.iter())
            .filter(|o| o.is_single() && o.cost <= limit && o.usable_at(territory, has_factory));
        let Some(best) = best_by(usable, |o| long_range_score(o, config)) else {
            continue;
        };
        trace!(territory = %territory.name, option = %best.name, credit, "long-range attacker");

        let cap = production.checked_div(config.surplus_substitution_divisor).unwrap_or(0);
        let swapped = substitute(ctx, home, best, options, cap);

        let mut ledger = ctx.ledger(ctx.remaining_production_for(home));
        greedy_commit(&mut ledger, |_| Some(best));
        trace!(territory = %territory.name, swapped, bought = ledger.units().len(), "surplus");
        ctx.commit(home, ledger);
    }
}

/// `attack efficiency * movement`, weighted up for aircraft.
fn long_range_score(option: &PurchaseOption, config: &PurchaseConfig) -> f64 {
    let preference = if option.is_air() { config.air_attack_preference } else { 1.0 };
    option.attack_efficiency * f64::from(option.movement) * preference
}

/// Cost of the cheapest placed unit that has a single land option, or 0.
fn cheapest_trade_in(ctx: &AllocationContext, id: PlaceId, options: &PurchaseOptions) -> u32 {
    ctx.place(id)
        .placed()
        .iter()
        .filter_map(|u| options.single_land(u.unit_type))
        .map(|o| o.cost)
        .min()
        .unwrap_or(0)
}

/// Replaces up to `cap` placed units that cost less than `best` with
/// `best`, while the difference is affordable. Returns the swap count.
fn substitute(
    ctx: &mut AllocationContext,
    id: PlaceId,
    best: &PurchaseOption,
    options: &PurchaseOptions,
    cap: u32,
) -> u32 {
    let mut added: Vec<Unit> = Vec::new();
    let mut swaps = 0;
    while swaps < cap {
        let candidate = ctx.place(id).placed().iter().enumerate().find_map(|(index, u)| {
            options
                .single_land(u.unit_type)
                .filter(|o| o.cost < best.cost)
                .map(|o| (index, o.cost))
        });
        let Some((index, refund)) = candidate else {
            break;
        };
        if best.cost > ctx.remaining_budget() + refund {
            break;
        }
        if ctx.trade_in(id, index, refund, best.cost).is_none() {
            break;
        }
        added.extend(Unit::batch(best.unit_type, ctx.player, best.quantity));
        swaps += 1;
    }
    ctx.push_traded(id, added);
    swaps
}
