//! Factory siting: decides whether to turn budget into a new production
//! territory.
//!
//! Runs as two passes. The land pass needs a site with real strategic
//! value; the sea pass, tried only when the land pass sited nothing, also
//! accepts sites next to a sea zone.

use tracing::{debug, trace};

use super::context::{AllocationContext, PlaceId, PlaceTerritory};
use super::option::{PurchaseOption, PurchaseOptions};
use super::Collaborators;
use crate::board::{Territory, TerritoryId, Unit};
use crate::config::PurchaseConfig;
use crate::eval::TerritoryValues;

/// Land pass: sites need strategic value of at least the minimum.
pub fn site_land_factory(
    ctx: &mut AllocationContext,
    land_priority: &[PlaceId],
    options: &PurchaseOptions,
    deps: &Collaborators,
    config: &PurchaseConfig,
) -> Option<TerritoryId> {
    debug!(budget = ctx.remaining_budget(), "site land factory");
    let min = config.min_strategic_value;
    site(ctx, land_priority, options, deps, config, |value, _| value >= min)
}

/// Sea pass: sites qualify on strategic value or by touching a sea zone.
pub fn site_sea_factory(
    ctx: &mut AllocationContext,
    land_priority: &[PlaceId],
    options: &PurchaseOptions,
    deps: &Collaborators,
    config: &PurchaseConfig,
) -> Option<TerritoryId> {
    debug!(budget = ctx.remaining_budget(), "site sea factory");
    let min = config.min_strategic_value;
    site(ctx, land_priority, options, deps, config, |value, sea_adjacent| {
        value >= min || sea_adjacent
    })
}

/// A placed unit that can be traded for a factory.
struct TradeIn {
    place: PlaceId,
    index: usize,
    cost: u32,
}

fn site(
    ctx: &mut AllocationContext,
    land_priority: &[PlaceId],
    options: &PurchaseOptions,
    deps: &Collaborators,
    config: &PurchaseConfig,
    eligible: impl Fn(f64, bool) -> bool,
) -> Option<TerritoryId> {
    let graph = deps.graph;
    let player = ctx.player;

    let mut viable = Vec::new();
    let mut unholdable = Vec::new();
    for t in graph.owned_land_territories(player) {
        let territory = graph.territory(t);
        if territory.conquered
            || graph.has_factory(t)
            || territory.production <= config.factory_production_floor
            || ctx.purchase_territory(t).is_some()
        {
            continue;
        }
        match ctx.threats.get(&t) {
            None => viable.push(t),
            Some(threat) => {
                let defenders = graph.allied_units(player, t);
                let outcome = deps
                    .combat
                    .estimate_battle(player, t, &threat.all_attackers(), &defenders);
                if outcome.defender_holds() {
                    viable.push(t);
                } else {
                    trace!(territory = %territory.name, swing = outcome.tuv_swing, "cannot hold factory site");
                    unholdable.push(t);
                }
            }
        }
    }
    viable.retain(|&t| {
        deps.combat
            .has_local_land_superiority(player, t, config.factory_superiority_radius)
    });
    trace!(candidates = viable.len(), unholdable = unholdable.len(), "factory candidates");

    let values = deps.values.territory_values(player, &unholdable);
    let site = best_site(&viable, &values, deps, &eligible)?;
    let territory = graph.territory(site);

    let trade_in = most_expensive_placed(ctx, land_priority, options);
    let credit = trade_in.as_ref().map_or(0, |t| t.cost);
    let budget = ctx.remaining_budget();
    let factory = costliest_factory(options, territory, budget + credit)?;

    if factory.cost > budget {
        let trade_in = trade_in?;
        if trade_in.cost > factory.cost {
            trace!(territory = %territory.name, "trade-in worth more than the factory");
            return None;
        }
        trade_for_factory(ctx, site, &trade_in, factory, deps, &values)?;
        debug!(territory = %territory.name, option = %factory.name, traded = trade_in.cost, "factory sited");
    } else {
        let id = register(ctx, site, deps, &values)?;
        ctx.commit_free(id, Unit::batch(factory.unit_type, player, factory.quantity), factory.cost);
        debug!(territory = %territory.name, option = %factory.name, "factory sited");
    }
    Some(site)
}

/// Highest `value * production + 0.1 * production` among eligible sites.
/// Ties keep the earlier site.
fn best_site(
    viable: &[TerritoryId],
    values: &TerritoryValues,
    deps: &Collaborators,
    eligible: &impl Fn(f64, bool) -> bool,
) -> Option<TerritoryId> {
    let mut best = None;
    let mut max = 0.0;
    for &t in viable {
        let production = f64::from(deps.graph.territory(t).production);
        let value = values.get(&t).copied().unwrap_or(0.0);
        let score = value * production + 0.1 * production;
        trace!(territory = %deps.graph.territory(t).name, value, score, "factory site");
        if score > max && eligible(value, deps.graph.is_sea_adjacent(t)) {
            max = score;
            best = Some(t);
        }
    }
    best
}

/// Costliest immobile factory usable at the site within `limit`.
fn costliest_factory<'o>(
    options: &'o PurchaseOptions,
    territory: &Territory,
    limit: u32,
) -> Option<&'o PurchaseOption> {
    let mut best: Option<&PurchaseOption> = None;
    for option in &options.factory {
        if option.movement == 0
            && option.usable_at(territory, false)
            && option.cost <= limit
            && option.cost > best.map_or(0, |b| b.cost)
        {
            best = Some(option);
        }
    }
    best
}

/// The most expensive single-quantity land unit placed in the land
/// priority territories. Later units win ties.
fn most_expensive_placed(
    ctx: &AllocationContext,
    land_priority: &[PlaceId],
    options: &PurchaseOptions,
) -> Option<TradeIn> {
    let mut best: Option<TradeIn> = None;
    for &place in land_priority {
        for (index, unit) in ctx.place(place).placed().iter().enumerate() {
            let Some(option) = options.single_land(unit.unit_type) else {
                continue;
            };
            if option.cost >= best.as_ref().map_or(0, |b| b.cost) {
                best = Some(TradeIn { place, index, cost: option.cost });
            }
        }
    }
    best
}

/// Swaps a placed unit for a factory at `site`. The site is only
/// registered once the trade-in has gone through.
fn trade_for_factory(
    ctx: &mut AllocationContext,
    site: TerritoryId,
    trade_in: &TradeIn,
    factory: &PurchaseOption,
    deps: &Collaborators,
    values: &TerritoryValues,
) -> Option<PlaceId> {
    ctx.trade_in(trade_in.place, trade_in.index, trade_in.cost, factory.cost)?;
    let id = register(ctx, site, deps, values)?;
    ctx.push_traded(id, Unit::batch(factory.unit_type, ctx.player, factory.quantity));
    Some(id)
}

/// Adds the site as a purchase territory with no production this turn.
fn register(
    ctx: &mut AllocationContext,
    site: TerritoryId,
    deps: &Collaborators,
    values: &TerritoryValues,
) -> Option<PlaceId> {
    ctx.add_purchase_territory(site, 0);
    let mut place = PlaceTerritory::new(site, site, false, deps.graph.allied_units(ctx.player, site));
    place.strategic_value = values.get(&site).copied().unwrap_or(0.0);
    ctx.add_place(place)
}
