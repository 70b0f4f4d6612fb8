//! Sea allocator.
//!
//! For each valuable sea zone, in order of value:
//! 1. If the zone is threatened, buy defenders until it holds. A zone that
//!    cannot be held is abandoned and its tentative buys are discarded.
//! 2. Keep buying defenders until the local fleet dominates the enemy
//!    ships and aircraft within the naval radius.
//! 3. Balance transports against land cargo waiting to be shipped.
//!
//! Production for a zone is the pooled remaining production of every
//! factory that can place into it. Ships go to the zone, cargo to the
//! supplying factory's own territory.

use tracing::{debug, trace};

use super::context::{greedy_commit, AllocationContext, PlaceId};
use super::option::{best_by, PurchaseOption, PurchaseOptions};
use super::Collaborators;
use crate::board::{PlayerId, Reach, TerritoryGraph, TerritoryId, Unit, UnitCategory};
use crate::config::PurchaseConfig;
use crate::eval::{BattleOutcome, CostTable};

/// Sea zones with positive strategic value, one entry per zone, ordered by
/// defender value plus strategic value, highest first.
pub fn prioritize(ctx: &AllocationContext, costs: &CostTable) -> Vec<PlaceId> {
    let mut seen: Vec<TerritoryId> = Vec::new();
    let mut scored: Vec<(PlaceId, f64)> = Vec::new();
    for id in ctx.place_ids() {
        let place = ctx.place(id);
        if !place.is_water || place.strategic_value <= 0.0 || seen.contains(&place.territory) {
            continue;
        }
        seen.push(place.territory);
        let score = f64::from(costs.tuv(&place.defenders)) + place.strategic_value;
        scored.push((id, score));
    }
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    debug!(count = scored.len(), "sea zones prioritized");
    scored.into_iter().map(|(id, _)| id).collect()
}

/// Returns true if a sea zone holds: the attacker loses value and is
/// unlikely to win.
fn sea_holds(outcome: &BattleOutcome, config: &PurchaseConfig) -> bool {
    outcome.tuv_swing < 0.0 && outcome.attacker_win_percentage < config.win_percentage
}

/// Best options for one zone, each affordable at selection time.
struct ZoneOptions<'o> {
    transport: Option<&'o PurchaseOption>,
    defense: Option<&'o PurchaseOption>,
    cargo: Option<&'o PurchaseOption>,
}

fn zone_options<'o>(
    ctx: &AllocationContext,
    zone: TerritoryId,
    options: &'o PurchaseOptions,
    graph: &dyn TerritoryGraph,
) -> ZoneOptions<'o> {
    let budget = ctx.remaining_budget();
    let territory = graph.territory(zone);
    let sea: Vec<&PurchaseOption> = options
        .sea
        .iter()
        .filter(|o| o.usable_at(territory, false) && o.cost <= budget)
        .collect();

    let loaders: Vec<TerritoryId> = ctx
        .suppliers_of(zone)
        .into_iter()
        .map(|(s, _)| s)
        .filter(|&s| ctx.purchase_territory(s).is_some_and(|p| p.remaining_production() > 0))
        .collect();
    let cargo = options.land.iter().filter(|o| {
        o.cost <= budget
            && o.transport_cost > 0
            && loaders
                .iter()
                .any(|&s| o.usable_at(graph.territory(s), graph.has_factory(s)))
    });

    ZoneOptions {
        transport: best_by(sea.iter().copied(), |o| o.transport_efficiency * f64::from(o.movement)),
        defense: best_by(sea.iter().copied().filter(|o| !o.is_sub), |o| {
            o.defense_efficiency * f64::from(o.movement)
        }),
        cargo: best_by(cargo, |o| o.hit_point_efficiency),
    }
}

/// Buys sea units for each prioritized zone.
pub fn purchase_sea_units(
    ctx: &mut AllocationContext,
    prioritized: &[PlaceId],
    options: &PurchaseOptions,
    deps: &Collaborators,
    config: &PurchaseConfig,
) {
    debug!(budget = ctx.remaining_budget(), "purchase sea units");

    for &id in prioritized {
        let zone = ctx.place(id).territory;
        let name = &deps.graph.territory(zone).name;
        let best = zone_options(ctx, zone, options, deps.graph);
        if best.transport.is_none() && best.defense.is_none() && best.cargo.is_none() {
            trace!(zone = %name, budget = ctx.remaining_budget(), "nothing affordable for zone");
            continue;
        }
        trace!(
            zone = %name,
            transport = ?best.transport.map(|o| &o.name),
            defense = ?best.defense.map(|o| &o.name),
            cargo = ?best.cargo.map(|o| &o.name),
            "sea options"
        );

        if !defend_zone(ctx, id, best.defense, deps, config) {
            continue;
        }
        if let Some(defense) = best.defense {
            hold_superiority(ctx, zone, defense, deps, config);
        }
        if let Some(cargo) = best.cargo {
            balance_transports(ctx, zone, cargo, best.transport, deps.graph);
        }
    }
}

/// Buys defenders for a threatened zone. Returns false, buying nothing,
/// if the zone cannot be held.
fn defend_zone(
    ctx: &mut AllocationContext,
    id: PlaceId,
    defense: Option<&PurchaseOption>,
    deps: &Collaborators,
    config: &PurchaseConfig,
) -> bool {
    let zone = ctx.place(id).territory;
    let Some(threat) = ctx.threats.get(&zone) else {
        return true;
    };
    let attackers = threat.max_units.clone();
    let mut defenders = ctx.place(id).defenders.clone();
    defenders.extend(ctx.zone_placed(zone));

    let player = ctx.player;
    let mut outcome = deps.combat.estimate_battle(player, zone, &attackers, &defenders);
    let mut ledger = ctx.ledger(ctx.zone_production(zone));
    greedy_commit(&mut ledger, |l| {
        if !l.units().is_empty() {
            let mut all = defenders.clone();
            all.extend_from_slice(l.units());
            outcome = deps.combat.estimate_battle(player, zone, &attackers, &all);
        }
        if sea_holds(&outcome, config) {
            None
        } else {
            defense
        }
    });

    ctx.place_mut(id).last_outcome = Some(outcome);
    if !sea_holds(&outcome, config) {
        trace!(
            zone = %deps.graph.territory(zone).name,
            swing = outcome.tuv_swing,
            win = outcome.attacker_win_percentage,
            tried = ledger.units().len(),
            "cannot defend zone"
        );
        return false;
    }
    trace!(zone = %deps.graph.territory(zone).name, bought = ledger.units().len(), "zone defenders");
    ctx.commit_to_zone(zone, ledger, None);
    true
}

/// Ships and aircraft around a zone.
struct NavalBalance {
    mine: Vec<Unit>,
    enemy_sea: Vec<Unit>,
    enemy_air: Vec<Unit>,
}

impl NavalBalance {
    fn around(graph: &dyn TerritoryGraph, player: PlayerId, zone: TerritoryId, radius: u32) -> Self {
        let category = |u: &Unit| graph.unit_stats(u.unit_type).map(|s| s.category);
        let mut balance = NavalBalance { mine: Vec::new(), enemy_sea: Vec::new(), enemy_air: Vec::new() };

        let mut seas = graph.neighbors_within(zone, radius, Reach::Water);
        seas.push(zone);
        for t in seas {
            for u in graph.units(t) {
                match category(u) {
                    None | Some(UnitCategory::Land) | Some(UnitCategory::Factory) => {}
                    Some(_) if u.owner == player => balance.mine.push(*u),
                    Some(_) if !graph.is_allied(player, u.owner) => balance.enemy_sea.push(*u),
                    Some(_) => {}
                }
            }
        }
        for t in graph.neighbors_within(zone, radius, Reach::Any) {
            if !graph.territory(t).is_land() {
                continue;
            }
            balance.enemy_air.extend(graph.units(t).iter().filter(|u| {
                !graph.is_allied(player, u.owner) && category(u) == Some(UnitCategory::Air)
            }));
        }
        balance
    }
}

/// Buys defenders until own naval strength dominates the neighborhood.
/// Buys nothing if it already does.
fn hold_superiority(
    ctx: &mut AllocationContext,
    zone: TerritoryId,
    defense: &PurchaseOption,
    deps: &Collaborators,
    config: &PurchaseConfig,
) {
    let balance = NavalBalance::around(deps.graph, ctx.player, zone, config.naval_radius);
    let mut mine = balance.mine;
    mine.extend(ctx.zone_placed(zone));
    let mut enemy = balance.enemy_sea.clone();
    enemy.extend_from_slice(&balance.enemy_air);

    let mut ledger = ctx.ledger(ctx.zone_production(zone));
    greedy_commit(&mut ledger, |l| {
        let mut ours = mine.clone();
        ours.extend_from_slice(l.units());
        let defense_diff = deps.combat.strength_difference(zone, &enemy, &ours);
        let attack_diff = deps.combat.strength_difference(zone, &ours, &balance.enemy_sea);
        trace!(defense_diff, attack_diff, ours = ours.len(), enemy = enemy.len(), "naval balance");
        if defense_diff < config.naval_defense_threshold && attack_diff > config.naval_attack_threshold {
            None
        } else {
            Some(defense)
        }
    });
    trace!(zone = %deps.graph.territory(zone).name, bought = ledger.units().len(), "superiority defenders");
    ctx.commit_to_zone(zone, ledger, None);
}

/// Buys cargo while transports have room, and transports while cargo waits.
fn balance_transports(
    ctx: &mut AllocationContext,
    zone: TerritoryId,
    cargo: &PurchaseOption,
    transport: Option<&PurchaseOption>,
    graph: &dyn TerritoryGraph,
) {
    let player = ctx.player;
    let slot = i64::from(cargo.transport_cost.max(1));
    let capacity: i64 = graph
        .units(zone)
        .iter()
        .filter(|u| u.owner == player)
        .filter_map(|u| graph.unit_stats(u.unit_type))
        .filter(|s| s.is_transport())
        .map(|s| i64::from(s.transport_capacity) / slot)
        .sum();
    let waiting = graph
        .neighbors_within(zone, 1, Reach::Any)
        .into_iter()
        .filter(|&t| graph.territory(t).is_land())
        .flat_map(|t| graph.units(t).iter())
        .filter(|u| u.owner == player)
        .filter(|u| {
            graph
                .unit_stats(u.unit_type)
                .is_some_and(|s| s.category == UnitCategory::Land && s.transport_cost > 0)
        })
        .count() as i64;
    let mut gap = capacity - waiting;
    trace!(zone = %graph.territory(zone).name, capacity, waiting, "transport gap");

    let mut ledger = ctx.ledger(ctx.zone_production(zone));
    greedy_commit(&mut ledger, |l| {
        if gap >= 0 && l.can_afford(cargo) {
            gap -= i64::from(cargo.quantity);
            return Some(cargo);
        }
        match transport {
            Some(t) if gap < 0 && l.can_afford(t) => {
                gap += i64::from(t.transport_capacity * t.quantity) / slot;
                Some(t)
            }
            _ => None,
        }
    });
    trace!(zone = %graph.territory(zone).name, bought = ledger.units().len(), "transports and cargo");
    ctx.commit_to_zone(zone, ledger, Some(cargo.unit_type));
}
