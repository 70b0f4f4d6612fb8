//! Territory catalog: which territories produce, and where they can place.

use tracing::{debug, trace};

use super::context::{AllocationContext, PlaceTerritory};
use crate::board::{PlayerId, TerritoryGraph};
use crate::eval::TerritoryValues;

/// Builds a fresh context with one purchase territory per production
/// territory and one placement entry per territory it can place into.
/// Each entry snapshots the allied units standing there.
pub fn build(graph: &dyn TerritoryGraph, player: PlayerId, budget: u32) -> AllocationContext {
    let mut ctx = AllocationContext::new(player, graph.capital(player), budget);

    for factory in graph.production_territories(player) {
        ctx.add_purchase_territory(factory, graph.territory(factory).production);
        for t in graph.placement_territories(player, factory) {
            let defenders = graph.allied_units(player, t);
            trace!(territory = %graph.territory(t).name, defenders = defenders.len(), "placement entry");
            let place = PlaceTerritory::new(t, factory, graph.territory(t).is_water(), defenders);
            ctx.add_place(place);
        }
    }

    debug!(
        purchase_territories = ctx.purchase_territories().count(),
        placements = ctx.place_ids().len(),
        budget,
        "catalog built"
    );
    ctx
}

/// Copies strategic values onto every placement entry. Missing values are 0.
pub fn apply_values(ctx: &mut AllocationContext, values: &TerritoryValues) {
    for id in ctx.place_ids() {
        let place = ctx.place_mut(id);
        place.strategic_value = values.get(&place.territory).copied().unwrap_or(0.0);
    }
}
