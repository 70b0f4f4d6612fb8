//! Purchase-phase allocation pipeline.
//!
//! Stages run strictly in order against one `AllocationContext`:
//! threat assessment, defense prioritization, defender purchase, land
//! allocation, land factory siting, sea allocation, sea factory siting
//! (only when the land pass sited nothing), surplus spending, and finally
//! aggregation into a purchase order. Every stage reads what the earlier
//! ones wrote and only interacts with them through the shared budget and
//! production counters.

pub mod aggregate;
pub mod catalog;
pub mod context;
pub mod defense;
pub mod factory;
pub mod land;
pub mod option;
pub mod sea;
pub mod surplus;
pub mod threat;

#[cfg(test)]
pub(crate) mod testing;

use thiserror::Error;
use tracing::{debug, error, info};

use crate::board::{PlayerId, TerritoryGraph, TerritoryId, Unit, UnitTypeId};
use crate::config::PurchaseConfig;
use crate::eval::{CombatEstimator, UnitValuation, ValueModel};

pub use aggregate::PurchaseOrder;
pub use context::{AllocationContext, Ledger, PlaceId, PlaceTerritory, PurchaseTerritory};
pub use option::{PurchaseOption, PurchaseOptions};

/// Integration failures inside the pipeline.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PurchaseError {
    #[error("no purchase option produces unit type {0:?}")]
    UnmatchedUnitType(UnitTypeId),
}

/// The external services a purchase phase consults.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub graph: &'a dyn TerritoryGraph,
    pub combat: &'a dyn CombatEstimator,
    pub values: &'a dyn ValueModel,
    pub costs: &'a dyn UnitValuation,
}

/// Units bound for one destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedPlacement {
    pub territory: TerritoryId,
    pub units: Vec<Unit>,
}

/// A production territory and everything it places this turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedTerritory {
    pub territory: TerritoryId,
    pub production: u32,
    pub remaining_production: u32,
    pub placements: Vec<PlannedPlacement>,
}

/// Result of one purchase phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchasePlan {
    pub player: PlayerId,
    pub initial_budget: u32,
    pub remaining_budget: u32,
    /// Production territories in id order.
    pub territories: Vec<PlannedTerritory>,
    pub order: PurchaseOrder,
}

impl PurchasePlan {
    fn new(ctx: AllocationContext, order: PurchaseOrder) -> Self {
        let player = ctx.player;
        let (initial_budget, remaining_budget, purchase, places) = ctx.into_parts();
        let territories = purchase
            .into_iter()
            .map(|p| PlannedTerritory {
                territory: p.territory,
                production: p.production,
                remaining_production: p.remaining_production(),
                placements: p
                    .places
                    .iter()
                    .map(|id| {
                        let place = &places[id.0];
                        PlannedPlacement { territory: place.territory, units: place.placed().to_vec() }
                    })
                    .collect(),
            })
            .collect();
        PurchasePlan { player, initial_budget, remaining_budget, territories, order }
    }

    /// Total units placed across every territory.
    pub fn unit_count(&self) -> usize {
        self.territories
            .iter()
            .flat_map(|t| &t.placements)
            .map(|p| p.units.len())
            .sum()
    }

    /// Budget spent by the phase.
    pub fn spent(&self) -> u32 {
        self.initial_budget - self.remaining_budget
    }
}

/// Runs a full purchase phase for `player` with `budget` to spend.
///
/// Never fails: resource exhaustion simply ends a stage, and an
/// aggregation failure is logged and yields an empty order.
pub fn plan_purchase(
    player: PlayerId,
    budget: u32,
    options: &PurchaseOptions,
    deps: &Collaborators,
    config: &PurchaseConfig,
) -> PurchasePlan {
    let mut ctx = catalog::build(deps.graph, player, budget);
    debug!(
        player = player.0,
        budget,
        factories = ctx.purchase_territories().count(),
        options = options.iter().count(),
        "purchase phase"
    );

    threat::assess(&mut ctx, deps.graph, deps.combat);
    let costs = deps.costs.unit_costs(player);
    let needs_defense = defense::prioritize(&mut ctx, deps, &costs, config);
    defense::purchase_defenders(&mut ctx, &needs_defense, options, deps, config);

    let values = deps.values.territory_values(player, &[]);
    catalog::apply_values(&mut ctx, &values);

    let land_priority = land::prioritize(&ctx, config);
    land::purchase_land_units(&mut ctx, &land_priority, options, deps.graph);
    let sited = factory::site_land_factory(&mut ctx, &land_priority, options, deps, config);

    let sea_priority = sea::prioritize(&ctx, &costs);
    sea::purchase_sea_units(&mut ctx, &sea_priority, options, deps, config);
    if sited.is_none() {
        factory::site_sea_factory(&mut ctx, &land_priority, options, deps, config);
    }

    surplus::spend_remaining(&mut ctx, options, deps.graph, config);

    let order = match aggregate::aggregate(&ctx, options) {
        Ok(order) => order,
        Err(err) => {
            error!(error = %err, "purchase aggregation failed");
            PurchaseOrder::new()
        }
    };
    let plan = PurchasePlan::new(ctx, order);
    info!(
        player = player.0,
        spent = plan.spent(),
        remaining = plan.remaining_budget,
        units = plan.unit_count(),
        "purchase planned"
    );
    plan
}
