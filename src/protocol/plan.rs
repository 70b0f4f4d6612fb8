//! JSON report of a purchase plan, with every id resolved to its name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::board::{BoardState, TerritoryGraph, TerritoryId, Unit};
use crate::purchase::{PurchaseOrder, PurchasePlan};

/// Units bound for one destination, counted per unit name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementReport {
    pub territory: String,
    pub units: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerritoryReport {
    pub territory: String,
    pub production: u32,
    pub remaining_production: u32,
    /// Destinations that receive at least one unit.
    pub placements: Vec<PlacementReport>,
}

/// Serializable outcome of one purchase phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanReport {
    pub player: String,
    pub budget: u32,
    pub spent: u32,
    pub remaining_budget: u32,
    pub purchase: PurchaseOrder,
    pub territories: Vec<TerritoryReport>,
    /// Placements the order sink refused.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<PlacementReport>,
}

impl PlanReport {
    pub fn new(plan: &PurchasePlan, board: &BoardState) -> Self {
        let territories = plan
            .territories
            .iter()
            .map(|t| TerritoryReport {
                territory: board.territory(t.territory).name.clone(),
                production: t.production,
                remaining_production: t.remaining_production,
                placements: t
                    .placements
                    .iter()
                    .filter(|p| !p.units.is_empty())
                    .map(|p| placement(board, p.territory, &p.units))
                    .collect(),
            })
            .collect();

        PlanReport {
            player: board
                .players
                .get(usize::from(plan.player.0))
                .map_or_else(|| plan.player.0.to_string(), |p| p.name.clone()),
            budget: plan.initial_budget,
            spent: plan.spent(),
            remaining_budget: plan.remaining_budget,
            purchase: plan.order.clone(),
            territories,
            rejected: Vec::new(),
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Counts units per name for a destination.
pub fn placement(board: &BoardState, territory: TerritoryId, units: &[Unit]) -> PlacementReport {
    let mut counts = BTreeMap::new();
    for unit in units {
        *counts.entry(board.unit_name(unit.unit_type).to_string()).or_insert(0) += 1;
    }
    PlacementReport { territory: board.territory(territory).name.clone(), units: counts }
}
