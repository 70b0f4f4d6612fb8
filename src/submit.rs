//! Hands a finished plan to the game's turn engine.
//!
//! The purchase order goes out first, then one placement per destination
//! that received units. A refused placement is logged and skipped; the
//! rest of the plan is still submitted.

use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::board::{TerritoryId, Unit};
use crate::config::PurchaseConfig;
use crate::purchase::{PurchaseOrder, PurchasePlan};

/// Receives purchases and placements.
pub trait OrderSink {
    fn purchase(&mut self, order: &PurchaseOrder);

    /// Places units in a territory. `Err` carries the engine's reason.
    fn place_units(&mut self, units: &[Unit], to: TerritoryId) -> Result<(), String>;
}

/// A placement the sink refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub territory: TerritoryId,
    pub units: Vec<Unit>,
    pub reason: String,
}

/// Submits the purchase order and then every placement of the plan.
pub fn submit(plan: &PurchasePlan, sink: &mut dyn OrderSink, config: &PurchaseConfig) -> Vec<Rejection> {
    debug!(rules = plan.order.len(), "submit purchase");
    sink.purchase(&plan.order);
    place(plan, sink, config)
}

/// Submits each non-empty placement, pausing after each one. Returns the
/// placements that were refused.
pub fn place(plan: &PurchasePlan, sink: &mut dyn OrderSink, config: &PurchaseConfig) -> Vec<Rejection> {
    let pause = Duration::from_millis(config.placement_pause_ms);
    let mut rejected = Vec::new();

    for territory in &plan.territories {
        for placement in &territory.placements {
            if placement.units.is_empty() {
                continue;
            }
            if let Err(reason) = sink.place_units(&placement.units, placement.territory) {
                warn!(
                    territory = ?placement.territory,
                    units = placement.units.len(),
                    %reason,
                    "placement rejected"
                );
                rejected.push(Rejection {
                    territory: placement.territory,
                    units: placement.units.clone(),
                    reason,
                });
            }
            if !pause.is_zero() {
                thread::sleep(pause);
            }
        }
    }
    rejected
}

/// Sink that records everything it accepts. Placements onto territories
/// the predicate refuses are rejected.
pub struct RecordingSink<'a> {
    accepts: Box<dyn Fn(TerritoryId) -> bool + 'a>,
    pub order: Option<PurchaseOrder>,
    pub placements: Vec<(TerritoryId, Vec<Unit>)>,
}

impl<'a> RecordingSink<'a> {
    pub fn new(accepts: impl Fn(TerritoryId) -> bool + 'a) -> Self {
        RecordingSink { accepts: Box::new(accepts), order: None, placements: Vec::new() }
    }

    /// A sink that accepts every placement.
    pub fn accept_all() -> Self {
        Self::new(|_| true)
    }
}

impl OrderSink for RecordingSink<'_> {
    fn purchase(&mut self, order: &PurchaseOrder) {
        self.order = Some(order.clone());
    }

    fn place_units(&mut self, units: &[Unit], to: TerritoryId) -> Result<(), String> {
        if !(self.accepts)(to) {
            return Err(format!("cannot place {} units in territory {}", units.len(), to.0));
        }
        self.placements.push((to, units.to_vec()));
        Ok(())
    }
}
