//! Shared allocation state for one purchase phase.
//!
//! `AllocationContext` owns the remaining budget, every purchase
//! territory's remaining production, and the placement arena. Stages stage
//! their buys in a `Ledger` and either commit it to the context or drop it.
//! All budget and production bookkeeping goes through the methods here.

use std::collections::BTreeMap;

use tracing::trace;

use super::option::PurchaseOption;
use crate::board::{PlayerId, TerritoryId, Unit, UnitTypeId};
use crate::eval::{BattleOutcome, ThreatEstimate};

/// Index of a `PlaceTerritory` in the context's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlaceId(pub usize);

/// A territory that can receive units this phase, as seen from one supplier.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceTerritory {
    pub territory: TerritoryId,
    /// The purchase territory whose production supplies this entry.
    pub supplier: TerritoryId,
    pub is_water: bool,
    /// Allied units present at phase start.
    pub defenders: Vec<Unit>,
    placed: Vec<Unit>,
    pub strategic_value: f64,
    pub defense_value: f64,
    pub last_outcome: Option<BattleOutcome>,
}

impl PlaceTerritory {
    pub fn new(territory: TerritoryId, supplier: TerritoryId, is_water: bool, defenders: Vec<Unit>) -> Self {
        PlaceTerritory {
            territory,
            supplier,
            is_water,
            defenders,
            placed: Vec::new(),
            strategic_value: 0.0,
            defense_value: 0.0,
            last_outcome: None,
        }
    }

    /// Units bought for this entry so far.
    #[inline]
    pub fn placed(&self) -> &[Unit] {
        &self.placed
    }

    /// Snapshot defenders followed by placed units.
    pub fn all_defenders(&self) -> Vec<Unit> {
        let mut units = self.defenders.clone();
        units.extend_from_slice(&self.placed);
        units
    }
}

/// A production territory and the placement entries it supplies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseTerritory {
    pub territory: TerritoryId,
    /// Production ceiling at phase start.
    pub production: u32,
    remaining: u32,
    pub places: Vec<PlaceId>,
}

impl PurchaseTerritory {
    pub fn new(territory: TerritoryId, production: u32) -> Self {
        PurchaseTerritory { territory, production, remaining: production, places: Vec::new() }
    }

    #[inline]
    pub fn remaining_production(&self) -> u32 {
        self.remaining
    }
}

/// Everything the stages read and write during one purchase phase.
#[derive(Debug, Clone)]
pub struct AllocationContext {
    pub player: PlayerId,
    pub capital: Option<TerritoryId>,
    initial_budget: u32,
    budget: u32,
    purchase: BTreeMap<TerritoryId, PurchaseTerritory>,
    places: Vec<PlaceTerritory>,
    /// Worst-case enemy force per assessed territory. Absent means no threat.
    pub threats: BTreeMap<TerritoryId, ThreatEstimate>,
}

impl AllocationContext {
    pub fn new(player: PlayerId, capital: Option<TerritoryId>, budget: u32) -> Self {
        AllocationContext {
            player,
            capital,
            initial_budget: budget,
            budget,
            purchase: BTreeMap::new(),
            places: Vec::new(),
            threats: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn initial_budget(&self) -> u32 {
        self.initial_budget
    }

    #[inline]
    pub fn remaining_budget(&self) -> u32 {
        self.budget
    }

    /// Registers a purchase territory. Re-adding an id keeps the original.
    pub fn add_purchase_territory(&mut self, territory: TerritoryId, production: u32) {
        self.purchase
            .entry(territory)
            .or_insert_with(|| PurchaseTerritory::new(territory, production));
    }

    /// Appends a placement entry to its supplier. Returns `None` if the
    /// supplier is not a registered purchase territory.
    pub fn add_place(&mut self, place: PlaceTerritory) -> Option<PlaceId> {
        let id = PlaceId(self.places.len());
        let supplier = self.purchase.get_mut(&place.supplier)?;
        supplier.places.push(id);
        self.places.push(place);
        Some(id)
    }

    /// Purchase territories in id order.
    pub fn purchase_territories(&self) -> impl Iterator<Item = &PurchaseTerritory> {
        self.purchase.values()
    }

    pub fn purchase_territory(&self, t: TerritoryId) -> Option<&PurchaseTerritory> {
        self.purchase.get(&t)
    }

    pub fn place(&self, id: PlaceId) -> &PlaceTerritory {
        &self.places[id.0]
    }

    pub fn place_mut(&mut self, id: PlaceId) -> &mut PlaceTerritory {
        &mut self.places[id.0]
    }

    /// Placement entries in encounter order: purchase territories by id,
    /// then each one's entries in insertion order.
    pub fn place_ids(&self) -> Vec<PlaceId> {
        self.purchase.values().flat_map(|p| p.places.iter().copied()).collect()
    }

    /// Distinct territories any entry can place into.
    pub fn placement_territories(&self) -> Vec<TerritoryId> {
        let mut territories: Vec<TerritoryId> = self.places.iter().map(|p| p.territory).collect();
        territories.sort();
        territories.dedup();
        territories
    }

    /// The entry of `supplier` that places into `territory`.
    pub fn entry(&self, supplier: TerritoryId, territory: TerritoryId) -> Option<PlaceId> {
        self.purchase
            .get(&supplier)?
            .places
            .iter()
            .copied()
            .find(|&id| self.places[id.0].territory == territory)
    }

    /// Suppliers placing into `zone`, in id order, with their entry.
    pub fn suppliers_of(&self, zone: TerritoryId) -> Vec<(TerritoryId, PlaceId)> {
        self.purchase
            .keys()
            .filter_map(|&s| self.entry(s, zone).map(|id| (s, id)))
            .collect()
    }

    /// Remaining production of the supplier feeding an entry.
    pub fn remaining_production_for(&self, id: PlaceId) -> u32 {
        self.purchase
            .get(&self.places[id.0].supplier)
            .map_or(0, PurchaseTerritory::remaining_production)
    }

    /// Summed remaining production of every supplier placing into `zone`.
    pub fn zone_production(&self, zone: TerritoryId) -> u32 {
        self.suppliers_of(zone)
            .iter()
            .filter_map(|(s, _)| self.purchase.get(s))
            .map(PurchaseTerritory::remaining_production)
            .sum()
    }

    /// Units placed into `zone` across all suppliers.
    pub fn zone_placed(&self, zone: TerritoryId) -> Vec<Unit> {
        self.places
            .iter()
            .filter(|p| p.territory == zone)
            .flat_map(|p| p.placed.iter().copied())
            .collect()
    }

    /// Opens a ledger over the current budget and `production`.
    pub fn ledger(&self, production: u32) -> Ledger {
        Ledger::new(self.player, self.budget, production)
    }

    /// Commits a ledger to one entry, charging its supplier's production.
    pub fn commit(&mut self, id: PlaceId, ledger: Ledger) {
        if ledger.units.is_empty() {
            return;
        }
        self.charge_budget(ledger.spent);
        let supplier = self.places[id.0].supplier;
        self.charge_production(supplier, ledger.used);
        trace!(place = ?self.places[id.0].territory, units = ledger.units.len(), spent = ledger.spent, "commit");
        self.places[id.0].placed.extend(ledger.units);
    }

    /// Commits a ledger for a sea zone. Units are spread over the zone's
    /// suppliers in id order, each up to its remaining production; units of
    /// `cargo` type go to the supplier's own land entry, everything else to
    /// its entry for the zone.
    pub fn commit_to_zone(&mut self, zone: TerritoryId, ledger: Ledger, cargo: Option<UnitTypeId>) {
        if ledger.units.is_empty() {
            return;
        }
        self.charge_budget(ledger.spent);
        let (mut cargo_units, mut sea_units): (Vec<Unit>, Vec<Unit>) = ledger
            .units
            .into_iter()
            .partition(|u| Some(u.unit_type) == cargo);

        for (supplier, zone_entry) in self.suppliers_of(zone) {
            let free = self.purchase.get(&supplier).map_or(0, PurchaseTerritory::remaining_production);
            let take = (free as usize).min(sea_units.len());
            let batch: Vec<Unit> = sea_units.drain(..take).collect();
            self.charge_production(supplier, batch.len() as u32);
            self.places[zone_entry.0].placed.extend(batch);

            if let Some(home) = self.entry(supplier, supplier) {
                let free = self.purchase.get(&supplier).map_or(0, PurchaseTerritory::remaining_production);
                let take = (free as usize).min(cargo_units.len());
                let batch: Vec<Unit> = cargo_units.drain(..take).collect();
                self.charge_production(supplier, batch.len() as u32);
                self.places[home.0].placed.extend(batch);
            }
        }
        debug_assert!(
            sea_units.is_empty() && cargo_units.is_empty(),
            "{} units charged but not placed into {zone:?}",
            sea_units.len() + cargo_units.len()
        );
        trace!(?zone, "zone commit");
    }

    /// Charges an outright purchase that uses no production (factories).
    pub fn commit_free(&mut self, id: PlaceId, units: Vec<Unit>, cost: u32) {
        self.charge_budget(cost);
        self.places[id.0].placed.extend(units);
    }

    /// Removes a placed unit and refunds `refund` against `cost` charged in
    /// the same step. Production is not refunded.
    pub fn trade_in(&mut self, id: PlaceId, index: usize, refund: u32, cost: u32) -> Option<Unit> {
        if index >= self.places[id.0].placed.len() || refund > cost {
            return None;
        }
        self.charge_budget(cost - refund);
        Some(self.places[id.0].placed.remove(index))
    }

    /// Adds units bought through `trade_in`. Budget is already settled.
    pub fn push_traded(&mut self, id: PlaceId, units: Vec<Unit>) {
        self.places[id.0].placed.extend(units);
    }

    /// Every entry's placed units, in encounter order.
    pub fn all_placed(&self) -> impl Iterator<Item = &Unit> {
        self.purchase
            .values()
            .flat_map(|p| p.places.iter())
            .flat_map(|id| self.places[id.0].placed.iter())
    }

    pub(crate) fn into_parts(self) -> (u32, u32, Vec<PurchaseTerritory>, Vec<PlaceTerritory>) {
        (self.initial_budget, self.budget, self.purchase.into_values().collect(), self.places)
    }

    fn charge_budget(&mut self, cost: u32) {
        debug_assert!(cost <= self.budget, "charge {cost} exceeds budget {}", self.budget);
        self.budget = self.budget.saturating_sub(cost);
    }

    fn charge_production(&mut self, supplier: TerritoryId, quantity: u32) {
        if let Some(p) = self.purchase.get_mut(&supplier) {
            debug_assert!(quantity <= p.remaining, "charge {quantity} exceeds production {}", p.remaining);
            p.remaining = p.remaining.saturating_sub(quantity);
        }
    }
}

/// Tentative purchases against a budget and production allowance.
///
/// Nothing touches the context until the ledger is committed; dropping it
/// discards the purchases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    player: PlayerId,
    budget: u32,
    production: u32,
    spent: u32,
    used: u32,
    units: Vec<Unit>,
}

impl Ledger {
    pub fn new(player: PlayerId, budget: u32, production: u32) -> Self {
        Ledger { player, budget, production, spent: 0, used: 0, units: Vec::new() }
    }

    #[inline]
    pub fn remaining_budget(&self) -> u32 {
        self.budget - self.spent
    }

    #[inline]
    pub fn remaining_production(&self) -> u32 {
        self.production - self.used
    }

    #[inline]
    pub fn spent(&self) -> u32 {
        self.spent
    }

    #[inline]
    pub fn used(&self) -> u32 {
        self.used
    }

    /// Units bought so far.
    #[inline]
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Returns true if one more batch fits the budget and production.
    #[inline]
    pub fn can_afford(&self, option: &PurchaseOption) -> bool {
        option.cost <= self.remaining_budget() && option.quantity <= self.remaining_production()
    }

    /// Buys one batch. Returns false, buying nothing, if it does not fit.
    pub fn buy(&mut self, option: &PurchaseOption) -> bool {
        if !self.can_afford(option) {
            return false;
        }
        self.spent += option.cost;
        self.used += option.quantity;
        self.units
            .extend(Unit::batch(option.unit_type, self.player, option.quantity));
        true
    }
}

/// Buys batches while `next` names an option that fits the ledger.
///
/// `next` sees the ledger after every purchase, so it can re-evaluate the
/// position and return `None` to stop. Returns the number of batches bought.
pub fn greedy_commit<'o, F>(ledger: &mut Ledger, mut next: F) -> u32
where
    F: FnMut(&Ledger) -> Option<&'o PurchaseOption>,
{
    let mut batches = 0;
    while let Some(option) = next(ledger) {
        if !ledger.buy(option) {
            break;
        }
        batches += 1;
    }
    batches
}
