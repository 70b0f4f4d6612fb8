//! Purchase options: what can be bought this turn and how good it is.
//!
//! Each option pairs a production rule with the unit it produces and
//! pre-computes the per-role efficiency scores the allocators rank by.

use crate::board::{Territory, UnitCategory, UnitStats, UnitTypeId};

/// An immutable, buyable unit type.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseOption {
    /// Production rule name used in the purchase order.
    pub rule: String,
    pub unit_type: UnitTypeId,
    /// Unit name, for logging.
    pub name: String,
    pub category: UnitCategory,
    pub cost: u32,
    /// Units produced per purchase of the rule.
    pub quantity: u32,
    pub movement: u32,
    pub is_sub: bool,
    pub attack_efficiency: f64,
    pub defense_efficiency: f64,
    pub hit_point_efficiency: f64,
    pub transport_efficiency: f64,
    pub transport_capacity: u32,
    pub transport_cost: u32,
}

impl PurchaseOption {
    /// Builds an option from a rule and the stats of the unit it produces.
    ///
    /// Efficiencies are value per point spent:
    /// - hit points: `(hp + 0.1 * attack + 0.2 * defense) * qty / cost`
    /// - attack: `(1 + hp) * (hp + attack + 0.5 * defense) * qty / cost`
    /// - defense: `(1 + hp) * (hp + 0.5 * attack + defense) * qty / cost`
    /// - transport: `capacity * qty / cost`
    pub fn new(rule: &str, unit_type: UnitTypeId, stats: &UnitStats, cost: u32, quantity: u32) -> Self {
        let quantity = quantity.max(1);
        let hp = f64::from(stats.hit_points);
        let attack = f64::from(stats.attack);
        let defense = f64::from(stats.defense);
        let per_point = if cost == 0 { 0.0 } else { f64::from(quantity) / f64::from(cost) };

        PurchaseOption {
            rule: rule.to_string(),
            unit_type,
            name: stats.name.clone(),
            category: stats.category,
            cost,
            quantity,
            movement: stats.movement,
            is_sub: stats.is_sub,
            attack_efficiency: (1.0 + hp) * (hp + attack + 0.5 * defense) * per_point,
            defense_efficiency: (1.0 + hp) * (hp + 0.5 * attack + defense) * per_point,
            hit_point_efficiency: (hp + 0.1 * attack + 0.2 * defense) * per_point,
            transport_efficiency: f64::from(stats.transport_capacity) * per_point,
            transport_capacity: stats.transport_capacity,
            transport_cost: stats.transport_cost,
        }
    }

    #[inline]
    pub fn is_air(&self) -> bool {
        self.category == UnitCategory::Air
    }

    #[inline]
    pub fn is_single(&self) -> bool {
        self.quantity == 1
    }

    /// Returns true if the option's units may be placed in `t`.
    pub fn usable_at(&self, t: &Territory, has_factory: bool) -> bool {
        match self.category {
            UnitCategory::Sea => t.is_water(),
            UnitCategory::Land | UnitCategory::Air => t.is_land(),
            UnitCategory::Factory => t.is_land() && !has_factory,
        }
    }
}

/// The turn's purchase options grouped by category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PurchaseOptions {
    pub land: Vec<PurchaseOption>,
    pub air: Vec<PurchaseOption>,
    pub sea: Vec<PurchaseOption>,
    pub factory: Vec<PurchaseOption>,
}

impl PurchaseOptions {
    /// Groups options by the category of the unit they produce.
    pub fn new(options: impl IntoIterator<Item = PurchaseOption>) -> Self {
        let mut grouped = PurchaseOptions::default();
        for option in options {
            match option.category {
                UnitCategory::Land => grouped.land.push(option),
                UnitCategory::Air => grouped.air.push(option),
                UnitCategory::Sea => grouped.sea.push(option),
                UnitCategory::Factory => grouped.factory.push(option),
            }
        }
        grouped
    }

    /// All options in land, air, sea, factory order.
    pub fn iter(&self) -> impl Iterator<Item = &PurchaseOption> {
        self.land
            .iter()
            .chain(self.air.iter())
            .chain(self.sea.iter())
            .chain(self.factory.iter())
    }

    /// The first option producing the given unit type.
    pub fn for_unit_type(&self, unit_type: UnitTypeId) -> Option<&PurchaseOption> {
        self.iter().find(|o| o.unit_type == unit_type)
    }

    /// The single-quantity land option producing the given unit type.
    pub fn single_land(&self, unit_type: UnitTypeId) -> Option<&PurchaseOption> {
        self.land
            .iter()
            .find(|o| o.unit_type == unit_type && o.is_single())
    }

    pub fn is_empty(&self) -> bool {
        self.land.is_empty() && self.air.is_empty() && self.sea.is_empty() && self.factory.is_empty()
    }
}

/// The option with the highest positive `score`, first one on ties.
///
/// Options scoring zero or less are never picked, so free or useless
/// options are never bought.
pub fn best_by<'o>(
    options: impl IntoIterator<Item = &'o PurchaseOption>,
    score: impl Fn(&PurchaseOption) -> f64,
) -> Option<&'o PurchaseOption> {
    let mut best = None;
    let mut max = 0.0;
    for option in options {
        let value = score(option);
        if value > max {
            max = value;
            best = Some(option);
        }
    }
    best
}
