//! Unit types, players, and units.
//!
//! Unit types are data-driven: the scenario supplies their combat stats and
//! the board keeps them in a catalog indexed by `UnitTypeId`. A `Unit` is a
//! lightweight (type, owner) pair; the purchase pipeline never needs unit
//! identity, only multisets of types.

use serde::{Deserialize, Serialize};

/// Index of a player in the board's player table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

/// Index of a unit type in the board's unit catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitTypeId(pub u16);

/// Broad unit category used for placement eligibility and option grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitCategory {
    Land,
    Air,
    Sea,
    /// Production facility. Does not fight and has no movement.
    Factory,
}

/// Combat and logistics stats of a unit type.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitStats {
    pub name: String,
    pub category: UnitCategory,
    pub cost: u32,
    pub attack: u32,
    pub defense: u32,
    pub hit_points: u32,
    pub movement: u32,
    pub is_sub: bool,
    /// Cargo space offered when this unit is a transport.
    pub transport_capacity: u32,
    /// Cargo space taken when this unit is carried.
    pub transport_cost: u32,
}

impl UnitStats {
    /// Returns true if the unit can carry land units.
    #[inline]
    pub fn is_transport(&self) -> bool {
        self.category == UnitCategory::Sea && self.transport_capacity > 0
    }

    /// Returns true if the unit takes part in combat.
    #[inline]
    pub fn is_combatant(&self) -> bool {
        self.category != UnitCategory::Factory
    }
}

/// A single unit on the board or in a placement list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    pub unit_type: UnitTypeId,
    pub owner: PlayerId,
}

impl Unit {
    /// Creates `count` units of one type for one owner.
    pub fn batch(unit_type: UnitTypeId, owner: PlayerId, count: u32) -> Vec<Unit> {
        (0..count).map(|_| Unit { unit_type, owner }).collect()
    }
}
