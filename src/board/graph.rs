//! Read-only view of the board consumed by the purchase pipeline.
//!
//! The pipeline never touches `BoardState` directly; it queries the map
//! through `TerritoryGraph` so a host engine can plug in its own map.

use super::territory::{Territory, TerritoryId};
use super::unit::{PlayerId, Unit, UnitCategory, UnitStats, UnitTypeId};

/// Which territories a radius query may pass through and return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reach {
    Any,
    Land,
    Water,
}

/// Ownership, adjacency, and unit queries for one game state.
pub trait TerritoryGraph {
    /// Metadata of a territory. Ids handed out by the graph are always valid.
    fn territory(&self, id: TerritoryId) -> &Territory;

    /// Stats of a unit type, or `None` for types the graph does not know.
    fn unit_stats(&self, unit_type: UnitTypeId) -> Option<&UnitStats>;

    /// The player's home capital, if it has one.
    fn capital(&self, player: PlayerId) -> Option<TerritoryId>;

    /// Returns true if both players are on the same side (a player is allied with itself).
    fn is_allied(&self, a: PlayerId, b: PlayerId) -> bool;

    /// All units currently in a territory.
    fn units(&self, t: TerritoryId) -> &[Unit];

    /// Owned, unconquered land territories with a production facility.
    fn production_territories(&self, player: PlayerId) -> Vec<TerritoryId>;

    /// Territories a production territory can place into: itself first,
    /// then adjacent sea zones in id order.
    fn placement_territories(&self, player: PlayerId, factory: TerritoryId) -> Vec<TerritoryId>;

    /// All land territories owned by the player.
    fn owned_land_territories(&self, player: PlayerId) -> Vec<TerritoryId>;

    /// Territories within `radius` steps, excluding `t`, in id order.
    fn neighbors_within(&self, t: TerritoryId, radius: u32, reach: Reach) -> Vec<TerritoryId>;

    /// Land-path distance to the nearest land territory owned by an enemy.
    fn nearest_enemy_land_distance(&self, player: PlayerId, t: TerritoryId) -> Option<u32>;

    /// Units in `t` allied with `player`.
    fn allied_units(&self, player: PlayerId, t: TerritoryId) -> Vec<Unit> {
        self.units(t)
            .iter()
            .filter(|u| self.is_allied(player, u.owner))
            .copied()
            .collect()
    }

    /// Returns true if a factory unit stands in the territory.
    fn has_factory(&self, t: TerritoryId) -> bool {
        self.units(t).iter().any(|u| {
            self.unit_stats(u.unit_type)
                .is_some_and(|s| s.category == UnitCategory::Factory)
        })
    }

    /// Returns true if any direct neighbor is a sea zone.
    fn is_sea_adjacent(&self, t: TerritoryId) -> bool {
        self.neighbors_within(t, 1, Reach::Any)
            .iter()
            .any(|&n| self.territory(n).is_water())
    }
}
