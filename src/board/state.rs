//! Game state representation.
//!
//! Holds a complete snapshot of the map at the start of a purchase phase:
//! players and their alliances, the unit catalog, territories with
//! ownership, adjacency, and the units standing in each territory.
//! `BoardState` is the reference `TerritoryGraph` used by the binary and
//! the integration tests.

use std::collections::HashMap;

use super::adjacency::Adjacency;
use super::graph::{Reach, TerritoryGraph};
use super::territory::{Territory, TerritoryId, TerritoryKind};
use super::unit::{PlayerId, Unit, UnitCategory, UnitStats, UnitTypeId};
use crate::eval::{CostTable, UnitValuation};

/// A player (power) in the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub name: String,
    /// Players sharing an alliance name are allied.
    pub alliance: String,
    pub capital: Option<TerritoryId>,
}

/// Complete board state at the start of a purchase phase.
///
/// Tables are indexed by the dense ids handed out by the `add_*` builders,
/// so lookups are O(1) and iteration order is the insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardState {
    pub players: Vec<Player>,
    pub unit_types: Vec<UnitStats>,
    pub territories: Vec<Territory>,
    pub adjacency: Adjacency,
    /// Units standing in each territory.
    pub units: Vec<Vec<Unit>>,
}

impl BoardState {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a player and returns its id.
    pub fn add_player(&mut self, name: &str, alliance: &str) -> PlayerId {
        self.players.push(Player {
            name: name.to_string(),
            alliance: alliance.to_string(),
            capital: None,
        });
        PlayerId((self.players.len() - 1) as u8)
    }

    /// Registers a unit type and returns its id.
    pub fn add_unit_type(&mut self, stats: UnitStats) -> UnitTypeId {
        self.unit_types.push(stats);
        UnitTypeId((self.unit_types.len() - 1) as u16)
    }

    /// Registers a territory and returns its id.
    pub fn add_territory(
        &mut self,
        name: &str,
        kind: TerritoryKind,
        production: u32,
        owner: Option<PlayerId>,
    ) -> TerritoryId {
        let id = TerritoryId(self.territories.len() as u16);
        self.territories.push(Territory {
            id,
            name: name.to_string(),
            kind,
            production,
            owner,
            conquered: false,
        });
        self.units.push(Vec::new());
        self.adjacency.grow(self.territories.len());
        id
    }

    /// Connects two territories.
    pub fn connect(&mut self, a: TerritoryId, b: TerritoryId) {
        self.adjacency.connect(a, b);
    }

    /// Adds `count` units of one type to a territory.
    pub fn add_units(&mut self, t: TerritoryId, unit_type: UnitTypeId, owner: PlayerId, count: u32) {
        self.units[t.index()].extend(Unit::batch(unit_type, owner, count));
    }

    /// Sets a player's capital.
    pub fn set_capital(&mut self, player: PlayerId, t: TerritoryId) {
        self.players[player.0 as usize].capital = Some(t);
    }

    /// Marks a territory as conquered during the current turn.
    pub fn set_conquered(&mut self, t: TerritoryId, conquered: bool) {
        self.territories[t.index()].conquered = conquered;
    }

    /// Looks up a territory by name.
    pub fn territory_by_name(&self, name: &str) -> Option<TerritoryId> {
        self.territories.iter().find(|t| t.name == name).map(|t| t.id)
    }

    /// Looks up a player by name.
    pub fn player_by_name(&self, name: &str) -> Option<PlayerId> {
        self.players
            .iter()
            .position(|p| p.name == name)
            .map(|i| PlayerId(i as u8))
    }

    /// Looks up a unit type by name.
    pub fn unit_type_by_name(&self, name: &str) -> Option<UnitTypeId> {
        self.unit_types
            .iter()
            .position(|u| u.name == name)
            .map(|i| UnitTypeId(i as u16))
    }

    /// Display name of a unit type, or `"?"` for unknown ids.
    pub fn unit_name(&self, unit_type: UnitTypeId) -> &str {
        self.unit_types
            .get(unit_type.0 as usize)
            .map_or("?", |u| u.name.as_str())
    }

    /// Returns true if `player` owns the territory.
    pub fn is_owned_by(&self, t: TerritoryId, player: PlayerId) -> bool {
        self.territories[t.index()].owner == Some(player)
    }

    /// Returns true if `t` is owned by a player not allied with `player`.
    pub fn is_enemy_owned(&self, t: TerritoryId, player: PlayerId) -> bool {
        matches!(self.territories[t.index()].owner, Some(o) if !self.is_allied(player, o))
    }

    fn kind_of(&self, t: TerritoryId) -> TerritoryKind {
        self.territories[t.index()].kind
    }
}

impl TerritoryGraph for BoardState {
    fn territory(&self, id: TerritoryId) -> &Territory {
        &self.territories[id.index()]
    }

    fn unit_stats(&self, unit_type: UnitTypeId) -> Option<&UnitStats> {
        self.unit_types.get(unit_type.0 as usize)
    }

    fn capital(&self, player: PlayerId) -> Option<TerritoryId> {
        self.players.get(player.0 as usize).and_then(|p| p.capital)
    }

    fn is_allied(&self, a: PlayerId, b: PlayerId) -> bool {
        if a == b {
            return true;
        }
        match (self.players.get(a.0 as usize), self.players.get(b.0 as usize)) {
            (Some(pa), Some(pb)) => !pa.alliance.is_empty() && pa.alliance == pb.alliance,
            _ => false,
        }
    }

    fn units(&self, t: TerritoryId) -> &[Unit] {
        &self.units[t.index()]
    }

    fn production_territories(&self, player: PlayerId) -> Vec<TerritoryId> {
        self.territories
            .iter()
            .filter(|t| t.is_land() && t.owner == Some(player) && !t.conquered)
            .filter(|t| self.has_factory(t.id))
            .map(|t| t.id)
            .collect()
    }

    fn placement_territories(&self, _player: PlayerId, factory: TerritoryId) -> Vec<TerritoryId> {
        let mut result = vec![factory];
        result.extend(
            self.adjacency
                .neighbors(factory)
                .iter()
                .copied()
                .filter(|&n| self.kind_of(n) == TerritoryKind::Sea),
        );
        result
    }

    fn owned_land_territories(&self, player: PlayerId) -> Vec<TerritoryId> {
        self.territories
            .iter()
            .filter(|t| t.is_land() && t.owner == Some(player))
            .map(|t| t.id)
            .collect()
    }

    fn neighbors_within(&self, t: TerritoryId, radius: u32, reach: Reach) -> Vec<TerritoryId> {
        self.adjacency.within(t, radius, |n| match reach {
            Reach::Any => true,
            Reach::Land => self.kind_of(n) == TerritoryKind::Land,
            Reach::Water => self.kind_of(n) == TerritoryKind::Sea,
        })
    }

    fn nearest_enemy_land_distance(&self, player: PlayerId, t: TerritoryId) -> Option<u32> {
        let dist = self
            .adjacency
            .distances(t, |n| self.kind_of(n) == TerritoryKind::Land);
        self.territories
            .iter()
            .filter(|e| e.is_land() && self.is_enemy_owned(e.id, player))
            .filter_map(|e| dist[e.id.index()])
            .min()
    }
}

impl UnitValuation for BoardState {
    fn unit_costs(&self, _player: PlayerId) -> CostTable {
        let costs: HashMap<UnitTypeId, u32> = self
            .unit_types
            .iter()
            .enumerate()
            .filter(|(_, u)| u.category != UnitCategory::Factory)
            .map(|(i, u)| (UnitTypeId(i as u16), u.cost))
            .collect();
        CostTable::new(costs)
    }
}
