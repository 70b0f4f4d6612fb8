//! Territory identifiers and static metadata.
//!
//! Territories are addressed by a dense `TerritoryId` assigned in the order
//! they appear in the scenario, so the id doubles as an index into the
//! board's lookup tables and gives every iteration a reproducible order.

use serde::{Deserialize, Serialize};

use super::unit::PlayerId;

/// Index of a territory on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TerritoryId(pub u16);

impl TerritoryId {
    /// Returns the id as a table index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Whether a territory is land or a sea zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerritoryKind {
    Land,
    Sea,
}

/// Static description of a territory plus its ownership at phase start.
#[derive(Debug, Clone, PartialEq)]
pub struct Territory {
    pub id: TerritoryId,
    pub name: String,
    pub kind: TerritoryKind,
    /// Base production value (income and, for factories, unit production).
    pub production: u32,
    pub owner: Option<PlayerId>,
    /// Captured during the current turn; such territories cannot host new factories.
    pub conquered: bool,
}

impl Territory {
    /// Returns true for sea zones.
    #[inline]
    pub fn is_water(&self) -> bool {
        self.kind == TerritoryKind::Sea
    }

    /// Returns true for land territories.
    #[inline]
    pub fn is_land(&self) -> bool {
        self.kind == TerritoryKind::Land
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_predicates() {
        let land = Territory {
            id: TerritoryId(0),
            name: "Germany".into(),
            kind: TerritoryKind::Land,
            production: 10,
            owner: Some(PlayerId(0)),
            conquered: false,
        };
        assert!(land.is_land());
        assert!(!land.is_water());

        let sea = Territory { kind: TerritoryKind::Sea, ..land };
        assert!(sea.is_water());
        assert!(!sea.is_land());
    }

    #[test]
    fn ids_order_by_index() {
        assert!(TerritoryId(1) < TerritoryId(2));
        assert_eq!(TerritoryId(7).index(), 7);
    }
}
