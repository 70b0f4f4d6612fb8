//! Board representation and map queries.
//!
//! Contains the territory, unit, and adjacency types, the `TerritoryGraph`
//! query trait the purchase pipeline runs against, and `BoardState`, the
//! in-memory map that implements it.

pub mod adjacency;
pub mod graph;
pub mod state;
pub mod territory;
pub mod unit;

pub use adjacency::Adjacency;
pub use graph::{Reach, TerritoryGraph};
pub use state::{BoardState, Player};
pub use territory::{Territory, TerritoryId, TerritoryKind};
pub use unit::{PlayerId, Unit, UnitCategory, UnitStats, UnitTypeId};
