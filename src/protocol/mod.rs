//! Scenario input and plan output.
//!
//! Scenarios are JSON documents that describe a board and a purchase
//! request; plans are written back as JSON reports keyed by names.

pub mod plan;
pub mod scenario;

pub use plan::{PlacementReport, PlanReport, TerritoryReport};
pub use scenario::{default_options, parse_scenario, Scenario, ScenarioError};
