//! JSON scenario files.
//!
//! A scenario describes one purchase phase: the players, the unit catalog,
//! production rules, the map with its units, who is buying with how much,
//! and optional configuration overrides. Everything is referenced by name
//! and resolved to dense ids while building the board.
//!
//! ```json
//! {
//!   "players": [{ "name": "Germany", "alliance": "Axis", "capital": "Berlin" }],
//!   "unit_types": [{ "name": "infantry", "category": "land", "cost": 3, "attack": 1, "defense": 2, "movement": 1 }],
//!   "territories": [{ "name": "Berlin", "kind": "land", "production": 10, "owner": "Germany" }],
//!   "connections": [["Berlin", "Baltic Sea"]],
//!   "units": [{ "territory": "Berlin", "unit": "infantry", "owner": "Germany", "count": 2 }],
//!   "purchase": { "player": "Germany", "budget": 30 }
//! }
//! ```

use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;

use crate::board::{BoardState, PlayerId, TerritoryId, TerritoryKind, UnitCategory, UnitStats, UnitTypeId};
use crate::config::PurchaseConfig;
use crate::purchase::{PurchaseOption, PurchaseOptions};

/// Errors that can occur when loading a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("invalid scenario JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown player '{0}'")]
    UnknownPlayer(String),

    #[error("unknown territory '{0}'")]
    UnknownTerritory(String),

    #[error("unknown unit type '{0}'")]
    UnknownUnitType(String),

    #[error("duplicate {kind} name '{name}'")]
    DuplicateName { kind: &'static str, name: String },

    #[error("capital of '{player}' must be a land territory, got '{territory}'")]
    InvalidCapital { player: String, territory: String },

    #[error("too many {0} in scenario")]
    TooMany(&'static str),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScenarioDoc {
    players: Vec<PlayerDoc>,
    unit_types: Vec<UnitTypeDoc>,
    #[serde(default)]
    production_rules: Option<Vec<RuleDoc>>,
    territories: Vec<TerritoryDoc>,
    #[serde(default)]
    connections: Vec<(String, String)>,
    #[serde(default)]
    units: Vec<UnitsDoc>,
    purchase: PurchaseDoc,
    #[serde(default)]
    config: PurchaseConfig,
}

#[derive(Debug, Deserialize)]
struct PlayerDoc {
    name: String,
    alliance: String,
    #[serde(default)]
    capital: Option<String>,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct UnitTypeDoc {
    name: String,
    category: UnitCategory,
    cost: u32,
    #[serde(default)]
    attack: u32,
    #[serde(default)]
    defense: u32,
    #[serde(default = "one")]
    hit_points: u32,
    #[serde(default)]
    movement: u32,
    #[serde(default)]
    is_sub: bool,
    #[serde(default)]
    transport_capacity: u32,
    #[serde(default)]
    transport_cost: u32,
}

#[derive(Debug, Deserialize)]
struct RuleDoc {
    name: String,
    unit: String,
    cost: u32,
    #[serde(default = "one")]
    quantity: u32,
}

#[derive(Debug, Deserialize)]
struct TerritoryDoc {
    name: String,
    kind: TerritoryKind,
    #[serde(default)]
    production: u32,
    #[serde(default)]
    owner: Option<String>,
    #[serde(default)]
    conquered: bool,
}

#[derive(Debug, Deserialize)]
struct UnitsDoc {
    territory: String,
    unit: String,
    owner: String,
    #[serde(default = "one")]
    count: u32,
}

#[derive(Debug, Deserialize)]
struct PurchaseDoc {
    player: String,
    budget: u32,
}

/// A resolved scenario, ready to plan.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub board: BoardState,
    pub options: PurchaseOptions,
    pub player: PlayerId,
    pub budget: u32,
    pub config: PurchaseConfig,
}

/// Parses and resolves a scenario document.
pub fn parse_scenario(json: &str) -> Result<Scenario, ScenarioError> {
    let doc: ScenarioDoc = serde_json::from_str(json)?;
    let mut board = BoardState::new();

    check_unique("player", doc.players.iter().map(|p| p.name.as_str()))?;
    check_unique("unit type", doc.unit_types.iter().map(|u| u.name.as_str()))?;
    check_unique("territory", doc.territories.iter().map(|t| t.name.as_str()))?;
    if doc.players.len() > usize::from(u8::MAX) {
        return Err(ScenarioError::TooMany("players"));
    }
    if doc.unit_types.len() > usize::from(u16::MAX) {
        return Err(ScenarioError::TooMany("unit types"));
    }
    if doc.territories.len() > usize::from(u16::MAX) {
        return Err(ScenarioError::TooMany("territories"));
    }

    for p in &doc.players {
        board.add_player(&p.name, &p.alliance);
    }
    for u in &doc.unit_types {
        board.add_unit_type(UnitStats {
            name: u.name.clone(),
            category: u.category,
            cost: u.cost,
            attack: u.attack,
            defense: u.defense,
            hit_points: u.hit_points,
            movement: u.movement,
            is_sub: u.is_sub,
            transport_capacity: u.transport_capacity,
            transport_cost: u.transport_cost,
        });
    }
    for t in &doc.territories {
        let owner = t.owner.as_deref().map(|name| player(&board, name)).transpose()?;
        let id = board.add_territory(&t.name, t.kind, t.production, owner);
        board.set_conquered(id, t.conquered);
    }
    for (a, b) in &doc.connections {
        let a = territory(&board, a)?;
        let b = territory(&board, b)?;
        board.connect(a, b);
    }
    for u in &doc.units {
        let t = territory(&board, &u.territory)?;
        let unit_type = unit_type(&board, &u.unit)?;
        let owner = player(&board, &u.owner)?;
        board.add_units(t, unit_type, owner, u.count);
    }
    for p in &doc.players {
        let Some(capital) = &p.capital else {
            continue;
        };
        let t = territory(&board, capital)?;
        if !board.territories[t.index()].is_land() {
            return Err(ScenarioError::InvalidCapital { player: p.name.clone(), territory: capital.clone() });
        }
        let id = player(&board, &p.name)?;
        board.set_capital(id, t);
    }

    let options = match &doc.production_rules {
        Some(rules) => {
            let mut options = Vec::with_capacity(rules.len());
            for rule in rules {
                let id = unit_type(&board, &rule.unit)?;
                let stats = &board.unit_types[usize::from(id.0)];
                options.push(PurchaseOption::new(&rule.name, id, stats, rule.cost, rule.quantity));
            }
            PurchaseOptions::new(options)
        }
        None => default_options(&board),
    };

    let player = player(&board, &doc.purchase.player)?;
    Ok(Scenario { board, options, player, budget: doc.purchase.budget, config: doc.config })
}

/// One `buy<Unit>` rule per unit type with a positive cost.
pub fn default_options(board: &BoardState) -> PurchaseOptions {
    PurchaseOptions::new(
        board
            .unit_types
            .iter()
            .enumerate()
            .filter(|(_, stats)| stats.cost > 0)
            .map(|(i, stats)| PurchaseOption::new(&rule_name(&stats.name), UnitTypeId(i as u16), stats, stats.cost, 1)),
    )
}

/// `infantry` becomes `buyInfantry`.
fn rule_name(unit: &str) -> String {
    let mut chars = unit.chars();
    match chars.next() {
        Some(first) => format!("buy{}{}", first.to_uppercase(), chars.as_str()),
        None => "buy".to_string(),
    }
}

fn check_unique<'a>(kind: &'static str, names: impl Iterator<Item = &'a str>) -> Result<(), ScenarioError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(ScenarioError::DuplicateName { kind, name: name.to_string() });
        }
    }
    Ok(())
}

fn player(board: &BoardState, name: &str) -> Result<PlayerId, ScenarioError> {
    board
        .player_by_name(name)
        .ok_or_else(|| ScenarioError::UnknownPlayer(name.to_string()))
}

fn territory(board: &BoardState, name: &str) -> Result<TerritoryId, ScenarioError> {
    board
        .territory_by_name(name)
        .ok_or_else(|| ScenarioError::UnknownTerritory(name.to_string()))
}

fn unit_type(board: &BoardState, name: &str) -> Result<UnitTypeId, ScenarioError> {
    board
        .unit_type_by_name(name)
        .ok_or_else(|| ScenarioError::UnknownUnitType(name.to_string()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::board::TerritoryGraph;

    /// Germany (Berlin, Poland) against Russia (Moscow), Baltic to the north.
    pub(crate) const SAMPLE: &str = r#"{
        "players": [
            { "name": "Germany", "alliance": "Axis", "capital": "Berlin" },
            { "name": "Russia", "alliance": "Allies", "capital": "Moscow" }
        ],
        "unit_types": [
            { "name": "infantry", "category": "land", "cost": 3, "attack": 1, "defense": 2, "movement": 1, "transport_cost": 2 },
            { "name": "armour", "category": "land", "cost": 6, "attack": 3, "defense": 3, "movement": 2, "transport_cost": 3 },
            { "name": "fighter", "category": "air", "cost": 10, "attack": 3, "defense": 4, "movement": 4 },
            { "name": "transport", "category": "sea", "cost": 7, "movement": 2, "transport_capacity": 5 },
            { "name": "destroyer", "category": "sea", "cost": 8, "attack": 2, "defense": 2, "movement": 2 },
            { "name": "factory", "category": "factory", "cost": 15 }
        ],
        "territories": [
            { "name": "Berlin", "kind": "land", "production": 10, "owner": "Germany" },
            { "name": "Poland", "kind": "land", "production": 3, "owner": "Germany" },
            { "name": "Moscow", "kind": "land", "production": 8, "owner": "Russia" },
            { "name": "Baltic", "kind": "sea" }
        ],
        "connections": [["Berlin", "Poland"], ["Poland", "Moscow"], ["Berlin", "Baltic"], ["Poland", "Baltic"]],
        "units": [
            { "territory": "Berlin", "unit": "factory", "owner": "Germany" },
            { "territory": "Berlin", "unit": "infantry", "owner": "Germany", "count": 3 },
            { "territory": "Moscow", "unit": "factory", "owner": "Russia" },
            { "territory": "Moscow", "unit": "infantry", "owner": "Russia", "count": 4 }
        ],
        "purchase": { "player": "Germany", "budget": 30 },
        "config": { "seed": 7, "simulation_trials": 50 }
    }"#;

    #[test]
    fn resolves_names_to_ids() {
        let scenario = parse_scenario(SAMPLE).unwrap();
        let board = &scenario.board;
        let berlin = board.territory_by_name("Berlin").unwrap();
        let germany = board.player_by_name("Germany").unwrap();
        assert_eq!(scenario.player, germany);
        assert_eq!(scenario.budget, 30);
        assert_eq!(board.capital(germany), Some(berlin));
        assert_eq!(board.units(berlin).len(), 4);
        assert!(board.has_factory(berlin));
        assert_eq!(board.production_territories(germany), vec![berlin]);
    }

    #[test]
    fn default_rules_skip_nothing_with_a_cost() {
        let scenario = parse_scenario(SAMPLE).unwrap();
        let rules: Vec<&str> = scenario.options.iter().map(|o| o.rule.as_str()).collect();
        assert_eq!(
            rules,
            vec!["buyInfantry", "buyArmour", "buyFighter", "buyTransport", "buyDestroyer", "buyFactory"]
        );
    }

    #[test]
    fn config_section_overrides_defaults() {
        let scenario = parse_scenario(SAMPLE).unwrap();
        assert_eq!(scenario.config.seed, 7);
        assert_eq!(scenario.config.simulation_trials, 50);
        assert_eq!(scenario.config.win_percentage, 95.0);
    }

    #[test]
    fn explicit_rules_replace_the_defaults() {
        let json = SAMPLE.replace(
            r#""purchase":"#,
            r#""production_rules": [{ "name": "buyTwoInfantry", "unit": "infantry", "cost": 5, "quantity": 2 }], "purchase":"#,
        );
        let scenario = parse_scenario(&json).unwrap();
        let rules: Vec<(&str, u32)> = scenario.options.iter().map(|o| (o.rule.as_str(), o.quantity)).collect();
        assert_eq!(rules, vec![("buyTwoInfantry", 2)]);
    }

    #[test]
    fn unknown_names_are_reported() {
        let json = SAMPLE.replace(r#"["Poland", "Moscow"]"#, r#"["Poland", "Kiev"]"#);
        assert!(matches!(parse_scenario(&json), Err(ScenarioError::UnknownTerritory(name)) if name == "Kiev"));

        let json = SAMPLE.replace(r#""player": "Germany""#, r#""player": "Italy""#);
        assert!(matches!(parse_scenario(&json), Err(ScenarioError::UnknownPlayer(name)) if name == "Italy"));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let json = SAMPLE.replace(r#""name": "Poland""#, r#""name": "Berlin""#);
        assert!(matches!(
            parse_scenario(&json),
            Err(ScenarioError::DuplicateName { kind: "territory", .. })
        ));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(parse_scenario("{"), Err(ScenarioError::Json(_))));
    }
}
