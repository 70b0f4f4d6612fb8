//! Engine state management.
//!
//! Holds the loaded scenario and option overrides, wires the reference
//! collaborators together, and runs a purchase phase into a report.

use std::collections::HashMap;
use std::io::{self, Write};

use thiserror::Error;
use tracing::warn;

use crate::board::{BoardState, PlayerId, TerritoryGraph};
use crate::config::PurchaseConfig;
use crate::eval::{DistanceValueModel, SimulatedCombat};
use crate::protocol::plan::{placement, PlanReport};
use crate::protocol::scenario::{parse_scenario, Scenario, ScenarioError};
use crate::purchase::{plan_purchase, Collaborators};
use crate::submit::{submit, RecordingSink};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no scenario loaded")]
    NoScenario,

    #[error("unknown player '{0}'")]
    UnknownPlayer(String),

    #[error(transparent)]
    Scenario(#[from] ScenarioError),

    #[error("failed to encode plan: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write plan: {0}")]
    Io(#[from] io::Error),
}

/// Holds the mutable state of the engine between commands.
#[derive(Debug, Default)]
pub struct Engine {
    scenario: Option<Scenario>,
    player: Option<String>,
    budget: Option<u32>,
    /// Named overrides applied on top of the scenario's config.
    pub options: HashMap<String, String>,
}

impl Engine {
    /// Creates an engine with no scenario.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a scenario from JSON, replacing any previous one.
    pub fn load_scenario(&mut self, json: &str) -> Result<(), EngineError> {
        self.scenario = Some(parse_scenario(json)?);
        Ok(())
    }

    pub fn scenario(&self) -> Option<&Scenario> {
        self.scenario.as_ref()
    }

    /// Buys for the named player instead of the scenario's.
    pub fn set_player(&mut self, name: &str) {
        self.player = Some(name.to_string());
    }

    /// Spends `budget` instead of the scenario's budget.
    pub fn set_budget(&mut self, budget: u32) {
        self.budget = Some(budget);
    }

    /// Sets an engine option.
    pub fn set_option(&mut self, name: String, value: Option<String>) {
        self.options.insert(name, value.unwrap_or_default());
    }

    /// The scenario's config with every option applied. Unknown or
    /// unparsable options are logged and ignored.
    pub fn config(&self) -> PurchaseConfig {
        let mut config = self
            .scenario
            .as_ref()
            .map(|s| s.config.clone())
            .unwrap_or_default();
        let mut names: Vec<&String> = self.options.keys().collect();
        names.sort();
        for name in names {
            let value = &self.options[name];
            if !config.set(name, value) {
                warn!(option = %name, %value, "ignoring option");
            }
        }
        config
    }

    fn resolve_player(&self, board: &BoardState, default: PlayerId) -> Result<PlayerId, EngineError> {
        match &self.player {
            Some(name) => board
                .player_by_name(name)
                .ok_or_else(|| EngineError::UnknownPlayer(name.clone())),
            None => Ok(default),
        }
    }

    /// Plans a purchase phase and submits it to a recording sink that
    /// refuses land the player does not own.
    pub fn run(&self) -> Result<PlanReport, EngineError> {
        let scenario = self.scenario.as_ref().ok_or(EngineError::NoScenario)?;
        let board = &scenario.board;
        let config = self.config();
        let player = self.resolve_player(board, scenario.player)?;
        let budget = self.budget.unwrap_or(scenario.budget);

        let combat = SimulatedCombat::new(board, config.simulation_trials, config.seed);
        let values = DistanceValueModel::new(board);
        let deps = Collaborators { graph: board, combat: &combat, values: &values, costs: board };
        let plan = plan_purchase(player, budget, &scenario.options, &deps, &config);

        let mut sink = RecordingSink::new(|t| board.territory(t).is_water() || board.is_owned_by(t, player));
        let rejected = submit(&plan, &mut sink, &config);

        let mut report = PlanReport::new(&plan, board);
        report.rejected = rejected
            .iter()
            .map(|r| placement(board, r.territory, &r.units))
            .collect();
        Ok(report)
    }

    /// Runs the phase and writes the JSON report followed by a newline.
    pub fn handle_plan<W: Write>(&self, out: &mut W) -> Result<(), EngineError> {
        let report = self.run()?;
        writeln!(out, "{}", report.to_json()?)?;
        out.flush()?;
        Ok(())
    }
}
