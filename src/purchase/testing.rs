//! Shared fixtures for the stage tests: a small map and a scripted
//! combat estimator whose outcomes are plain functions of unit counts.

use std::collections::{BTreeSet, HashMap};

use super::option::{PurchaseOption, PurchaseOptions};
use crate::board::{
    BoardState, PlayerId, TerritoryId, TerritoryKind, Unit, UnitCategory, UnitStats, UnitTypeId,
};
use crate::eval::{BattleOutcome, CombatEstimator, TerritoryValues, ThreatEstimate, ValueModel};

pub(crate) const GERMANY: PlayerId = PlayerId(0);
pub(crate) const RUSSIA: PlayerId = PlayerId(1);

pub(crate) const INFANTRY: UnitTypeId = UnitTypeId(0);
pub(crate) const ARTILLERY: UnitTypeId = UnitTypeId(1);
pub(crate) const TANK: UnitTypeId = UnitTypeId(2);
pub(crate) const FIGHTER: UnitTypeId = UnitTypeId(3);
pub(crate) const TRANSPORT: UnitTypeId = UnitTypeId(4);
pub(crate) const DESTROYER: UnitTypeId = UnitTypeId(5);
pub(crate) const SUBMARINE: UnitTypeId = UnitTypeId(6);
pub(crate) const FACTORY: UnitTypeId = UnitTypeId(7);

pub(crate) const BERLIN: TerritoryId = TerritoryId(0);
pub(crate) const POLAND: TerritoryId = TerritoryId(1);
pub(crate) const MOSCOW: TerritoryId = TerritoryId(2);
pub(crate) const BALTIC: TerritoryId = TerritoryId(3);

fn unit(name: &str, category: UnitCategory, cost: u32, attack: u32, defense: u32, movement: u32) -> UnitStats {
    UnitStats {
        name: name.to_string(),
        category,
        cost,
        attack,
        defense,
        hit_points: 1,
        movement,
        is_sub: false,
        transport_capacity: 0,
        transport_cost: if category == UnitCategory::Land { 2 } else { 0 },
    }
}

/// Berlin (10, factory, capital) - Poland (3) - Moscow (8, enemy factory),
/// with the Baltic touching Berlin and Poland.
pub(crate) fn board() -> BoardState {
    let mut board = BoardState::new();
    board.add_player("Germany", "Axis");
    board.add_player("Russia", "Allies");

    board.add_unit_type(unit("infantry", UnitCategory::Land, 3, 1, 2, 1));
    board.add_unit_type(unit("artillery", UnitCategory::Land, 4, 3, 2, 1));
    let mut tank = unit("armour", UnitCategory::Land, 6, 3, 3, 2);
    tank.transport_cost = 3;
    board.add_unit_type(tank);
    board.add_unit_type(unit("fighter", UnitCategory::Air, 10, 3, 4, 4));
    let mut transport = unit("transport", UnitCategory::Sea, 7, 0, 0, 2);
    transport.transport_capacity = 5;
    board.add_unit_type(transport);
    board.add_unit_type(unit("destroyer", UnitCategory::Sea, 8, 2, 2, 2));
    let mut sub = unit("submarine", UnitCategory::Sea, 6, 2, 1, 2);
    sub.is_sub = true;
    board.add_unit_type(sub);
    board.add_unit_type(unit("factory", UnitCategory::Factory, 15, 0, 0, 0));

    let berlin = board.add_territory("Berlin", TerritoryKind::Land, 10, Some(GERMANY));
    let poland = board.add_territory("Poland", TerritoryKind::Land, 3, Some(GERMANY));
    let moscow = board.add_territory("Moscow", TerritoryKind::Land, 8, Some(RUSSIA));
    let baltic = board.add_territory("Baltic", TerritoryKind::Sea, 0, None);
    board.connect(berlin, poland);
    board.connect(poland, moscow);
    board.connect(berlin, baltic);
    board.connect(poland, baltic);
    board.set_capital(GERMANY, berlin);
    board.set_capital(RUSSIA, moscow);
    board.add_units(berlin, FACTORY, GERMANY, 1);
    board.add_units(moscow, FACTORY, RUSSIA, 1);
    board
}

/// One single-quantity option per unit type of the board, priced at cost.
pub(crate) fn options(board: &BoardState) -> PurchaseOptions {
    PurchaseOptions::new(board.unit_types.iter().enumerate().map(|(i, stats)| {
        PurchaseOption::new(&format!("buy{}", stats.name), UnitTypeId(i as u16), stats, stats.cost, 1)
    }))
}

pub(crate) fn units(unit_type: UnitTypeId, owner: PlayerId, count: u32) -> Vec<Unit> {
    Unit::batch(unit_type, owner, count)
}

type OutcomeFn = Box<dyn Fn(usize, usize) -> BattleOutcome>;

/// Combat estimator driven by unit counts.
pub(crate) struct ScriptedCombat {
    pub threats: HashMap<TerritoryId, ThreatEstimate>,
    /// Outcome as a function of (attacker count, defender count).
    pub outcome: OutcomeFn,
    pub superior: BTreeSet<TerritoryId>,
    /// Strength difference as a function of (attacker count, defender count).
    pub strength: Box<dyn Fn(usize, usize) -> f64>,
}

impl ScriptedCombat {
    /// Attack succeeds while attackers outnumber defenders.
    pub(crate) fn new() -> Self {
        ScriptedCombat {
            threats: HashMap::new(),
            outcome: Box::new(|a, d| {
                let a = a as f64;
                let d = d as f64;
                BattleOutcome {
                    tuv_swing: a - d,
                    attacker_win_percentage: if d >= a { 0.0 } else { 100.0 * (a - d) / a },
                    attacker_land_remaining: d < a,
                }
            }),
            superior: BTreeSet::new(),
            strength: Box::new(|a, d| {
                if a == 0 {
                    0.0
                } else if d == 0 {
                    100.0
                } else {
                    100.0 * a as f64 / (a + d) as f64
                }
            }),
        }
    }

    pub(crate) fn threaten(mut self, t: TerritoryId, attackers: Vec<Unit>) -> Self {
        self.threats.insert(t, ThreatEstimate { max_units: attackers, max_amphib_units: vec![] });
        self
    }
}

impl CombatEstimator for ScriptedCombat {
    fn max_enemy_attack(&self, _player: PlayerId, t: TerritoryId) -> Option<ThreatEstimate> {
        self.threats.get(&t).cloned()
    }

    fn estimate_battle(&self, _player: PlayerId, _t: TerritoryId, attackers: &[Unit], defenders: &[Unit]) -> BattleOutcome {
        (self.outcome)(attackers.len(), defenders.len())
    }

    fn strength_difference(&self, _t: TerritoryId, attackers: &[Unit], defenders: &[Unit]) -> f64 {
        (self.strength)(attackers.len(), defenders.len())
    }

    fn has_local_land_superiority(&self, _player: PlayerId, t: TerritoryId, _radius: u32) -> bool {
        self.superior.contains(&t)
    }
}

/// Value model returning a fixed table.
pub(crate) struct FixedValues(pub TerritoryValues);

impl ValueModel for FixedValues {
    fn territory_values(&self, _player: PlayerId, unholdable: &[TerritoryId]) -> TerritoryValues {
        let mut values = self.0.clone();
        for t in unholdable {
            values.insert(*t, 0.0);
        }
        values
    }
}
