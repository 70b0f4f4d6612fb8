//! Monte-Carlo combat estimation on a `BoardState`.
//!
//! Battles are rolled out with six-sided dice: every round each unit hits
//! on a roll at or below its attack (or defense) value, multi-hit-point
//! units soak hits first, and the cheapest units die first. Trials run in
//! parallel with rayon; each trial seeds its own `SmallRng` from the
//! estimator seed plus the trial index, so results do not depend on thread
//! scheduling.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use super::{BattleOutcome, CombatEstimator, ThreatEstimate};
use crate::board::{
    BoardState, PlayerId, Reach, TerritoryGraph, TerritoryId, TerritoryKind, Unit, UnitCategory,
};

/// Default number of simulated battles per estimate.
pub const DEFAULT_TRIALS: u32 = 200;

/// Rounds after which a stalled battle is called for the defender.
const MAX_ROUNDS: u32 = 20;

/// One unit's combat profile inside a simulated battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fighter {
    cost: u32,
    power: u32,
    hit_points: u32,
    is_land: bool,
}

/// Result of a single simulated battle.
#[derive(Debug, Clone, Copy, Default)]
struct Trial {
    attacker_won: bool,
    land_remaining: bool,
    attacker_loss: u32,
    defender_loss: u32,
}

/// Seeded Monte-Carlo battle estimator and reachability-based threat finder.
#[derive(Debug, Clone)]
pub struct SimulatedCombat<'a> {
    board: &'a BoardState,
    trials: u32,
    seed: u64,
}

impl<'a> SimulatedCombat<'a> {
    /// Creates an estimator running `trials` battles per estimate.
    pub fn new(board: &'a BoardState, trials: u32, seed: u64) -> Self {
        SimulatedCombat { board, trials: trials.max(1), seed }
    }

    /// Converts units into fighters, dropping units that cannot fight in a
    /// territory of the given kind. Sorted so the cheapest fighter dies first.
    fn fighters(&self, units: &[Unit], attacking: bool, kind: TerritoryKind) -> Vec<Fighter> {
        let mut fighters: Vec<Fighter> = units
            .iter()
            .filter_map(|u| self.board.unit_stats(u.unit_type))
            .filter(|s| match (s.category, kind) {
                (UnitCategory::Factory, _) => false,
                (UnitCategory::Sea, TerritoryKind::Land) => false,
                (UnitCategory::Land, TerritoryKind::Sea) => false,
                _ => true,
            })
            .map(|s| Fighter {
                cost: s.cost,
                power: if attacking { s.attack } else { s.defense },
                hit_points: s.hit_points.max(1),
                is_land: s.category == UnitCategory::Land,
            })
            .collect();
        fighters.sort_by_key(|f| (f.cost, f.power));
        fighters
    }

    /// Relative strength of a unit list, counting hit points twice.
    fn strength(&self, units: &[Unit], attacking: bool) -> f64 {
        units
            .iter()
            .filter_map(|u| self.board.unit_stats(u.unit_type))
            .filter(|s| s.is_combatant())
            .map(|s| {
                let power = if attacking { s.attack } else { s.defense };
                f64::from(2 * s.hit_points + power)
            })
            .sum()
    }
}

/// Rolls one round of dice for a side and returns the number of hits.
fn roll(side: &[Fighter], rng: &mut SmallRng) -> u32 {
    side.iter()
        .filter(|f| f.power > 0 && rng.gen_range(1..=6) <= f.power)
        .count() as u32
}

/// Applies hits to a side: multi-hit-point units absorb first, then the
/// cheapest units are removed. Returns the value lost.
fn apply_hits(side: &mut Vec<Fighter>, mut hits: u32) -> u32 {
    for f in side.iter_mut() {
        while hits > 0 && f.hit_points > 1 {
            f.hit_points -= 1;
            hits -= 1;
        }
    }
    let removed = (hits as usize).min(side.len());
    side.drain(..removed).map(|f| f.cost).sum()
}

/// Plays one battle to completion or until the round limit.
fn simulate(attackers: &[Fighter], defenders: &[Fighter], rng: &mut SmallRng) -> Trial {
    let mut att = attackers.to_vec();
    let mut def = defenders.to_vec();
    let mut trial = Trial::default();

    for _ in 0..MAX_ROUNDS {
        if att.is_empty() || def.is_empty() {
            break;
        }
        let att_hits = roll(&att, rng);
        let def_hits = roll(&def, rng);
        trial.defender_loss += apply_hits(&mut def, att_hits);
        trial.attacker_loss += apply_hits(&mut att, def_hits);
    }

    trial.attacker_won = def.is_empty() && !att.is_empty();
    trial.land_remaining = trial.attacker_won && att.iter().any(|f| f.is_land);
    trial
}

impl CombatEstimator for SimulatedCombat<'_> {
    fn max_enemy_attack(&self, player: PlayerId, t: TerritoryId) -> Option<ThreatEstimate> {
        let board = self.board;
        let target_is_water = board.territory(t).is_water();
        let kind_is = |k: TerritoryKind| move |n: TerritoryId| board.territory(n).kind == k;
        let land_dist = board.adjacency.distances(t, kind_is(TerritoryKind::Land));
        let water_dist = board.adjacency.distances(t, kind_is(TerritoryKind::Sea));
        let any_dist = board.adjacency.distances(t, |_| true);

        let mut threat = ThreatEstimate::default();
        let mut transport_space = 0u32;
        let mut cargo_sources: Vec<TerritoryId> = Vec::new();

        for src in &board.territories {
            for unit in board.units(src.id) {
                if board.is_allied(player, unit.owner) {
                    continue;
                }
                let Some(stats) = board.unit_stats(unit.unit_type) else {
                    continue;
                };
                let within = |d: Option<u32>| d.is_some_and(|d| d <= stats.movement);
                let direct = match stats.category {
                    UnitCategory::Factory => false,
                    UnitCategory::Land => !target_is_water && src.id != t && within(land_dist[src.id.index()]),
                    UnitCategory::Air => src.id != t && within(any_dist[src.id.index()]),
                    UnitCategory::Sea => target_is_water && within(water_dist[src.id.index()]),
                };
                if direct {
                    threat.max_units.push(*unit);
                }

                // Transports that can reach a sea zone next to a land target.
                if !target_is_water && stats.is_transport() && src.is_water() {
                    let steps = water_dist[src.id.index()].map(|d| d.saturating_sub(1));
                    if steps.is_some_and(|s| s <= stats.movement) {
                        transport_space += stats.transport_capacity;
                        for &n in board.adjacency.neighbors(src.id) {
                            if board.territory(n).is_land() && n != t && !cargo_sources.contains(&n) {
                                cargo_sources.push(n);
                            }
                        }
                    }
                }
            }
        }

        // Load enemy land units that are not already attacking overland.
        cargo_sources.sort();
        for src in cargo_sources {
            for unit in board.units(src) {
                if board.is_allied(player, unit.owner) {
                    continue;
                }
                let Some(stats) = board.unit_stats(unit.unit_type) else {
                    continue;
                };
                if stats.category != UnitCategory::Land || stats.transport_cost == 0 {
                    continue;
                }
                if land_dist[src.index()].is_some_and(|d| d <= stats.movement) {
                    continue;
                }
                if stats.transport_cost > transport_space {
                    continue;
                }
                transport_space -= stats.transport_cost;
                threat.max_amphib_units.push(*unit);
            }
        }

        if threat.is_empty() {
            None
        } else {
            Some(threat)
        }
    }

    fn estimate_battle(
        &self,
        _player: PlayerId,
        t: TerritoryId,
        attackers: &[Unit],
        defenders: &[Unit],
    ) -> BattleOutcome {
        let kind = self.board.territory(t).kind;
        let att = self.fighters(attackers, true, kind);
        let def = self.fighters(defenders, false, kind);
        if att.is_empty() {
            return BattleOutcome::default();
        }

        let (wins, land, swing) = (0..self.trials)
            .into_par_iter()
            .map(|i| {
                let mut rng = SmallRng::seed_from_u64(self.seed.wrapping_add(u64::from(i)));
                let trial = simulate(&att, &def, &mut rng);
                (
                    u32::from(trial.attacker_won),
                    u32::from(trial.land_remaining),
                    i64::from(trial.defender_loss) - i64::from(trial.attacker_loss),
                )
            })
            .reduce(|| (0, 0, 0), |a, b| (a.0 + b.0, a.1 + b.1, a.2 + b.2));

        let trials = f64::from(self.trials);
        BattleOutcome {
            tuv_swing: swing as f64 / trials,
            attacker_win_percentage: f64::from(wins) * 100.0 / trials,
            attacker_land_remaining: land * 2 >= self.trials,
        }
    }

    fn strength_difference(&self, _t: TerritoryId, attackers: &[Unit], defenders: &[Unit]) -> f64 {
        let att = self.strength(attackers, true);
        let def = self.strength(defenders, false);
        if att <= 0.0 {
            0.0
        } else if def <= 0.0 {
            100.0
        } else {
            100.0 * att / (att + def)
        }
    }

    fn has_local_land_superiority(&self, player: PlayerId, t: TerritoryId, radius: u32) -> bool {
        let board = self.board;
        let mut area = board.neighbors_within(t, radius, Reach::Any);
        area.push(t);

        let mut mine = Vec::new();
        let mut enemy = Vec::new();
        for &n in &area {
            for unit in board.units(n) {
                let mobile = board
                    .unit_stats(unit.unit_type)
                    .is_some_and(|s| matches!(s.category, UnitCategory::Land | UnitCategory::Air));
                if !mobile {
                    continue;
                }
                if board.is_allied(player, unit.owner) {
                    mine.push(*unit);
                } else {
                    enemy.push(*unit);
                }
            }
        }
        self.strength_difference(t, &enemy, &mine) < 50.0
    }
}
