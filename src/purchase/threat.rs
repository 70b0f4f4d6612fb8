//! Threat assessment: the worst enemy force each territory faces next turn.

use tracing::{debug, trace};

use super::context::AllocationContext;
use crate::board::TerritoryGraph;
use crate::eval::CombatEstimator;

/// Fills `ctx.threats` for every placement territory and every owned land
/// territory. Territories the estimator cannot reach stay absent, which
/// downstream stages read as "no threat".
pub fn assess(ctx: &mut AllocationContext, graph: &dyn TerritoryGraph, combat: &dyn CombatEstimator) {
    let mut targets = ctx.placement_territories();
    targets.extend(graph.owned_land_territories(ctx.player));
    targets.sort();
    targets.dedup();

    for t in targets {
        match combat.max_enemy_attack(ctx.player, t) {
            Some(threat) if !threat.is_empty() => {
                trace!(
                    territory = %graph.territory(t).name,
                    direct = threat.max_units.len(),
                    amphibious = threat.max_amphib_units.len(),
                    "threatened"
                );
                ctx.threats.insert(t, threat);
            }
            _ => {}
        }
    }
    debug!(threatened = ctx.threats.len(), "threat assessment done");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::purchase::catalog;
    use crate::purchase::testing::*;

    #[test]
    fn owned_land_without_factory_is_assessed() {
        let board = board();
        let combat = ScriptedCombat::new()
            .threaten(POLAND, units(INFANTRY, RUSSIA, 3))
            .threaten(MOSCOW, units(INFANTRY, RUSSIA, 1));
        let mut ctx = catalog::build(&board, GERMANY, 0);
        assess(&mut ctx, &board, &combat);

        assert!(ctx.threats.contains_key(&POLAND));
        assert!(!ctx.threats.contains_key(&MOSCOW), "enemy land is not a target");
        assert!(!ctx.threats.contains_key(&BERLIN), "unreachable means absent");
    }

    #[test]
    fn empty_forces_count_as_no_threat() {
        let board = board();
        let combat = ScriptedCombat::new().threaten(BERLIN, vec![]);
        let mut ctx = catalog::build(&board, GERMANY, 0);
        assess(&mut ctx, &board, &combat);
        assert!(ctx.threats.is_empty());
    }
}
