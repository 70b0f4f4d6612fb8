//! Distance-weighted strategic value model.
//!
//! A territory is worth more the closer it sits to production the player
//! does not yet control. Each non-allied production territory contributes
//! `production / (1 + distance)^2`; scores are then normalized so the most
//! valuable territory scores 1.0.

use super::{TerritoryValues, ValueModel};
use crate::board::{BoardState, PlayerId, TerritoryGraph, TerritoryId};

/// Reference `ValueModel` over a `BoardState`.
#[derive(Debug, Clone, Copy)]
pub struct DistanceValueModel<'a> {
    board: &'a BoardState,
}

impl<'a> DistanceValueModel<'a> {
    pub fn new(board: &'a BoardState) -> Self {
        DistanceValueModel { board }
    }
}

impl ValueModel for DistanceValueModel<'_> {
    fn territory_values(&self, player: PlayerId, unholdable: &[TerritoryId]) -> TerritoryValues {
        let board = self.board;
        let targets: Vec<(TerritoryId, f64)> = board
            .territories
            .iter()
            .filter(|t| t.is_land() && t.production > 0 && !unholdable.contains(&t.id))
            .filter(|t| !matches!(t.owner, Some(o) if board.is_allied(player, o)))
            .map(|t| (t.id, f64::from(t.production)))
            .collect();

        let mut raw: Vec<(TerritoryId, f64)> = Vec::with_capacity(board.territories.len());
        for t in &board.territories {
            if unholdable.contains(&t.id) {
                raw.push((t.id, 0.0));
                continue;
            }
            let dist = board.adjacency.distances(t.id, |_| true);
            let score: f64 = targets
                .iter()
                .filter_map(|&(e, production)| {
                    dist[e.index()].map(|d| production / f64::from((1 + d) * (1 + d)))
                })
                .sum();
            raw.push((t.id, score));
        }

        let max = raw.iter().map(|&(_, v)| v).fold(0.0, f64::max);
        raw.into_iter()
            .map(|(t, v)| (t, if max > 0.0 { v / max } else { 0.0 }))
            .collect()
    }
}
