//! Adjacency graph between territories.
//!
//! Edges are undirected and stored as per-territory neighbor lists sorted by
//! id. Breadth-first helpers take a `passable` predicate so callers can
//! restrict paths to land, to water, or allow both.

use std::collections::VecDeque;

use super::territory::TerritoryId;

/// Undirected adjacency lists indexed by `TerritoryId`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Adjacency {
    neighbors: Vec<Vec<TerritoryId>>,
}

impl Adjacency {
    /// Creates an adjacency graph with `count` territories and no edges.
    pub fn new(count: usize) -> Self {
        Adjacency { neighbors: vec![Vec::new(); count] }
    }

    /// Extends the graph to `count` territories; new entries have no edges.
    pub fn grow(&mut self, count: usize) {
        if count > self.neighbors.len() {
            self.neighbors.resize(count, Vec::new());
        }
    }

    /// Number of territories in the graph.
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    /// Returns true if the graph has no territories.
    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Adds an undirected edge. Self-loops and duplicates are ignored.
    pub fn connect(&mut self, a: TerritoryId, b: TerritoryId) {
        if a == b {
            return;
        }
        for (from, to) in [(a, b), (b, a)] {
            let list = &mut self.neighbors[from.index()];
            if let Err(pos) = list.binary_search(&to) {
                list.insert(pos, to);
            }
        }
    }

    /// Returns the direct neighbors of a territory in id order.
    #[inline]
    pub fn neighbors(&self, t: TerritoryId) -> &[TerritoryId] {
        &self.neighbors[t.index()]
    }

    /// BFS distances from `from`, stepping only onto territories accepted by
    /// `passable`. The origin is always at distance 0; unreachable entries
    /// are `None`.
    pub fn distances(
        &self,
        from: TerritoryId,
        passable: impl Fn(TerritoryId) -> bool,
    ) -> Vec<Option<u32>> {
        let mut dist = vec![None; self.neighbors.len()];
        dist[from.index()] = Some(0);
        let mut queue = VecDeque::with_capacity(self.neighbors.len());
        queue.push_back((from, 0u32));

        while let Some((cur, d)) = queue.pop_front() {
            for &next in self.neighbors(cur) {
                if dist[next.index()].is_some() || !passable(next) {
                    continue;
                }
                dist[next.index()] = Some(d + 1);
                queue.push_back((next, d + 1));
            }
        }
        dist
    }

    /// Territories within `radius` steps of `from` (excluding `from`), in id
    /// order, using only passable intermediate and final territories.
    pub fn within(
        &self,
        from: TerritoryId,
        radius: u32,
        passable: impl Fn(TerritoryId) -> bool,
    ) -> Vec<TerritoryId> {
        self.distances(from, passable)
            .iter()
            .enumerate()
            .filter_map(|(i, d)| match d {
                Some(d) if *d > 0 && *d <= radius => Some(TerritoryId(i as u16)),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 0 - 1 - 2 - 3, plus 1 - 4.
    fn line() -> Adjacency {
        let mut adj = Adjacency::new(5);
        adj.connect(TerritoryId(0), TerritoryId(1));
        adj.connect(TerritoryId(1), TerritoryId(2));
        adj.connect(TerritoryId(2), TerritoryId(3));
        adj.connect(TerritoryId(1), TerritoryId(4));
        adj
    }

    #[test]
    fn edges_are_symmetric_and_deduplicated() {
        let mut adj = line();
        adj.connect(TerritoryId(1), TerritoryId(0));
        adj.connect(TerritoryId(2), TerritoryId(2));
        assert_eq!(adj.neighbors(TerritoryId(0)), &[TerritoryId(1)]);
        assert_eq!(
            adj.neighbors(TerritoryId(1)),
            &[TerritoryId(0), TerritoryId(2), TerritoryId(4)]
        );
        assert!(adj.neighbors(TerritoryId(3)).contains(&TerritoryId(2)));
        assert!(!adj.neighbors(TerritoryId(0)).contains(&TerritoryId(3)));
    }

    #[test]
    fn distances_follow_shortest_path() {
        let d = line().distances(TerritoryId(0), |_| true);
        assert_eq!(d, vec![Some(0), Some(1), Some(2), Some(3), Some(2)]);
    }

    #[test]
    fn impassable_territories_block_paths() {
        let d = line().distances(TerritoryId(0), |t| t != TerritoryId(2));
        assert_eq!(d[3], None);
        assert_eq!(d[4], Some(2));
    }

    #[test]
    fn within_excludes_origin_and_respects_radius() {
        let near = line().within(TerritoryId(1), 1, |_| true);
        assert_eq!(near, vec![TerritoryId(0), TerritoryId(2), TerritoryId(4)]);
        let far = line().within(TerritoryId(0), 3, |_| true);
        assert_eq!(far.len(), 4);
    }
}
