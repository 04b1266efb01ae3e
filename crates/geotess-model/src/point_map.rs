//! Enumeration of the active data-bearing nodes of a model.

use rustc_hash::FxHashMap;

/// One node of one profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointRef {
    pub vertex: u32,
    pub layer: usize,
    pub node: usize,
}

/// Bijection between point indices and (vertex, layer, node) triples.
///
/// Points are ordered vertex-major, then by layer, then by node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointMap {
    points: Vec<PointRef>,
    index: FxHashMap<PointRef, usize>,
}

impl PointMap {
    /// Build from points already in canonical order.
    pub(crate) fn from_points(points: Vec<PointRef>) -> Self {
        debug_assert!(points.windows(2).all(|w| w[0] < w[1]));
        let index = points.iter().enumerate().map(|(i, p)| (*p, i)).collect();
        Self { points, index }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<PointRef> {
        self.points.get(index).copied()
    }

    /// Point index of `(vertex, layer, node)`, if it is active.
    #[must_use]
    pub fn index_of(&self, vertex: u32, layer: usize, node: usize) -> Option<usize> {
        self.index.get(&PointRef { vertex, layer, node }).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = PointRef> + '_ {
        self.points.iter().copied()
    }

    /// Distinct vertices with at least one active point, ascending.
    #[must_use]
    pub fn vertices(&self) -> Vec<u32> {
        let mut vs: Vec<u32> = self.points.iter().map(|p| p.vertex).collect();
        vs.dedup();
        vs
    }
}
