//! Adjacency queries over one level of a tessellation.

use rustc_hash::FxHashMap;

use crate::Triangle;

/// Vertex → triangles and edge → triangles maps for a level.
///
/// Triangle handles are indices into the slice the topology was built from.
#[derive(Debug, Clone, Default)]
pub struct TopLevelTopology {
    vertex_triangles: FxHashMap<u32, Vec<usize>>,
    edge_triangles: FxHashMap<(u32, u32), Vec<usize>>,
}

#[inline]
pub(crate) fn edge_key(a: u32, b: u32) -> (u32, u32) {
    if a < b { (a, b) } else { (b, a) }
}

impl TopLevelTopology {
    #[must_use]
    pub fn new(triangles: &[Triangle]) -> Self {
        let mut vertex_triangles: FxHashMap<u32, Vec<usize>> = FxHashMap::default();
        let mut edge_triangles: FxHashMap<(u32, u32), Vec<usize>> = FxHashMap::default();
        for (i, tri) in triangles.iter().enumerate() {
            for v in tri.vertices {
                vertex_triangles.entry(v).or_default().push(i);
            }
            for (a, b) in tri.edges() {
                edge_triangles.entry(edge_key(a, b)).or_default().push(i);
            }
        }
        Self {
            vertex_triangles,
            edge_triangles,
        }
    }

    /// Triangles incident to vertex `v`, in ascending order.
    #[must_use]
    pub fn triangles_of(&self, v: u32) -> &[usize] {
        self.vertex_triangles
            .get(&v)
            .map(|ts| ts.as_slice())
            .unwrap_or(&[])
    }

    /// Triangles sharing the undirected edge `(a, b)`.
    #[must_use]
    pub fn edge_triangles(&self, a: u32, b: u32) -> &[usize] {
        self.edge_triangles
            .get(&edge_key(a, b))
            .map(|ts| ts.as_slice())
            .unwrap_or(&[])
    }

    /// Vertices joined to `v` by an edge, sorted ascending.
    #[must_use]
    pub fn neighbors(&self, v: u32, triangles: &[Triangle]) -> Vec<u32> {
        let mut out: Vec<u32> = self
            .triangles_of(v)
            .iter()
            .flat_map(|&t| triangles[t].vertices)
            .filter(|&u| u != v)
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    #[must_use]
    pub fn n_vertices(&self) -> usize {
        self.vertex_triangles.len()
    }

    #[must_use]
    pub fn n_edges(&self) -> usize {
        self.edge_triangles.len()
    }

    /// The smallest edge not shared by exactly two triangles, with its
    /// triangle count. `None` for a conforming closed surface.
    #[must_use]
    pub fn bad_edge(&self) -> Option<((u32, u32), usize)> {
        self.edge_triangles
            .iter()
            .filter(|(_, ts)| ts.len() != 2)
            .map(|(&e, ts)| (e, ts.len()))
            .min()
    }

    #[must_use]
    pub fn is_conforming(&self) -> bool {
        self.bad_edge().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PlatonicSolid, Tessellation};

    fn icosahedron() -> Vec<Triangle> {
        let (_, t) = PlatonicSolid::Icosahedron.seed();
        Tessellation::from_seed(&t).top_level().to_vec()
    }

    #[test]
    fn test_icosahedron_adjacency() {
        let tris = icosahedron();
        let topo = TopLevelTopology::new(&tris);
        assert_eq!(topo.n_vertices(), 12);
        assert_eq!(topo.n_edges(), 30);
        assert_eq!(topo.triangles_of(0).len(), 5);
        assert_eq!(topo.neighbors(0, &tris), vec![1, 2, 3, 4, 5]);
        assert_eq!(topo.edge_triangles(2, 1).len(), 2);
        assert!(topo.is_conforming());
    }

    #[test]
    fn test_open_surface_is_not_conforming() {
        let tris = &icosahedron()[1..];
        let topo = TopLevelTopology::new(tris);
        assert!(!topo.is_conforming());
        let ((a, b), count) = topo.bad_edge().unwrap();
        assert_eq!(count, 1);
        assert!(a < b);
    }

    #[test]
    fn test_unknown_vertex_has_no_triangles() {
        let topo = TopLevelTopology::new(&icosahedron());
        assert!(topo.triangles_of(99).is_empty());
        assert!(topo.edge_triangles(0, 11).is_empty());
    }
}
