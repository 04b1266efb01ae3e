//! One red/green refinement pass over a level.
//!
//! Selected triangles are split 1→4 ("red"). Any other triangle with two or
//! more split edges is promoted to red until the set is closed. Triangles left
//! with exactly one split edge are bisected ("green") so the new level has no
//! T-junctions.

use rustc_hash::{FxHashMap, FxHashSet};

use geotess_geometry::UnitVector;

use crate::topology::edge_key;
use crate::{GridError, TopLevelTopology, Triangle};

/// Supplies the vertex at the great-circle midpoint of an edge.
pub trait MidpointSource {
    /// Index of the midpoint of `(a, b)`, appending it to `vertices` when it
    /// does not exist yet.
    ///
    /// # Errors
    ///
    /// Fails when the midpoint is undefined (antipodal endpoints).
    fn midpoint(
        &mut self,
        a: u32,
        b: u32,
        vertices: &mut Vec<UnitVector>,
    ) -> Result<u32, GridError>;
}

/// Midpoints keyed by `(min, max)` vertex index.
///
/// One map is shared by every tessellation of a builder run so equal edges
/// resolve to one vertex.
#[derive(Debug, Default)]
pub struct EdgeMidpoints {
    map: FxHashMap<(u32, u32), u32>,
}

impl EdgeMidpoints {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl MidpointSource for EdgeMidpoints {
    fn midpoint(
        &mut self,
        a: u32,
        b: u32,
        vertices: &mut Vec<UnitVector>,
    ) -> Result<u32, GridError> {
        let key = edge_key(a, b);
        if let Some(&m) = self.map.get(&key) {
            return Ok(m);
        }
        let m = vertices[a as usize].midpoint(vertices[b as usize])?;
        let index = vertices.len() as u32;
        vertices.push(m);
        self.map.insert(key, index);
        Ok(index)
    }
}

/// Counts from one [`subdivide`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubdivisionStats {
    /// Triangles split 1→4, including promoted ones.
    pub red: usize,
    /// Triangles bisected to restore conformity.
    pub green: usize,
    /// Triangles promoted to red by the closure.
    pub promoted: usize,
    /// Vertices appended to the vertex array.
    pub vertices_added: usize,
}

/// Refine `triangles` once, splitting every `selected` triangle.
///
/// Returns the triangles of the new level. New vertices are created in
/// triangle order, edges ab, bc, ca, through `midpoints`. Red children are
/// `[a, mab, mca]`, `[mab, b, mbc]`, `[mca, mbc, c]`, `[mab, mbc, mca]` at
/// depth + 1; a green triangle rotated so its split edge is `(a, b)` becomes
/// `[a, m, c]`, `[m, b, c]` at its own depth.
///
/// # Errors
///
/// Propagates midpoint failures from `midpoints`.
pub fn subdivide<M: MidpointSource + ?Sized>(
    triangles: &[Triangle],
    selected: &[bool],
    vertices: &mut Vec<UnitVector>,
    midpoints: &mut M,
) -> Result<(Vec<Triangle>, SubdivisionStats), GridError> {
    debug_assert_eq!(triangles.len(), selected.len());
    let topology = TopLevelTopology::new(triangles);
    let mut red: Vec<bool> = selected.to_vec();
    let mut split: FxHashSet<(u32, u32)> = FxHashSet::default();
    let mut queue: Vec<usize> = Vec::new();
    for (i, tri) in triangles.iter().enumerate() {
        if red[i] {
            split.extend(tri.edges().map(|(a, b)| edge_key(a, b)));
            queue.push(i);
        }
    }

    let mut stats = SubdivisionStats::default();
    let split_count = |tri: &Triangle, split: &FxHashSet<(u32, u32)>| {
        tri.edges()
            .iter()
            .filter(|(a, b)| split.contains(&edge_key(*a, *b)))
            .count()
    };
    while let Some(t) = queue.pop() {
        for (a, b) in triangles[t].edges() {
            for &n in topology.edge_triangles(a, b) {
                if red[n] || split_count(&triangles[n], &split) < 2 {
                    continue;
                }
                red[n] = true;
                stats.promoted += 1;
                split.extend(triangles[n].edges().map(|(a, b)| edge_key(a, b)));
                queue.push(n);
            }
        }
    }

    let n_before = vertices.len();
    let mut out = Vec::with_capacity(triangles.len() + 3 * split.len());
    for (i, tri) in triangles.iter().enumerate() {
        if red[i] {
            let [a, b, c] = tri.vertices;
            let mab = midpoints.midpoint(a, b, vertices)?;
            let mbc = midpoints.midpoint(b, c, vertices)?;
            let mca = midpoints.midpoint(c, a, vertices)?;
            let d = tri.depth.saturating_add(1);
            out.push(Triangle::new([a, mab, mca], d));
            out.push(Triangle::new([mab, b, mbc], d));
            out.push(Triangle::new([mca, mbc, c], d));
            out.push(Triangle::new([mab, mbc, mca], d));
            stats.red += 1;
        } else if let Some(k) = tri
            .edges()
            .iter()
            .position(|(a, b)| split.contains(&edge_key(*a, *b)))
        {
            let v = tri.vertices;
            let (a, b, c) = (v[k], v[(k + 1) % 3], v[(k + 2) % 3]);
            let m = midpoints.midpoint(a, b, vertices)?;
            out.push(Triangle::new([a, m, c], tri.depth));
            out.push(Triangle::new([m, b, c], tri.depth));
            stats.green += 1;
        } else {
            out.push(*tri);
        }
    }
    stats.vertices_added = vertices.len() - n_before;
    Ok((out, stats))
}
