//! The multi-tessellation grid and its refinement levels.

use serde::{Deserialize, Serialize};

use geotess_geometry::{EulerRotation, UnitVector};

use crate::{GridError, GridId, PlatonicSolid, TopLevelTopology};

/// A triangle of a tessellation level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triangle {
    /// Vertex indices into the grid's vertex array, counter-clockwise from
    /// outside the sphere.
    pub vertices: [u32; 3],
    /// Number of 1→4 splits between the seed and this triangle.
    pub depth: u8,
}

impl Triangle {
    #[must_use]
    pub fn new(vertices: [u32; 3], depth: u8) -> Self {
        Self { vertices, depth }
    }

    /// Edges in the order ab, bc, ca.
    #[must_use]
    pub fn edges(&self) -> [(u32, u32); 3] {
        let [a, b, c] = self.vertices;
        [(a, b), (b, c), (c, a)]
    }

    #[must_use]
    pub fn has_vertex(&self, v: u32) -> bool {
        self.vertices.contains(&v)
    }
}

/// A contiguous range of a tessellation's triangle arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub first: usize,
    pub len: usize,
}

/// One triangulation of S² refined through successive levels.
///
/// Every level is a complete conforming covering of the sphere. Level 0 is
/// the seed; the last level is the top level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tessellation {
    triangles: Vec<Triangle>,
    levels: Vec<Level>,
}

impl Tessellation {
    /// A tessellation holding only the seed level.
    #[must_use]
    pub fn from_seed(seed: &[[u32; 3]]) -> Self {
        let triangles: Vec<Triangle> = seed.iter().map(|&v| Triangle::new(v, 0)).collect();
        let levels = vec![Level {
            first: 0,
            len: triangles.len(),
        }];
        Self { triangles, levels }
    }

    #[must_use]
    pub fn n_levels(&self) -> usize {
        self.levels.len()
    }

    /// Triangles of level `k`, or `None` if it does not exist.
    #[must_use]
    pub fn level(&self, k: usize) -> Option<&[Triangle]> {
        self.levels
            .get(k)
            .map(|l| &self.triangles[l.first..l.first + l.len])
    }

    /// Triangles of the finest level.
    #[must_use]
    pub fn top_level(&self) -> &[Triangle] {
        let l = self.levels[self.levels.len() - 1];
        &self.triangles[l.first..l.first + l.len]
    }

    /// Index of the finest level.
    #[must_use]
    pub fn top_level_index(&self) -> usize {
        self.levels.len() - 1
    }

    /// Append a new top level.
    pub fn push_level(&mut self, triangles: Vec<Triangle>) {
        let first = self.triangles.len();
        let len = triangles.len();
        self.triangles.extend(triangles);
        self.levels.push(Level { first, len });
    }

    #[must_use]
    pub fn n_triangles(&self) -> usize {
        self.triangles.len()
    }

    fn is_well_formed(&self) -> bool {
        !self.levels.is_empty()
            && self
                .levels
                .iter()
                .all(|l| l.len > 0 && l.first + l.len <= self.triangles.len())
    }

    pub fn levels(&self) -> impl Iterator<Item = &[Triangle]> + '_ {
        self.levels
            .iter()
            .map(|l| &self.triangles[l.first..l.first + l.len])
    }
}

/// An ordered stack of tessellations over one shared vertex array.
///
/// Grids are immutable once built; refinement produces a new grid through
/// [`Grid::from_parts`]. The [`GridId`] is computed at construction.
#[derive(Clone, Debug)]
pub struct Grid {
    solid: PlatonicSolid,
    vertices: Vec<UnitVector>,
    tessellations: Vec<Tessellation>,
    rotation: Option<EulerRotation>,
    /// Sorted vertex indices present in each tessellation's top level.
    top_vertices: Vec<Vec<u32>>,
    id: GridId,
}

impl Grid {
    /// Assemble and validate a grid.
    ///
    /// `vertices` must already be rotated; `rotation` is only recorded.
    ///
    /// # Errors
    ///
    /// [`GridError::EmptyTessellations`] when `tessellations` is empty,
    /// [`GridError::MalformedTessellation`] for a tessellation without levels
    /// or with level ranges outside its arena, and
    /// [`GridError::InvalidVertexIndex`] for out-of-range triangle vertices.
    pub fn from_parts(
        solid: PlatonicSolid,
        vertices: Vec<UnitVector>,
        tessellations: Vec<Tessellation>,
        rotation: Option<EulerRotation>,
    ) -> Result<Self, GridError> {
        if tessellations.is_empty() {
            return Err(GridError::EmptyTessellations);
        }
        if let Some(t) = tessellations.iter().position(|t| !t.is_well_formed()) {
            return Err(GridError::MalformedTessellation(t));
        }
        let n_vertices = vertices.len();
        if let Some(&index) = tessellations
            .iter()
            .flat_map(|t| t.triangles.iter())
            .flat_map(|tri| tri.vertices.iter())
            .find(|&&i| i as usize >= n_vertices)
        {
            return Err(GridError::InvalidVertexIndex { index, n_vertices });
        }
        let top_vertices = tessellations
            .iter()
            .map(|t| {
                let mut vs: Vec<u32> = t
                    .top_level()
                    .iter()
                    .flat_map(|tri| tri.vertices)
                    .collect();
                vs.sort_unstable();
                vs.dedup();
                vs
            })
            .collect();
        let id = GridId::compute(&vertices, &tessellations);
        Ok(Self {
            solid,
            vertices,
            tessellations,
            rotation,
            top_vertices,
            id,
        })
    }

    #[must_use]
    pub fn id(&self) -> GridId {
        self.id
    }

    /// The seed solid the grid was grown from.
    #[must_use]
    pub fn solid(&self) -> PlatonicSolid {
        self.solid
    }

    #[must_use]
    pub fn rotation(&self) -> Option<EulerRotation> {
        self.rotation
    }

    #[must_use]
    pub fn vertices(&self) -> &[UnitVector] {
        &self.vertices
    }

    #[must_use]
    pub fn vertex(&self, index: u32) -> UnitVector {
        self.vertices[index as usize]
    }

    #[must_use]
    pub fn n_vertices(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn tessellations(&self) -> &[Tessellation] {
        &self.tessellations
    }

    #[must_use]
    pub fn n_tessellations(&self) -> usize {
        self.tessellations.len()
    }

    /// # Errors
    ///
    /// [`GridError::TessellationOutOfRange`] for an unknown index.
    pub fn tessellation(&self, t: usize) -> Result<&Tessellation, GridError> {
        self.tessellations
            .get(t)
            .ok_or(GridError::TessellationOutOfRange {
                tessellation: t,
                n_tessellations: self.tessellations.len(),
            })
    }

    /// Top-level triangles of tessellation `t`.
    ///
    /// # Errors
    ///
    /// [`GridError::TessellationOutOfRange`] for an unknown index.
    pub fn top_level(&self, t: usize) -> Result<&[Triangle], GridError> {
        Ok(self.tessellation(t)?.top_level())
    }

    /// Sorted, distinct vertex indices in the top level of tessellation `t`.
    /// Empty for an unknown tessellation.
    #[must_use]
    pub fn top_level_vertices(&self, t: usize) -> &[u32] {
        self.top_vertices
            .get(t)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// `true` when vertex `v` belongs to the top level of tessellation `t`.
    #[must_use]
    pub fn is_top_level_vertex(&self, t: usize, v: u32) -> bool {
        self.top_level_vertices(t).binary_search(&v).is_ok()
    }

    /// Nominal edge length in degrees of a triangle at `depth`, the same for
    /// every seed solid.
    #[must_use]
    pub fn nominal_edge_degrees(&self, depth: u8) -> f64 {
        nominal_edge_degrees(depth)
    }

    /// Adjacency of the top level of tessellation `t`.
    ///
    /// # Errors
    ///
    /// [`GridError::TessellationOutOfRange`] for an unknown index.
    pub fn topology(&self, t: usize) -> Result<TopLevelTopology, GridError> {
        Ok(TopLevelTopology::new(self.top_level(t)?))
    }

    /// Verify every level of every tessellation is conforming.
    ///
    /// # Errors
    ///
    /// [`GridError::NonConforming`] naming the first offending edge.
    pub fn check_conforming(&self) -> Result<(), GridError> {
        for (t, tess) in self.tessellations.iter().enumerate() {
            for (level, triangles) in tess.levels().enumerate() {
                if let Some(((a, b), count)) = TopLevelTopology::new(triangles).bad_edge() {
                    return Err(GridError::NonConforming {
                        tessellation: t,
                        level,
                        a,
                        b,
                        count,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Grids are identified by their [`GridId`].
impl PartialEq for Grid {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Nominal edge length of level 0, whatever the seed solid.
pub const LEVEL0_EDGE_DEG: f64 = 64.0;

pub(crate) fn nominal_edge_degrees(depth: u8) -> f64 {
    LEVEL0_EDGE_DEG / f64::from(1u32 << depth.min(31))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn octahedron_grid() -> Grid {
        let (v, t) = PlatonicSolid::Octahedron.seed();
        Grid::from_parts(
            PlatonicSolid::Octahedron,
            v,
            vec![Tessellation::from_seed(&t)],
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_seed_tessellation_has_one_level() {
        let grid = octahedron_grid();
        let tess = grid.tessellation(0).unwrap();
        assert_eq!(tess.n_levels(), 1);
        assert_eq!(tess.top_level().len(), 8);
        assert_eq!(grid.top_level_vertices(0), &[0, 1, 2, 3, 4, 5]);
        assert!(grid.is_top_level_vertex(0, 5));
        assert!(!grid.is_top_level_vertex(1, 5));
    }

    #[test]
    fn test_push_level_keeps_older_levels() {
        let (_, t) = PlatonicSolid::Octahedron.seed();
        let mut tess = Tessellation::from_seed(&t);
        tess.push_level(vec![Triangle::new([0, 1, 2], 1)]);
        assert_eq!(tess.n_levels(), 2);
        assert_eq!(tess.level(0).unwrap().len(), 8);
        assert_eq!(tess.top_level(), &[Triangle::new([0, 1, 2], 1)]);
        assert!(tess.level(2).is_none());
    }

    #[test]
    fn test_rejects_bad_vertex_index() {
        let (v, _) = PlatonicSolid::Octahedron.seed();
        let err = Grid::from_parts(
            PlatonicSolid::Octahedron,
            v,
            vec![Tessellation::from_seed(&[[0, 1, 6]])],
            None,
        )
        .unwrap_err();
        assert!(matches!(err, GridError::InvalidVertexIndex { index: 6, n_vertices: 6 }));
    }

    #[test]
    fn test_rejects_empty_tessellations() {
        let (v, _) = PlatonicSolid::Octahedron.seed();
        assert!(matches!(
            Grid::from_parts(PlatonicSolid::Octahedron, v, vec![], None),
            Err(GridError::EmptyTessellations)
        ));
    }

    #[test]
    fn test_nominal_edge_halves_per_depth() {
        let grid = octahedron_grid();
        assert!((grid.nominal_edge_degrees(0) - 64.0).abs() < 1e-9);
        assert!((grid.nominal_edge_degrees(2) - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_seed_is_conforming() {
        octahedron_grid().check_conforming().unwrap();
    }

    #[test]
    fn test_tessellation_out_of_range() {
        let grid = octahedron_grid();
        assert!(matches!(
            grid.top_level(3),
            Err(GridError::TessellationOutOfRange { tessellation: 3, n_tessellations: 1 })
        ));
        assert!(grid.top_level_vertices(3).is_empty());
    }
}
