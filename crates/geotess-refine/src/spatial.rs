//! Spatial stage: one red/green pass per seeded tessellation.

use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashMap;
use tracing::debug;

use geotess_geometry::UnitVector;
use geotess_grid::{
    Grid, GridError, LocatedMidpoints, MidpointSource, SubdivisionStats, Tessellation, subdivide,
};

/// Records which edge each midpoint vertex came from.
///
/// Parents are kept per tessellation pass; a vertex reused from another
/// tessellation is still recorded with the edge that produced it here.
struct RecordingMidpoints {
    located: LocatedMidpoints,
    parents: FxHashMap<u32, (u32, u32)>,
}

impl MidpointSource for RecordingMidpoints {
    fn midpoint(
        &mut self,
        a: u32,
        b: u32,
        vertices: &mut Vec<UnitVector>,
    ) -> Result<u32, GridError> {
        let m = self.located.midpoint(a, b, vertices)?;
        self.parents.entry(m).or_insert((a, b));
        Ok(m)
    }
}

/// Result of refining the tessellations of a grid.
pub(crate) struct SpatialRefinement {
    pub grid: Grid,
    /// Per refined tessellation: midpoint vertex → parent edge.
    pub parents: BTreeMap<usize, FxHashMap<u32, (u32, u32)>>,
    pub stats: Vec<(usize, SubdivisionStats)>,
}

/// Subdivide, in each tessellation of `seeds`, the top-level triangles
/// incident to its seed vertices. Other tessellations are copied unchanged.
pub(crate) fn refine_tessellations(
    grid: &Grid,
    seeds: &BTreeMap<usize, BTreeSet<u32>>,
) -> Result<SpatialRefinement, GridError> {
    let mut vertices = grid.vertices().to_vec();
    let mut tessellations: Vec<Tessellation> = grid.tessellations().to_vec();
    let mut midpoints = RecordingMidpoints {
        located: LocatedMidpoints::new(&vertices),
        parents: FxHashMap::default(),
    };
    let mut parents = BTreeMap::new();
    let mut stats = Vec::new();

    for (&t, seed_vertices) in seeds {
        let tess = tessellations.get_mut(t).ok_or(GridError::TessellationOutOfRange {
            tessellation: t,
            n_tessellations: grid.n_tessellations(),
        })?;
        let top = tess.top_level();
        let selected: Vec<bool> = top
            .iter()
            .map(|tri| tri.vertices.iter().any(|v| seed_vertices.contains(v)))
            .collect();
        let (level, pass) = subdivide(top, &selected, &mut vertices, &mut midpoints)?;
        debug!(
            tessellation = t,
            seeds = seed_vertices.len(),
            red = pass.red,
            green = pass.green,
            promoted = pass.promoted,
            vertices_added = pass.vertices_added,
            "tessellation refined"
        );
        tess.push_level(level);
        parents.insert(t, std::mem::take(&mut midpoints.parents));
        stats.push((t, pass));
    }

    let grid = Grid::from_parts(grid.solid(), vertices, tessellations, grid.rotation())?;
    Ok(SpatialRefinement {
        grid,
        parents,
        stats,
    })
}
