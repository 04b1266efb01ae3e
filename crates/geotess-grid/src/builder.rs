//! Grid construction from a Platonic seed.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use geotess_geometry::{EulerRotation, Polygon, UnitVector};

use crate::grid::nominal_edge_degrees;
use crate::{EdgeMidpoints, Grid, GridError, PlatonicSolid, Tessellation, Triangle, subdivide};

/// Slack when comparing nominal edge lengths against targets, in degrees.
const EDGE_TOLERANCE_DEG: f64 = 1e-9;

/// A region of one tessellation refined to a finer target edge length.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolygonRefinement {
    pub polygon: Polygon,
    pub tessellation: usize,
    pub target_edge_deg: f64,
}

/// Everything the builder needs to construct a grid from scratch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridOptions {
    pub solid: PlatonicSolid,
    /// One base edge length per tessellation, in degrees.
    pub base_edge_lengths: Vec<f64>,
    pub polygons: Vec<PolygonRefinement>,
    /// Rotation applied to every vertex after construction.
    pub rotation: Option<EulerRotation>,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            solid: PlatonicSolid::Icosahedron,
            base_edge_lengths: vec![64.0],
            polygons: Vec::new(),
            rotation: None,
        }
    }
}

impl GridOptions {
    /// # Errors
    ///
    /// See [`GridError`]: empty tessellation list, non-positive edge lengths,
    /// and polygons pointing at missing tessellations.
    pub fn validate(&self) -> Result<(), GridError> {
        if self.base_edge_lengths.is_empty() {
            return Err(GridError::EmptyTessellations);
        }
        for (tessellation, &value) in self.base_edge_lengths.iter().enumerate() {
            if !value.is_finite() || value <= 0.0 {
                return Err(GridError::InvalidEdgeLength {
                    tessellation,
                    value,
                });
            }
        }
        let n_tessellations = self.base_edge_lengths.len();
        for p in &self.polygons {
            if p.tessellation >= n_tessellations {
                return Err(GridError::PolygonTessellationOutOfRange {
                    tessellation: p.tessellation,
                    n_tessellations,
                });
            }
            if !p.target_edge_deg.is_finite() || p.target_edge_deg <= 0.0 {
                return Err(GridError::InvalidEdgeLength {
                    tessellation: p.tessellation,
                    value: p.target_edge_deg,
                });
            }
        }
        if self
            .base_edge_lengths
            .windows(2)
            .any(|w| w[1] > w[0])
        {
            warn!(
                "base edge lengths {:?} are not decreasing",
                self.base_edge_lengths
            );
        }
        Ok(())
    }
}

/// Builds a [`Grid`] from validated [`GridOptions`].
#[derive(Debug, Clone)]
pub struct GridBuilder {
    options: GridOptions,
}

impl GridBuilder {
    /// # Errors
    ///
    /// Returns the first validation failure of `options`.
    pub fn new(options: GridOptions) -> Result<Self, GridError> {
        options.validate()?;
        Ok(Self { options })
    }

    #[must_use]
    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    /// Construct the grid.
    ///
    /// For each tessellation: global passes until the nominal edge length is
    /// at most the base edge length, then polygon passes that split every
    /// triangle intersecting a polygon whose target is smaller than the
    /// triangle's nominal edge. Midpoints are shared across tessellations.
    ///
    /// # Errors
    ///
    /// Propagates geometry failures from midpoint creation.
    pub fn build(&self) -> Result<Grid, GridError> {
        let opts = &self.options;
        let (mut vertices, seed) = opts.solid.seed();
        let mut midpoints = EdgeMidpoints::new();
        let mut tessellations = Vec::with_capacity(opts.base_edge_lengths.len());

        for (t, &base) in opts.base_edge_lengths.iter().enumerate() {
            let mut tess = Tessellation::from_seed(&seed);
            while tess
                .top_level()
                .iter()
                .any(|tri| nominal_edge_degrees(tri.depth) > base + EDGE_TOLERANCE_DEG)
            {
                let selected: Vec<bool> = tess
                    .top_level()
                    .iter()
                    .map(|tri| nominal_edge_degrees(tri.depth) > base + EDGE_TOLERANCE_DEG)
                    .collect();
                refine_pass(&mut tess, &selected, &mut vertices, &mut midpoints, t)?;
            }

            let polygons: Vec<&PolygonRefinement> =
                opts.polygons.iter().filter(|p| p.tessellation == t).collect();
            if !polygons.is_empty() {
                loop {
                    let selected = select_for_polygons(
                        tess.top_level(),
                        &vertices,
                        &polygons,
                        opts.rotation,
                    );
                    if !selected.iter().any(|&s| s) {
                        break;
                    }
                    refine_pass(&mut tess, &selected, &mut vertices, &mut midpoints, t)?;
                }
            }
            info!(
                tessellation = t,
                levels = tess.n_levels(),
                triangles = tess.top_level().len(),
                "tessellation built"
            );
            tessellations.push(tess);
        }

        if let Some(rotation) = opts.rotation {
            debug!(
                alpha = rotation.alpha,
                beta = rotation.beta,
                gamma = rotation.gamma,
                "rotating grid"
            );
            rotation.apply_all(&mut vertices);
        }

        let grid = Grid::from_parts(opts.solid, vertices, tessellations, opts.rotation)?;
        info!(
            solid = %grid.solid(),
            vertices = grid.n_vertices(),
            id = %grid.id(),
            "grid built"
        );
        Ok(grid)
    }
}

fn refine_pass(
    tess: &mut Tessellation,
    selected: &[bool],
    vertices: &mut Vec<UnitVector>,
    midpoints: &mut EdgeMidpoints,
    t: usize,
) -> Result<(), GridError> {
    let (level, stats) = subdivide(tess.top_level(), selected, vertices, midpoints)?;
    debug!(
        tessellation = t,
        level = tess.n_levels(),
        red = stats.red,
        green = stats.green,
        promoted = stats.promoted,
        new_vertices = stats.vertices_added,
        "subdivision pass"
    );
    tess.push_level(level);
    Ok(())
}

/// Polygons are geographic: triangles are tested at their positions after
/// `rotation`.
fn select_for_polygons(
    triangles: &[Triangle],
    vertices: &[UnitVector],
    polygons: &[&PolygonRefinement],
    rotation: Option<EulerRotation>,
) -> Vec<bool> {
    let place = |i: u32| {
        let v = vertices[i as usize];
        rotation.map_or(v, |r| r.apply(v))
    };
    triangles
        .iter()
        .map(|tri| {
            let edge = nominal_edge_degrees(tri.depth);
            let [a, b, c] = tri.vertices.map(place);
            polygons.iter().any(|p| {
                edge > p.target_edge_deg + EDGE_TOLERANCE_DEG && p.polygon.intersects_triangle(a, b, c)
            })
        })
        .collect()
}
