//! The model: a grid plus a profile per (vertex, layer).

use tracing::debug;

use geotess_grid::Grid;

use crate::{MetaData, ModelError, PointMap, PointRef, Polygon3D, Profile};

/// A 3-D (or, with surface profiles, 2-D) model on a multi-tessellation grid.
///
/// Profiles are stored per vertex, then per layer. Vertices that are not in
/// the top level of a layer's tessellation keep empty profiles in that layer.
#[derive(Clone, Debug)]
pub struct Model {
    grid: Grid,
    metadata: MetaData,
    profiles: Vec<Vec<Profile>>,
    active_region: Option<Polygon3D>,
    point_map: PointMap,
    point_map_stale: bool,
}

impl Model {
    /// A model with every profile empty and the whole model active.
    ///
    /// # Errors
    ///
    /// [`ModelError::LayerTessellationOutOfRange`] when a layer is bound to a
    /// tessellation the grid lacks.
    pub fn new(grid: Grid, metadata: MetaData) -> Result<Self, ModelError> {
        let profiles = vec![vec![Profile::default(); metadata.n_layers()]; grid.n_vertices()];
        Self::from_parts(grid, metadata, profiles, None)
    }

    /// Assemble a model from stored parts and build its point map.
    ///
    /// # Errors
    ///
    /// Dimension, layer binding, and profile validation failures.
    pub fn from_parts(
        grid: Grid,
        metadata: MetaData,
        profiles: Vec<Vec<Profile>>,
        active_region: Option<Polygon3D>,
    ) -> Result<Self, ModelError> {
        for (layer, &t) in metadata.layer_tessellations().iter().enumerate() {
            if t >= grid.n_tessellations() {
                return Err(ModelError::LayerTessellationOutOfRange {
                    layer,
                    tessellation: t,
                    n_tessellations: grid.n_tessellations(),
                });
            }
        }
        if profiles.len() != grid.n_vertices() {
            return Err(ModelError::Dimensions(format!(
                "{} profile rows for {} vertices",
                profiles.len(),
                grid.n_vertices()
            )));
        }
        if let Some(row) = profiles.iter().find(|row| row.len() != metadata.n_layers()) {
            return Err(ModelError::Dimensions(format!(
                "profile row of {} layers, model has {}",
                row.len(),
                metadata.n_layers()
            )));
        }
        for p in profiles.iter().flatten() {
            p.check_attributes(metadata.n_attributes())?;
        }
        let mut model = Self {
            grid,
            metadata,
            profiles,
            active_region: None,
            point_map: PointMap::default(),
            point_map_stale: true,
        };
        model.set_active_region(active_region);
        Ok(model)
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn metadata(&self) -> &MetaData {
        &self.metadata
    }

    #[must_use]
    pub fn n_vertices(&self) -> usize {
        self.grid.n_vertices()
    }

    #[must_use]
    pub fn n_layers(&self) -> usize {
        self.metadata.n_layers()
    }

    /// Tessellation bound to `layer`.
    ///
    /// # Errors
    ///
    /// [`ModelError::LayerOutOfRange`].
    pub fn layer_tessellation(&self, layer: usize) -> Result<usize, ModelError> {
        self.metadata
            .tessellation_of(layer)
            .ok_or(ModelError::LayerOutOfRange {
                layer,
                n_layers: self.n_layers(),
            })
    }

    fn check_cell(&self, vertex: u32, layer: usize) -> Result<(), ModelError> {
        if vertex as usize >= self.n_vertices() {
            return Err(ModelError::VertexOutOfRange {
                vertex,
                n_vertices: self.n_vertices(),
            });
        }
        if layer >= self.n_layers() {
            return Err(ModelError::LayerOutOfRange {
                layer,
                n_layers: self.n_layers(),
            });
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Vertex or layer out of range.
    pub fn profile(&self, vertex: u32, layer: usize) -> Result<&Profile, ModelError> {
        self.check_cell(vertex, layer)?;
        Ok(&self.profiles[vertex as usize][layer])
    }

    /// All profiles, indexed `[vertex][layer]`.
    #[must_use]
    pub fn profiles(&self) -> &[Vec<Profile>] {
        &self.profiles
    }

    /// Replace the profile at `(vertex, layer)`. Values are coerced to the
    /// model data type. The point map becomes stale.
    ///
    /// # Errors
    ///
    /// Vertex or layer out of range, or a wrong attribute count.
    pub fn set_profile(
        &mut self,
        vertex: u32,
        layer: usize,
        profile: Profile,
    ) -> Result<(), ModelError> {
        self.check_cell(vertex, layer)?;
        profile.check_attributes(self.metadata.n_attributes())?;
        self.profiles[vertex as usize][layer] = profile.coerced(self.metadata.data_type);
        self.point_map_stale = true;
        Ok(())
    }

    /// Replace the profile from raw radii and optional data nodes; see
    /// [`Profile::from_radii`] for the kind selected.
    ///
    /// # Errors
    ///
    /// As [`Model::set_profile`] plus radius / data-count validation.
    pub fn set_profile_radii(
        &mut self,
        vertex: u32,
        layer: usize,
        radii: &[f32],
        data: Option<Vec<Vec<f64>>>,
    ) -> Result<(), ModelError> {
        self.set_profile(vertex, layer, Profile::from_radii(radii, data)?)
    }

    /// Set the surface data of `vertex` in a single-layer (2-D) model.
    ///
    /// # Errors
    ///
    /// [`ModelError::Dimensions`] when the model has more than one layer,
    /// plus the failures of [`Model::set_profile`].
    pub fn set_surface_profile(&mut self, vertex: u32, data: Vec<f64>) -> Result<(), ModelError> {
        if self.n_layers() != 1 {
            return Err(ModelError::Dimensions(format!(
                "surface profiles need a single-layer model, this one has {} layers",
                self.n_layers()
            )));
        }
        self.set_profile(vertex, 0, Profile::surface(data)?)
    }

    /// Select the active region and rebuild the point map. `None` activates
    /// the whole model.
    pub fn set_active_region(&mut self, region: Option<Polygon3D>) {
        self.active_region = region;
        self.point_map = self.build_point_map();
        self.point_map_stale = false;
        debug!(
            points = self.point_map.len(),
            restricted = self.active_region.is_some(),
            "point map rebuilt"
        );
    }

    #[must_use]
    pub fn active_region(&self) -> Option<&Polygon3D> {
        self.active_region.as_ref()
    }

    /// The current point map.
    ///
    /// # Errors
    ///
    /// [`ModelError::StalePointMap`] if profiles changed since the active
    /// region was last set.
    pub fn point_map(&self) -> Result<&PointMap, ModelError> {
        if self.point_map_stale {
            return Err(ModelError::StalePointMap);
        }
        Ok(&self.point_map)
    }

    /// Resolve a point index.
    ///
    /// # Errors
    ///
    /// [`ModelError::StalePointMap`] or [`ModelError::PointIndexOutOfRange`].
    pub fn point(&self, index: usize) -> Result<PointRef, ModelError> {
        let map = self.point_map()?;
        map.get(index).ok_or(ModelError::PointIndexOutOfRange {
            index,
            len: map.len(),
        })
    }

    /// `true` when vertex `v` carries data for `layer`: it is in the top level
    /// of the layer's tessellation.
    #[must_use]
    pub fn is_layer_vertex(&self, vertex: u32, layer: usize) -> bool {
        self.metadata
            .tessellation_of(layer)
            .is_some_and(|t| self.grid.is_top_level_vertex(t, vertex))
    }

    /// `true` when the vertex lies inside the active region's polygon.
    #[must_use]
    pub fn in_active_polygon(&self, vertex: u32) -> bool {
        self.active_region
            .as_ref()
            .is_none_or(|r| r.polygon.contains(self.grid.vertex(vertex)))
    }

    fn build_point_map(&self) -> PointMap {
        let mut points = Vec::new();
        for vertex in 0..self.n_vertices() as u32 {
            if !self.in_active_polygon(vertex) {
                continue;
            }
            for layer in 0..self.n_layers() {
                if !self.is_layer_vertex(vertex, layer) {
                    continue;
                }
                let profile = &self.profiles[vertex as usize][layer];
                for node in 0..profile.n_data() {
                    let active = self.active_region.as_ref().is_none_or(|r| {
                        r.contains(self, vertex, layer, profile.node_radius(node))
                    });
                    if active {
                        points.push(PointRef {
                            vertex,
                            layer,
                            node,
                        });
                    }
                }
            }
        }
        PointMap::from_points(points)
    }

    /// Consume the model, returning its grid, metadata, profiles and active
    /// region.
    #[must_use]
    pub fn into_parts(self) -> (Grid, MetaData, Vec<Vec<Profile>>, Option<Polygon3D>) {
        (self.grid, self.metadata, self.profiles, self.active_region)
    }
}

/// Same grid ID, same interpretive metadata, and elementwise-equal profiles.
impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.grid.id() == other.grid.id()
            && self.metadata.same_interpretation(&other.metadata)
            && self.profiles == other.profiles
    }
}

#[cfg(test)]
mod tests {
    use geotess_geometry::{EarthShape, Polygon};
    use geotess_grid::{GridBuilder, GridOptions, PlatonicSolid};

    use super::*;
    use crate::{DataType, Horizon};

    fn grid(edges: &[f64]) -> Grid {
        GridBuilder::new(GridOptions {
            solid: PlatonicSolid::Icosahedron,
            base_edge_lengths: edges.to_vec(),
            ..Default::default()
        })
        .unwrap()
        .build()
        .unwrap()
    }

    /// Two layers on tessellations 0 and 1 with 3-node profiles.
    fn two_layer_model() -> Model {
        let md = MetaData::new(&["lower", "upper"], &["vp"], &["km/s"], DataType::Double)
            .unwrap()
            .with_layer_tessellations(&[0, 1])
            .unwrap();
        let mut model = Model::new(grid(&[64.0, 32.0]), md).unwrap();
        for v in 0..model.n_vertices() as u32 {
            for layer in 0..2 {
                if model.is_layer_vertex(v, layer) {
                    let base = 5000.0 + 500.0 * layer as f32;
                    model
                        .set_profile_radii(
                            v,
                            layer,
                            &[base, base + 100.0, base + 200.0],
                            Some(vec![vec![1.0], vec![2.0], vec![3.0]]),
                        )
                        .unwrap();
                }
            }
        }
        model.set_active_region(None);
        model
    }

    #[test]
    fn test_new_model_has_empty_profiles() {
        let md = MetaData::new(&["a"], &["x"], &["u"], DataType::Float).unwrap();
        let model = Model::new(grid(&[64.0]), md).unwrap();
        assert_eq!(model.n_vertices(), 12);
        assert!(!model.profile(3, 0).unwrap().is_data_bearing());
        assert!(model.point_map().unwrap().is_empty());
    }

    #[test]
    fn test_point_map_order_and_size() {
        let model = two_layer_model();
        let map = model.point_map().unwrap();
        // 12 vertices x 3 nodes in layer 0, 42 x 3 in layer 1.
        assert_eq!(map.len(), 12 * 3 + 42 * 3);
        assert_eq!(map.get(0), Some(PointRef { vertex: 0, layer: 0, node: 0 }));
        assert_eq!(map.get(3), Some(PointRef { vertex: 0, layer: 1, node: 0 }));
        assert_eq!(map.index_of(0, 0, 1), Some(1));
        // Vertex 12 is only in tessellation 1.
        assert_eq!(map.index_of(12, 0, 0), None);
        assert!(map.index_of(12, 1, 0).is_some());
    }

    #[test]
    fn test_point_map_goes_stale() {
        let mut model = two_layer_model();
        model.set_profile_radii(0, 0, &[1.0, 2.0], None).unwrap();
        assert!(matches!(model.point_map(), Err(ModelError::StalePointMap)));
        model.set_active_region(None);
        assert_eq!(model.point_map().unwrap().len(), 11 * 3 + 42 * 3);
    }

    #[test]
    fn test_set_profile_validation() {
        let mut model = two_layer_model();
        assert!(matches!(
            model.set_profile_radii(0, 0, &[2.0, 1.0], Some(vec![vec![1.0], vec![2.0]])),
            Err(ModelError::NotIncreasing(_))
        ));
        assert!(matches!(
            model.set_profile_radii(0, 0, &[1.0, 2.0], Some(vec![vec![1.0, 2.0]])),
            Err(ModelError::AttributeCountMismatch { expected: 1, found: 2 })
        ));
        assert!(matches!(
            model.set_profile_radii(99, 0, &[1.0], None),
            Err(ModelError::VertexOutOfRange { vertex: 99, .. })
        ));
        assert!(matches!(
            model.set_profile_radii(0, 5, &[1.0], None),
            Err(ModelError::LayerOutOfRange { layer: 5, n_layers: 2 })
        ));
    }

    #[test]
    fn test_layer_bound_to_missing_tessellation() {
        let md = MetaData::new(&["a", "b"], &["x"], &["u"], DataType::Double)
            .unwrap()
            .with_layer_tessellations(&[0, 3])
            .unwrap();
        assert!(matches!(
            Model::new(grid(&[64.0]), md),
            Err(ModelError::LayerTessellationOutOfRange { layer: 1, tessellation: 3, .. })
        ));
    }

    #[test]
    fn test_active_region_polygon() {
        let mut model = two_layer_model();
        let cap = Polygon::small_circle(geotess_geometry::UnitVector::NORTH_POLE, 10.0).unwrap();
        model.set_active_region(Some(Polygon3D::columns(cap)));
        let map = model.point_map().unwrap();
        assert_eq!(map.vertices(), vec![0]);
        assert_eq!(map.len(), 6);
    }

    #[test]
    fn test_active_region_layer_fraction_horizons() {
        let mut model = two_layer_model();
        // From halfway up layer 0 to the bottom of layer 1.
        let region = Polygon3D::new(
            Polygon::Global,
            Horizon::LayerFraction { layer: 0, fraction: 0.5 },
            Horizon::LayerFraction { layer: 1, fraction: 0.0 },
        );
        model.set_active_region(Some(region));
        let map = model.point_map().unwrap();
        // Layer 0 nodes 1, 2 at 12 vertices; layer 1 node 0 at 42 vertices.
        assert_eq!(map.len(), 12 * 2 + 42);
        assert_eq!(map.index_of(0, 0, 0), None);
        assert!(map.index_of(0, 1, 0).is_some());
        assert_eq!(map.index_of(0, 1, 1), None);
    }

    #[test]
    fn test_radius_and_depth_horizons() {
        let mut model = two_layer_model();
        model.set_active_region(Some(Polygon3D::new(
            Polygon::Global,
            Horizon::Radius(5050.0),
            Horizon::Radius(5550.0),
        )));
        // Layer 0 nodes 1, 2; layer 1 node 0.
        assert_eq!(model.point_map().unwrap().len(), 12 * 2 + 42);

        let surface = EarthShape::Wgs84.radius_km(model.grid().vertex(0));
        model.set_active_region(Some(Polygon3D::new(
            Polygon::Global,
            Horizon::Depth(surface - 5150.0),
            Horizon::Depth(0.0),
        )));
        let map = model.point_map().unwrap();
        assert!(map.index_of(0, 0, 1).is_none());
        assert!(map.index_of(0, 0, 2).is_some());
    }

    #[test]
    fn test_equality() {
        let a = two_layer_model();
        let mut b = a.clone();
        assert_eq!(a, b);
        b.set_profile_radii(5, 0, &[5000.0, 5100.0, 5200.0], Some(vec![vec![1.0], vec![2.0], vec![3.5]]))
            .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_surface_profiles() {
        let md = MetaData::new(&["topography"], &["elevation"], &["km"], DataType::Double).unwrap();
        let mut model = Model::new(grid(&[64.0]), md).unwrap();
        for v in 0..12 {
            model.set_surface_profile(v, vec![f64::from(v)]).unwrap();
        }
        model.set_active_region(Some(Polygon3D::new(
            Polygon::Global,
            Horizon::Radius(7000.0),
            Horizon::Radius(8000.0),
        )));
        // Surface points have no radius, so horizons do not exclude them.
        assert_eq!(model.point_map().unwrap().len(), 12);

        let mut layered = two_layer_model();
        assert!(matches!(
            layered.set_surface_profile(0, vec![1.0]),
            Err(ModelError::Dimensions(_))
        ));
    }

    #[test]
    fn test_data_type_coercion_on_set() {
        let md = MetaData::new(&["a"], &["x"], &["u"], DataType::Byte).unwrap();
        let mut model = Model::new(grid(&[64.0]), md).unwrap();
        model.set_profile(0, 0, Profile::surface(vec![1.7]).unwrap()).unwrap();
        assert_eq!(model.profile(0, 0).unwrap().value(0, 0), Some(2.0));
    }
}
