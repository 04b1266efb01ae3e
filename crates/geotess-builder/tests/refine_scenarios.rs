//! End-to-end `model refinement` runs through the property interface.

use std::collections::BTreeMap;

use std::f64::consts::FRAC_PI_2;

use geotess_builder::{BuildError, BuildOutput, ErrorKind, run, run_config};
use geotess_config::{BuilderConfig, ConfigError, ConstructionMode, Properties};
use geotess_geometry::{EarthShape, Polygon, UnitVector};
use geotess_grid::Grid;
use geotess_model::{DataType, Horizon, MetaData, Model, Polygon3D, Profile};

fn scratch(lines: &[&str]) -> Grid {
    let mut props = Properties::new();
    props.set("gridConstructionMode", "scratch");
    for line in lines {
        props.set_line(line).unwrap();
    }
    match run(&props, None).unwrap() {
        BuildOutput::Grid(grid) => grid,
        BuildOutput::Model(_) => panic!("scratch run produced a model"),
    }
}

fn refinement(lines: &[&str]) -> Properties {
    let mut props = Properties::new();
    props.set("gridConstructionMode", "model refinement");
    for line in lines {
        props.set_line(line).unwrap();
    }
    props
}

fn refine(model: &Model, lines: &[&str]) -> Result<Model, BuildError> {
    match run(&refinement(lines), Some(model))? {
        BuildOutput::Model(model) => Ok(model),
        BuildOutput::Grid(_) => panic!("refinement run produced a grid"),
    }
}

/// Layers on tessellations 0, 1, 2 with 4-node profiles at every vertex of
/// their tessellation.
fn layered_model() -> Model {
    let grid = scratch(&["nTessellations = 3", "baseEdgeLengths = 64, 32, 16"]);
    let md = MetaData::new(&["core", "mantle", "crust"], &["vp"], &["km/s"], DataType::Double)
        .unwrap()
        .with_layer_tessellations(&[0, 1, 2])
        .unwrap();
    let mut model = Model::new(grid, md).unwrap();
    for v in 0..model.n_vertices() as u32 {
        for layer in 0..3 {
            if model.is_layer_vertex(v, layer) {
                let base = 3000.0 + 1000.0 * layer as f32;
                let radii: Vec<f32> = (0..4).map(|i| base + 100.0 * i as f32).collect();
                let data = (0..4).map(|i| vec![5.0 + i as f64]).collect();
                model.set_profile_radii(v, layer, &radii, Some(data)).unwrap();
            }
        }
    }
    model.set_active_region(None);
    model
}

/// Three layers spanning `[100 l, 100 l + 100]` everywhere; each layer's
/// own top-level vertices carry four nodes of value 2.
fn global_model(grid_lines: &[&str]) -> Model {
    let mut lines = vec!["nTessellations = 3", "baseEdgeLengths = 64, 32, 16"];
    lines.extend_from_slice(grid_lines);
    let md = MetaData::new(&["core", "mantle", "crust"], &["DATA"], &["km/s"], DataType::Float)
        .unwrap()
        .with_layer_tessellations(&[0, 1, 2])
        .unwrap();
    let mut model = Model::new(scratch(&lines), md).unwrap();
    for layer in 0..3 {
        let bottom = 100.0 * layer as f32;
        for v in 0..model.n_vertices() as u32 {
            if model.is_layer_vertex(v, layer) {
                let radii = [bottom, bottom + 40.0, bottom + 60.0, bottom + 100.0];
                model.set_profile_radii(v, layer, &radii, Some(vec![vec![2.0]; 4])).unwrap();
            } else {
                let empty = Profile::empty_span(bottom, bottom + 100.0).unwrap();
                model.set_profile(v, layer, empty).unwrap();
            }
        }
    }
    model.set_active_region(None);
    model
}

/// The whole of `layer` below a polar cap of 20 degrees.
fn polar_cap_region(layer: usize) -> Polygon3D {
    Polygon3D::new(
        Polygon::small_circle(UnitVector::NORTH_POLE, 20.0).unwrap(),
        Horizon::LayerFraction { layer, fraction: 0.0 },
        Horizon::LayerFraction { layer, fraction: 1.0 },
    )
}

fn at_north_pole(model: &Model) -> bool {
    model.grid().vertex(0).dot(UnitVector::NORTH_POLE) > 1e-7f64.cos()
}

fn top_counts(model: &Model) -> Vec<usize> {
    (0..model.grid().n_tessellations())
        .map(|t| model.grid().top_level_vertices(t).len())
        .collect()
}

/// Number of top-level vertices of `layer`'s tessellation per node count.
fn node_histogram(model: &Model, layer: usize) -> BTreeMap<usize, usize> {
    let t = model.layer_tessellation(layer).unwrap();
    let mut out = BTreeMap::new();
    for &v in model.grid().top_level_vertices(t) {
        *out.entry(model.profile(v, layer).unwrap().n_data()).or_default() += 1;
    }
    out
}

/// Number of vertices per node count in `layer`, over the whole grid.
fn vertex_histogram(model: &Model, layer: usize) -> BTreeMap<usize, usize> {
    let mut out = BTreeMap::new();
    for v in 0..model.n_vertices() as u32 {
        *out.entry(model.profile(v, layer).unwrap().n_data()).or_default() += 1;
    }
    out
}

fn point_index(model: &Model, vertex: u32, layer: usize, node: usize) -> usize {
    model.point_map().unwrap().index_of(vertex, layer, node).unwrap()
}

#[test]
fn test_interior_node_of_coarsest_layer() {
    let model = layered_model();
    let dir = tempfile::tempdir().unwrap();
    let points = format!("pointsToRefine = {}", point_index(&model, 0, 0, 1));
    let out = format!("outputModelFile = {}", dir.path().join("refined.gtm").display());
    let vtk = format!("vtkDir = {}", dir.path().join("vtk").display());

    let refined = refine(&model, &[&points, &out, &vtk]).unwrap();
    assert_eq!(top_counts(&refined), vec![22, 42, 162]);
    assert_eq!(refined.n_vertices(), 162);
    assert_eq!(node_histogram(&refined, 0), BTreeMap::from([(4, 16), (6, 6)]));
    assert_eq!(node_histogram(&refined, 2), BTreeMap::from([(4, 162)]));

    let reloaded = geotess_model::io::read_model(&dir.path().join("refined.gtm")).unwrap();
    assert_eq!(reloaded, refined);
    for t in 0..3 {
        for prefix in ["original", "refined"] {
            assert!(dir.path().join("vtk").join(format!("{prefix}_{t}.vtk")).exists());
        }
    }
    let refined_vtk = std::fs::read_to_string(dir.path().join("vtk/refined_0.vtk")).unwrap();
    assert!(refined_vtk.contains("POINTS 22 double"));
    assert!(refined_vtk.contains("SCALARS nodes_core double 1"));
}

#[test]
fn test_endpoint_node_of_finest_layer() {
    let model = layered_model();
    let points = format!("pointsToRefine = {}", point_index(&model, 0, 2, 3));
    let refined = refine(&model, &[&points]).unwrap();
    assert_eq!(top_counts(&refined), vec![12, 42, 172]);
    assert_eq!(node_histogram(&refined, 2), BTreeMap::from([(4, 166), (5, 6)]));
    assert!(refined.grid().check_conforming().is_ok());
}

#[test]
fn test_every_node_of_one_profile() {
    let model = layered_model();
    let indices: Vec<String> = (0..4)
        .map(|node| point_index(&model, 0, 0, node).to_string())
        .collect();
    let points = format!("pointsToRefine = {}", indices.join(", "));
    let refined = refine(&model, &[&points]).unwrap();
    assert_eq!(refined.profile(0, 0).unwrap().n_data(), 7);
}

#[test]
fn test_empty_point_list_keeps_model() {
    let model = layered_model();
    let refined = refine(&model, &["pointsToRefine = []"]).unwrap();
    assert_eq!(refined, model);
}

#[test]
fn test_threshold_on_surface_model() {
    let grid = scratch(&["nTessellations = 1", "baseEdgeLengths = 64"]);
    let md = MetaData::new(&["surface"], &["z"], &["none"], DataType::Float).unwrap();
    let mut model = Model::new(grid, md).unwrap();
    for v in 0..model.n_vertices() as u32 {
        let z = model.grid().vertex(v).z();
        model.set_surface_profile(v, vec![z]).unwrap();
    }
    model.set_active_region(None);

    let refined = refine(&model, &["threshold = z > 0.99"]).unwrap();
    assert_eq!(refined.n_vertices(), 22);
    assert_eq!(refined.point_map().unwrap().len(), 22);

    let unchanged = refine(&model, &["threshold = z > 2"]).unwrap();
    assert_eq!(unchanged, model);
}

/// Constant crust inside the cap the grid was refined around, empty columns
/// outside it.
#[test]
fn test_crustal_cap_model() {
    let grid = scratch(&[
        "initialSolid = octahedron",
        "nTessellations = 1",
        "baseEdgeLengths = 64",
        "polygons = spherical_cap, 20, 20, 20, 0, 16",
        "rotateGrid = 20 20",
    ]);
    let cap = Polygon::small_circle_degrees(20.0, 20.0, 20.0, EarthShape::Wgs84).unwrap();
    let md = MetaData::new(&["crust"], &["DATA"], &["km/s"], DataType::Float).unwrap();
    let mut model = Model::new(grid, md).unwrap();
    for v in 0..model.n_vertices() as u32 {
        if cap.contains(model.grid().vertex(v)) {
            model.set_profile_radii(v, 0, &[6341.0, 6371.0], Some(vec![vec![2.0]])).unwrap();
        } else {
            model.set_profile(v, 0, Profile::empty_span(6341.0, 6371.0).unwrap()).unwrap();
        }
    }
    model.set_active_region(Some(Polygon3D::columns(cap)));
    assert_eq!(top_counts(&model), vec![22]);
    assert_eq!(point_index(&model, 0, 0, 0), 0);

    let refined = refine(&model, &["pointsToRefine = 0"]).unwrap();
    let v0 = refined.grid().vertex(0);
    assert!(v0.dot(EarthShape::Wgs84.vector_degrees(20.0, 20.0)) > 1e-7f64.cos());
    assert_eq!(top_counts(&refined), vec![30]);
    assert!(refined.grid().check_conforming().is_ok());

    let bearing: Vec<u32> = (0..refined.n_vertices() as u32)
        .filter(|&v| refined.profile(v, 0).unwrap().n_data() > 0)
        .collect();
    assert_eq!(bearing, vec![0, 22, 24, 26, 28]);
    for v in bearing {
        assert_eq!(refined.profile(v, 0).unwrap().n_data(), 1);
    }
}

#[test]
fn test_layer_fraction_region_on_middle_layer() {
    let mut model = global_model(&[]);
    model.set_active_region(Some(Polygon3D::new(
        Polygon::Global,
        Horizon::LayerFraction { layer: 1, fraction: 0.0 },
        Horizon::LayerFraction { layer: 1, fraction: 1.0 },
    )));
    let points = format!("pointsToRefine = {}", point_index(&model, 0, 1, 1));

    let refined = refine(&model, &[&points]).unwrap();
    assert!(at_north_pole(&refined));
    assert_eq!(top_counts(&refined), vec![12, 52, 162]);
    assert_eq!(node_histogram(&refined, 1), BTreeMap::from([(4, 46), (6, 6)]));
    assert_eq!(refined.profile(0, 1).unwrap().n_data(), 6);
}

#[test]
fn test_threshold_inside_polar_region() {
    let mut model = global_model(&[]);
    model.set_active_region(Some(polar_cap_region(2)));

    let refined = refine(&model, &["threshold = DATA > 1"]).unwrap();
    assert!(at_north_pole(&refined));
    assert_eq!(top_counts(&refined), vec![12, 42, 197]);
    assert_eq!(node_histogram(&refined, 2), BTreeMap::from([(4, 166), (7, 31)]));
    assert_eq!(refined.profile(0, 2).unwrap().n_data(), 7);
    // Layers outside the region keep their profiles.
    assert_eq!(node_histogram(&refined, 1), BTreeMap::from([(4, 42)]));
}

/// With vertex 0 moved to (30, 30) the polar cap is centred on seed vertex 2.
#[test]
fn test_threshold_inside_polar_region_of_rotated_grid() {
    let mut model = global_model(&["rotateGrid = 30 30"]);
    model.set_active_region(Some(polar_cap_region(2)));

    let refined = refine(&model, &["threshold = DATA > 1"]).unwrap();
    let v0 = refined.grid().vertex(0);
    assert!(v0.dot(EarthShape::Wgs84.vector_degrees(30.0, 30.0)) > 1e-7f64.cos());
    assert_eq!(top_counts(&refined), vec![12, 42, 197]);
    assert_eq!(node_histogram(&refined, 2), BTreeMap::from([(4, 166), (7, 31)]));
    for v in [2, 50, 49] {
        assert_eq!(refined.profile(v, 2).unwrap().n_data(), 7);
    }
    assert_eq!(refined.profile(0, 2).unwrap().n_data(), 4);
}

/// Thin mantle, three-node lower crust, constant upper crust; each layer is
/// refined under its own cap.
#[test]
fn test_thin_npoint_and_constant_layers() {
    let grid = scratch(&["nTessellations = 1", "baseEdgeLengths = 16"]);
    let md = MetaData::new(
        &["mantle", "lower_crust", "upper_crust"],
        &["VP"],
        &["km/s"],
        DataType::Float,
    )
    .unwrap();
    let mut model = Model::new(grid, md).unwrap();
    for v in 0..model.n_vertices() as u32 {
        model.set_profile_radii(v, 0, &[6341.0], Some(vec![vec![8.0]])).unwrap();
        model
            .set_profile_radii(v, 1, &[6341.0, 6351.0, 6361.0], Some(vec![vec![4.0]; 3]))
            .unwrap();
        model.set_profile_radii(v, 2, &[6361.0, 6371.0], Some(vec![vec![2.0]])).unwrap();
    }
    model.set_active_region(None);
    assert_eq!(model.n_vertices(), 162);

    let caps = [
        UnitVector::from_geocentric(0.0, 0.0),
        UnitVector::from_geocentric(0.0, FRAC_PI_2),
        UnitVector::NORTH_POLE,
    ]
    .map(|center| Polygon::small_circle(center, 20.0).unwrap());
    let indices: Vec<String> = model
        .point_map()
        .unwrap()
        .iter()
        .enumerate()
        .filter(|(_, p)| caps[p.layer].contains(model.grid().vertex(p.vertex)))
        .map(|(i, _)| i.to_string())
        .collect();
    let points = format!("pointsToRefine = [{}]", indices.join(", "));

    let refined = refine(&model, &[&points]).unwrap();
    assert!(at_north_pole(&refined));
    assert_eq!(refined.n_vertices(), 281);
    assert_eq!(vertex_histogram(&refined, 1), BTreeMap::from([(3, 244), (5, 37)]));
    assert_eq!(vertex_histogram(&refined, 0), BTreeMap::from([(1, 281)]));
    assert_eq!(vertex_histogram(&refined, 2), BTreeMap::from([(1, 281)]));
}

#[test]
fn test_threshold_on_polar_surface_values() {
    let grid = scratch(&["nTessellations = 1", "baseEdgeLengths = 16"]);
    let md = MetaData::new(&["surface"], &["DATA"], &["km/s"], DataType::Float).unwrap();
    let mut model = Model::new(grid, md).unwrap();
    let cap = Polygon::small_circle(UnitVector::NORTH_POLE, 20.0).unwrap();
    for v in 0..model.n_vertices() as u32 {
        let value = if cap.contains(model.grid().vertex(v)) { 2.0 } else { 0.0 };
        model.set_surface_profile(v, vec![value]).unwrap();
    }
    model.set_active_region(None);

    let refined = refine(&model, &["threshold = DATA > 1"]).unwrap();
    assert!(at_north_pole(&refined));
    assert_eq!(top_counts(&refined), vec![197]);
    let mut values = BTreeMap::new();
    for v in 0..refined.n_vertices() as u32 {
        let value = refined.profile(v, 0).unwrap().value(0, 0).unwrap();
        *values.entry(value.round() as i64).or_insert(0usize) += 1;
    }
    assert_eq!(values, BTreeMap::from([(0, 166), (1, 15), (2, 16)]));
}

#[test]
fn test_refinement_error_tags() {
    let model = layered_model();
    let kind = |lines: &[&str]| refine(&model, lines).unwrap_err().kind();

    assert_eq!(kind(&["pointsToRefine = 1000000"]), ErrorKind::RefinementTarget);
    assert_eq!(kind(&["threshold = density > 1"]), ErrorKind::RefinementTarget);
    assert_eq!(kind(&["threshold = vp >"]), ErrorKind::Configuration);
    assert_eq!(
        kind(&["pointsToRefine = 0", "threshold = vp > 1"]),
        ErrorKind::Configuration
    );
    assert_eq!(kind(&[]), ErrorKind::Configuration);

    let no_model = run(&refinement(&["pointsToRefine = 0"]), None).unwrap_err();
    assert!(matches!(no_model, BuildError::MissingModel));
    assert_eq!(no_model.exit_code(), 2);
}

#[test]
fn test_config_without_trigger() {
    let config = BuilderConfig {
        mode: ConstructionMode::ModelRefinement,
        ..Default::default()
    };
    let err = run_config(&config, Some(&layered_model())).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(matches!(err, BuildError::Config(ConfigError::MissingKey(_))));
}
