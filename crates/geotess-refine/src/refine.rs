//! The refinement pipeline.

use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashMap;
use tracing::{debug, info};

use geotess_grid::{Grid, SubdivisionStats, TopLevelTopology};
use geotess_model::{Model, PointRef, Profile};

use crate::radial::{RadialPlan, split_radii};
use crate::spatial::refine_tessellations;
use crate::{RefineError, RefinementTrigger};

/// Counts from one refinement run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefineReport {
    pub seeds: usize,
    /// Subdivision counts per refined tessellation.
    pub tessellations: Vec<(usize, SubdivisionStats)>,
    pub vertices_added: usize,
    /// Profiles built for vertices that joined a top level.
    pub profiles_synthesized: usize,
    pub radial_splits: usize,
}

/// Refine `model` around the points selected by `trigger`.
///
/// # Errors
///
/// See [`refine_with_report`].
pub fn refine(model: &Model, trigger: &RefinementTrigger) -> Result<Model, RefineError> {
    refine_with_report(model, trigger).map(|(model, _)| model)
}

/// Refine `model` and report what was done. A trigger selecting no points
/// returns an equal model.
///
/// # Errors
///
/// Invalid point index, unknown threshold attribute, stale point map, and
/// grid or model validation failures.
pub fn refine_with_report(
    model: &Model,
    trigger: &RefinementTrigger,
) -> Result<(Model, RefineReport), RefineError> {
    let seeds = trigger.seeds(model)?;
    if seeds.is_empty() {
        info!("no points selected, model unchanged");
        return Ok((model.clone(), RefineReport::default()));
    }

    // Stage 2: spatial seeds per tessellation, radial requests per seed.
    let mut spatial: BTreeMap<usize, BTreeSet<u32>> = BTreeMap::new();
    let mut radial: Vec<(PointRef, Vec<f32>)> = Vec::new();
    for &seed in &seeds {
        let t = model.layer_tessellation(seed.layer)?;
        spatial.entry(t).or_default().insert(seed.vertex);
        let radii = split_radii(model.profile(seed.vertex, seed.layer)?, seed.node);
        if !radii.is_empty() {
            radial.push((seed, radii));
        }
    }
    info!(
        seeds = seeds.len(),
        tessellations = spatial.len(),
        radial_seeds = radial.len(),
        "refinement seeds collected"
    );

    // Stage 3: subdivide.
    let refined = refine_tessellations(model.grid(), &spatial)?;
    let grid = refined.grid;

    // Stage 4: profiles for new top-level vertices, then radial splits.
    let (mut profiles, synthesized) = synthesize_profiles(model, &grid, &refined.parents);
    let mut plan = RadialPlan::default();
    let mut topologies: FxHashMap<usize, TopLevelTopology> = FxHashMap::default();
    for (seed, radii) in &radial {
        let t = model.layer_tessellation(seed.layer)?;
        if !topologies.contains_key(&t) {
            topologies.insert(t, grid.topology(t)?);
        }
        let ring = topologies[&t].neighbors(seed.vertex, grid.top_level(t)?);
        for v in std::iter::once(seed.vertex).chain(ring) {
            plan.request(v, seed.layer, &profiles[v as usize][seed.layer], radii);
        }
    }
    plan.apply(&mut profiles);
    debug!(
        profiles = plan.n_profiles(),
        intervals = plan.n_splits(),
        "radial intervals split"
    );

    let data_type = model.metadata().data_type;
    let profiles = profiles
        .into_iter()
        .map(|row| row.into_iter().map(|p| p.coerced(data_type)).collect())
        .collect();
    let report = RefineReport {
        seeds: seeds.len(),
        tessellations: refined.stats,
        vertices_added: grid.n_vertices() - model.n_vertices(),
        profiles_synthesized: synthesized,
        radial_splits: plan.n_splits(),
    };
    let out = Model::from_parts(
        grid,
        model.metadata().clone(),
        profiles,
        model.active_region().cloned(),
    )?;
    info!(
        vertices = out.n_vertices(),
        vertices_added = report.vertices_added,
        profiles_synthesized = report.profiles_synthesized,
        radial_splits = report.radial_splits,
        points = out.point_map().map_or(0, |m| m.len()),
        "model refined"
    );
    Ok((out, report))
}

/// Empty profile spanning the mean of the parents' spans.
fn empty_between(a: &Profile, b: &Profile) -> Profile {
    let span = |p: &Profile| p.span().filter(|(bottom, top)| bottom < top);
    Profile::midpoint(
        &Profile::Empty { span: span(a) },
        &Profile::Empty { span: span(b) },
    )
}

/// Profile of a vertex joining the top level between `a` and `b`.
fn synthesize(a: &Profile, b: &Profile, inside_active: bool) -> Profile {
    match (a.is_data_bearing(), b.is_data_bearing()) {
        (true, true) => Profile::midpoint(a, b),
        (true, false) | (false, true) if inside_active => Profile::midpoint(a, b),
        _ => empty_between(a, b),
    }
}

/// Profile table of the refined grid, and the number of profiles built for
/// vertices that joined a top level.
fn synthesize_profiles(
    model: &Model,
    grid: &Grid,
    parents: &BTreeMap<usize, FxHashMap<u32, (u32, u32)>>,
) -> (Vec<Vec<Profile>>, usize) {
    let old = model.profiles();
    let n_old = model.n_vertices();
    let n_layers = model.n_layers();
    let mut profiles = old.to_vec();
    profiles.resize(grid.n_vertices(), vec![Profile::default(); n_layers]);

    // Brand-new vertices start empty in every layer.
    let mut created = vec![false; grid.n_vertices()];
    for edges in parents.values() {
        for (&v, &(a, b)) in edges {
            let i = v as usize;
            if i >= n_old && !created[i] {
                created[i] = true;
                for layer in 0..n_layers {
                    profiles[i][layer] =
                        empty_between(&old[a as usize][layer], &old[b as usize][layer]);
                }
            }
        }
    }

    let inside = |v: u32| {
        model
            .active_region()
            .is_none_or(|r| r.polygon.contains(grid.vertex(v)))
    };
    let mut synthesized = 0;
    for (&t, edges) in parents {
        let layers = model.metadata().layers_of(t);
        let before = model.grid().top_level_vertices(t);
        for &v in grid.top_level_vertices(t) {
            if before.binary_search(&v).is_ok() {
                continue;
            }
            let Some(&(a, b)) = edges.get(&v) else {
                continue;
            };
            for &layer in &layers {
                profiles[v as usize][layer] = synthesize(
                    &old[a as usize][layer],
                    &old[b as usize][layer],
                    inside(v),
                );
                synthesized += 1;
            }
        }
    }
    (profiles, synthesized)
}
