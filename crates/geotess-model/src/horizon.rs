//! Radial bounds of an active region.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use geotess_geometry::Polygon;

use crate::Model;

/// A surface bounding the active region radially.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Horizon {
    /// `fraction ∈ [0, 1]` of the way from the bottom to the top of `layer`
    /// at the query vertex.
    LayerFraction { layer: usize, fraction: f64 },
    /// Constant depth in km below the ellipsoid surface.
    Depth(f64),
    /// Constant radius in km.
    Radius(f64),
}

impl Horizon {
    /// Where the point `(vertex, layer, radius)` lies relative to this
    /// horizon: `Less` below, `Greater` above.
    ///
    /// For a layer-fraction horizon, points in deeper layers are below it and
    /// points in shallower layers are above it regardless of radius. When the
    /// horizon layer has no span at the vertex the point counts as on it.
    #[must_use]
    pub fn compare(&self, model: &Model, vertex: u32, layer: usize, radius: f32) -> Ordering {
        let r = f64::from(radius);
        let horizon_radius = match *self {
            Horizon::Radius(h) => h,
            Horizon::Depth(d) => {
                model.metadata().earth_shape.radius_km(model.grid().vertex(vertex)) - d
            }
            Horizon::LayerFraction { layer: hl, fraction } => {
                match layer.cmp(&hl) {
                    Ordering::Equal => {}
                    other => return other,
                }
                let span = model
                    .profile(vertex, hl)
                    .ok()
                    .and_then(|p| p.span());
                let Some((b, t)) = span else {
                    return Ordering::Equal;
                };
                f64::from(b) + fraction * f64::from(t - b)
            }
        };
        r.partial_cmp(&horizon_radius).unwrap_or(Ordering::Equal)
    }
}

/// A spherical polygon with optional bottom and top horizons.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Polygon3D {
    pub polygon: Polygon,
    pub bottom: Option<Horizon>,
    pub top: Option<Horizon>,
}

impl Polygon3D {
    #[must_use]
    pub fn new(polygon: Polygon, bottom: Horizon, top: Horizon) -> Self {
        Self {
            polygon,
            bottom: Some(bottom),
            top: Some(top),
        }
    }

    /// Every radius in the columns under `polygon`.
    #[must_use]
    pub fn columns(polygon: Polygon) -> Self {
        Self {
            polygon,
            bottom: None,
            top: None,
        }
    }

    /// `true` when the vertex lies in the polygon and, for points with a
    /// radius, the radius lies between the horizons (inclusive).
    #[must_use]
    pub fn contains(&self, model: &Model, vertex: u32, layer: usize, radius: Option<f32>) -> bool {
        if !self.polygon.contains(model.grid().vertex(vertex)) {
            return false;
        }
        let Some(r) = radius else {
            return true;
        };
        let above_bottom = self
            .bottom
            .is_none_or(|h| h.compare(model, vertex, layer, r) != Ordering::Less);
        let below_top = self
            .top
            .is_none_or(|h| h.compare(model, vertex, layer, r) != Ordering::Greater);
        above_bottom && below_top
    }
}
