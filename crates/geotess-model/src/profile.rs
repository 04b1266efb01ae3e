//! Radial profiles: the column of data at one (vertex, layer).

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{DataType, ModelError};

/// Discriminant of a [`Profile`], for logging and tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProfileKind {
    Empty,
    Thin,
    Constant,
    NPoint,
    Surface,
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProfileKind::Empty => "empty",
            ProfileKind::Thin => "thin",
            ProfileKind::Constant => "constant",
            ProfileKind::NPoint => "npoint",
            ProfileKind::Surface => "surface",
        };
        f.write_str(name)
    }
}

/// Radii (km) and attribute values at one (vertex, layer).
///
/// Radii are strictly increasing. Every data node holds one value per model
/// attribute.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Profile {
    /// No data. `span` keeps the layer's bottom/top radii when known.
    Empty { span: Option<(f32, f32)> },
    /// A single radius with one data node.
    Thin { radius: f32, data: Vec<f64> },
    /// Two radii sharing one data node.
    Constant { bottom: f32, top: f32, data: Vec<f64> },
    /// `n >= 2` radii, one data node each.
    NPoint { radii: Vec<f32>, data: Vec<Vec<f64>> },
    /// Data without radii, for 2-D models.
    Surface { data: Vec<f64> },
}

impl Default for Profile {
    fn default() -> Self {
        Profile::Empty { span: None }
    }
}

fn check_increasing(radii: &[f32]) -> Result<(), ModelError> {
    if radii.iter().any(|r| !r.is_finite()) || radii.windows(2).any(|w| w[1] <= w[0]) {
        return Err(ModelError::NotIncreasing(radii.to_vec()));
    }
    Ok(())
}

fn check_finite(data: &[f64]) -> Result<(), ModelError> {
    if data.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ModelError::NonFinite("data"))
    }
}

impl Profile {
    /// Build the profile kind implied by the number of radii and data nodes:
    ///
    /// | radii | data   | kind      |
    /// |-------|--------|-----------|
    /// | any   | none   | empty     |
    /// | 1     | 1      | thin      |
    /// | 2     | 1      | constant  |
    /// | n ≥ 2 | n      | n-point   |
    ///
    /// # Errors
    ///
    /// [`ModelError::NotIncreasing`] and [`ModelError::DataCountMismatch`].
    pub fn from_radii(radii: &[f32], data: Option<Vec<Vec<f64>>>) -> Result<Self, ModelError> {
        check_increasing(radii)?;
        let Some(mut data) = data else {
            return Ok(Profile::Empty {
                span: radii.first().zip(radii.last()).map(|(b, t)| (*b, *t)),
            });
        };
        for node in &data {
            check_finite(node)?;
        }
        let mismatch = ModelError::DataCountMismatch {
            radii: radii.len(),
            data: data.len(),
        };
        match (radii.len(), data.len()) {
            (1, 1) => Ok(Profile::Thin {
                radius: radii[0],
                data: data.pop().unwrap_or_default(),
            }),
            (2, 1) => Ok(Profile::Constant {
                bottom: radii[0],
                top: radii[1],
                data: data.pop().unwrap_or_default(),
            }),
            (n, m) if n >= 2 && n == m => Ok(Profile::NPoint {
                radii: radii.to_vec(),
                data,
            }),
            _ => Err(mismatch),
        }
    }

    /// # Errors
    ///
    /// [`ModelError::NonFinite`] for NaN / infinite values.
    pub fn surface(data: Vec<f64>) -> Result<Self, ModelError> {
        check_finite(&data)?;
        Ok(Profile::Surface { data })
    }

    /// An empty profile remembering the layer span.
    ///
    /// # Errors
    ///
    /// [`ModelError::NotIncreasing`] unless `bottom < top`.
    pub fn empty_span(bottom: f32, top: f32) -> Result<Self, ModelError> {
        check_increasing(&[bottom, top])?;
        Ok(Profile::Empty {
            span: Some((bottom, top)),
        })
    }

    #[must_use]
    pub fn kind(&self) -> ProfileKind {
        match self {
            Profile::Empty { .. } => ProfileKind::Empty,
            Profile::Thin { .. } => ProfileKind::Thin,
            Profile::Constant { .. } => ProfileKind::Constant,
            Profile::NPoint { .. } => ProfileKind::NPoint,
            Profile::Surface { .. } => ProfileKind::Surface,
        }
    }

    #[must_use]
    pub fn is_data_bearing(&self) -> bool {
        !matches!(self, Profile::Empty { .. })
    }

    #[must_use]
    pub fn radii(&self) -> Vec<f32> {
        match self {
            Profile::Empty { span: Some((b, t)) } => vec![*b, *t],
            Profile::Empty { span: None } | Profile::Surface { .. } => Vec::new(),
            Profile::Thin { radius, .. } => vec![*radius],
            Profile::Constant { bottom, top, .. } => vec![*bottom, *top],
            Profile::NPoint { radii, .. } => radii.clone(),
        }
    }

    #[must_use]
    pub fn n_radii(&self) -> usize {
        match self {
            Profile::Empty { span } => if span.is_some() { 2 } else { 0 },
            Profile::Surface { .. } => 0,
            Profile::Thin { .. } => 1,
            Profile::Constant { .. } => 2,
            Profile::NPoint { radii, .. } => radii.len(),
        }
    }

    /// Number of data nodes.
    #[must_use]
    pub fn n_data(&self) -> usize {
        match self {
            Profile::Empty { .. } => 0,
            Profile::Thin { .. } | Profile::Constant { .. } | Profile::Surface { .. } => 1,
            Profile::NPoint { data, .. } => data.len(),
        }
    }

    /// Bottom and top radius. Thin profiles have a zero-height span; surface
    /// and span-less empty profiles have none.
    #[must_use]
    pub fn span(&self) -> Option<(f32, f32)> {
        match self {
            Profile::Empty { span } => *span,
            Profile::Thin { radius, .. } => Some((*radius, *radius)),
            Profile::Constant { bottom, top, .. } => Some((*bottom, *top)),
            Profile::NPoint { radii, .. } => radii.first().zip(radii.last()).map(|(b, t)| (*b, *t)),
            Profile::Surface { .. } => None,
        }
    }

    /// Radius of data node `node`. Constant profiles report their bottom;
    /// surface profiles have no radius.
    #[must_use]
    pub fn node_radius(&self, node: usize) -> Option<f32> {
        match self {
            Profile::Thin { radius, .. } if node == 0 => Some(*radius),
            Profile::Constant { bottom, .. } if node == 0 => Some(*bottom),
            Profile::NPoint { radii, .. } => radii.get(node).copied(),
            _ => None,
        }
    }

    /// Attribute values of data node `node`.
    #[must_use]
    pub fn data(&self, node: usize) -> Option<&[f64]> {
        match self {
            Profile::Thin { data, .. }
            | Profile::Constant { data, .. }
            | Profile::Surface { data }
                if node == 0 =>
            {
                Some(data.as_slice())
            }
            Profile::NPoint { data, .. } => data.get(node).map(Vec::as_slice),
            _ => None,
        }
    }

    #[must_use]
    pub fn value(&self, node: usize, attribute: usize) -> Option<f64> {
        self.data(node).and_then(|d| d.get(attribute).copied())
    }

    /// Every data node, in order.
    #[must_use]
    pub fn data_nodes(&self) -> Vec<&[f64]> {
        (0..self.n_data()).filter_map(|i| self.data(i)).collect()
    }

    /// Verify every data node holds `expected` attribute values.
    ///
    /// # Errors
    ///
    /// [`ModelError::AttributeCountMismatch`] if the nodes disagree.
    pub fn check_attributes(&self, expected: usize) -> Result<(), ModelError> {
        match self.data_nodes().into_iter().find(|d| d.len() != expected) {
            Some(bad) => Err(ModelError::AttributeCountMismatch {
                expected,
                found: bad.len(),
            }),
            None => Ok(()),
        }
    }

    /// Coerce all values to `data_type`.
    #[must_use]
    pub fn coerced(mut self, data_type: DataType) -> Self {
        let coerce = |d: &mut Vec<f64>| d.iter_mut().for_each(|v| *v = data_type.coerce(*v));
        match &mut self {
            Profile::Empty { .. } => {}
            Profile::Thin { data, .. } | Profile::Constant { data, .. } | Profile::Surface { data } => {
                coerce(data);
            }
            Profile::NPoint { data, .. } => data.iter_mut().for_each(coerce),
        }
        self
    }

    /// Attribute values at fractional height `f ∈ [0, 1]` through the span,
    /// linearly interpolated between n-point nodes.
    #[must_use]
    pub fn data_at_fraction(&self, f: f64) -> Option<Vec<f64>> {
        match self {
            Profile::Empty { .. } => None,
            Profile::Thin { data, .. } | Profile::Constant { data, .. } | Profile::Surface { data } => {
                Some(data.clone())
            }
            Profile::NPoint { radii, data } => {
                let (b, t) = (f64::from(radii[0]), f64::from(radii[radii.len() - 1]));
                let r = b + f.clamp(0.0, 1.0) * (t - b);
                let j = radii
                    .windows(2)
                    .position(|w| r <= f64::from(w[1]))
                    .unwrap_or(radii.len() - 2);
                let (r0, r1) = (f64::from(radii[j]), f64::from(radii[j + 1]));
                let w = ((r - r0) / (r1 - r0)).clamp(0.0, 1.0);
                Some(
                    data[j]
                        .iter()
                        .zip(&data[j + 1])
                        .map(|(a, b)| a + w * (b - a))
                        .collect(),
                )
            }
        }
    }

    /// Index `j` of the interval `(r_j, r_{j+1})` strictly containing `r`.
    #[must_use]
    pub fn interval_containing(&self, r: f32) -> Option<usize> {
        match self {
            Profile::NPoint { radii, .. } => radii.windows(2).position(|w| w[0] < r && r < w[1]),
            _ => None,
        }
    }

    /// Midpoint radius of interval `j` of an n-point profile.
    #[must_use]
    pub fn interval_midpoint(&self, j: usize) -> Option<f32> {
        match self {
            Profile::NPoint { radii, .. } if j + 1 < radii.len() => {
                Some(0.5 * (radii[j] + radii[j + 1]))
            }
            _ => None,
        }
    }

    /// Insert a node at the midpoint of each interval in `intervals`, with
    /// values the mean of the bracketing nodes. Other kinds, and intervals
    /// whose midpoint does not fall strictly between its nodes in `f32`, are
    /// left unchanged.
    #[must_use]
    pub fn split_intervals(&self, intervals: &BTreeSet<usize>) -> Profile {
        let Profile::NPoint { radii, data } = self else {
            return self.clone();
        };
        let mut new_radii = Vec::with_capacity(radii.len() + intervals.len());
        let mut new_data = Vec::with_capacity(radii.len() + intervals.len());
        for i in 0..radii.len() {
            new_radii.push(radii[i]);
            new_data.push(data[i].clone());
            if intervals.contains(&i) && i + 1 < radii.len() {
                let mid = 0.5 * (radii[i] + radii[i + 1]);
                if radii[i] < mid && mid < radii[i + 1] {
                    new_radii.push(mid);
                    new_data.push(
                        data[i]
                            .iter()
                            .zip(&data[i + 1])
                            .map(|(a, b)| 0.5 * (a + b))
                            .collect(),
                    );
                }
            }
        }
        Profile::NPoint {
            radii: new_radii,
            data: new_data,
        }
    }

    /// Profile at the great-circle midpoint of two vertices.
    ///
    /// Profiles of the same kind and node count are averaged node by node.
    /// Otherwise the profile with more data nodes is the template: its nodes
    /// keep their fractional height within the averaged span and values are
    /// the mean of both profiles sampled at that height. Empty profiles
    /// average their spans.
    #[must_use]
    pub fn midpoint(a: &Profile, b: &Profile) -> Profile {
        let mean = |x: f32, y: f32| 0.5 * (x + y);
        let mean_data = |x: &[f64], y: &[f64]| -> Vec<f64> {
            x.iter().zip(y).map(|(p, q)| 0.5 * (p + q)).collect()
        };
        match (a, b) {
            (Profile::Empty { .. }, Profile::Empty { .. }) => Profile::Empty {
                span: mean_span(a.span(), b.span()),
            },
            (Profile::Empty { .. }, other) | (other, Profile::Empty { .. }) => other.clone(),
            (Profile::Thin { radius: r1, data: d1 }, Profile::Thin { radius: r2, data: d2 }) => {
                Profile::Thin {
                    radius: mean(*r1, *r2),
                    data: mean_data(d1, d2),
                }
            }
            (
                Profile::Constant { bottom: b1, top: t1, data: d1 },
                Profile::Constant { bottom: b2, top: t2, data: d2 },
            ) => Profile::Constant {
                bottom: mean(*b1, *b2),
                top: mean(*t1, *t2),
                data: mean_data(d1, d2),
            },
            (Profile::Surface { data: d1 }, Profile::Surface { data: d2 }) => Profile::Surface {
                data: mean_data(d1, d2),
            },
            (Profile::NPoint { radii: r1, data: d1 }, Profile::NPoint { radii: r2, data: d2 })
                if r1.len() == r2.len() =>
            {
                Profile::NPoint {
                    radii: r1.iter().zip(r2).map(|(x, y)| mean(*x, *y)).collect(),
                    data: d1.iter().zip(d2).map(|(x, y)| mean_data(x, y)).collect(),
                }
            }
            _ => resample_midpoint(a, b),
        }
    }
}

fn mean_span(a: Option<(f32, f32)>, b: Option<(f32, f32)>) -> Option<(f32, f32)> {
    match (a, b) {
        (Some((b1, t1)), Some((b2, t2))) => Some((0.5 * (b1 + b2), 0.5 * (t1 + t2))),
        (Some(s), None) | (None, Some(s)) => Some(s),
        (None, None) => None,
    }
}

/// Midpoint of two data-bearing profiles with different structure.
fn resample_midpoint(a: &Profile, b: &Profile) -> Profile {
    let (template, other) = if b.n_data() > a.n_data() { (b, a) } else { (a, b) };
    let span = mean_span(template.span(), other.span());
    let Profile::NPoint { radii, .. } = template else {
        // Template kinds with a single data node: average the values and
        // keep the template's shape over the mean span.
        let data: Vec<f64> = match (template.data(0), other.data_at_fraction(0.5)) {
            (Some(t), Some(o)) => t.iter().zip(&o).map(|(p, q)| 0.5 * (p + q)).collect(),
            (Some(t), None) => t.to_vec(),
            _ => return template.clone(),
        };
        return match (template, span) {
            (Profile::Thin { .. }, Some((b, t))) => Profile::Thin {
                radius: 0.5 * (b + t),
                data,
            },
            (Profile::Constant { .. }, Some((b, t))) if b < t => Profile::Constant {
                bottom: b,
                top: t,
                data,
            },
            (Profile::Surface { .. }, _) => Profile::Surface { data },
            _ => template.clone(),
        };
    };
    let (tb, tt) = (f64::from(radii[0]), f64::from(radii[radii.len() - 1]));
    let (nb, nt) = span.map_or((tb, tt), |(b, t)| (f64::from(b), f64::from(t)));
    let mut new_radii = Vec::with_capacity(radii.len());
    let mut new_data = Vec::with_capacity(radii.len());
    for (i, r) in radii.iter().enumerate() {
        let f = if tt > tb { (f64::from(*r) - tb) / (tt - tb) } else { 0.0 };
        let t_vals = template.data(i).map(<[f64]>::to_vec).unwrap_or_default();
        let vals = match other.data_at_fraction(f) {
            Some(o) => t_vals.iter().zip(&o).map(|(p, q)| 0.5 * (p + q)).collect(),
            None => t_vals,
        };
        new_radii.push((nb + f * (nt - nb)) as f32);
        new_data.push(vals);
    }
    if new_radii.windows(2).any(|w| w[1] <= w[0]) {
        // Collapsed span: keep the template radii.
        new_radii = radii.clone();
    }
    Profile::NPoint {
        radii: new_radii,
        data: new_data,
    }
}
