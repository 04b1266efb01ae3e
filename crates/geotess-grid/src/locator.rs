//! Spatial hash over grid vertices for position-based deduplication.
//!
//! Refining an existing grid cannot rely on an edge map: the midpoint of an
//! edge in one tessellation may already exist as a vertex of another. The
//! locator buckets vertices by a cubic cell of their coordinates so lookups
//! check only the 27 cells around the query point.

use rustc_hash::FxHashMap;

use geotess_geometry::UnitVector;

use crate::subdivide::MidpointSource;
use crate::GridError;

/// Cell edge length in unit-sphere coordinates.
const CELL_SIZE: f64 = 1e-6;

/// Two vertices closer than this (chord length) are the same vertex.
const TOLERANCE: f64 = 1e-9;

type CellKey = (i64, i64, i64);

fn cell_of(v: UnitVector) -> CellKey {
    let p = v.as_dvec3() / CELL_SIZE;
    (p.x.floor() as i64, p.y.floor() as i64, p.z.floor() as i64)
}

/// Vertex indices bucketed by position.
#[derive(Debug, Default)]
pub struct VertexLocator {
    buckets: FxHashMap<CellKey, Vec<(u32, UnitVector)>>,
    count: usize,
}

impl VertexLocator {
    /// Index every vertex of `vertices` under its position in the slice.
    #[must_use]
    pub fn new(vertices: &[UnitVector]) -> Self {
        let mut locator = Self::default();
        for (i, v) in vertices.iter().enumerate() {
            locator.insert(i as u32, *v);
        }
        locator
    }

    pub fn insert(&mut self, index: u32, v: UnitVector) {
        self.buckets.entry(cell_of(v)).or_default().push((index, v));
        self.count += 1;
    }

    /// The lowest index within tolerance of `v`, if any.
    #[must_use]
    pub fn find(&self, v: UnitVector) -> Option<u32> {
        let (cx, cy, cz) = cell_of(v);
        let mut best: Option<u32> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(bucket) = self.buckets.get(&(cx + dx, cy + dy, cz + dz)) else {
                        continue;
                    };
                    for &(index, u) in bucket {
                        if (u.as_dvec3() - v.as_dvec3()).length() <= TOLERANCE
                            && best.is_none_or(|b| index < b)
                        {
                            best = Some(index);
                        }
                    }
                }
            }
        }
        best
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// A [`MidpointSource`] that reuses any existing vertex at the midpoint
/// position.
#[derive(Debug)]
pub struct LocatedMidpoints {
    locator: VertexLocator,
}

impl LocatedMidpoints {
    #[must_use]
    pub fn new(vertices: &[UnitVector]) -> Self {
        Self {
            locator: VertexLocator::new(vertices),
        }
    }
}

impl MidpointSource for LocatedMidpoints {
    fn midpoint(
        &mut self,
        a: u32,
        b: u32,
        vertices: &mut Vec<UnitVector>,
    ) -> Result<u32, GridError> {
        let m = vertices[a as usize].midpoint(vertices[b as usize])?;
        if let Some(existing) = self.locator.find(m) {
            return Ok(existing);
        }
        let index = vertices.len() as u32;
        vertices.push(m);
        self.locator.insert(index, m);
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec3;

    use super::*;

    #[test]
    fn test_find_exact_and_perturbed() {
        let vs = vec![
            UnitVector::NORTH_POLE,
            UnitVector::from_geocentric(0.1, 0.2),
            UnitVector::from_geocentric(-0.5, 3.0),
        ];
        let locator = VertexLocator::new(&vs);
        assert_eq!(locator.len(), 3);
        assert_eq!(locator.find(vs[1]), Some(1));
        let nudged = UnitVector::new(vs[2].as_dvec3() + DVec3::splat(1e-12)).unwrap();
        assert_eq!(locator.find(nudged), Some(2));
        assert_eq!(locator.find(UnitVector::SOUTH_POLE), None);
    }

    #[test]
    fn test_cell_boundary_is_searched() {
        // A point just across a cell face from a stored vertex.
        let stored = UnitVector::new(DVec3::new(0.6, 0.0, 0.8)).unwrap();
        let mut locator = VertexLocator::default();
        locator.insert(7, stored);
        let across = UnitVector::new(stored.as_dvec3() - DVec3::new(0.0, 5e-10, 0.0)).unwrap();
        assert_eq!(locator.find(across), Some(7));
    }

    #[test]
    fn test_located_midpoints_reuse_existing_vertex() {
        let a = UnitVector::from_geocentric(0.0, 0.0);
        let b = UnitVector::from_geocentric(0.0, 0.5);
        let m = a.midpoint(b).unwrap();
        let mut vertices = vec![a, b, m];
        let mut source = LocatedMidpoints::new(&vertices);
        assert_eq!(source.midpoint(0, 1, &mut vertices).unwrap(), 2);
        assert_eq!(vertices.len(), 3);

        let c = UnitVector::from_geocentric(0.5, 0.0);
        vertices.push(c);
        source.locator.insert(3, c);
        let idx = source.midpoint(0, 3, &mut vertices).unwrap();
        assert_eq!(idx, 4);
        assert_eq!(source.midpoint(3, 0, &mut vertices).unwrap(), 4);
    }
}
