//! Deterministic 128-bit grid identity.

use std::fmt;
use std::str::FromStr;

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

use geotess_geometry::UnitVector;

use crate::Tessellation;

/// MD5 digest over a grid's vertices and triangles, shown as 32 upper-case
/// hex characters.
///
/// Hashed in order: every vertex as three little-endian `f64`s; then for each
/// tessellation, each level, each triangle, its three vertex indices as
/// little-endian `u32`s, rotated so the smallest index comes first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridId([u8; 16]);

impl GridId {
    #[must_use]
    pub fn compute(vertices: &[UnitVector], tessellations: &[Tessellation]) -> Self {
        let mut hasher = Md5::new();
        for v in vertices {
            let p = v.as_dvec3();
            hasher.update(p.x.to_le_bytes());
            hasher.update(p.y.to_le_bytes());
            hasher.update(p.z.to_le_bytes());
        }
        for tess in tessellations {
            for level in tess.levels() {
                for tri in level {
                    for i in canonical(tri.vertices) {
                        hasher.update(i.to_le_bytes());
                    }
                }
            }
        }
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&hasher.finalize());
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

/// Rotate so the smallest index is first, keeping orientation.
fn canonical(v: [u32; 3]) -> [u32; 3] {
    let k = (0..3).min_by_key(|&i| v[i]).unwrap_or(0);
    [v[k], v[(k + 1) % 3], v[(k + 2) % 3]]
}

impl fmt::Display for GridId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{b:02X}")?;
        }
        Ok(())
    }
}

impl FromStr for GridId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != 32 || !s.is_ascii() {
            return Err(format!("grid ID must be 32 hex characters, got '{s}'"));
        }
        let mut bytes = [0u8; 16];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = u8::from_str_radix(&s[2 * i..2 * i + 2], 16)
                .map_err(|e| format!("invalid grid ID '{s}': {e}"))?;
        }
        Ok(Self(bytes))
    }
}
