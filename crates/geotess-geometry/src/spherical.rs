//! Predicates on spherical triangles and great-circle arcs.
//!
//! Arcs are always the minor arc between their endpoints. Predicates are
//! closed: points on a boundary count as inside / touching.

use glam::DVec3;

use crate::UnitVector;

const EPS: f64 = 1e-12;

/// `true` when `p` lies inside or on the spherical triangle `(a, b, c)`.
///
/// Works for either winding. Only triangles smaller than a hemisphere are
/// meaningful; the antipodal image of the triangle is excluded.
#[must_use]
pub fn triangle_contains(a: UnitVector, b: UnitVector, c: UnitVector, p: UnitVector) -> bool {
    let (a, b, c, p) = (a.as_dvec3(), b.as_dvec3(), c.as_dvec3(), p.as_dvec3());
    if p.dot(a + b + c) <= 0.0 {
        return false;
    }
    let s1 = a.cross(b).dot(p);
    let s2 = b.cross(c).dot(p);
    let s3 = c.cross(a).dot(p);
    (s1 >= -EPS && s2 >= -EPS && s3 >= -EPS) || (s1 <= EPS && s2 <= EPS && s3 <= EPS)
}

/// Angular distance in radians from `p` to the minor arc `a`–`b`.
#[must_use]
pub fn arc_distance(p: UnitVector, a: UnitVector, b: UnitVector) -> f64 {
    let endpoint_distance = p.angle_to(a).min(p.angle_to(b));
    let n = a.as_dvec3().cross(b.as_dvec3());
    let n_len = n.length();
    if n_len < EPS {
        return endpoint_distance;
    }
    let n = n / n_len;
    let pv = p.as_dvec3();
    let off = pv.dot(n);
    let q = pv - off * n;
    if q.length() < EPS {
        // p is a pole of the arc's great circle
        return endpoint_distance;
    }
    if within_arc(q, a.as_dvec3(), b.as_dvec3(), n) {
        off.abs().atan2(q.length())
    } else {
        endpoint_distance
    }
}

/// `true` when the minor arcs `a`–`b` and `c`–`d` share at least one point.
#[must_use]
pub fn arcs_intersect(a: UnitVector, b: UnitVector, c: UnitVector, d: UnitVector) -> bool {
    let (av, bv, cv, dv) = (a.as_dvec3(), b.as_dvec3(), c.as_dvec3(), d.as_dvec3());
    let n1 = av.cross(bv);
    let n2 = cv.cross(dv);
    let x = n1.cross(n2);
    if x.length() < EPS {
        // Coplanar (or degenerate) arcs: they meet only if one touches the other.
        return arc_distance(c, a, b) < 1e-9
            || arc_distance(d, a, b) < 1e-9
            || arc_distance(a, c, d) < 1e-9
            || arc_distance(b, c, d) < 1e-9;
    }
    let x = x.normalize();
    [x, -x]
        .into_iter()
        .any(|x| within_arc(x, av, bv, n1) && within_arc(x, cv, dv, n2))
}

/// `q` (on the great circle with normal `n`) lies between `a` and `b`.
fn within_arc(q: DVec3, a: DVec3, b: DVec3, n: DVec3) -> bool {
    let tol = EPS * n.length().max(1.0);
    a.cross(q).dot(n) >= -tol && q.cross(b).dot(n) >= -tol && q.dot(a + b) >= 0.0
}
