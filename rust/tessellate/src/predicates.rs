// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pure 2D predicates over coordinate snapshots.
//!
//! Nothing in here touches the arena or the projection table, so every
//! admissibility and containment rule is unit-testable on bare points.
//! All inputs are coordinates in the face's flattened 2D space.

use std::cmp::Ordering;

use nalgebra::Point2;

/// Strict-interior margin for the barycentric point-in-triangle test and
/// the turn-sign test. Deliberately not taken from the tolerance bundle:
/// it guards algorithmic degeneracy, not model geometry.
pub(crate) const NEAR_EPS: f64 = 1e-10;

/// Scan-line ordering: decreasing y first, increasing x on a tie. Ties are
/// taken within `dist_tol` so nearly-level points scan as one row.
pub fn scan_cmp(a: &Point2<f64>, b: &Point2<f64>, dist_tol: f64) -> Ordering {
    if (a.y - b.y).abs() > dist_tol {
        // Higher y scans first.
        return b.y.partial_cmp(&a.y).unwrap_or(Ordering::Equal);
    }
    if (a.x - b.x).abs() > dist_tol {
        return a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal);
    }
    Ordering::Equal
}

/// z component of the cross product of (cur − prev) and (next − cur):
/// positive for a left (counterclockwise) turn at `cur`, negative for a
/// right turn, zero for collinear points.
pub fn turn_cross(prev: &Point2<f64>, cur: &Point2<f64>, next: &Point2<f64>) -> f64 {
    (cur.x - prev.x) * (next.y - cur.y) - (cur.y - prev.y) * (next.x - cur.x)
}

/// `true` when `p` lies strictly inside triangle (a, b, c), by barycentric
/// sign tests with a strict near-epsilon margin. Points on an edge or at a
/// corner are *not* inside.
pub fn point_in_triangle_strict(
    p: &Point2<f64>,
    a: &Point2<f64>,
    b: &Point2<f64>,
    c: &Point2<f64>,
) -> bool {
    let d1 = turn_cross(a, b, p);
    let d2 = turn_cross(b, c, p);
    let d3 = turn_cross(c, a, p);

    (d1 > NEAR_EPS && d2 > NEAR_EPS && d3 > NEAR_EPS)
        || (d1 < -NEAR_EPS && d2 < -NEAR_EPS && d3 < -NEAR_EPS)
}

/// `true` when `p` lies on the closed segment [a, b], within `dist_tol`
/// perpendicular distance and inside the segment's extent.
pub fn point_on_segment(
    p: &Point2<f64>,
    a: &Point2<f64>,
    b: &Point2<f64>,
    dist_tol: f64,
) -> bool {
    let ab = b - a;
    let ap = p - a;
    let len_sq = ab.norm_squared();
    if len_sq <= dist_tol * dist_tol {
        return ap.norm() <= dist_tol;
    }

    let t = ap.dot(&ab) / len_sq;
    if !(-f64::EPSILON..=1.0 + f64::EPSILON).contains(&t) {
        // Beyond an endpoint — allow the tolerance radius around it.
        let nearest = if t < 0.5 { a } else { b };
        return (p - nearest).norm() <= dist_tol;
    }
    let closest = a + ab * t;
    (p - closest).norm() <= dist_tol
}

/// `true` when the open diagonal (d1, d2) is blocked by segment (e1, e2):
/// they intersect or overlap somewhere other than within `dist_tol` of the
/// diagonal's own endpoints. Touching exactly at d1 or d2 is allowed —
/// that is where the diagonal is deliberately anchored.
pub fn diagonal_blocked(
    d1: &Point2<f64>,
    d2: &Point2<f64>,
    e1: &Point2<f64>,
    e2: &Point2<f64>,
    dist_tol: f64,
) -> bool {
    let r = d2 - d1;
    let s = e2 - e1;
    let qp = e1 - d1;
    let denom = r.x * s.y - r.y * s.x;
    let qp_cross_r = qp.x * r.y - qp.y * r.x;

    if denom.abs() <= NEAR_EPS {
        // Parallel. Not collinear → disjoint.
        if qp_cross_r.abs() > NEAR_EPS * (1.0 + r.norm() + s.norm()) {
            return false;
        }
        // Collinear: blocked when the overlap extends past the diagonal's
        // endpoint neighborhoods.
        let len_sq = r.norm_squared();
        if len_sq <= dist_tol * dist_tol {
            return false;
        }
        let t0 = (e1 - d1).dot(&r) / len_sq;
        let t1 = (e2 - d1).dot(&r) / len_sq;
        let (lo, hi) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
        let margin = dist_tol / len_sq.sqrt();
        return hi > margin && lo < 1.0 - margin;
    }

    let t = (qp.x * s.y - qp.y * s.x) / denom;
    let u = qp_cross_r / denom;
    if !(0.0..=1.0).contains(&t) || !(0.0..=1.0).contains(&u) {
        return false;
    }

    // Intersection point; allowed only in the endpoint neighborhoods.
    let x = d1 + r * t;
    (x - d1).norm() > dist_tol && (x - d2).norm() > dist_tol
}

/// Bit-identical coordinate comparison (the shared-vertex projection law
/// requires exact equality, not tolerance equality).
pub fn exact_eq(a: &Point2<f64>, b: &Point2<f64>) -> bool {
    a.x.to_bits() == b.x.to_bits() && a.y.to_bits() == b.y.to_bits()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2<f64> {
        Point2::new(x, y)
    }

    #[test]
    fn scan_order_prefers_high_y_then_low_x() {
        let tol = 1e-6;
        assert_eq!(scan_cmp(&p(0.0, 1.0), &p(5.0, 0.0), tol), Ordering::Less);
        assert_eq!(scan_cmp(&p(0.0, 1.0), &p(1.0, 1.0), tol), Ordering::Less);
        assert_eq!(scan_cmp(&p(2.0, 1.0), &p(1.0, 1.0), tol), Ordering::Greater);
        assert_eq!(scan_cmp(&p(1.0, 1.0), &p(1.0, 1.0 + 1e-9), tol), Ordering::Equal);
    }

    #[test]
    fn turn_sign() {
        assert!(turn_cross(&p(0.0, 0.0), &p(1.0, 0.0), &p(1.0, 1.0)) > 0.0);
        assert!(turn_cross(&p(0.0, 0.0), &p(1.0, 0.0), &p(1.0, -1.0)) < 0.0);
        assert_eq!(turn_cross(&p(0.0, 0.0), &p(1.0, 0.0), &p(2.0, 0.0)), 0.0);
    }

    #[test]
    fn triangle_interior_is_strict() {
        let (a, b, c) = (p(0.0, 0.0), p(4.0, 0.0), p(0.0, 4.0));
        assert!(point_in_triangle_strict(&p(1.0, 1.0), &a, &b, &c));
        // Boundary points are not strictly inside.
        assert!(!point_in_triangle_strict(&p(2.0, 0.0), &a, &b, &c));
        assert!(!point_in_triangle_strict(&a, &a, &b, &c));
        assert!(!point_in_triangle_strict(&p(5.0, 5.0), &a, &b, &c));
        // Works for clockwise triangles too.
        assert!(point_in_triangle_strict(&p(1.0, 1.0), &a, &c, &b));
    }

    #[test]
    fn on_segment() {
        let tol = 1e-6;
        assert!(point_on_segment(&p(1.0, 0.0), &p(0.0, 0.0), &p(2.0, 0.0), tol));
        assert!(point_on_segment(&p(0.0, 0.0), &p(0.0, 0.0), &p(2.0, 0.0), tol));
        assert!(!point_on_segment(&p(1.0, 0.1), &p(0.0, 0.0), &p(2.0, 0.0), tol));
        assert!(!point_on_segment(&p(3.0, 0.0), &p(0.0, 0.0), &p(2.0, 0.0), tol));
    }

    #[test]
    fn diagonal_crossing_rules() {
        let tol = 1e-6;
        // Proper crossing blocks.
        assert!(diagonal_blocked(
            &p(0.0, 0.0),
            &p(2.0, 2.0),
            &p(0.0, 2.0),
            &p(2.0, 0.0),
            tol
        ));
        // Disjoint segment does not.
        assert!(!diagonal_blocked(
            &p(0.0, 0.0),
            &p(2.0, 2.0),
            &p(3.0, 0.0),
            &p(4.0, 0.0),
            tol
        ));
        // Touching exactly at a diagonal endpoint is allowed.
        assert!(!diagonal_blocked(
            &p(0.0, 0.0),
            &p(2.0, 2.0),
            &p(0.0, 0.0),
            &p(1.0, 0.0),
            tol
        ));
        // A T-junction against the diagonal's interior blocks.
        assert!(diagonal_blocked(
            &p(0.0, 0.0),
            &p(2.0, 2.0),
            &p(1.0, 1.0),
            &p(3.0, 1.0),
            tol
        ));
        // Collinear overlap blocks.
        assert!(diagonal_blocked(
            &p(0.0, 0.0),
            &p(2.0, 0.0),
            &p(1.0, 0.0),
            &p(3.0, 0.0),
            tol
        ));
        // Collinear but disjoint does not.
        assert!(!diagonal_blocked(
            &p(0.0, 0.0),
            &p(1.0, 0.0),
            &p(2.0, 0.0),
            &p(3.0, 0.0),
            tol
        ));
    }

    #[test]
    fn exact_equality_is_bitwise() {
        assert!(exact_eq(&p(0.1 + 0.2, 1.0), &p(0.1 + 0.2, 1.0)));
        assert!(!exact_eq(&p(0.3, 1.0), &p(0.1 + 0.2, 1.0)));
    }
}
