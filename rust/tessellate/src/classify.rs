// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Point-in-loop and loop-in-loop classification.
//!
//! Ray casting in the face plane with even/odd parity counting. The ray
//! runs in +x from the query point; an edge counts as a crossing under the
//! half-open rule — an endpoint exactly on the ray counts only when the
//! edge's *other* endpoint lies strictly below it — so a ray that passes
//! exactly through a loop vertex is counted once, not twice, no matter how
//! many edges meet there.
//!
//! Zero-length edges fail fast: they mean the producer handed over
//! un-fused geometry, and parity counting over them is meaningless.

use brep_lite_topology::{LoopBoundary, LoopOrientation, LoopUseKey, MeshArena};
use nalgebra::Point2;
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::predicates::point_on_segment;
use crate::project::FaceProjection;
use crate::tolerance::Tolerance;

/// Where a point (or loop) sits relative to a loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Inside,
    Outside,
    /// On the boundary, or sharing it (for loop-vs-loop queries).
    OnBoundary,
}

/// Classifies a 2D point against one loop of the projected face.
pub fn classify_point_in_loop(
    arena: &MeshArena,
    proj: &FaceProjection,
    pt: &Point2<f64>,
    lu: LoopUseKey,
    tol: &Tolerance,
) -> Result<Classification> {
    let mut crossings = 0u32;

    for eu in arena.loop_edge_uses(lu) {
        let data = arena
            .edge_use(eu)
            .ok_or(brep_lite_topology::Error::EdgeUseNotFound(eu))?;
        let next = arena
            .edge_use(data.next)
            .ok_or(brep_lite_topology::Error::EdgeUseNotFound(data.next))?;
        let a = proj.coord(data.vu)?;
        let b = proj.coord(next.vu)?;

        if (a - b).norm() <= tol.dist {
            return Err(Error::ZeroLengthEdge { edge_use: eu });
        }
        if point_on_segment(pt, &a, &b, tol.dist) {
            return Ok(Classification::OnBoundary);
        }

        // Half-open crossing rule: count when exactly one endpoint is
        // strictly above the ray.
        if (a.y > pt.y) != (b.y > pt.y) {
            let t = (pt.y - a.y) / (b.y - a.y);
            let xi = a.x + t * (b.x - a.x);
            if xi > pt.x {
                crossings += 1;
            }
        }
    }

    if crossings % 2 == 1 {
        Ok(Classification::Inside)
    } else {
        Ok(Classification::Outside)
    }
}

/// Classifies every vertex of `inner` against `outer`.
///
/// The first vertex strictly inside or outside decides; a loop whose every
/// vertex sits on the boundary is `OnBoundary` (shared geometry).
pub fn classify_loop_in_loop(
    arena: &MeshArena,
    proj: &FaceProjection,
    inner: LoopUseKey,
    outer: LoopUseKey,
    tol: &Tolerance,
) -> Result<Classification> {
    for vu in arena.loop_vertex_uses(inner) {
        let pt = proj.coord(vu)?;
        match classify_point_in_loop(arena, proj, &pt, outer, tol)? {
            Classification::OnBoundary => continue,
            decided => return Ok(decided),
        }
    }
    Ok(Classification::OnBoundary)
}

/// Signed area of a loop in the projected plane (shoelace formula):
/// positive when the loop winds counterclockwise.
pub fn loop_area_2d(
    arena: &MeshArena,
    proj: &FaceProjection,
    lu: LoopUseKey,
) -> Result<f64> {
    let vus = arena.loop_vertex_uses(lu);
    if vus.len() < 3 {
        return Ok(0.0);
    }
    let mut sum = 0.0;
    for i in 0..vus.len() {
        let a = proj.coord(vus[i])?;
        let b = proj.coord(vus[(i + 1) % vus.len()])?;
        sum += a.x * b.y - b.x * a.y;
    }
    Ok(sum / 2.0)
}

/// For every hole loop of the face use, the non-hole loops containing it,
/// innermost first (smallest enclosing area). This is the nesting tree
/// flattened to what hole removal needs: outer loop, its holes, holes'
/// islands, and so on.
pub fn build_nesting(
    arena: &MeshArena,
    proj: &FaceProjection,
    fu: brep_lite_topology::FaceUseKey,
    tol: &Tolerance,
) -> Result<FxHashMap<LoopUseKey, Vec<LoopUseKey>>> {
    let loops = arena.face_use_loops(fu);
    let mut nesting = FxHashMap::default();

    for &hole in &loops {
        let hole_data = arena
            .loop_use(hole)
            .ok_or(brep_lite_topology::Error::LoopUseNotFound(hole))?;
        if hole_data.orientation != LoopOrientation::Hole {
            continue;
        }
        if matches!(hole_data.boundary, LoopBoundary::Point(_)) {
            continue;
        }

        let mut enclosing: Vec<(LoopUseKey, f64)> = Vec::new();
        for &outer in &loops {
            if outer == hole {
                continue;
            }
            let outer_data = arena
                .loop_use(outer)
                .ok_or(brep_lite_topology::Error::LoopUseNotFound(outer))?;
            if outer_data.orientation == LoopOrientation::Hole {
                continue;
            }
            if matches!(outer_data.boundary, LoopBoundary::Point(_)) {
                continue;
            }
            if classify_loop_in_loop(arena, proj, hole, outer, tol)? == Classification::Inside {
                let area = loop_area_2d(arena, proj, outer)?.abs();
                enclosing.push((outer, area));
            }
        }
        enclosing.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        nesting.insert(hole, enclosing.into_iter().map(|(lu, _)| lu).collect());
    }

    Ok(nesting)
}

#[cfg(test)]
mod tests {
    use super::*;
    use brep_lite_topology::{make_face, make_face_with_holes};

    fn square_face(arena: &mut MeshArena) -> brep_lite_topology::FaceUseKey {
        let v = [
            arena.add_vertex(0.0, 0.0, 0.0),
            arena.add_vertex(4.0, 0.0, 0.0),
            arena.add_vertex(4.0, 4.0, 0.0),
            arena.add_vertex(0.0, 4.0, 0.0),
        ];
        make_face(arena, &v).unwrap()
    }

    #[test]
    fn point_classification() {
        let mut arena = MeshArena::new();
        let fu = square_face(&mut arena);
        let tol = Tolerance::default();
        let proj = FaceProjection::build(&arena, fu, &tol).unwrap();
        let lu = arena.face_use(fu).unwrap().loops[0];

        let class = |x, y| {
            classify_point_in_loop(&arena, &proj, &Point2::new(x, y), lu, &tol).unwrap()
        };
        assert_eq!(class(2.0, 2.0), Classification::Inside);
        assert_eq!(class(5.0, 2.0), Classification::Outside);
        assert_eq!(class(-1.0, 2.0), Classification::Outside);
        assert_eq!(class(4.0, 2.0), Classification::OnBoundary);
        assert_eq!(class(0.0, 0.0), Classification::OnBoundary);
    }

    #[test]
    fn ray_through_vertex_counts_once() {
        let mut arena = MeshArena::new();
        // Diamond: the +x ray from the center passes exactly through the
        // right corner vertex.
        let v = [
            arena.add_vertex(0.0, -2.0, 0.0),
            arena.add_vertex(2.0, 0.0, 0.0),
            arena.add_vertex(0.0, 2.0, 0.0),
            arena.add_vertex(-2.0, 0.0, 0.0),
        ];
        let fu = make_face(&mut arena, &v).unwrap();
        let tol = Tolerance::default();
        let proj = FaceProjection::build(&arena, fu, &tol).unwrap();
        let lu = arena.face_use(fu).unwrap().loops[0];

        let class = classify_point_in_loop(&arena, &proj, &Point2::new(0.0, 0.0), lu, &tol)
            .unwrap();
        assert_eq!(class, Classification::Inside);

        // Outside point level with the same vertex.
        let class = classify_point_in_loop(&arena, &proj, &Point2::new(-5.0, 0.0), lu, &tol)
            .unwrap();
        assert_eq!(class, Classification::Outside);
    }

    #[test]
    fn loop_in_loop() {
        let mut arena = MeshArena::new();
        let v = [
            arena.add_vertex(0.0, 0.0, 0.0),
            arena.add_vertex(4.0, 0.0, 0.0),
            arena.add_vertex(4.0, 4.0, 0.0),
            arena.add_vertex(0.0, 4.0, 0.0),
        ];
        let h = vec![
            arena.add_vertex(1.0, 1.0, 0.0),
            arena.add_vertex(1.0, 3.0, 0.0),
            arena.add_vertex(3.0, 3.0, 0.0),
            arena.add_vertex(3.0, 1.0, 0.0),
        ];
        let fu = make_face_with_holes(&mut arena, &v, &[h]).unwrap();
        let tol = Tolerance::default();
        let proj = FaceProjection::build(&arena, fu, &tol).unwrap();
        let loops = arena.face_use(fu).unwrap().loops.clone();

        assert_eq!(
            classify_loop_in_loop(&arena, &proj, loops[1], loops[0], &tol).unwrap(),
            Classification::Inside
        );
        assert_eq!(
            classify_loop_in_loop(&arena, &proj, loops[0], loops[1], &tol).unwrap(),
            Classification::Outside
        );
    }

    #[test]
    fn nesting_finds_enclosing_outer() {
        let mut arena = MeshArena::new();
        let v = [
            arena.add_vertex(0.0, 0.0, 0.0),
            arena.add_vertex(4.0, 0.0, 0.0),
            arena.add_vertex(4.0, 4.0, 0.0),
            arena.add_vertex(0.0, 4.0, 0.0),
        ];
        let h = vec![
            arena.add_vertex(1.0, 1.0, 0.0),
            arena.add_vertex(1.0, 3.0, 0.0),
            arena.add_vertex(3.0, 3.0, 0.0),
            arena.add_vertex(3.0, 1.0, 0.0),
        ];
        let fu = make_face_with_holes(&mut arena, &v, &[h]).unwrap();
        let tol = Tolerance::default();
        let proj = FaceProjection::build(&arena, fu, &tol).unwrap();
        let loops = arena.face_use(fu).unwrap().loops.clone();

        let nesting = build_nesting(&arena, &proj, fu, &tol).unwrap();
        assert_eq!(nesting.len(), 1);
        assert_eq!(nesting[&loops[1]], vec![loops[0]]);
    }

    #[test]
    fn signed_area_orientation() {
        let mut arena = MeshArena::new();
        let fu = square_face(&mut arena);
        let tol = Tolerance::default();
        let proj = FaceProjection::build(&arena, fu, &tol).unwrap();
        let lu = arena.face_use(fu).unwrap().loops[0];

        let area = loop_area_2d(&arena, &proj, lu).unwrap();
        assert!((area - 16.0).abs() < 1e-9);
    }
}
