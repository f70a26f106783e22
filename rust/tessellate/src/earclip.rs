// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The ear-clipping decomposer.
//!
//! Precondition: a simple, hole-free loop with outer orientation, fully
//! projected. Each pass starts the walk at the loop's scan-line maximum
//! and tests each (previous, current, next) triple for admissibility:
//!
//! 1. the turn at `current` must not be reflex — angles of exactly 0 and π
//!    are admitted, so deliberate zero-area cuts clip cleanly;
//! 2. no other vertex of the loop may lie strictly inside the candidate
//!    triangle;
//! 3. the chord (previous, next) must not pass exactly through any other
//!    loop vertex.
//!
//! An admissible ear is detached with the cut primitive, shrinking the
//! remainder by one vertex, so an n-vertex loop needs at most n − 2 cuts.
//! Each admissibility scan is O(n), O(n²) per loop overall; the iteration
//! budget is proportional to n² and trips only if an admissibility bug
//! makes the search spin.

use brep_lite_topology::{EdgeUseKey, LoopUseKey, VertexUseKey};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::accordion::remove_accordions;
use crate::context::TriContext;
use crate::cutjoin::cut;
use crate::error::{Error, Result};
use crate::predicates::{point_in_triangle_strict, point_on_segment, turn_cross, NEAR_EPS};

/// Budget slack per squared input vertex count.
pub(crate) const EAR_BUDGET_FACTOR: usize = 8;

/// Clips one loop down to triangles. Returns the loops detached along the
/// way (the remainder, itself a triangle by then, stays under its own key
/// and is not listed).
pub fn clip_loop(
    ctx: &mut TriContext<'_>,
    lu: LoopUseKey,
) -> Result<SmallVec<[LoopUseKey; 8]>> {
    let mut detached: SmallVec<[LoopUseKey; 8]> = SmallVec::new();

    let n0 = ctx.arena.loop_edge_count(lu);
    let budget = EAR_BUDGET_FACTOR * n0 * n0 + 64;
    let mut spent = 0usize;

    debug!(?lu, vertices = n0, "ear-clipping loop");

    'clip: while ctx.arena.loop_use(lu).is_some() && ctx.arena.loop_edge_count(lu) > 3 {
        let n = ctx.arena.loop_edge_count(lu);
        let start = ctx.proj.scan_max_of_loop(ctx.arena, lu)?;

        let mut cur = start;
        for _ in 0..n {
            spent += 1;
            if spent > budget {
                return Err(Error::EarBudgetExceeded {
                    loop_use: lu,
                    budget,
                });
            }

            if let Some((p_prev, p_next)) = admissible_ear(ctx, lu, cur)? {
                let out = cut(ctx, p_prev, p_next)?;
                if let Some(tri) = out.detached {
                    trace!(?lu, ear = ?tri, "detached ear");
                    detached.push(tri);
                }
                continue 'clip;
            }
            cur = ctx
                .arena
                .edge_use(cur)
                .ok_or(brep_lite_topology::Error::EdgeUseNotFound(cur))?
                .next;
        }

        // No ear in a full walk: only residual degeneracy can cause that
        // on simple input. Strip accordions and retry; a loop that sheds
        // nothing here means the admissibility tests are stuck.
        let before = ctx.arena.loop_edge_count(lu);
        if !remove_accordions(ctx, lu)? {
            break;
        }
        if ctx.arena.loop_edge_count(lu) == before {
            return Err(Error::EarBudgetExceeded {
                loop_use: lu,
                budget,
            });
        }
    }

    Ok(detached)
}

/// Tests the ear at `cur`'s start vertex. Returns the chord endpoints
/// (previous and next vertex uses) when the ear is admissible.
fn admissible_ear(
    ctx: &TriContext<'_>,
    lu: LoopUseKey,
    cur: EdgeUseKey,
) -> Result<Option<(VertexUseKey, VertexUseKey)>> {
    let arena = &*ctx.arena;
    let cur_data = arena
        .edge_use(cur)
        .ok_or(brep_lite_topology::Error::EdgeUseNotFound(cur))?;
    let prev_eu = cur_data.prev;
    let next_eu = cur_data.next;
    let prev_data = arena
        .edge_use(prev_eu)
        .ok_or(brep_lite_topology::Error::EdgeUseNotFound(prev_eu))?;
    let next_data = arena
        .edge_use(next_eu)
        .ok_or(brep_lite_topology::Error::EdgeUseNotFound(next_eu))?;

    let a = ctx.proj.coord(prev_data.vu)?;
    let b = ctx.proj.coord(cur_data.vu)?;
    let c = ctx.proj.coord(next_data.vu)?;

    // Reflex turns are inadmissible; 0 and π are allowed.
    if turn_cross(&a, &b, &c) < -NEAR_EPS {
        return Ok(None);
    }

    // No other loop vertex strictly inside the candidate triangle, and
    // none exactly on the chord. "Other" is by vertex, not vertex use: a
    // loop that passes through a corner vertex twice (keyhole bridges)
    // anchors the chord there rather than blocking it.
    let corner = |eu_vu| -> Result<brep_lite_topology::VertexKey> {
        Ok(arena
            .vertex_use(eu_vu)
            .ok_or(brep_lite_topology::Error::VertexUseNotFound(eu_vu))?
            .vertex)
    };
    let skip = [
        corner(prev_data.vu)?,
        corner(cur_data.vu)?,
        corner(next_data.vu)?,
    ];
    for vu in arena.loop_vertex_uses(lu) {
        let vk = arena
            .vertex_use(vu)
            .ok_or(brep_lite_topology::Error::VertexUseNotFound(vu))?
            .vertex;
        if skip.contains(&vk) {
            continue;
        }
        let p = ctx.proj.coord(vu)?;
        if point_in_triangle_strict(&p, &a, &b, &c) {
            return Ok(None);
        }
        if point_on_segment(&p, &a, &c, ctx.tol.dist) {
            return Ok(None);
        }
    }

    Ok(Some((prev_data.vu, next_data.vu)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use brep_lite_topology::{check::verify_face_use, make_face, MeshArena};
    use crate::classify::loop_area_2d;
    use crate::project::FaceProjection;
    use crate::tolerance::Tolerance;

    fn clip_polygon(points: &[(f64, f64)]) -> (MeshArena, brep_lite_topology::FaceUseKey) {
        let mut arena = MeshArena::new();
        let verts: Vec<_> = points
            .iter()
            .map(|&(x, y)| arena.add_vertex(x, y, 0.0))
            .collect();
        let fu = make_face(&mut arena, &verts).unwrap();

        let tol = Tolerance::default();
        let proj = FaceProjection::build(&arena, fu, &tol).unwrap();
        let normal = arena.face(arena.face_use(fu).unwrap().face).unwrap().normal;
        let lu = arena.face_use(fu).unwrap().loops[0];
        let mut ctx = TriContext {
            arena: &mut arena,
            fu,
            normal,
            proj,
            tol,
        };
        clip_loop(&mut ctx, lu).unwrap();
        verify_face_use(&arena, fu).unwrap();
        (arena, fu)
    }

    fn total_area(arena: &MeshArena, fu: brep_lite_topology::FaceUseKey) -> f64 {
        let tol = Tolerance::default();
        let proj = FaceProjection::build(arena, fu, &tol).unwrap();
        arena
            .face_use_loops(fu)
            .into_iter()
            .map(|lu| loop_area_2d(arena, &proj, lu).unwrap().abs())
            .sum()
    }

    #[test]
    fn convex_pentagon_yields_three_triangles() {
        let (arena, fu) = clip_polygon(&[
            (0.0, 0.0),
            (4.0, 0.0),
            (5.0, 3.0),
            (2.0, 5.0),
            (-1.0, 3.0),
        ]);

        let loops = arena.face_use_loops(fu);
        assert_eq!(loops.len(), 3);
        for lu in &loops {
            assert_eq!(arena.loop_edge_count(*lu), 3);
        }
    }

    #[test]
    fn reflex_pentagon_avoids_notch() {
        // Concave pentagon with a notch at (2, 1).
        let (arena, fu) = clip_polygon(&[
            (0.0, 0.0),
            (4.0, 0.0),
            (4.0, 4.0),
            (2.0, 1.0),
            (0.0, 4.0),
        ]);

        let loops = arena.face_use_loops(fu);
        assert_eq!(loops.len(), 3);
        // Area is conserved: the two wings without the notch interior.
        let expected = {
            // Shoelace over the input polygon.
            let pts = [
                (0.0, 0.0),
                (4.0, 0.0),
                (4.0, 4.0),
                (2.0, 1.0),
                (0.0, 4.0),
            ];
            let mut s: f64 = 0.0;
            for i in 0..pts.len() {
                let (x0, y0) = pts[i];
                let (x1, y1) = pts[(i + 1) % pts.len()];
                s += x0 * y1 - x1 * y0;
            }
            s.abs() / 2.0
        };
        assert_relative_eq!(total_area(&arena, fu), expected, epsilon = 1e-9);
    }

    #[test]
    fn square_clips_once() {
        let (arena, fu) = clip_polygon(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let loops = arena.face_use_loops(fu);
        assert_eq!(loops.len(), 2);
        assert_relative_eq!(total_area(&arena, fu), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn collinear_run_is_clippable() {
        // Midpoint on the bottom edge: chords through it are rejected but
        // the surrounding ears still reduce the loop to triangles.
        let (arena, fu) = clip_polygon(&[
            (0.0, 0.0),
            (2.0, 0.0),
            (4.0, 0.0),
            (4.0, 4.0),
            (0.0, 4.0),
        ]);
        let loops = arena.face_use_loops(fu);
        assert_eq!(loops.len(), 3);
        assert_relative_eq!(total_area(&arena, fu), 16.0, epsilon = 1e-9);
    }
}
