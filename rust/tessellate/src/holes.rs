// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hole removal: merging hole loops into outer loops.
//!
//! Two strategies, tried in order for each hole:
//! 1. a vertex shared with a non-hole loop of the face → splice the two
//!    loops directly through it;
//! 2. otherwise an exhaustive search for a diagonal from a hole vertex to
//!    an outer-loop vertex whose open segment crosses no edge of any loop
//!    of the face → join across a keyhole bridge.
//!
//! Candidate outer loops are tried innermost-enclosing first (the nesting
//! tree from the classifier), which keeps island-in-hole-in-face inputs
//! from wasting candidates on unreachable outers. A hole that survives
//! both strategies against every candidate pair is an input-geometry
//! defect, not an algorithm bug, and is reported as such.

use brep_lite_topology::{
    EdgeUseKey, LoopBoundary, LoopOrientation, LoopUseKey, MeshArena, VertexKey,
};
use nalgebra::Point2;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::classify::build_nesting;
use crate::context::TriContext;
use crate::cutjoin::join;
use crate::error::{Error, Result};
use crate::predicates::diagonal_blocked;

/// Merges every hole loop of the face use into a non-hole loop. After a
/// successful return the face use has no hole loops left.
pub fn remove_holes(ctx: &mut TriContext<'_>) -> Result<()> {
    loop {
        let Some(hole) = first_hole(ctx.arena, ctx.fu) else {
            return Ok(());
        };

        // Strategy 1: a vertex shared with any non-hole loop.
        if let Some((eu_outer, eu_hole)) = shared_vertex_join(ctx, hole)? {
            debug!(?hole, "removing hole through shared vertex");
            ctx.arena.merge_loops_at_vertex(eu_outer, eu_hole)?;
            continue;
        }

        // Strategy 2: a non-crossing diagonal to an outer-loop vertex.
        if let Some((vu_outer, vu_hole)) = find_diagonal(ctx, hole)? {
            debug!(?hole, "removing hole across synthesized diagonal");
            join(ctx, vu_outer, vu_hole)?;
            continue;
        }

        return Err(Error::NoFeasibleDiagonal { hole });
    }
}

/// Next hole worth removing. Degenerate holes (under 3 edges or distinct
/// vertices) are left for the pruner rather than joined.
fn first_hole(arena: &MeshArena, fu: brep_lite_topology::FaceUseKey) -> Option<LoopUseKey> {
    arena.face_use_loops(fu).into_iter().find(|&lu| {
        arena
            .loop_use(lu)
            .map(|d| {
                d.orientation == LoopOrientation::Hole
                    && matches!(d.boundary, LoopBoundary::Edges(_))
                    && arena.loop_edge_count(lu) >= 3
                    && arena.distinct_vertex_count(lu) >= 3
            })
            .unwrap_or(false)
    })
}

/// Looks for a vertex shared between the hole and a non-hole loop;
/// returns the edge uses starting at it in (outer, hole) order.
fn shared_vertex_join(
    ctx: &TriContext<'_>,
    hole: LoopUseKey,
) -> Result<Option<(EdgeUseKey, EdgeUseKey)>> {
    let arena = &*ctx.arena;
    for lu in arena.face_use_loops(ctx.fu) {
        if lu == hole {
            continue;
        }
        let Some(data) = arena.loop_use(lu) else {
            continue;
        };
        if data.orientation == LoopOrientation::Hole
            || matches!(data.boundary, LoopBoundary::Point(_))
        {
            continue;
        }
        if let Some(v) = arena.shared_vertex(lu, hole) {
            let eu_outer = edge_use_starting_at(arena, lu, v);
            let eu_hole = edge_use_starting_at(arena, hole, v);
            if let (Some(a), Some(b)) = (eu_outer, eu_hole) {
                return Ok(Some((a, b)));
            }
        }
    }
    Ok(None)
}

fn edge_use_starting_at(
    arena: &MeshArena,
    lu: LoopUseKey,
    v: VertexKey,
) -> Option<EdgeUseKey> {
    arena.loop_edge_uses(lu).find(|&eu| {
        arena
            .edge_use(eu)
            .and_then(|d| arena.vertex_use(d.vu))
            .map(|vu| vu.vertex == v)
            .unwrap_or(false)
    })
}

/// Exhaustive diagonal search: every (hole vertex, outer vertex) pair,
/// with candidate outers ordered innermost-enclosing first, tested against
/// every edge of every loop of the face.
fn find_diagonal(
    ctx: &TriContext<'_>,
    hole: LoopUseKey,
) -> Result<Option<(brep_lite_topology::VertexUseKey, brep_lite_topology::VertexUseKey)>> {
    let arena = &*ctx.arena;

    let nesting = build_nesting(arena, &ctx.proj, ctx.fu, &ctx.tol)?;
    let mut candidates: Vec<LoopUseKey> = nesting.get(&hole).cloned().unwrap_or_default();
    // Fall back to every non-hole loop when nesting found no container
    // (the hole may touch its outer's boundary).
    for lu in arena.face_use_loops(ctx.fu) {
        let Some(data) = arena.loop_use(lu) else {
            continue;
        };
        if lu != hole
            && data.orientation != LoopOrientation::Hole
            && matches!(data.boundary, LoopBoundary::Edges(_))
            && !candidates.contains(&lu)
        {
            candidates.push(lu);
        }
    }

    // Snapshot every edge of every loop once.
    let mut edges: Vec<(Point2<f64>, Point2<f64>)> = Vec::new();
    for lu in arena.face_use_loops(ctx.fu) {
        for eu in arena.loop_edge_uses(lu) {
            let data = arena
                .edge_use(eu)
                .ok_or(brep_lite_topology::Error::EdgeUseNotFound(eu))?;
            let next = arena
                .edge_use(data.next)
                .ok_or(brep_lite_topology::Error::EdgeUseNotFound(data.next))?;
            edges.push((ctx.proj.coord(data.vu)?, ctx.proj.coord(next.vu)?));
        }
    }

    let hole_vus: SmallVec<[_; 16]> = arena.loop_vertex_uses(hole).into();
    for outer in candidates {
        for outer_vu in arena.loop_vertex_uses(outer) {
            let op = ctx.proj.coord(outer_vu)?;
            for &hole_vu in &hole_vus {
                let hp = ctx.proj.coord(hole_vu)?;
                let blocked = edges
                    .iter()
                    .any(|(e1, e2)| diagonal_blocked(&hp, &op, e1, e2, ctx.tol.dist));
                if !blocked {
                    trace!(?hole, ?outer, "found non-crossing diagonal");
                    return Ok(Some((outer_vu, hole_vu)));
                }
            }
        }
    }
    Ok(None)
}
