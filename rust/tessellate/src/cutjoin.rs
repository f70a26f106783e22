// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The cut and join primitives.
//!
//! `cut` splits one loop along a chord between two vertex uses; `join`
//! merges two loops of the same face use through two points. Both leave the
//! projection table fully consistent before returning: vertex uses created
//! by the underlying surgery are projected immediately (with exact
//! per-vertex coordinate reuse), and per-vertex shading normals propagate
//! inside the surgery layer.
//!
//! Because a vertex may carry several vertex uses at a cut point, `cut`
//! re-resolves its endpoints when the handed-in uses no longer sit in one
//! loop of the face: among the vertex's uses it picks the edge use whose
//! surrounding edges (next and previous) best align with the chord
//! direction. If the best candidates still land in two different loops,
//! the cut degenerates into a join and is delegated accordingly.

use brep_lite_topology::{EdgeUseKey, LoopUseKey, MeshArena, VertexUseKey, VertexUseOwner};
use nalgebra::Vector2;
use tracing::trace;

use crate::context::TriContext;
use crate::error::{Error, Result};

/// Result of a [`cut`].
#[derive(Debug, Clone)]
pub struct CutOutcome {
    /// The loop detached by the chord; `None` when the endpoints resolved
    /// into two loops and the cut delegated to [`join`].
    pub detached: Option<LoopUseKey>,
    /// The loop holding the remainder (or the merged loop on the join
    /// fallback path).
    pub remainder: LoopUseKey,
}

/// Splits the loop containing `p1` and `p2` along the chord between them.
pub fn cut(ctx: &mut TriContext<'_>, p1: VertexUseKey, p2: VertexUseKey) -> Result<CutOutcome> {
    let eu1 = resolve_endpoint(ctx, p1, p2)?;
    let eu2 = resolve_endpoint(ctx, p2, p1)?;
    if eu1 == eu2 {
        return Err(Error::CutDisambiguation { p1, p2 });
    }

    let lu1 = parent_loop(ctx.arena, eu1)?;
    let lu2 = parent_loop(ctx.arena, eu2)?;

    if lu1 != lu2 {
        // Disambiguation resolved the endpoints into two loops: the chord
        // is really a junction between them.
        trace!(?p1, ?p2, "cut endpoints landed in two loops, delegating to join");
        let merged = join_edge_uses(ctx, eu1, eu2)?;
        return Ok(CutOutcome {
            detached: None,
            remainder: merged,
        });
    }

    let split = ctx.arena.split_loop(eu1, eu2)?;
    for vu in split.new_vertex_uses {
        ctx.proj.insert_use(ctx.arena, vu)?;
    }
    trace!(?lu1, new_loop = ?split.new_loop, "cut detached loop");
    Ok(CutOutcome {
        detached: Some(split.new_loop),
        remainder: lu1,
    })
}

/// Merges the two loops containing `p1` and `p2` into one loop through the
/// two points: a direct splice when they reference the same vertex, a
/// keyhole bridge otherwise.
pub fn join(ctx: &mut TriContext<'_>, p1: VertexUseKey, p2: VertexUseKey) -> Result<LoopUseKey> {
    let eu1 = resolve_endpoint(ctx, p1, p2)?;
    let eu2 = resolve_endpoint(ctx, p2, p1)?;
    join_edge_uses(ctx, eu1, eu2)
}

/// Join on already-resolved edge uses (each standing for its start vertex).
fn join_edge_uses(
    ctx: &mut TriContext<'_>,
    eu1: EdgeUseKey,
    eu2: EdgeUseKey,
) -> Result<LoopUseKey> {
    let v1 = start_vertex(ctx.arena, eu1)?;
    let v2 = start_vertex(ctx.arena, eu2)?;

    if v1 == v2 {
        let merged = ctx.arena.merge_loops_at_vertex(eu1, eu2)?;
        trace!(?merged, "joined loops at shared vertex");
        Ok(merged)
    } else {
        let bridge = ctx.arena.bridge_loops(eu1, eu2)?;
        for vu in bridge.new_vertex_uses {
            ctx.proj.insert_use(ctx.arena, vu)?;
        }
        trace!(merged = ?bridge.merged_loop, "joined loops across bridge edge");
        Ok(bridge.merged_loop)
    }
}

/// Resolves a cut endpoint to an edge use of this face use starting at the
/// endpoint's vertex.
///
/// The handed-in vertex use wins when it is still an edge-use start inside
/// this face use. Otherwise every use of the vertex is scored by how well
/// its outgoing (next) and incoming (previous) edge directions align with
/// the chord toward `other`, and the best-aligned edge use is chosen.
fn resolve_endpoint(
    ctx: &TriContext<'_>,
    vu: VertexUseKey,
    other: VertexUseKey,
) -> Result<EdgeUseKey> {
    let arena = &*ctx.arena;

    // Fast path: the given use is already a live edge-use start here.
    if let Some(eu) = owning_edge_use(arena, vu) {
        if parent_face_use(arena, eu).as_ref() == Some(&ctx.fu) {
            return Ok(eu);
        }
    }

    let v = arena
        .vertex_use(vu)
        .ok_or(Error::CutDisambiguation { p1: vu, p2: other })?
        .vertex;
    let v_other = arena
        .vertex_use(other)
        .ok_or(Error::CutDisambiguation { p1: vu, p2: other })?
        .vertex;

    let from = ctx
        .proj
        .vertex_coord(v)
        .ok_or(Error::CutDisambiguation { p1: vu, p2: other })?;
    let to = ctx
        .proj
        .vertex_coord(v_other)
        .ok_or(Error::CutDisambiguation { p1: vu, p2: other })?;
    let chord: Vector2<f64> = to - from;
    let chord_len = chord.norm();
    // Zero-length chords carry no direction; any use of the vertex in this
    // face will do.
    let chord_dir = if chord_len > 0.0 { chord / chord_len } else { chord };

    let mut best: Option<(EdgeUseKey, f64)> = None;
    for candidate_vu in arena.vertex_uses_of(v) {
        let Some(eu) = owning_edge_use(arena, candidate_vu) else {
            continue;
        };
        if parent_face_use(arena, eu).as_ref() != Some(&ctx.fu) {
            continue;
        }

        let score = alignment_score(ctx, eu, &chord_dir)?;
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((eu, score));
        }
    }

    best.map(|(eu, _)| eu)
        .ok_or(Error::CutDisambiguation { p1: vu, p2: other })
}

/// Best alignment of the chord direction with the edge leaving the vertex
/// (next) or arriving at it (previous), both taken pointing away from the
/// vertex.
fn alignment_score(
    ctx: &TriContext<'_>,
    eu: EdgeUseKey,
    chord_dir: &Vector2<f64>,
) -> Result<f64> {
    let arena = &*ctx.arena;
    let data = arena
        .edge_use(eu)
        .ok_or(brep_lite_topology::Error::EdgeUseNotFound(eu))?;
    let here = ctx.proj.coord(data.vu)?;

    let out_end = ctx.start_coord(data.next)?;
    let in_start = ctx.start_coord(data.prev)?;

    let mut score = f64::NEG_INFINITY;
    for target in [out_end, in_start] {
        let d: Vector2<f64> = target - here;
        let len = d.norm();
        if len > 0.0 {
            score = score.max((d / len).dot(chord_dir));
        }
    }
    Ok(score)
}

fn owning_edge_use(arena: &MeshArena, vu: VertexUseKey) -> Option<EdgeUseKey> {
    match arena.vertex_use(vu)?.owner {
        VertexUseOwner::Edge(eu) => arena.edge_use(eu).map(|_| eu),
        VertexUseOwner::Loop(_) => None,
    }
}

fn parent_loop(arena: &MeshArena, eu: EdgeUseKey) -> Result<LoopUseKey> {
    Ok(arena
        .edge_use(eu)
        .ok_or(brep_lite_topology::Error::EdgeUseNotFound(eu))?
        .parent)
}

fn parent_face_use(
    arena: &MeshArena,
    eu: EdgeUseKey,
) -> Option<brep_lite_topology::FaceUseKey> {
    let lu = arena.edge_use(eu)?.parent;
    Some(arena.loop_use(lu)?.parent)
}

fn start_vertex(arena: &MeshArena, eu: EdgeUseKey) -> Result<brep_lite_topology::VertexKey> {
    let vu = arena
        .edge_use(eu)
        .ok_or(brep_lite_topology::Error::EdgeUseNotFound(eu))?
        .vu;
    Ok(arena
        .vertex_use(vu)
        .ok_or(brep_lite_topology::Error::VertexUseNotFound(vu))?
        .vertex)
}
