// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The per-face triangulation state machine and the mesh-wide entry point.
//!
//! Per face use the stages run:
//!
//! ```text
//! NeedsCheck → HoleRemoval (if holes) → DegeneratePrune → EarClip
//!            → FinalPrune → OrientNormalize → Done | Empty
//! ```
//!
//! `Empty` is the terminal state for a face whose loops all pruned away;
//! the face-use pair is discarded. A face that is already triangulated
//! (every loop a correctly wound 3-vertex outer loop) returns before the
//! projection table is even allocated.
//!
//! Mesh-wide, faces are processed strictly serially: they share vertices
//! and edges of one arena, and the half-edge invariants do not allow
//! interleaved mutation. Input-geometry failures are collected per face
//! and reported together after the rest of the mesh has been processed;
//! invariant and consistency failures abort the whole call.

use brep_lite_topology::{
    check::verify_face_use, FaceUseKey, LoopBoundary, LoopOrientation, MeshArena,
};
use nalgebra::Vector3;
use tracing::{debug, warn};

use crate::context::TriContext;
use crate::earclip::clip_loop;
use crate::error::{Error, FaceFailure, Result};
use crate::holes::remove_holes;
use crate::orient::normalize_orientation;
use crate::project::FaceProjection;
use crate::prune::prune_degenerate_loops;
use crate::tolerance::Tolerance;

/// Pipeline stage of one face triangulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    NeedsCheck,
    HoleRemoval,
    DegeneratePrune,
    EarClip,
    FinalPrune,
    OrientNormalize,
    Done,
    Empty,
}

/// How one face use left the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceOutcome {
    /// Every surviving loop is a canonical 3-vertex triangle.
    Triangulated,
    /// No valid loop survived; the face-use pair was discarded.
    Empty,
}

/// Triangulates every face of the mesh, strictly serially.
///
/// Faces failing with input-geometry errors are skipped and reported
/// together as [`Error::FacesFailed`] once the rest of the mesh has been
/// processed; algorithm-invariant and topology-consistency errors abort
/// immediately.
pub fn triangulate(arena: &mut MeshArena, tol: &Tolerance) -> Result<()> {
    let face_uses: Vec<FaceUseKey> = arena.forward_face_uses().collect();
    let mut failures: Vec<FaceFailure> = Vec::new();

    for fu in face_uses {
        if arena.face_use(fu).is_none() {
            continue;
        }
        match triangulate_face_use(arena, fu, tol) {
            Ok(FaceOutcome::Triangulated) => {}
            Ok(FaceOutcome::Empty) => {
                warn!(?fu, "face pruned to nothing during triangulation");
                failures.push(FaceFailure {
                    face_use: fu,
                    error: Error::FaceEmptied { face_use: fu },
                });
            }
            Err(e) if e.is_input_geometry() => {
                warn!(?fu, error = %e, "skipping face with defective input geometry");
                failures.push(FaceFailure { face_use: fu, error: e });
            }
            Err(e) => return Err(e),
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(Error::FacesFailed(failures))
    }
}

/// Triangulates one face use.
pub fn triangulate_face_use(
    arena: &mut MeshArena,
    fu: FaceUseKey,
    tol: &Tolerance,
) -> Result<FaceOutcome> {
    let fu_data = arena.face_use(fu).ok_or(Error::FaceUseNotFound(fu))?;
    let face = arena
        .face(fu_data.face)
        .ok_or(Error::FaceUseNotFound(fu))?;
    let mut normal = face.normal;
    if fu_data.side == brep_lite_topology::FaceSide::Backward {
        normal = -normal;
    }
    let len = normal.norm();
    if !len.is_finite() || len < 1e-12 {
        return Err(Error::DegenerateNormal { face_use: fu });
    }
    let normal = normal / len;

    // Idempotence: an already-triangulated face returns without paying for
    // a projection table.
    if already_triangulated(arena, fu, &normal) {
        debug!(?fu, "face already triangulated");
        return Ok(FaceOutcome::Triangulated);
    }

    check_edge_lengths(arena, fu, tol)?;

    let proj = FaceProjection::build(arena, fu, tol)?;
    let mut ctx = TriContext {
        arena,
        fu,
        normal,
        proj,
        tol: *tol,
    };

    let mut stage = Stage::NeedsCheck;
    loop {
        debug!(?fu, ?stage, "triangulation stage");
        stage = match stage {
            Stage::NeedsCheck => {
                if has_hole_loops(ctx.arena, fu) {
                    Stage::HoleRemoval
                } else {
                    Stage::DegeneratePrune
                }
            }
            Stage::HoleRemoval => {
                remove_holes(&mut ctx)?;
                Stage::DegeneratePrune
            }
            Stage::DegeneratePrune => {
                if prune_degenerate_loops(&mut ctx)? {
                    Stage::Empty
                } else {
                    Stage::EarClip
                }
            }
            Stage::EarClip => {
                while let Some(lu) = next_clippable_loop(ctx.arena, fu) {
                    clip_loop(&mut ctx, lu)?;
                }
                Stage::FinalPrune
            }
            Stage::FinalPrune => {
                if prune_degenerate_loops(&mut ctx)? {
                    Stage::Empty
                } else {
                    Stage::OrientNormalize
                }
            }
            Stage::OrientNormalize => {
                normalize_orientation(&mut ctx)?;
                if ctx.arena.face_use_loops(fu).is_empty() {
                    Stage::Empty
                } else {
                    Stage::Done
                }
            }
            Stage::Done => {
                verify_face_use(ctx.arena, fu)?;
                debug_assert!(ctx
                    .arena
                    .face_use_loops(fu)
                    .iter()
                    .all(|&lu| ctx.arena.loop_edge_count(lu) == 3));
                debug!(
                    ?fu,
                    triangles = ctx.arena.face_use_loops(fu).len(),
                    "face triangulated"
                );
                return Ok(FaceOutcome::Triangulated);
            }
            Stage::Empty => {
                ctx.arena.kill_face_use_pair(fu)?;
                return Ok(FaceOutcome::Empty);
            }
        };
    }
}

/// `true` when every loop is already a 3-edge outer loop wound
/// counterclockwise about the face normal. Checked on raw 3D coordinates
/// so the fast path allocates nothing.
fn already_triangulated(arena: &MeshArena, fu: FaceUseKey, normal: &Vector3<f64>) -> bool {
    let loops = arena.face_use_loops(fu);
    if loops.is_empty() {
        return false;
    }
    for lu in loops {
        let Some(data) = arena.loop_use(lu) else {
            return false;
        };
        if data.orientation != LoopOrientation::Outer {
            return false;
        }
        if !matches!(data.boundary, LoopBoundary::Edges(_)) {
            return false;
        }
        if arena.loop_edge_count(lu) != 3 || arena.distinct_vertex_count(lu) != 3 {
            return false;
        }
        let verts = arena.loop_vertices(lu);
        let (Some(p0), Some(p1), Some(p2)) = (
            arena.vertex_point(verts[0]),
            arena.vertex_point(verts[1]),
            arena.vertex_point(verts[2]),
        ) else {
            return false;
        };
        if (p1 - p0).cross(&(p2 - p0)).dot(normal) <= 0.0 {
            return false;
        }
    }
    true
}

/// Zero-length edges mean un-fused input; reject the face before any
/// surgery touches it.
fn check_edge_lengths(arena: &MeshArena, fu: FaceUseKey, tol: &Tolerance) -> Result<()> {
    for lu in arena.face_use_loops(fu) {
        for eu in arena.loop_edge_uses(lu) {
            let length = arena
                .edge_use_length(eu)
                .ok_or(brep_lite_topology::Error::EdgeUseNotFound(eu))?;
            if length <= tol.dist {
                return Err(Error::ZeroLengthEdge { edge_use: eu });
            }
        }
    }
    Ok(())
}

fn has_hole_loops(arena: &MeshArena, fu: FaceUseKey) -> bool {
    arena.face_use_loops(fu).into_iter().any(|lu| {
        arena
            .loop_use(lu)
            .map(|d| d.orientation == LoopOrientation::Hole)
            .unwrap_or(false)
    })
}

fn next_clippable_loop(
    arena: &MeshArena,
    fu: FaceUseKey,
) -> Option<brep_lite_topology::LoopUseKey> {
    arena
        .face_use_loops(fu)
        .into_iter()
        .find(|&lu| arena.loop_edge_count(lu) > 3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use brep_lite_topology::make_face;

    #[test]
    fn idempotent_triangle_face() {
        let mut arena = MeshArena::new();
        let v = [
            arena.add_vertex(0.0, 0.0, 0.0),
            arena.add_vertex(1.0, 0.0, 0.0),
            arena.add_vertex(0.5, 1.0, 0.0),
        ];
        let fu = make_face(&mut arena, &v).unwrap();
        let eu_count = arena.edge_use_count();
        let vu_count = arena.vertex_use_count();

        let outcome = triangulate_face_use(&mut arena, fu, &Tolerance::default()).unwrap();
        assert_eq!(outcome, FaceOutcome::Triangulated);
        // Nothing was allocated or mutated.
        assert_eq!(arena.edge_use_count(), eu_count);
        assert_eq!(arena.vertex_use_count(), vu_count);
    }

    #[test]
    fn zero_length_edge_rejected() {
        let mut arena = MeshArena::new();
        // Two distinct vertices at the same position: the v1–v2 edge has
        // zero length.
        let v = [
            arena.add_vertex(0.0, 0.0, 0.0),
            arena.add_vertex(1.0, 0.0, 0.0),
            arena.add_vertex(1.0, 0.0, 0.0),
            arena.add_vertex(0.5, 1.0, 0.0),
        ];
        let fu = arena
            .add_face_from_loops(
                &[(v.to_vec(), LoopOrientation::Outer)],
                Vector3::z(),
            )
            .unwrap();

        let err = triangulate_face_use(&mut arena, fu, &Tolerance::default()).unwrap_err();
        assert!(matches!(err, Error::ZeroLengthEdge { .. }));
        assert!(err.is_input_geometry());
    }

    #[test]
    fn degenerate_normal_rejected() {
        let mut arena = MeshArena::new();
        let v = [
            arena.add_vertex(0.0, 0.0, 0.0),
            arena.add_vertex(1.0, 0.0, 0.0),
            arena.add_vertex(1.0, 1.0, 0.0),
            arena.add_vertex(0.0, 1.0, 0.0),
        ];
        let fu = arena
            .add_face_from_loops(
                &[(v.to_vec(), LoopOrientation::Outer)],
                Vector3::zeros(),
            )
            .unwrap();

        let err = triangulate_face_use(&mut arena, fu, &Tolerance::default()).unwrap_err();
        assert!(matches!(err, Error::DegenerateNormal { .. }));
    }
}
