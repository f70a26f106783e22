// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Orientation normalization of the finished triangles.
//!
//! After all cuts complete every surviving loop must be a 3-vertex loop in
//! canonical outer orientation, wound counterclockwise about the face
//! normal. A loop measured clockwise is swapped with its mate (the mate
//! winds the other way by construction) and its vertex uses are
//! re-registered in the projection table under the side that now faces the
//! pass. Loops whose winding cannot be measured are first fed to accordion
//! removal; if they still enclose no area they are discarded outright.

use brep_lite_topology::{LoopBoundary, LoopOrientation, Winding};
use tracing::{debug, trace};

use crate::accordion::remove_accordions;
use crate::context::TriContext;
use crate::error::Result;

/// Forces every remaining loop of the face use to outer orientation with
/// consistent winding.
pub fn normalize_orientation(ctx: &mut TriContext<'_>) -> Result<()> {
    for lu in ctx.arena.face_use_loops(ctx.fu) {
        let Some(data) = ctx.arena.loop_use(lu) else {
            continue;
        };
        if matches!(data.boundary, LoopBoundary::Point(_)) {
            continue;
        }

        let winding = match ctx.arena.loop_winding(lu, &ctx.normal, ctx.tol.dist_sq) {
            Some(w) => w,
            None => {
                // Residual degeneracy: strip jaunts and measure again.
                if !remove_accordions(ctx, lu)? {
                    continue;
                }
                match ctx.arena.loop_winding(lu, &ctx.normal, ctx.tol.dist_sq) {
                    Some(w) => w,
                    None => {
                        debug!(?lu, "discarding zero-area loop");
                        let removed = ctx.arena.kill_loop_use_pair(lu)?;
                        for vu in &removed {
                            ctx.proj.remove_use(*vu);
                        }
                        continue;
                    }
                }
            }
        };

        if winding == Winding::Cw {
            trace!(?lu, "swapping reversed loop with its mate");
            let mate = ctx
                .arena
                .loop_use(lu)
                .ok_or(brep_lite_topology::Error::LoopUseNotFound(lu))?
                .mate;
            ctx.arena.swap_loop_with_mate(lu)?;

            // The mate now fronts this pass: register its vertex uses and
            // retire the swapped-away side's entries.
            for vu in ctx.arena.loop_vertex_uses(lu) {
                ctx.proj.remove_use(vu);
            }
            ctx.proj.reregister_loop(ctx.arena, mate)?;
            ctx.arena.set_loop_orientation(mate, LoopOrientation::Outer)?;
        } else {
            ctx.arena.set_loop_orientation(lu, LoopOrientation::Outer)?;
        }
    }
    Ok(())
}
