// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Accordion removal: excision of zero-area jaunts.
//!
//! Repeated cutting can leave a loop with a "jaunt" — an edge pair that
//! walks out to a vertex and immediately returns to its own start — or
//! with a topologically zero-length edge (both ends on one vertex). Both
//! enclose no area and confuse winding measurement, so they are excised
//! until none remain or the loop is down to 2 edges.

use brep_lite_topology::LoopUseKey;
use tracing::trace;

use crate::context::TriContext;
use crate::error::Result;

/// Excises jaunts from one loop until none remain or only 2 edges are
/// left. Returns `false` when the loop collapsed entirely (its loop-use
/// pair is gone).
pub fn remove_accordions(ctx: &mut TriContext<'_>, lu: LoopUseKey) -> Result<bool> {
    loop {
        if ctx.arena.loop_use(lu).is_none() {
            return Ok(false);
        }
        if ctx.arena.loop_edge_count(lu) <= 2 {
            return Ok(true);
        }

        let Some(jaunt) = find_jaunt(ctx, lu) else {
            return Ok(true);
        };

        trace!(?lu, ?jaunt, "excising jaunt");
        let out = ctx.arena.excise_jaunt(jaunt)?;
        for vu in &out.removed_vertex_uses {
            ctx.proj.remove_use(*vu);
        }
        if out.loop_killed {
            return Ok(false);
        }
    }
}

/// Finds an edge use starting a jaunt: one whose cycle endpoints coincide
/// (zero-length) or whose successor retraces it back to its start vertex.
fn find_jaunt(
    ctx: &TriContext<'_>,
    lu: LoopUseKey,
) -> Option<brep_lite_topology::EdgeUseKey> {
    let arena = &*ctx.arena;
    for eu in arena.loop_edge_uses(lu) {
        let (a, b) = arena.edge_use_endpoints(eu)?;
        if a == b {
            return Some(eu);
        }
        let next = arena.edge_use(eu)?.next;
        let (_, c) = arena.edge_use_endpoints(next)?;
        if c == a {
            return Some(eu);
        }
    }
    None
}
