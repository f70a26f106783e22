// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Topology surgery: the index-table edits behind loop cut and join.
//!
//! Every operation here edits a loop use *and its mate* in one transaction,
//! so the mate invariant (`mate(mate(eu)) == eu`, mate in the mated loop,
//! reversed traversal) holds at every return point. The mirror rule for the
//! mate side is mechanical: whenever the forward cycle gains `x.next == y`,
//! the mate cycle gains `mate(y).next == mate(x)`.
//!
//! New vertex uses inherit the per-use shading normal from an existing use
//! of the same vertex on the same face-use side (negated when only the
//! opposite side has one), keeping attributes consistent with the face
//! use's orientation.

use nalgebra::Vector3;
use smallvec::SmallVec;
use tracing::trace;

use crate::arena::*;
use crate::error::{Error, Result};
use crate::keys::*;

/// Result of [`MeshArena::split_loop`].
#[derive(Debug, Clone)]
pub struct LoopSplit {
    /// The detached loop (contains the path from the first endpoint to the
    /// second, closed by the chord).
    pub new_loop: LoopUseKey,
    /// The chord edge shared by the two result loops.
    pub edge: EdgeKey,
    /// Chord traversal remaining in the original loop (starts at the first
    /// endpoint).
    pub chord_in_old: EdgeUseKey,
    /// Chord traversal in the detached loop (starts at the second endpoint).
    pub chord_in_new: EdgeUseKey,
    /// Vertex uses created on the side that was split (not the mate side).
    pub new_vertex_uses: [VertexUseKey; 2],
}

/// Result of [`MeshArena::bridge_loops`].
#[derive(Debug, Clone)]
pub struct LoopBridge {
    /// The surviving merged loop (the first endpoint's loop).
    pub merged_loop: LoopUseKey,
    /// The bridge edge, traversed out and back by the merged loop.
    pub edge: EdgeKey,
    /// Vertex uses created on the side that was joined (not the mate side).
    pub new_vertex_uses: [VertexUseKey; 2],
}

/// Result of [`MeshArena::excise_jaunt`].
#[derive(Debug, Clone)]
pub struct Excision {
    /// `true` when the loop would have collapsed below 2 edges and the
    /// whole loop-use pair was removed instead.
    pub loop_killed: bool,
    /// All vertex uses removed from the arena (both sides).
    pub removed_vertex_uses: SmallVec<[VertexUseKey; 8]>,
}

impl MeshArena {
    /// Splits one loop along a chord between the start vertices of `eu1`
    /// and `eu2` (both in the same loop use).
    ///
    /// The original loop keeps the portion from `eu2`'s start onward plus a
    /// chord traversal; the detached loop receives the portion from `eu1`'s
    /// start to `eu2`'s start, closed by the reverse chord traversal. One
    /// edge, four edge uses, and four vertex uses are created; the mate
    /// loop is mirrored in the same call.
    ///
    /// The chord endpoints may reference the same vertex (a deliberate
    /// zero-length chord); the accordion pass is responsible for excising
    /// the resulting jaunt later.
    pub fn split_loop(&mut self, eu1: EdgeUseKey, eu2: EdgeUseKey) -> Result<LoopSplit> {
        let d1 = self
            .edge_uses
            .get(eu1)
            .ok_or(Error::EdgeUseNotFound(eu1))?
            .clone();
        let d2 = self
            .edge_uses
            .get(eu2)
            .ok_or(Error::EdgeUseNotFound(eu2))?
            .clone();
        if eu1 == eu2 {
            return Err(Error::SplitAtSelf(d1.parent));
        }
        if d1.parent != d2.parent {
            return Err(Error::NotSameLoop(eu1, eu2));
        }

        let lu = d1.parent;
        let lu_data = self.loop_uses[lu].clone();
        let lu_mate = lu_data.mate;
        let fu = lu_data.parent;
        let fu_mate = self.face_uses[fu].mate;

        let p1 = self.vertex_uses[d1.vu].vertex;
        let p2 = self.vertex_uses[d2.vu].vertex;

        let eux = d1.prev; // ends at p1
        let euy = d2.prev; // ends at p2
        let eux_m = self.edge_uses[eux].mate; // starts at p1
        let euy_m = self.edge_uses[euy].mate; // starts at p2
        let eu1_m = d1.mate;
        let eu2_m = d2.mate;

        let edge = self.edges.insert(EdgeData {
            start: p1,
            end: p2,
            uses: SmallVec::new(),
        });

        let new_lu = self.loop_uses.insert(LoopUseData {
            parent: fu,
            mate: LoopUseKey::default(),
            orientation: lu_data.orientation,
            boundary: LoopBoundary::Point(VertexUseKey::default()),
        });
        let new_lu_m = self.loop_uses.insert(LoopUseData {
            parent: fu_mate,
            mate: new_lu,
            orientation: lu_data.orientation,
            boundary: LoopBoundary::Point(VertexUseKey::default()),
        });
        self.loop_uses[new_lu].mate = new_lu_m;

        // Chord traversals: eu_a stays in the shrinking loop, eu_b closes
        // the detached one; their mates mirror them.
        let eu_a = self.edge_uses.insert(EdgeUseData {
            vu: VertexUseKey::default(),
            edge,
            parent: lu,
            next: eu2,
            prev: eux,
            mate: EdgeUseKey::default(),
            radial: EdgeUseKey::default(),
        });
        let eu_b = self.edge_uses.insert(EdgeUseData {
            vu: VertexUseKey::default(),
            edge,
            parent: new_lu,
            next: eu1,
            prev: euy,
            mate: EdgeUseKey::default(),
            radial: EdgeUseKey::default(),
        });
        let eu_a_m = self.edge_uses.insert(EdgeUseData {
            vu: VertexUseKey::default(),
            edge,
            parent: lu_mate,
            next: eux_m,
            prev: eu2_m,
            mate: eu_a,
            radial: EdgeUseKey::default(),
        });
        let eu_b_m = self.edge_uses.insert(EdgeUseData {
            vu: VertexUseKey::default(),
            edge,
            parent: new_lu_m,
            next: euy_m,
            prev: eu1_m,
            mate: eu_b,
            radial: EdgeUseKey::default(),
        });
        self.edge_uses[eu_a].mate = eu_a_m;
        self.edge_uses[eu_b].mate = eu_b_m;

        // Splice the forward side.
        self.edge_uses[eux].next = eu_a;
        self.edge_uses[eu2].prev = eu_a;
        self.edge_uses[euy].next = eu_b;
        self.edge_uses[eu1].prev = eu_b;

        // Mirror on the mate side.
        self.edge_uses[eux_m].prev = eu_a_m;
        self.edge_uses[eu2_m].next = eu_a_m;
        self.edge_uses[eu1_m].next = eu_b_m;
        self.edge_uses[euy_m].prev = eu_b_m;

        // Vertex uses for the four new traversal starts.
        let vu_a = self.new_vertex_use(p1, VertexUseOwner::Edge(eu_a), self.normal_at(fu, p1));
        self.edge_uses[eu_a].vu = vu_a;
        let vu_b = self.new_vertex_use(p2, VertexUseOwner::Edge(eu_b), self.normal_at(fu, p2));
        self.edge_uses[eu_b].vu = vu_b;
        let vu_a_m =
            self.new_vertex_use(p2, VertexUseOwner::Edge(eu_a_m), self.normal_at(fu_mate, p2));
        self.edge_uses[eu_a_m].vu = vu_a_m;
        let vu_b_m =
            self.new_vertex_use(p1, VertexUseOwner::Edge(eu_b_m), self.normal_at(fu_mate, p1));
        self.edge_uses[eu_b_m].vu = vu_b_m;

        self.edges[edge].uses.extend([eu_a, eu_a_m, eu_b, eu_b_m]);
        self.relink_radial(edge);

        // Reparent the detached portion and set the boundary heads.
        self.loop_uses[lu].boundary = LoopBoundary::Edges(eu_a);
        self.loop_uses[lu_mate].boundary = LoopBoundary::Edges(eu_a_m);
        self.loop_uses[new_lu].boundary = LoopBoundary::Edges(eu_b);
        self.loop_uses[new_lu_m].boundary = LoopBoundary::Edges(eu_b_m);
        self.reparent_cycle(eu_b, new_lu);
        self.reparent_cycle(eu_b_m, new_lu_m);

        self.face_uses[fu].loops.push(new_lu);
        self.face_uses[fu_mate].loops.push(new_lu_m);

        trace!(?lu, ?new_lu, "split loop along chord");

        #[cfg(debug_assertions)]
        {
            crate::check::verify_loop(self, lu)?;
            crate::check::verify_loop(self, new_lu)?;
        }

        Ok(LoopSplit {
            new_loop: new_lu,
            edge,
            chord_in_old: eu_a,
            chord_in_new: eu_b,
            new_vertex_uses: [vu_a, vu_b],
        })
    }

    /// Merges two loops of the same face use that meet at a shared vertex:
    /// `eu_i` and `eu_j` must start at the same vertex, each in its own
    /// loop. No edge is created; the cycles are spliced at the vertex.
    ///
    /// The first loop survives (tagged outer if either input was); the
    /// second loop-use pair is removed. Returns the surviving loop.
    pub fn merge_loops_at_vertex(
        &mut self,
        eu_i: EdgeUseKey,
        eu_j: EdgeUseKey,
    ) -> Result<LoopUseKey> {
        let (lu1, lu2) = self.joinable_loops(eu_i, eu_j)?;
        let di = self.edge_uses[eu_i].clone();
        let dj = self.edge_uses[eu_j].clone();
        let vi = self.vertex_uses[di.vu].vertex;
        let vj = self.vertex_uses[dj.vu].vertex;
        if vi != vj {
            return Err(Error::NoSharedVertex(eu_i, eu_j));
        }

        let eux = di.prev; // ends at the shared vertex, in lu1
        let euy = dj.prev; // ends at the shared vertex, in lu2
        let eux_m = self.edge_uses[eux].mate;
        let euy_m = self.edge_uses[euy].mate;
        let eu_i_m = di.mate;
        let eu_j_m = dj.mate;

        let lu2_mate = self.loop_uses[lu2].mate;

        // Forward splice: ... eux, eu_j ... euy, eu_i ...
        self.edge_uses[eux].next = eu_j;
        self.edge_uses[eu_j].prev = eux;
        self.edge_uses[euy].next = eu_i;
        self.edge_uses[eu_i].prev = euy;

        // Mate mirror.
        self.edge_uses[eu_j_m].next = eux_m;
        self.edge_uses[eux_m].prev = eu_j_m;
        self.edge_uses[eu_i_m].next = euy_m;
        self.edge_uses[euy_m].prev = eu_i_m;

        self.absorb_loop(lu1, lu2, lu2_mate)?;

        trace!(?lu1, ?lu2, vertex = ?vi, "merged loops at shared vertex");

        #[cfg(debug_assertions)]
        crate::check::verify_loop(self, lu1)?;

        Ok(lu1)
    }

    /// Merges two loops of the same face use through a new bridge edge
    /// between the start vertices of `eu_i` and `eu_j`. The merged loop
    /// traverses the bridge twice (out and back).
    ///
    /// The first loop survives; the second loop-use pair is removed.
    pub fn bridge_loops(&mut self, eu_i: EdgeUseKey, eu_j: EdgeUseKey) -> Result<LoopBridge> {
        let (lu1, lu2) = self.joinable_loops(eu_i, eu_j)?;
        let di = self.edge_uses[eu_i].clone();
        let dj = self.edge_uses[eu_j].clone();
        let p1 = self.vertex_uses[di.vu].vertex;
        let p2 = self.vertex_uses[dj.vu].vertex;
        if p1 == p2 {
            return Err(Error::BridgeSameVertex(p1));
        }

        let lu1_data = self.loop_uses[lu1].clone();
        let lu1_mate = lu1_data.mate;
        let fu = lu1_data.parent;
        let fu_mate = self.face_uses[fu].mate;
        let lu2_mate = self.loop_uses[lu2].mate;

        let eux = di.prev; // ends at p1
        let euy = dj.prev; // ends at p2
        let eux_m = self.edge_uses[eux].mate;
        let euy_m = self.edge_uses[euy].mate;
        let eu_i_m = di.mate;
        let eu_j_m = dj.mate;

        let edge = self.edges.insert(EdgeData {
            start: p1,
            end: p2,
            uses: SmallVec::new(),
        });

        // Bridge traversals: out into the absorbed loop, back to the first.
        let eu_b1 = self.edge_uses.insert(EdgeUseData {
            vu: VertexUseKey::default(),
            edge,
            parent: lu1,
            next: eu_j,
            prev: eux,
            mate: EdgeUseKey::default(),
            radial: EdgeUseKey::default(),
        });
        let eu_b2 = self.edge_uses.insert(EdgeUseData {
            vu: VertexUseKey::default(),
            edge,
            parent: lu1,
            next: eu_i,
            prev: euy,
            mate: EdgeUseKey::default(),
            radial: EdgeUseKey::default(),
        });
        let eu_b1_m = self.edge_uses.insert(EdgeUseData {
            vu: VertexUseKey::default(),
            edge,
            parent: lu1_mate,
            next: eux_m,
            prev: eu_j_m,
            mate: eu_b1,
            radial: EdgeUseKey::default(),
        });
        let eu_b2_m = self.edge_uses.insert(EdgeUseData {
            vu: VertexUseKey::default(),
            edge,
            parent: lu1_mate,
            next: euy_m,
            prev: eu_i_m,
            mate: eu_b2,
            radial: EdgeUseKey::default(),
        });
        self.edge_uses[eu_b1].mate = eu_b1_m;
        self.edge_uses[eu_b2].mate = eu_b2_m;

        // Forward splice: ... eux, b1, eu_j ... euy, b2, eu_i ...
        self.edge_uses[eux].next = eu_b1;
        self.edge_uses[eu_j].prev = eu_b1;
        self.edge_uses[euy].next = eu_b2;
        self.edge_uses[eu_i].prev = eu_b2;

        // Mate mirror.
        self.edge_uses[eux_m].prev = eu_b1_m;
        self.edge_uses[eu_j_m].next = eu_b1_m;
        self.edge_uses[euy_m].prev = eu_b2_m;
        self.edge_uses[eu_i_m].next = eu_b2_m;

        let vu_b1 = self.new_vertex_use(p1, VertexUseOwner::Edge(eu_b1), self.normal_at(fu, p1));
        self.edge_uses[eu_b1].vu = vu_b1;
        let vu_b2 = self.new_vertex_use(p2, VertexUseOwner::Edge(eu_b2), self.normal_at(fu, p2));
        self.edge_uses[eu_b2].vu = vu_b2;
        let vu_b1_m =
            self.new_vertex_use(p2, VertexUseOwner::Edge(eu_b1_m), self.normal_at(fu_mate, p2));
        self.edge_uses[eu_b1_m].vu = vu_b1_m;
        let vu_b2_m =
            self.new_vertex_use(p1, VertexUseOwner::Edge(eu_b2_m), self.normal_at(fu_mate, p1));
        self.edge_uses[eu_b2_m].vu = vu_b2_m;

        self.edges[edge]
            .uses
            .extend([eu_b1, eu_b1_m, eu_b2, eu_b2_m]);
        self.relink_radial(edge);

        self.absorb_loop(lu1, lu2, lu2_mate)?;

        trace!(?lu1, ?lu2, ?edge, "bridged loops with keyhole edge");

        #[cfg(debug_assertions)]
        crate::check::verify_loop(self, lu1)?;

        Ok(LoopBridge {
            merged_loop: lu1,
            edge,
            new_vertex_uses: [vu_b1, vu_b2],
        })
    }

    /// Excises a zero-area jaunt starting at `eu`, together with its
    /// mate-side mirror, in one transaction.
    ///
    /// Two jaunt shapes exist: a topologically zero-length edge use (both
    /// cycle endpoints on one vertex, removed alone) and an out-and-back
    /// pair (`eu` followed by an edge use retracing it, removed together).
    /// Returns [`Error::NotAJaunt`] when `eu` starts neither. If removal
    /// would leave the loop with fewer than 2 edges, the whole loop-use
    /// pair is removed instead.
    pub fn excise_jaunt(&mut self, eu: EdgeUseKey) -> Result<Excision> {
        let d = self
            .edge_uses
            .get(eu)
            .ok_or(Error::EdgeUseNotFound(eu))?
            .clone();
        let lu = d.parent;

        let (a, b) = self
            .edge_use_endpoints(eu)
            .ok_or(Error::EdgeUseNotFound(eu))?;
        let doomed: SmallVec<[EdgeUseKey; 2]> = if a == b {
            // Zero-length edge use: out and back on one vertex.
            SmallVec::from_slice(&[eu])
        } else {
            let next = d.next;
            let (_, c) = self
                .edge_use_endpoints(next)
                .ok_or(Error::EdgeUseNotFound(next))?;
            if c != a {
                return Err(Error::NotAJaunt(eu));
            }
            SmallVec::from_slice(&[eu, next])
        };

        let count = self.loop_edge_count(lu);
        if count < doomed.len() + 2 {
            let removed = self.kill_loop_use_pair(lu)?;
            return Ok(Excision {
                loop_killed: true,
                removed_vertex_uses: removed,
            });
        }

        let lu_mate = self.loop_uses[lu].mate;

        // Splice both cycles around the doomed run in one edit: the run is
        // consecutive, so one forward splice and one mirrored splice close
        // both loops.
        let first = doomed[0];
        let last = doomed[doomed.len() - 1];
        let before = self.edge_uses[first].prev;
        let after = self.edge_uses[last].next;
        self.edge_uses[before].next = after;
        self.edge_uses[after].prev = before;

        let before_m = self.edge_uses[before].mate;
        let after_m = self.edge_uses[after].mate;
        self.edge_uses[after_m].next = before_m;
        self.edge_uses[before_m].prev = after_m;

        if matches!(self.loop_uses[lu].boundary, LoopBoundary::Edges(head) if doomed.contains(&head))
        {
            self.loop_uses[lu].boundary = LoopBoundary::Edges(after);
        }
        let mate_doomed: SmallVec<[EdgeUseKey; 2]> =
            doomed.iter().map(|&e| self.edge_uses[e].mate).collect();
        if matches!(self.loop_uses[lu_mate].boundary, LoopBoundary::Edges(head) if mate_doomed.contains(&head))
        {
            self.loop_uses[lu_mate].boundary = LoopBoundary::Edges(before_m);
        }

        let mut removed: SmallVec<[VertexUseKey; 8]> = SmallVec::new();
        for (&dead, &dead_m) in doomed.iter().zip(mate_doomed.iter()) {
            for side in [dead, dead_m] {
                let vu = self.edge_uses[side].vu;
                removed.push(vu);
                self.kill_vertex_use(vu);
                self.unlink_radial(side);
                self.edge_uses.remove(side);
            }
        }

        trace!(?lu, removed = doomed.len(), "excised jaunt");

        #[cfg(debug_assertions)]
        crate::check::verify_loop(self, lu)?;

        Ok(Excision {
            loop_killed: false,
            removed_vertex_uses: removed,
        })
    }

    /// Removes a loop use and its mate entirely: every edge use, vertex
    /// use, and any edge whose radial ring empties. Returns the removed
    /// vertex uses.
    pub fn kill_loop_use_pair(
        &mut self,
        lu: LoopUseKey,
    ) -> Result<SmallVec<[VertexUseKey; 8]>> {
        let lu_data = self
            .loop_uses
            .get(lu)
            .ok_or(Error::LoopUseNotFound(lu))?
            .clone();
        let lu_mate = lu_data.mate;
        let fu = lu_data.parent;
        let fu_mate = self.loop_uses[lu_mate].parent;

        let mut removed: SmallVec<[VertexUseKey; 8]> = SmallVec::new();
        for side in [lu, lu_mate] {
            match self.loop_uses[side].boundary {
                LoopBoundary::Point(vu) => {
                    removed.push(vu);
                    self.kill_vertex_use(vu);
                }
                LoopBoundary::Edges(_) => {
                    let eus: Vec<EdgeUseKey> = self.loop_edge_uses(side).collect();
                    for eu in eus {
                        let vu = self.edge_uses[eu].vu;
                        removed.push(vu);
                        self.kill_vertex_use(vu);
                        self.unlink_radial(eu);
                        self.edge_uses.remove(eu);
                    }
                }
            }
        }

        self.loop_uses.remove(lu);
        self.loop_uses.remove(lu_mate);
        self.face_uses[fu].loops.retain(|&l| l != lu);
        self.face_uses[fu_mate].loops.retain(|&l| l != lu_mate);

        trace!(?lu, "killed loop use pair");
        Ok(removed)
    }

    /// Removes a face use, its mate, all their loops, and the face record.
    pub fn kill_face_use_pair(&mut self, fu: FaceUseKey) -> Result<()> {
        let fu_data = self
            .face_uses
            .get(fu)
            .ok_or(Error::FaceUseNotFound(fu))?
            .clone();
        for lu in fu_data.loops {
            // Each kill also drops the mate-side loop from the mate list.
            self.kill_loop_use_pair(lu)?;
        }
        self.face_uses.remove(fu);
        self.face_uses.remove(fu_data.mate);
        self.faces.remove(fu_data.face);
        trace!(?fu, "killed face use pair");
        Ok(())
    }

    /// Exchanges a loop use with its mate between the two sides of their
    /// face-use pair. Loop identity and edge uses are untouched; only the
    /// parent assignments move.
    pub fn swap_loop_with_mate(&mut self, lu: LoopUseKey) -> Result<()> {
        let lu_data = self
            .loop_uses
            .get(lu)
            .ok_or(Error::LoopUseNotFound(lu))?
            .clone();
        let mate = lu_data.mate;
        let fu = lu_data.parent;
        let fu_mate = self.loop_uses[mate].parent;

        self.loop_uses[lu].parent = fu_mate;
        self.loop_uses[mate].parent = fu;
        for slot in self.face_uses[fu].loops.iter_mut() {
            if *slot == lu {
                *slot = mate;
            }
        }
        for slot in self.face_uses[fu_mate].loops.iter_mut() {
            if *slot == mate {
                *slot = lu;
            }
        }
        trace!(?lu, "swapped loop use with its mate");
        Ok(())
    }

    /// Sets the orientation tag on a loop use and its mate together (the
    /// two always agree).
    pub fn set_loop_orientation(
        &mut self,
        lu: LoopUseKey,
        orientation: LoopOrientation,
    ) -> Result<()> {
        let mate = self
            .loop_uses
            .get(lu)
            .ok_or(Error::LoopUseNotFound(lu))?
            .mate;
        self.loop_uses[lu].orientation = orientation;
        self.loop_uses[mate].orientation = orientation;
        Ok(())
    }

    // --- internal helpers ---

    /// Validates that two edge uses sit in different loops of the same face
    /// use; returns their parent loops.
    fn joinable_loops(
        &self,
        eu_i: EdgeUseKey,
        eu_j: EdgeUseKey,
    ) -> Result<(LoopUseKey, LoopUseKey)> {
        let di = self
            .edge_uses
            .get(eu_i)
            .ok_or(Error::EdgeUseNotFound(eu_i))?;
        let dj = self
            .edge_uses
            .get(eu_j)
            .ok_or(Error::EdgeUseNotFound(eu_j))?;
        if di.parent == dj.parent {
            return Err(Error::NotSameLoop(eu_i, eu_j));
        }
        let fu_i = self.loop_uses[di.parent].parent;
        let fu_j = self.loop_uses[dj.parent].parent;
        if fu_i != fu_j {
            return Err(Error::NotSameFaceUse(di.parent, dj.parent));
        }
        Ok((di.parent, dj.parent))
    }

    /// After a splice, moves `lu2`'s bookkeeping into `lu1`: reparents the
    /// (already joined) cycle, promotes the orientation to outer if either
    /// input was outer, and removes the absorbed loop-use records.
    fn absorb_loop(
        &mut self,
        lu1: LoopUseKey,
        lu2: LoopUseKey,
        lu2_mate: LoopUseKey,
    ) -> Result<()> {
        let lu1_data = self.loop_uses[lu1].clone();
        let lu1_mate = lu1_data.mate;

        let head = match lu1_data.boundary {
            LoopBoundary::Edges(head) => head,
            LoopBoundary::Point(_) => return Err(Error::CycleCorrupt(lu1)),
        };
        self.reparent_cycle(head, lu1);
        let mate_head = match self.loop_uses[lu1_mate].boundary {
            LoopBoundary::Edges(head) => head,
            LoopBoundary::Point(_) => return Err(Error::CycleCorrupt(lu1_mate)),
        };
        self.reparent_cycle(mate_head, lu1_mate);

        let absorbed_orientation = self.loop_uses[lu2].orientation;
        if absorbed_orientation == LoopOrientation::Outer {
            self.loop_uses[lu1].orientation = LoopOrientation::Outer;
            self.loop_uses[lu1_mate].orientation = LoopOrientation::Outer;
        }

        let fu = self.loop_uses[lu1].parent;
        let fu_mate = self.loop_uses[lu1_mate].parent;
        self.loop_uses.remove(lu2);
        self.loop_uses.remove(lu2_mate);
        self.face_uses[fu].loops.retain(|&l| l != lu2);
        self.face_uses[fu_mate].loops.retain(|&l| l != lu2_mate);
        Ok(())
    }

    /// Walks a (already spliced) cycle from `head`, assigning every member
    /// to `parent`.
    fn reparent_cycle(&mut self, head: EdgeUseKey, parent: LoopUseKey) {
        let budget = self.edge_uses.len();
        let mut eu = head;
        for _ in 0..budget {
            self.edge_uses[eu].parent = parent;
            eu = self.edge_uses[eu].next;
            if eu == head {
                break;
            }
        }
    }

    /// Finds the shading normal of an existing vertex use of `v` on the
    /// given face-use side; falls back to the negated attribute from the
    /// mate side.
    fn normal_at(&self, fu: FaceUseKey, v: VertexKey) -> Option<Vector3<f64>> {
        let mate = self.face_uses.get(fu)?.mate;
        let mut flipped = None;
        for vu in self.vertex_uses_of(v) {
            let data = self.vertex_use(vu)?;
            let owner_fu = match data.owner {
                VertexUseOwner::Edge(eu) => {
                    let lu = self.edge_use(eu)?.parent;
                    self.loop_use(lu)?.parent
                }
                VertexUseOwner::Loop(lu) => self.loop_use(lu)?.parent,
            };
            if owner_fu == fu {
                if let Some(n) = data.normal {
                    return Some(n);
                }
            } else if owner_fu == mate && flipped.is_none() {
                flipped = data.normal.map(|n| -n);
            }
        }
        flipped
    }
}
