// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Runtime invariant verification for the use-layer graph.
//!
//! These are the arena-and-handle equivalent of classic B-rep magic-number
//! assertions: every surgery primitive calls [`verify_loop`] /
//! [`verify_face_use`] in debug builds, and tests call them after each
//! mutation. Verification never mutates.
//!
//! Checked invariants:
//! 1. mate(mate(eu)) == eu, the mate lives in the mated loop use and
//!    traverses the same edge in the opposite direction;
//! 2. every edge's radial ring closes and contains exactly its uses;
//! 3. next/prev are mutually inverse and cycles close back to the head,
//!    with every member parented under the loop being walked;
//! 4. every vertex use is owned by its edge use (or lone-point loop) and
//!    registered on its vertex;
//! 5. a loop and its mate carry the same orientation tag and live under
//!    mated face uses.

use crate::arena::*;
use crate::error::{Error, Result};
use crate::keys::*;

/// Verifies all use-layer invariants of one loop use.
pub fn verify_loop(arena: &MeshArena, lu: LoopUseKey) -> Result<()> {
    let loop_data = arena.loop_use(lu).ok_or(Error::LoopUseNotFound(lu))?;
    let mate_lu = loop_data.mate;
    let mate_data = arena
        .loop_use(mate_lu)
        .ok_or(Error::LoopUseNotFound(mate_lu))?;

    if mate_data.mate != lu || mate_data.orientation != loop_data.orientation {
        return Err(Error::CycleCorrupt(lu));
    }
    let parent = arena
        .face_use(loop_data.parent)
        .ok_or(Error::FaceUseNotFound(loop_data.parent))?;
    if parent.mate != mate_data.parent {
        return Err(Error::NotSameFaceUse(lu, mate_lu));
    }

    match loop_data.boundary {
        LoopBoundary::Point(vu) => {
            let vu_data = arena.vertex_use(vu).ok_or(Error::VertexUseNotFound(vu))?;
            if vu_data.owner != VertexUseOwner::Loop(lu) {
                return Err(Error::UnregisteredVertexUse(vu, vu_data.vertex));
            }
            verify_vertex_use_registered(arena, vu)?;
        }
        LoopBoundary::Edges(head) => {
            verify_edge_cycle(arena, lu, head)?;
        }
    }
    Ok(())
}

fn verify_edge_cycle(arena: &MeshArena, lu: LoopUseKey, head: EdgeUseKey) -> Result<()> {
    let budget = arena.edge_use_count() + 1;
    let mut eu = head;
    for step in 0.. {
        if step >= budget {
            return Err(Error::CycleCorrupt(lu));
        }
        let data = arena.edge_use(eu).ok_or(Error::EdgeUseNotFound(eu))?;
        if data.parent != lu {
            return Err(Error::WrongParent(eu, lu));
        }

        // next/prev must be mutually inverse.
        let next = arena.edge_use(data.next).ok_or(Error::EdgeUseNotFound(data.next))?;
        if next.prev != eu {
            return Err(Error::CycleCorrupt(lu));
        }

        verify_mate(arena, eu)?;
        verify_radial(arena, eu)?;

        // The start vertex use must be owned by this edge use.
        let vu = data.vu;
        let vu_data = arena.vertex_use(vu).ok_or(Error::VertexUseNotFound(vu))?;
        if vu_data.owner != VertexUseOwner::Edge(eu) {
            return Err(Error::UnregisteredVertexUse(vu, vu_data.vertex));
        }
        verify_vertex_use_registered(arena, vu)?;

        eu = data.next;
        if eu == head {
            break;
        }
    }
    Ok(())
}

fn verify_mate(arena: &MeshArena, eu: EdgeUseKey) -> Result<()> {
    let data = arena.edge_use(eu).ok_or(Error::EdgeUseNotFound(eu))?;
    let mate = arena
        .edge_use(data.mate)
        .ok_or(Error::MateCorrupt(eu))?;
    if mate.mate != eu || mate.edge != data.edge {
        return Err(Error::MateCorrupt(eu));
    }

    // The mate must live in the mated loop use.
    let lu_data = arena
        .loop_use(data.parent)
        .ok_or(Error::LoopUseNotFound(data.parent))?;
    if mate.parent != lu_data.mate {
        return Err(Error::MateCorrupt(eu));
    }

    // And traverse the edge in the opposite direction.
    let (start, end) = arena
        .edge_use_endpoints(eu)
        .ok_or(Error::MateCorrupt(eu))?;
    let (m_start, m_end) = arena
        .edge_use_endpoints(data.mate)
        .ok_or(Error::MateCorrupt(eu))?;
    if start != m_end || end != m_start {
        return Err(Error::MateCorrupt(eu));
    }
    Ok(())
}

fn verify_radial(arena: &MeshArena, eu: EdgeUseKey) -> Result<()> {
    let edge = arena.edge_use(eu).ok_or(Error::EdgeUseNotFound(eu))?.edge;
    let edge_data = arena.edge(edge).ok_or(Error::RadialRingCorrupt(edge))?;
    if !edge_data.uses.contains(&eu) {
        return Err(Error::RadialRingCorrupt(edge));
    }

    // The ring reached by radial links must close over exactly the
    // edge's recorded uses.
    let ring: Vec<EdgeUseKey> = arena.radial_ring(edge).collect();
    if ring.len() != edge_data.uses.len() {
        return Err(Error::RadialRingCorrupt(edge));
    }
    for ring_eu in &ring {
        let data = arena
            .edge_use(*ring_eu)
            .ok_or(Error::RadialRingCorrupt(edge))?;
        if data.edge != edge {
            return Err(Error::RadialRingCorrupt(edge));
        }
    }
    Ok(())
}

fn verify_vertex_use_registered(arena: &MeshArena, vu: VertexUseKey) -> Result<()> {
    let vu_data = arena.vertex_use(vu).ok_or(Error::VertexUseNotFound(vu))?;
    let vertex = vu_data.vertex;
    if !arena.vertex_uses_of(vertex).any(|u| u == vu) {
        return Err(Error::UnregisteredVertexUse(vu, vertex));
    }
    Ok(())
}

/// Verifies every loop of a face use and its mate, plus the pairing of the
/// two face uses themselves.
pub fn verify_face_use(arena: &MeshArena, fu: FaceUseKey) -> Result<()> {
    let fu_data = arena.face_use(fu).ok_or(Error::FaceUseNotFound(fu))?;
    let mate = arena
        .face_use(fu_data.mate)
        .ok_or(Error::FaceUseNotFound(fu_data.mate))?;
    if mate.mate != fu || mate.face != fu_data.face {
        return Err(Error::NotFound(TopoKey::FaceUse(fu_data.mate)));
    }
    if fu_data.loops.len() != mate.loops.len() {
        return Err(Error::NotSameFaceUse(
            *fu_data.loops.first().unwrap_or(&LoopUseKey::default()),
            *mate.loops.first().unwrap_or(&LoopUseKey::default()),
        ));
    }

    for &lu in &fu_data.loops {
        verify_loop(arena, lu)?;
        let lu_data = arena.loop_use(lu).ok_or(Error::LoopUseNotFound(lu))?;
        if lu_data.parent != fu {
            return Err(Error::NotSameFaceUse(lu, lu_data.mate));
        }
        // The mate loop must be listed by the mate face use.
        if !mate.loops.contains(&lu_data.mate) {
            return Err(Error::NotSameFaceUse(lu, lu_data.mate));
        }
    }
    Ok(())
}
