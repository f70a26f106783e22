// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Construction methods for the use-layer topology.
//!
//! Faces are always built as mated pairs: one call to
//! [`MeshArena::add_face_from_loops`] creates the face, both face uses, a
//! mated loop-use pair per boundary loop, and a mated edge-use pair per
//! traversed edge. Edges already present in the arena (because another face
//! traverses them) are reused, splicing the new uses into the existing
//! radial ring — the caller is expected to hand in fused vertices, so two
//! faces sharing a geometric edge share the `EdgeKey`.

use nalgebra::Vector3;
use smallvec::SmallVec;

use crate::arena::*;
use crate::error::{Error, Result};
use crate::keys::*;

impl MeshArena {
    /// Creates a face from one or more boundary loops, each an ordered list
    /// of vertices with an orientation tag.
    ///
    /// Loop vertex order is the traversal order of the *forward* face use;
    /// for an outer loop that means counterclockwise about `normal`. The
    /// mate side is generated automatically with reversed traversal.
    ///
    /// Returns the forward face use. Errors if any loop has fewer than 2
    /// vertices, repeats a vertex consecutively, or references a vertex not
    /// in the arena.
    pub fn add_face_from_loops(
        &mut self,
        loops: &[(Vec<VertexKey>, LoopOrientation)],
        normal: Vector3<f64>,
    ) -> Result<FaceUseKey> {
        if loops.is_empty() {
            return Err(Error::EmptyFace);
        }
        for (verts, _) in loops {
            // 2-vertex loops (an edge traversed out and back) are legal
            // input; the triangulation pruner removes them.
            if verts.len() < 2 {
                return Err(Error::DegenerateLoop(verts.len()));
            }
            for (i, &vk) in verts.iter().enumerate() {
                if !self.vertices.contains_key(vk) {
                    return Err(Error::VertexNotFound(vk));
                }
                if vk == verts[(i + 1) % verts.len()] {
                    return Err(Error::RepeatedVertex(vk));
                }
            }
        }

        let face = self.faces.insert(FaceData {
            normal,
            uses: [FaceUseKey::default(); 2],
        });
        let fu_fwd = self.face_uses.insert(FaceUseData {
            face,
            side: FaceSide::Forward,
            mate: FaceUseKey::default(),
            loops: Vec::with_capacity(loops.len()),
        });
        let fu_bwd = self.face_uses.insert(FaceUseData {
            face,
            side: FaceSide::Backward,
            mate: fu_fwd,
            loops: Vec::with_capacity(loops.len()),
        });
        self.face_uses[fu_fwd].mate = fu_bwd;
        self.faces[face].uses = [fu_fwd, fu_bwd];

        for (verts, orientation) in loops {
            self.add_loop_pair(fu_fwd, fu_bwd, verts, *orientation);
        }

        Ok(fu_fwd)
    }

    /// Creates one mated loop-use pair under an existing face-use pair.
    /// Inputs are pre-validated by the caller. Returns the loop use on the
    /// `fu_fwd` side.
    fn add_loop_pair(
        &mut self,
        fu_fwd: FaceUseKey,
        fu_bwd: FaceUseKey,
        verts: &[VertexKey],
        orientation: LoopOrientation,
    ) -> LoopUseKey {
        let n = verts.len();

        let lu_fwd = self.loop_uses.insert(LoopUseData {
            parent: fu_fwd,
            mate: LoopUseKey::default(),
            orientation,
            boundary: LoopBoundary::Point(VertexUseKey::default()), // patched below
        });
        let lu_bwd = self.loop_uses.insert(LoopUseData {
            parent: fu_bwd,
            mate: lu_fwd,
            orientation,
            boundary: LoopBoundary::Point(VertexUseKey::default()),
        });
        self.loop_uses[lu_fwd].mate = lu_bwd;

        // One forward edge use per vertex, plus its mate on the backward side.
        let mut fwd: SmallVec<[EdgeUseKey; 8]> = SmallVec::with_capacity(n);
        let mut bwd: SmallVec<[EdgeUseKey; 8]> = SmallVec::with_capacity(n);

        for i in 0..n {
            let a = verts[i];
            let b = verts[(i + 1) % n];

            let edge = self.edge_between(a, b).unwrap_or_else(|| {
                self.edges.insert(EdgeData {
                    start: a,
                    end: b,
                    uses: SmallVec::new(),
                })
            });

            let eu = self.edge_uses.insert(EdgeUseData {
                vu: VertexUseKey::default(),
                edge,
                parent: lu_fwd,
                next: EdgeUseKey::default(),
                prev: EdgeUseKey::default(),
                mate: EdgeUseKey::default(),
                radial: EdgeUseKey::default(),
            });
            let eu_mate = self.edge_uses.insert(EdgeUseData {
                vu: VertexUseKey::default(),
                edge,
                parent: lu_bwd,
                next: EdgeUseKey::default(),
                prev: EdgeUseKey::default(),
                mate: eu,
                radial: EdgeUseKey::default(),
            });
            self.edge_uses[eu].mate = eu_mate;

            let vu = self.new_vertex_use(a, VertexUseOwner::Edge(eu), None);
            self.edge_uses[eu].vu = vu;
            let vu_mate = self.new_vertex_use(b, VertexUseOwner::Edge(eu_mate), None);
            self.edge_uses[eu_mate].vu = vu_mate;

            self.edges[edge].uses.push(eu);
            self.edges[edge].uses.push(eu_mate);
            self.relink_radial(edge);

            fwd.push(eu);
            bwd.push(eu_mate);
        }

        // Forward cycle follows vertex order; the mate cycle is its reverse.
        for i in 0..n {
            let next = fwd[(i + 1) % n];
            let prev = fwd[(i + n - 1) % n];
            self.edge_uses[fwd[i]].next = next;
            self.edge_uses[fwd[i]].prev = prev;

            let m_next = bwd[(i + n - 1) % n];
            let m_prev = bwd[(i + 1) % n];
            self.edge_uses[bwd[i]].next = m_next;
            self.edge_uses[bwd[i]].prev = m_prev;
        }

        self.loop_uses[lu_fwd].boundary = LoopBoundary::Edges(fwd[0]);
        self.loop_uses[lu_bwd].boundary = LoopBoundary::Edges(bwd[0]);
        self.face_uses[fu_fwd].loops.push(lu_fwd);
        self.face_uses[fu_bwd].loops.push(lu_bwd);
        lu_fwd
    }

    /// Adds one more boundary loop to an existing face-use pair.
    ///
    /// Vertex order is the traversal order on `fu`'s side. Used when holes
    /// are discovered after the face is built.
    pub fn add_loop_to_face(
        &mut self,
        fu: FaceUseKey,
        verts: &[VertexKey],
        orientation: LoopOrientation,
    ) -> Result<LoopUseKey> {
        let fu_data = self
            .face_uses
            .get(fu)
            .ok_or(Error::FaceUseNotFound(fu))?;
        let fu_mate = fu_data.mate;
        if verts.len() < 2 {
            return Err(Error::DegenerateLoop(verts.len()));
        }
        for (i, &vk) in verts.iter().enumerate() {
            if !self.vertices.contains_key(vk) {
                return Err(Error::VertexNotFound(vk));
            }
            if vk == verts[(i + 1) % verts.len()] {
                return Err(Error::RepeatedVertex(vk));
            }
        }
        Ok(self.add_loop_pair(fu, fu_mate, verts, orientation))
    }

    /// Creates a lone-point loop pair (a single vertex use per side) under
    /// the given face use and its mate.
    pub fn add_point_loop(&mut self, fu: FaceUseKey, vertex: VertexKey) -> Result<LoopUseKey> {
        let fu_data = self
            .face_uses
            .get(fu)
            .ok_or(Error::FaceUseNotFound(fu))?;
        let fu_mate = fu_data.mate;
        if !self.vertices.contains_key(vertex) {
            return Err(Error::VertexNotFound(vertex));
        }

        let lu = self.loop_uses.insert(LoopUseData {
            parent: fu,
            mate: LoopUseKey::default(),
            orientation: LoopOrientation::Outer,
            boundary: LoopBoundary::Point(VertexUseKey::default()),
        });
        let lu_mate = self.loop_uses.insert(LoopUseData {
            parent: fu_mate,
            mate: lu,
            orientation: LoopOrientation::Outer,
            boundary: LoopBoundary::Point(VertexUseKey::default()),
        });
        self.loop_uses[lu].mate = lu_mate;

        let vu = self.new_vertex_use(vertex, VertexUseOwner::Loop(lu), None);
        let vu_mate = self.new_vertex_use(vertex, VertexUseOwner::Loop(lu_mate), None);
        self.loop_uses[lu].boundary = LoopBoundary::Point(vu);
        self.loop_uses[lu_mate].boundary = LoopBoundary::Point(vu_mate);

        self.face_uses[fu].loops.push(lu);
        self.face_uses[fu_mate].loops.push(lu_mate);
        Ok(lu)
    }

    /// Sets the per-use shading normal of a vertex use.
    pub fn set_vertex_use_normal(
        &mut self,
        vu: VertexUseKey,
        normal: Option<Vector3<f64>>,
    ) -> Result<()> {
        let data = self
            .vertex_uses
            .get_mut(vu)
            .ok_or(Error::VertexUseNotFound(vu))?;
        data.normal = normal;
        Ok(())
    }
}

/// Helper to build a single-loop polygonal face, computing the plane normal
/// from the vertices with Newell's method.
///
/// Returns the forward face use.
pub fn make_face(arena: &mut MeshArena, verts: &[VertexKey]) -> Result<FaceUseKey> {
    make_face_with_holes(arena, verts, &[])
}

/// Helper to build a face with an outer boundary and zero or more hole
/// loops. Hole vertex order should wind opposite to the outer loop.
pub fn make_face_with_holes(
    arena: &mut MeshArena,
    outer: &[VertexKey],
    holes: &[Vec<VertexKey>],
) -> Result<FaceUseKey> {
    let normal = newell_normal(arena, outer)?;
    let mut loops = Vec::with_capacity(1 + holes.len());
    loops.push((outer.to_vec(), LoopOrientation::Outer));
    for hole in holes {
        loops.push((hole.clone(), LoopOrientation::Hole));
    }
    arena.add_face_from_loops(&loops, normal)
}

fn newell_normal(arena: &MeshArena, verts: &[VertexKey]) -> Result<Vector3<f64>> {
    if verts.len() < 3 {
        return Err(Error::DegenerateLoop(verts.len()));
    }
    let mut normal = Vector3::<f64>::zeros();
    let n = verts.len();
    for i in 0..n {
        let curr = arena
            .vertex_point(verts[i])
            .ok_or(Error::VertexNotFound(verts[i]))?;
        let next = arena
            .vertex_point(verts[(i + 1) % n])
            .ok_or(Error::VertexNotFound(verts[(i + 1) % n]))?;
        normal.x += (curr.y - next.y) * (curr.z + next.z);
        normal.y += (curr.z - next.z) * (curr.x + next.x);
        normal.z += (curr.x - next.x) * (curr.y + next.y);
    }
    let len = normal.norm();
    if len < 1e-15 {
        return Err(Error::DegenerateLoop(n));
    }
    Ok(normal / len)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(arena: &mut MeshArena) -> [VertexKey; 4] {
        [
            arena.add_vertex(0.0, 0.0, 0.0),
            arena.add_vertex(1.0, 0.0, 0.0),
            arena.add_vertex(1.0, 1.0, 0.0),
            arena.add_vertex(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn face_pair_entity_counts() {
        let mut arena = MeshArena::new();
        let v = square(&mut arena);
        make_face(&mut arena, &v).unwrap();

        assert_eq!(arena.face_count(), 1);
        assert_eq!(arena.face_use_count(), 2);
        assert_eq!(arena.loop_use_count(), 2);
        assert_eq!(arena.edge_count(), 4);
        assert_eq!(arena.edge_use_count(), 8);
        assert_eq!(arena.vertex_use_count(), 8);
    }

    #[test]
    fn face_use_pair_is_mated() {
        let mut arena = MeshArena::new();
        let v = square(&mut arena);
        let fu = make_face(&mut arena, &v).unwrap();

        let fu_data = arena.face_use(fu).unwrap();
        assert_eq!(fu_data.side, FaceSide::Forward);
        let mate = arena.face_use(fu_data.mate).unwrap();
        assert_eq!(mate.side, FaceSide::Backward);
        assert_eq!(mate.mate, fu);
        assert_eq!(arena.face_use_pair(fu_data.face).unwrap()[0], fu);
    }

    #[test]
    fn edge_use_mates_are_symmetric_and_reversed() {
        let mut arena = MeshArena::new();
        let v = square(&mut arena);
        let fu = make_face(&mut arena, &v).unwrap();

        let lu = arena.face_use(fu).unwrap().loops[0];
        let LoopBoundary::Edges(head) = arena.loop_use(lu).unwrap().boundary else {
            panic!("expected edge loop");
        };

        let mut eu = head;
        loop {
            let data = arena.edge_use(eu).unwrap();
            let mate = arena.edge_use(data.mate).unwrap();
            assert_eq!(mate.mate, eu);
            // mate starts where this use ends
            let end = arena.edge_use(data.next).unwrap().vu;
            let end_vertex = arena.vertex_use(end).unwrap().vertex;
            assert_eq!(arena.vertex_use(mate.vu).unwrap().vertex, end_vertex);
            // mate-mirror rule: mate(eu).next == mate(eu.prev)
            assert_eq!(mate.next, arena.edge_use(data.prev).unwrap().mate);

            eu = data.next;
            if eu == head {
                break;
            }
        }
    }

    #[test]
    fn shared_edge_radial_ring_has_four_uses() {
        let mut arena = MeshArena::new();
        let v0 = arena.add_vertex(0.0, 0.0, 0.0);
        let v1 = arena.add_vertex(1.0, 0.0, 0.0);
        let v2 = arena.add_vertex(1.0, 1.0, 0.0);
        let v3 = arena.add_vertex(0.0, 0.0, 1.0);

        make_face(&mut arena, &[v0, v1, v2]).unwrap();
        make_face(&mut arena, &[v1, v0, v3]).unwrap();

        // The v0-v1 edge is shared, not duplicated.
        assert_eq!(arena.edge_count(), 5);
        let shared = arena.edge_between(v0, v1).unwrap();
        assert_eq!(arena.edge(shared).unwrap().uses.len(), 4);

        // The radial ring closes over all four uses.
        let ring_head = arena.edge(shared).unwrap().uses[0];
        let mut seen = 0;
        let mut eu = ring_head;
        loop {
            seen += 1;
            eu = arena.edge_use(eu).unwrap().radial;
            if eu == ring_head {
                break;
            }
        }
        assert_eq!(seen, 4);
    }

    #[test]
    fn degenerate_loop_rejected() {
        let mut arena = MeshArena::new();
        let v0 = arena.add_vertex(0.0, 0.0, 0.0);
        let v1 = arena.add_vertex(1.0, 0.0, 0.0);
        // The plane-deriving helper needs 3 vertices.
        assert!(make_face(&mut arena, &[v0, v1]).is_err());
        // The explicit-normal path accepts a 2-vertex sliver loop (the
        // pruner's job to remove), but nothing smaller.
        assert!(arena
            .add_face_from_loops(
                &[(vec![v0, v1], LoopOrientation::Outer)],
                Vector3::z()
            )
            .is_ok());
        assert!(arena
            .add_face_from_loops(&[(vec![v0], LoopOrientation::Outer)], Vector3::z())
            .is_err());
    }

    #[test]
    fn two_vertex_loop_shares_one_edge() {
        let mut arena = MeshArena::new();
        let v0 = arena.add_vertex(0.0, 0.0, 0.0);
        let v1 = arena.add_vertex(1.0, 0.0, 0.0);
        let fu = arena
            .add_face_from_loops(
                &[(vec![v0, v1], LoopOrientation::Outer)],
                Vector3::z(),
            )
            .unwrap();

        // Out and back over a single edge: 1 edge, 4 uses in its ring.
        assert_eq!(arena.edge_count(), 1);
        let lu = arena.face_use(fu).unwrap().loops[0];
        assert_eq!(arena.loop_edge_count(lu), 2);
        let edge = arena.edge_between(v0, v1).unwrap();
        assert_eq!(arena.edge(edge).unwrap().uses.len(), 4);
    }

    #[test]
    fn consecutive_repeat_rejected() {
        let mut arena = MeshArena::new();
        let v0 = arena.add_vertex(0.0, 0.0, 0.0);
        let v1 = arena.add_vertex(1.0, 0.0, 0.0);
        let v2 = arena.add_vertex(1.0, 1.0, 0.0);
        assert!(make_face(&mut arena, &[v0, v1, v1, v2]).is_err());
    }

    #[test]
    fn point_loop_construction() {
        let mut arena = MeshArena::new();
        let v = square(&mut arena);
        let fu = make_face(&mut arena, &v).unwrap();
        let lone = arena.add_vertex(0.5, 0.5, 0.0);

        let lu = arena.add_point_loop(fu, lone).unwrap();
        let data = arena.loop_use(lu).unwrap();
        assert!(matches!(data.boundary, LoopBoundary::Point(_)));
        assert_eq!(arena.face_use(fu).unwrap().loops.len(), 2);
        // Mate side mirrors the point loop.
        let mate = arena.loop_use(data.mate).unwrap();
        assert!(matches!(mate.boundary, LoopBoundary::Point(_)));
    }

    #[test]
    fn hole_face_has_two_loop_pairs() {
        let mut arena = MeshArena::new();
        let v = square(&mut arena);
        let h = [
            arena.add_vertex(0.4, 0.4, 0.0),
            arena.add_vertex(0.4, 0.6, 0.0),
            arena.add_vertex(0.6, 0.6, 0.0),
            arena.add_vertex(0.6, 0.4, 0.0),
        ];
        let fu = make_face_with_holes(&mut arena, &v, &[h.to_vec()]).unwrap();

        assert_eq!(arena.loop_use_count(), 4);
        let loops = &arena.face_use(fu).unwrap().loops;
        assert_eq!(loops.len(), 2);
        assert_eq!(
            arena.loop_use(loops[0]).unwrap().orientation,
            LoopOrientation::Outer
        );
        assert_eq!(
            arena.loop_use(loops[1]).unwrap().orientation,
            LoopOrientation::Hole
        );
    }
}
