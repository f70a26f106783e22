// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Traversal queries over the use-layer graph.
//!
//! All iteration is key-based and read-only. Cyclic chains (loop edge uses,
//! radial rings) are walked once around from their entry point; the
//! iterators carry a step budget equal to the arena's total use count so a
//! corrupt cycle cannot hang a traversal (the `check` module is the place
//! that reports such corruption).

use rustc_hash::FxHashSet;

use crate::arena::*;
use crate::keys::*;

/// Iterator over the edge uses of one loop use, in cycle order.
pub struct LoopEdgeUses<'a> {
    arena: &'a MeshArena,
    head: EdgeUseKey,
    cur: Option<EdgeUseKey>,
    remaining: usize,
}

impl<'a> Iterator for LoopEdgeUses<'a> {
    type Item = EdgeUseKey;

    fn next(&mut self) -> Option<EdgeUseKey> {
        let cur = self.cur?;
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let next = self.arena.edge_use(cur)?.next;
        self.cur = if next == self.head { None } else { Some(next) };
        Some(cur)
    }
}

/// Iterator over the radial ring of an edge, in ring order.
pub struct RadialRing<'a> {
    arena: &'a MeshArena,
    head: EdgeUseKey,
    cur: Option<EdgeUseKey>,
    remaining: usize,
}

impl<'a> Iterator for RadialRing<'a> {
    type Item = EdgeUseKey;

    fn next(&mut self) -> Option<EdgeUseKey> {
        let cur = self.cur?;
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let next = self.arena.edge_use(cur)?.radial;
        self.cur = if next == self.head { None } else { Some(next) };
        Some(cur)
    }
}

impl MeshArena {
    /// Iterates the edge uses of a loop use in cycle order. Empty for
    /// lone-point loops.
    pub fn loop_edge_uses(&self, lu: LoopUseKey) -> LoopEdgeUses<'_> {
        let head = match self.loop_use(lu).map(|l| l.boundary) {
            Some(LoopBoundary::Edges(head)) => Some(head),
            _ => None,
        };
        LoopEdgeUses {
            arena: self,
            head: head.unwrap_or_default(),
            cur: head,
            remaining: self.edge_use_count(),
        }
    }

    /// Returns the vertex uses of a loop use in cycle order. A lone-point
    /// loop yields its single vertex use.
    pub fn loop_vertex_uses(&self, lu: LoopUseKey) -> Vec<VertexUseKey> {
        match self.loop_use(lu).map(|l| l.boundary) {
            Some(LoopBoundary::Edges(_)) => self
                .loop_edge_uses(lu)
                .filter_map(|eu| self.edge_use(eu).map(|d| d.vu))
                .collect(),
            Some(LoopBoundary::Point(vu)) => vec![vu],
            None => Vec::new(),
        }
    }

    /// Returns the vertices of a loop use in cycle order (with repetition
    /// if the loop visits a vertex more than once).
    pub fn loop_vertices(&self, lu: LoopUseKey) -> Vec<VertexKey> {
        self.loop_vertex_uses(lu)
            .into_iter()
            .filter_map(|vu| self.vertex_use(vu).map(|d| d.vertex))
            .collect()
    }

    /// Number of edge uses in a loop use (0 for lone-point loops).
    pub fn loop_edge_count(&self, lu: LoopUseKey) -> usize {
        self.loop_edge_uses(lu).count()
    }

    /// Number of distinct vertices referenced by a loop use.
    pub fn distinct_vertex_count(&self, lu: LoopUseKey) -> usize {
        let mut seen: FxHashSet<VertexKey> = FxHashSet::default();
        for vk in self.loop_vertices(lu) {
            seen.insert(vk);
        }
        seen.len()
    }

    /// Start and end vertices of an edge use, in traversal order.
    pub fn edge_use_endpoints(&self, eu: EdgeUseKey) -> Option<(VertexKey, VertexKey)> {
        let data = self.edge_use(eu)?;
        let start = self.vertex_use(data.vu)?.vertex;
        let end_vu = self.edge_use(data.next)?.vu;
        let end = self.vertex_use(end_vu)?.vertex;
        Some((start, end))
    }

    /// Iterates the radial ring of an edge from its first recorded use.
    pub fn radial_ring(&self, edge: EdgeKey) -> RadialRing<'_> {
        let head = self.edge(edge).and_then(|e| e.uses.first().copied());
        RadialRing {
            arena: self,
            head: head.unwrap_or_default(),
            cur: head,
            remaining: self.edge_use_count(),
        }
    }

    /// Returns the loop uses of a face use, in ownership order.
    pub fn face_use_loops(&self, fu: FaceUseKey) -> Vec<LoopUseKey> {
        self.face_use(fu).map(|f| f.loops.clone()).unwrap_or_default()
    }

    /// Returns every vertex use reachable from a face use's loops.
    pub fn face_use_vertex_uses(&self, fu: FaceUseKey) -> Vec<VertexUseKey> {
        self.face_use_loops(fu)
            .into_iter()
            .flat_map(|lu| self.loop_vertex_uses(lu))
            .collect()
    }

    /// Finds a vertex shared between two loop uses, if any.
    pub fn shared_vertex(&self, a: LoopUseKey, b: LoopUseKey) -> Option<VertexKey> {
        let in_a: FxHashSet<VertexKey> = self.loop_vertices(a).into_iter().collect();
        self.loop_vertices(b).into_iter().find(|vk| in_a.contains(vk))
    }
}
