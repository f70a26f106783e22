// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena-based storage for the half-edge (use-layer) B-rep graph.
//!
//! The [`MeshArena`] is the central owner of all topology data. Every entity
//! (vertex, edge, face, and their oriented *uses*) lives inside slot maps
//! with stable, generational keys. The use layer is the interesting part:
//! a [`FaceUseData`] owns ordered [`LoopUseData`]s, a loop use owns a cyclic
//! chain of [`EdgeUseData`]s linked through `next`/`prev`, and every edge use
//! carries a `mate` link (the reverse traversal in the mated loop use) and a
//! `radial` link (the next use around the same undirected edge, across all
//! faces sharing it).
//!
//! Because the mate/radial graph is inherently cyclic, entities reference
//! each other exclusively through keys; all link edits happen in the
//! `surgery` module under invariant checks.

use nalgebra::{Point3, Vector3};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use slotmap::SlotMap;

use crate::keys::*;

/// Orientation tag of a boundary loop: an outer loop contributes positively
/// to the face interior, a hole subtracts from it.
///
/// A loop use and its mate carry the same tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopOrientation {
    Outer,
    Hole,
}

/// Which of the two oriented uses of a face this is. The forward side's
/// loop cycles run counterclockwise about the face normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceSide {
    Forward,
    Backward,
}

/// What owns a vertex use: an edge use (its start vertex) or a lone-point
/// loop use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexUseOwner {
    Edge(EdgeUseKey),
    Loop(LoopUseKey),
}

/// Boundary of a loop use: a cyclic edge-use chain entered at `head`, or a
/// single lone vertex use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopBoundary {
    Edges(EdgeUseKey),
    Point(VertexUseKey),
}

/// Data stored for a vertex: a unique point in 3D space plus the set of
/// vertex uses referencing it (upward adjacency).
#[derive(Debug, Clone)]
pub struct VertexData {
    pub point: Point3<f64>,
    pub(crate) uses: FxHashSet<VertexUseKey>,
}

/// Data stored for an undirected edge: its two endpoint vertices and its
/// directed uses in radial-ring order. Two uses for an edge interior to one
/// face pair, four or more when faces share the edge.
#[derive(Debug, Clone)]
pub struct EdgeData {
    pub start: VertexKey,
    pub end: VertexKey,
    pub(crate) uses: SmallVec<[EdgeUseKey; 4]>,
}

/// Data stored for a face: the plane normal (outward for the forward side)
/// and its two oriented uses.
#[derive(Debug, Clone)]
pub struct FaceData {
    pub normal: Vector3<f64>,
    pub(crate) uses: [FaceUseKey; 2],
}

/// One occurrence of a vertex inside an edge use or lone-point loop.
/// Distinct vertex uses may reference the same vertex. `normal` is the
/// optional per-use shading attribute that topology surgery propagates.
#[derive(Debug, Clone)]
pub struct VertexUseData {
    pub vertex: VertexKey,
    pub owner: VertexUseOwner,
    pub normal: Option<Vector3<f64>>,
}

/// A directed traversal of an edge within one loop use.
///
/// `vu` is the vertex use at the traversal's *start*; the end vertex is the
/// start of `next`. `mate` is the reverse traversal in the parent loop's
/// mate, `radial` the next edge use around the same edge.
#[derive(Debug, Clone)]
pub struct EdgeUseData {
    pub vu: VertexUseKey,
    pub edge: EdgeKey,
    pub parent: LoopUseKey,
    pub next: EdgeUseKey,
    pub prev: EdgeUseKey,
    pub mate: EdgeUseKey,
    pub radial: EdgeUseKey,
}

/// One oriented use of a closed boundary loop of a face use.
#[derive(Debug, Clone)]
pub struct LoopUseData {
    pub parent: FaceUseKey,
    pub mate: LoopUseKey,
    pub orientation: LoopOrientation,
    pub boundary: LoopBoundary,
}

/// One of the two oriented uses of a face, owning an ordered set of loop
/// uses.
#[derive(Debug, Clone)]
pub struct FaceUseData {
    pub face: FaceKey,
    pub side: FaceSide,
    pub mate: FaceUseKey,
    pub loops: Vec<LoopUseKey>,
}

/// The central arena that owns all topology entities.
///
/// # Example
///
/// ```
/// use brep_lite_topology::MeshArena;
///
/// let mut arena = MeshArena::new();
/// let v0 = arena.add_vertex(0.0, 0.0, 0.0);
/// let v1 = arena.add_vertex(1.0, 0.0, 0.0);
/// let v2 = arena.add_vertex(1.0, 1.0, 0.0);
///
/// assert_eq!(arena.vertex_count(), 3);
/// ```
#[derive(Debug)]
pub struct MeshArena {
    pub(crate) vertices: SlotMap<VertexKey, VertexData>,
    pub(crate) edges: SlotMap<EdgeKey, EdgeData>,
    pub(crate) faces: SlotMap<FaceKey, FaceData>,
    pub(crate) vertex_uses: SlotMap<VertexUseKey, VertexUseData>,
    pub(crate) edge_uses: SlotMap<EdgeUseKey, EdgeUseData>,
    pub(crate) loop_uses: SlotMap<LoopUseKey, LoopUseData>,
    pub(crate) face_uses: SlotMap<FaceUseKey, FaceUseData>,
}

impl MeshArena {
    /// Creates a new, empty arena.
    pub fn new() -> Self {
        Self {
            vertices: SlotMap::with_key(),
            edges: SlotMap::with_key(),
            faces: SlotMap::with_key(),
            vertex_uses: SlotMap::with_key(),
            edge_uses: SlotMap::with_key(),
            loop_uses: SlotMap::with_key(),
            face_uses: SlotMap::with_key(),
        }
    }

    // --- Vertex operations ---

    /// Adds a vertex at the given 3D coordinates.
    pub fn add_vertex(&mut self, x: f64, y: f64, z: f64) -> VertexKey {
        self.vertices.insert(VertexData {
            point: Point3::new(x, y, z),
            uses: FxHashSet::default(),
        })
    }

    /// Returns the vertex data for the given key, or `None` if not found.
    pub fn vertex(&self, key: VertexKey) -> Option<&VertexData> {
        self.vertices.get(key)
    }

    /// Returns the position of a vertex.
    pub fn vertex_point(&self, key: VertexKey) -> Option<Point3<f64>> {
        self.vertices.get(key).map(|v| v.point)
    }

    /// Returns the vertex uses currently referencing a vertex.
    pub fn vertex_uses_of(&self, key: VertexKey) -> impl Iterator<Item = VertexUseKey> + '_ {
        self.vertices
            .get(key)
            .into_iter()
            .flat_map(|v| v.uses.iter().copied())
    }

    /// Returns the number of vertices in the arena.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    // --- Edge operations ---

    /// Returns the edge data for the given key, or `None` if not found.
    pub fn edge(&self, key: EdgeKey) -> Option<&EdgeData> {
        self.edges.get(key)
    }

    /// Returns the number of edges in the arena.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Finds the undirected edge between two vertices, if one exists.
    ///
    /// Scans the uses of `a`, so cost is proportional to the valence of `a`.
    pub fn edge_between(&self, a: VertexKey, b: VertexKey) -> Option<EdgeKey> {
        let va = self.vertices.get(a)?;
        for &vu in &va.uses {
            if let VertexUseOwner::Edge(eu) = self.vertex_uses.get(vu)?.owner {
                let ek = self.edge_uses.get(eu)?.edge;
                let edge = &self.edges[ek];
                if (edge.start == a && edge.end == b) || (edge.start == b && edge.end == a) {
                    return Some(ek);
                }
            }
        }
        None
    }

    // --- Face operations ---

    /// Returns the face data for the given key, or `None` if not found.
    pub fn face(&self, key: FaceKey) -> Option<&FaceData> {
        self.faces.get(key)
    }

    /// Returns the two oriented uses of a face as `[forward, backward]`.
    pub fn face_use_pair(&self, key: FaceKey) -> Option<[FaceUseKey; 2]> {
        self.faces.get(key).map(|f| f.uses)
    }

    /// Returns the number of faces in the arena.
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    // --- Use-layer accessors ---

    /// Returns the vertex use data for the given key, or `None` if not found.
    pub fn vertex_use(&self, key: VertexUseKey) -> Option<&VertexUseData> {
        self.vertex_uses.get(key)
    }

    /// Returns the edge use data for the given key, or `None` if not found.
    pub fn edge_use(&self, key: EdgeUseKey) -> Option<&EdgeUseData> {
        self.edge_uses.get(key)
    }

    /// Returns the loop use data for the given key, or `None` if not found.
    pub fn loop_use(&self, key: LoopUseKey) -> Option<&LoopUseData> {
        self.loop_uses.get(key)
    }

    /// Returns the face use data for the given key, or `None` if not found.
    pub fn face_use(&self, key: FaceUseKey) -> Option<&FaceUseData> {
        self.face_uses.get(key)
    }

    /// Returns the number of vertex uses in the arena.
    pub fn vertex_use_count(&self) -> usize {
        self.vertex_uses.len()
    }

    /// Returns the number of edge uses in the arena.
    pub fn edge_use_count(&self) -> usize {
        self.edge_uses.len()
    }

    /// Returns the number of loop uses in the arena.
    pub fn loop_use_count(&self) -> usize {
        self.loop_uses.len()
    }

    /// Returns the number of face uses in the arena.
    pub fn face_use_count(&self) -> usize {
        self.face_uses.len()
    }

    /// Iterates over all face use keys.
    pub fn face_use_keys(&self) -> impl Iterator<Item = FaceUseKey> + '_ {
        self.face_uses.keys()
    }

    /// Iterates over the forward face use of every face.
    pub fn forward_face_uses(&self) -> impl Iterator<Item = FaceUseKey> + '_ {
        self.faces.values().map(|f| f.uses[0])
    }

    // --- Entity existence checks ---

    /// Returns `true` if the given topology key references a valid entity.
    pub fn contains(&self, key: TopoKey) -> bool {
        match key {
            TopoKey::Vertex(k) => self.vertices.contains_key(k),
            TopoKey::Edge(k) => self.edges.contains_key(k),
            TopoKey::Face(k) => self.faces.contains_key(k),
            TopoKey::VertexUse(k) => self.vertex_uses.contains_key(k),
            TopoKey::EdgeUse(k) => self.edge_uses.contains_key(k),
            TopoKey::LoopUse(k) => self.loop_uses.contains_key(k),
            TopoKey::FaceUse(k) => self.face_uses.contains_key(k),
        }
    }

    // --- Vertex-use registration helpers ---

    /// Creates a vertex use of `vertex` and registers it in the vertex's
    /// upward-adjacency set.
    pub(crate) fn new_vertex_use(
        &mut self,
        vertex: VertexKey,
        owner: VertexUseOwner,
        normal: Option<Vector3<f64>>,
    ) -> VertexUseKey {
        let vu = self.vertex_uses.insert(VertexUseData {
            vertex,
            owner,
            normal,
        });
        self.vertices[vertex].uses.insert(vu);
        vu
    }

    /// Removes a vertex use and unregisters it from its vertex.
    pub(crate) fn kill_vertex_use(&mut self, vu: VertexUseKey) {
        if let Some(data) = self.vertex_uses.remove(vu) {
            if let Some(v) = self.vertices.get_mut(data.vertex) {
                v.uses.remove(&vu);
            }
        }
    }

    /// Rewrites the radial links of every use of `edge` to follow the ring
    /// order stored in its `uses` list.
    pub(crate) fn relink_radial(&mut self, edge: EdgeKey) {
        let ring: SmallVec<[EdgeUseKey; 4]> = self.edges[edge].uses.clone();
        let n = ring.len();
        for (i, &eu) in ring.iter().enumerate() {
            self.edge_uses[eu].radial = ring[(i + 1) % n];
        }
    }

    /// Drops an edge use from its edge's radial ring, removing the edge
    /// itself once its ring is empty.
    pub(crate) fn unlink_radial(&mut self, eu: EdgeUseKey) {
        let edge = self.edge_uses[eu].edge;
        let ring = &mut self.edges[edge].uses;
        ring.retain(|&mut u| u != eu);
        if ring.is_empty() {
            self.edges.remove(edge);
        } else {
            self.relink_radial(edge);
        }
    }
}

impl Default for MeshArena {
    fn default() -> Self {
        Self::new()
    }
}
