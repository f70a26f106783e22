// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # BRep-Lite Topology
//!
//! Arena-based half-edge (use-layer) topology for B-rep solid modeling.
//!
//! This crate provides the mesh data structure that the tessellation
//! pipeline mutates: vertices, edges, and faces, plus their oriented *uses*
//! — vertex uses, edge uses (with mate and radial links), loop uses, and
//! face uses — all stored in slot maps with stable generational keys.
//! Topology surgery (loop split, shared-vertex merge, keyhole bridge, edge
//! use excision, side swapping) keeps the mate and radial invariants intact
//! at every return point; the `check` module verifies them explicitly.

pub mod arena;
pub mod check;
pub mod construction;
pub mod error;
pub mod geometry;
pub mod keys;
pub mod surgery;
pub mod traversal;

pub use arena::{
    EdgeData, EdgeUseData, FaceData, FaceSide, FaceUseData, LoopBoundary, LoopOrientation,
    LoopUseData, MeshArena, VertexData, VertexUseData, VertexUseOwner,
};
pub use construction::{make_face, make_face_with_holes};
pub use error::{Error, Result};
pub use geometry::Winding;
pub use keys::{
    EdgeKey, EdgeUseKey, FaceKey, FaceUseKey, LoopUseKey, TopoKey, TopoType, VertexKey,
    VertexUseKey,
};
pub use surgery::{Excision, LoopBridge, LoopSplit};
