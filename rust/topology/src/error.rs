// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for topology operations.

use crate::keys::*;

/// Result type alias for topology operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during topology operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A referenced topology entity was not found in the arena.
    #[error("topology entity not found: {0:?}")]
    NotFound(TopoKey),

    /// Vertex key not found in the arena.
    #[error("vertex not found: {0:?}")]
    VertexNotFound(VertexKey),

    /// Edge use key not found in the arena.
    #[error("edge use not found: {0:?}")]
    EdgeUseNotFound(EdgeUseKey),

    /// Vertex use key not found in the arena.
    #[error("vertex use not found: {0:?}")]
    VertexUseNotFound(VertexUseKey),

    /// Loop use key not found in the arena.
    #[error("loop use not found: {0:?}")]
    LoopUseNotFound(LoopUseKey),

    /// Face use key not found in the arena.
    #[error("face use not found: {0:?}")]
    FaceUseNotFound(FaceUseKey),

    /// A boundary loop needs at least 2 vertices (or 3 for helpers that
    /// derive a plane from them).
    #[error("loop has too few vertices ({0})")]
    DegenerateLoop(usize),

    /// Two consecutive loop vertices are the same vertex.
    #[error("loop repeats vertex {0:?} consecutively")]
    RepeatedVertex(VertexKey),

    /// A face must have at least one boundary loop.
    #[error("face has no boundary loops")]
    EmptyFace,

    /// Both endpoints of a split must lie in the same loop use.
    #[error("edge uses {0:?} and {1:?} belong to different loop uses")]
    NotSameLoop(EdgeUseKey, EdgeUseKey),

    /// Both loops of a merge must belong to the same face use.
    #[error("loop uses {0:?} and {1:?} belong to different face uses")]
    NotSameFaceUse(LoopUseKey, LoopUseKey),

    /// A split was asked to run between an edge use and itself.
    #[error("cannot split loop use {0:?} at a single edge use")]
    SplitAtSelf(LoopUseKey),

    /// Jaunt excision was pointed at an edge use that does not start one.
    #[error("edge use {0:?} does not start a zero-area jaunt")]
    NotAJaunt(EdgeUseKey),

    /// A shared-vertex merge was given edge uses starting at different
    /// vertices.
    #[error("edge uses {0:?} and {1:?} do not start at a shared vertex")]
    NoSharedVertex(EdgeUseKey, EdgeUseKey),

    /// A bridge join needs two distinct endpoint vertices.
    #[error("bridge endpoints both reference vertex {0:?}")]
    BridgeSameVertex(VertexKey),

    /// An edge's radial ring does not close or contains foreign uses.
    #[error("radial ring of edge {0:?} is corrupt")]
    RadialRingCorrupt(EdgeKey),

    /// An edge use's mate link is missing or asymmetric.
    #[error("mate link of edge use {0:?} is corrupt")]
    MateCorrupt(EdgeUseKey),

    /// A loop's next/prev cycle does not close back on itself.
    #[error("edge-use cycle of loop use {0:?} is corrupt")]
    CycleCorrupt(LoopUseKey),

    /// An edge use is parented under the wrong loop use.
    #[error("edge use {0:?} has wrong parent (expected {1:?})")]
    WrongParent(EdgeUseKey, LoopUseKey),

    /// A vertex use is not registered with its vertex.
    #[error("vertex use {0:?} is not registered on vertex {1:?}")]
    UnregisteredVertexUse(VertexUseKey, VertexKey),
}
