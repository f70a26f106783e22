// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error taxonomy for the triangulation pipeline.
//!
//! Three categories with very different handling:
//! - [`ErrorCategory::InputGeometry`] — expected on real-world input;
//!   reported per face so the caller can skip or flag the face and keep
//!   going with the rest of the mesh.
//! - [`ErrorCategory::AlgorithmInvariant`] — a bug in this subsystem;
//!   the whole triangulation call fails.
//! - [`ErrorCategory::TopologyConsistency`] — the half-edge graph violated
//!   an invariant mid-pass; also fatal for the whole call, since continuing
//!   would silently corrupt the mesh.

use brep_lite_topology::{EdgeUseKey, FaceUseKey, LoopUseKey, VertexKey, VertexUseKey};
use thiserror::Error;

/// Result type for triangulation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of a triangulation error, driving whether the
/// caller may continue with other faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    InputGeometry,
    AlgorithmInvariant,
    TopologyConsistency,
}

/// One face that failed triangulation, with its identity and cause.
#[derive(Debug)]
pub struct FaceFailure {
    pub face_use: FaceUseKey,
    pub error: Error,
}

/// Errors that can occur during face triangulation.
#[derive(Debug, Error)]
pub enum Error {
    /// Edge shorter than the distance tolerance: the producer failed to
    /// fuse its endpoints.
    #[error("zero-length edge use {edge_use:?} (un-fused input geometry)")]
    ZeroLengthEdge { edge_use: EdgeUseKey },

    /// Two distinct vertices project within tolerance of each other.
    #[error("vertices {a:?} and {b:?} coincide within tolerance but are not fused")]
    UnfusedVertices { a: VertexKey, b: VertexKey },

    /// The face plane normal is degenerate; projection is undefined.
    #[error("face use {face_use:?} has a degenerate plane normal")]
    DegenerateNormal { face_use: FaceUseKey },

    /// Pruning removed every loop of the face.
    #[error("face use {face_use:?} reduced to fewer than 3 distinct vertices")]
    FaceEmptied { face_use: FaceUseKey },

    /// Every candidate hole-to-outer diagonal crosses an existing edge.
    #[error("no non-crossing diagonal joins hole loop {hole:?} to an outer loop")]
    NoFeasibleDiagonal { hole: LoopUseKey },

    /// The ear search ran past its quadratic iteration budget.
    #[error("ear-clipping iteration budget exhausted on loop use {loop_use:?} ({budget} steps)")]
    EarBudgetExceeded { loop_use: LoopUseKey, budget: usize },

    /// Neither cut nor its join fallback could resolve the endpoints.
    #[error("cut endpoints {p1:?} and {p2:?} could not be disambiguated to edge uses")]
    CutDisambiguation { p1: VertexUseKey, p2: VertexUseKey },

    /// A reachable vertex use has no entry in the projection table.
    #[error("vertex use {vertex_use:?} has no projection entry")]
    MissingProjection { vertex_use: VertexUseKey },

    /// The requested face use does not exist.
    #[error("face use {0:?} not found")]
    FaceUseNotFound(FaceUseKey),

    /// A tolerance bundle parameter was not strictly positive.
    #[error("tolerance out of range: {0}")]
    InvalidTolerance(String),

    /// The topology layer rejected a surgery or traversal.
    #[error(transparent)]
    Topology(#[from] brep_lite_topology::Error),

    /// Aggregate of per-face input-geometry failures from a mesh-wide run.
    #[error("triangulation failed for {} face(s)", .0.len())]
    FacesFailed(Vec<FaceFailure>),
}

impl Error {
    /// The handling category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::ZeroLengthEdge { .. }
            | Error::UnfusedVertices { .. }
            | Error::DegenerateNormal { .. }
            | Error::FaceEmptied { .. }
            | Error::NoFeasibleDiagonal { .. }
            | Error::InvalidTolerance(_)
            | Error::FacesFailed(_) => ErrorCategory::InputGeometry,

            Error::EarBudgetExceeded { .. } | Error::CutDisambiguation { .. } => {
                ErrorCategory::AlgorithmInvariant
            }

            Error::MissingProjection { .. }
            | Error::FaceUseNotFound(_)
            | Error::Topology(_) => ErrorCategory::TopologyConsistency,
        }
    }

    /// `true` for errors a mesh-wide run may report per face and continue.
    pub fn is_input_geometry(&self) -> bool {
        self.category() == ErrorCategory::InputGeometry
    }
}
