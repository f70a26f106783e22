// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # BRep-Lite Tessellate
//!
//! Face triangulation for B-rep solids: flattens each planar face into 2D,
//! merges hole loops into their outer loops, ear-clips every loop down to
//! triangles, and normalizes the result to consistent outer winding — all
//! by mutating the live half-edge graph of `brep-lite-topology` under its
//! mate/radial invariants.
//!
//! The programmatic surface is [`triangulate`] for a whole mesh and
//! [`triangulate_face_use`] for a single face, both driven by a
//! [`Tolerance`] bundle supplying the one distance and one angular
//! tolerance used throughout.

mod accordion;
pub mod classify;
mod context;
mod cutjoin;
mod earclip;
pub mod error;
mod holes;
mod orient;
pub mod predicates;
pub mod project;
mod prune;
pub mod tolerance;
pub mod triangulate;

pub use classify::Classification;
pub use error::{Error, ErrorCategory, FaceFailure, Result};
pub use project::FaceProjection;
pub use tolerance::Tolerance;
pub use triangulate::{triangulate, triangulate_face_use, FaceOutcome};
