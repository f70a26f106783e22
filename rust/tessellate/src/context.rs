// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared state of one in-flight face triangulation.

use brep_lite_topology::{EdgeUseKey, FaceUseKey, MeshArena};
use nalgebra::{Point2, Vector3};

use crate::error::Result;
use crate::project::FaceProjection;
use crate::tolerance::Tolerance;

/// Everything a pipeline stage needs while triangulating one face use.
///
/// Exclusively owned by the pass: the projection table in particular must
/// never be shared with another in-flight triangulation.
pub(crate) struct TriContext<'a> {
    pub arena: &'a mut MeshArena,
    pub fu: FaceUseKey,
    /// Side-adjusted unit face normal (outward for this face use).
    pub normal: Vector3<f64>,
    pub proj: FaceProjection,
    pub tol: Tolerance,
}

impl TriContext<'_> {
    /// 2D coordinate of an edge use's start vertex use.
    pub fn start_coord(&self, eu: EdgeUseKey) -> Result<Point2<f64>> {
        let vu = self
            .arena
            .edge_use(eu)
            .ok_or(brep_lite_topology::Error::EdgeUseNotFound(eu))?
            .vu;
        self.proj.coord(vu)
    }
}
