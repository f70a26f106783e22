// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometric queries on use-layer topology entities.
//!
//! Computes lengths, normals, areas, and winding using standard
//! computational geometry (Newell's method, cross-product sums). All
//! queries are read-only; signed quantities are measured about a caller
//! supplied reference normal so both sides of a face pair can be queried
//! consistently.

use nalgebra::Vector3;

use crate::arena::*;
use crate::keys::*;

/// Winding sense of a loop about a reference normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winding {
    /// Counterclockwise about the normal (positive signed area).
    Ccw,
    /// Clockwise about the normal (negative signed area).
    Cw,
}

impl MeshArena {
    /// Euclidean length of an edge use.
    pub fn edge_use_length(&self, eu: EdgeUseKey) -> Option<f64> {
        let (a, b) = self.edge_use_endpoints(eu)?;
        let pa = self.vertex_point(a)?;
        let pb = self.vertex_point(b)?;
        Some((pb - pa).norm())
    }

    /// Loop normal by Newell's method, normalized.
    ///
    /// Works for any planar polygon (convex or concave); `None` for
    /// lone-point loops and degenerate (zero-area) cycles.
    pub fn loop_newell_normal(&self, lu: LoopUseKey) -> Option<Vector3<f64>> {
        let verts = self.loop_vertices(lu);
        if verts.len() < 3 {
            return None;
        }

        let mut normal = Vector3::<f64>::zeros();
        let n = verts.len();
        for i in 0..n {
            let curr = self.vertex_point(verts[i])?;
            let next = self.vertex_point(verts[(i + 1) % n])?;
            normal.x += (curr.y - next.y) * (curr.z + next.z);
            normal.y += (curr.z - next.z) * (curr.x + next.x);
            normal.z += (curr.x - next.x) * (curr.y + next.y);
        }

        let len = normal.norm();
        if len < 1e-15 {
            return None;
        }
        Some(normal / len)
    }

    /// Signed area of a loop measured about `normal`: positive when the
    /// loop winds counterclockwise about it.
    pub fn loop_area_about(&self, lu: LoopUseKey, normal: &Vector3<f64>) -> Option<f64> {
        let verts = self.loop_vertices(lu);
        if verts.len() < 3 {
            return Some(0.0);
        }

        let p0 = self.vertex_point(verts[0])?;
        let mut total = Vector3::<f64>::zeros();
        for i in 1..verts.len() - 1 {
            let p1 = self.vertex_point(verts[i])?;
            let p2 = self.vertex_point(verts[i + 1])?;
            total += (p1 - p0).cross(&(p2 - p0));
        }
        Some(total.dot(normal) / 2.0)
    }

    /// Winding of a loop about `normal`; `None` when the signed area does
    /// not exceed `eps` in magnitude (residual degeneracy — the caller is
    /// expected to run accordion removal and retry).
    pub fn loop_winding(
        &self,
        lu: LoopUseKey,
        normal: &Vector3<f64>,
        eps: f64,
    ) -> Option<Winding> {
        let area = self.loop_area_about(lu, normal)?;
        if area > eps {
            Some(Winding::Ccw)
        } else if area < -eps {
            Some(Winding::Cw)
        } else {
            None
        }
    }

    /// Net area of a face use: the sum of its loops' signed areas about
    /// the side-adjusted face normal, so outer loops contribute positively
    /// and holes subtract.
    pub fn face_use_area(&self, fu: FaceUseKey) -> Option<f64> {
        let fu_data = self.face_use(fu)?;
        let mut normal = self.face(fu_data.face)?.normal;
        if fu_data.side == FaceSide::Backward {
            normal = -normal;
        }

        let mut total = 0.0;
        for &lu in &fu_data.loops {
            total += self.loop_area_about(lu, &normal)?;
        }
        Some(total)
    }
}
