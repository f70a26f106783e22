// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D projection of a face use and the per-pass projection table.
//!
//! A [`FaceProjection`] is created at the start of one face's triangulation
//! and discarded when it finishes. It owns:
//! - the rotation taking the face normal onto +z (identity when the normal
//!   is already canonical within the angular tolerance);
//! - an arena of projected 2D points plus an O(1) map from vertex-use key
//!   to point index;
//! - a per-vertex index guaranteeing that every use of one vertex maps to
//!   a *bit-identical* coordinate — shared corners must not drift apart
//!   through repeated trigonometry;
//! - a scan-ordered view (decreasing y, then increasing x, ties within the
//!   distance tolerance) used to seed ear walks.

use brep_lite_topology::{FaceSide, LoopUseKey, MeshArena, VertexKey, VertexUseKey};
use nalgebra::{Point2, Rotation3, Vector3};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{Error, Result};
use crate::predicates::scan_cmp;
use crate::tolerance::Tolerance;

/// The ephemeral 2D projection of one face use.
#[derive(Debug)]
pub struct FaceProjection {
    rotation: Rotation3<f64>,
    pts: Vec<Point2<f64>>,
    by_use: FxHashMap<VertexUseKey, usize>,
    by_vertex: FxHashMap<VertexKey, usize>,
    order: Vec<VertexUseKey>,
    dist_tol: f64,
}

impl FaceProjection {
    /// Projects every vertex use reachable from `fu` into the face plane.
    ///
    /// Fails with [`Error::DegenerateNormal`] when the face normal cannot
    /// be normalized, and with [`Error::UnfusedVertices`] when two distinct
    /// vertices land within the distance tolerance of each other (the
    /// producer was required to fuse them).
    pub fn build(
        arena: &MeshArena,
        fu: brep_lite_topology::FaceUseKey,
        tol: &Tolerance,
    ) -> Result<Self> {
        let fu_data = arena.face_use(fu).ok_or(Error::FaceUseNotFound(fu))?;
        let face = arena
            .face(fu_data.face)
            .ok_or(Error::FaceUseNotFound(fu))?;
        let mut normal = face.normal;
        if fu_data.side == FaceSide::Backward {
            normal = -normal;
        }

        let len = normal.norm();
        if !len.is_finite() || len < 1e-12 {
            return Err(Error::DegenerateNormal { face_use: fu });
        }
        let n = normal / len;

        let z = Vector3::z();
        let rotation = if n.angle(&z) <= tol.angular {
            Rotation3::identity()
        } else {
            Rotation3::rotation_between(&n, &z).unwrap_or_else(|| {
                // Antiparallel: flip about x.
                Rotation3::from_axis_angle(&Vector3::x_axis(), std::f64::consts::PI)
            })
        };

        let mut proj = Self {
            rotation,
            pts: Vec::new(),
            by_use: FxHashMap::default(),
            by_vertex: FxHashMap::default(),
            order: Vec::new(),
            dist_tol: tol.dist,
        };

        for vu in arena.face_use_vertex_uses(fu) {
            proj.insert_use(arena, vu)?;
        }
        proj.check_fused(arena)?;

        debug!(?fu, points = proj.pts.len(), "built face projection");
        Ok(proj)
    }

    /// Projects one vertex use, reusing the exact 2D coordinate of any
    /// previously projected use of the same vertex. Idempotent.
    pub fn insert_use(&mut self, arena: &MeshArena, vu: VertexUseKey) -> Result<()> {
        if self.by_use.contains_key(&vu) {
            return Ok(());
        }
        let data = arena
            .vertex_use(vu)
            .ok_or(brep_lite_topology::Error::VertexUseNotFound(vu))?;

        let idx = match self.by_vertex.get(&data.vertex) {
            Some(&idx) => idx,
            None => {
                let p3 = arena
                    .vertex_point(data.vertex)
                    .ok_or(brep_lite_topology::Error::VertexNotFound(data.vertex))?;
                let q = self.rotation * p3;
                let idx = self.pts.len();
                self.pts.push(Point2::new(q.x, q.y));
                self.by_vertex.insert(data.vertex, idx);
                idx
            }
        };
        self.by_use.insert(vu, idx);

        let coord = self.pts[idx];
        let pos = self
            .order
            .partition_point(|&other| {
                let other_coord = self.pts[self.by_use[&other]];
                scan_cmp(&other_coord, &coord, self.dist_tol) == std::cmp::Ordering::Less
            });
        self.order.insert(pos, vu);
        Ok(())
    }

    /// Drops a vertex use from the table (after surgery removed it).
    pub fn remove_use(&mut self, vu: VertexUseKey) {
        if self.by_use.remove(&vu).is_some() {
            self.order.retain(|&u| u != vu);
        }
    }

    /// The 2D coordinate of a vertex use. A missing entry is a topology
    /// consistency failure, not a recoverable condition.
    pub fn coord(&self, vu: VertexUseKey) -> Result<Point2<f64>> {
        self.by_use
            .get(&vu)
            .map(|&idx| self.pts[idx])
            .ok_or(Error::MissingProjection { vertex_use: vu })
    }

    /// `true` when the table has an entry for the vertex use.
    pub fn contains(&self, vu: VertexUseKey) -> bool {
        self.by_use.contains_key(&vu)
    }

    /// The shared 2D coordinate of a vertex, if any of its uses was
    /// projected. All uses of one vertex share this exact value.
    pub fn vertex_coord(&self, v: VertexKey) -> Option<Point2<f64>> {
        self.by_vertex.get(&v).map(|&idx| self.pts[idx])
    }

    /// Number of registered vertex uses.
    pub fn len(&self) -> usize {
        self.by_use.len()
    }

    /// `true` when no vertex use is registered.
    pub fn is_empty(&self) -> bool {
        self.by_use.is_empty()
    }

    /// Vertex uses in scan order (decreasing y, then increasing x).
    pub fn scan_order(&self) -> &[VertexUseKey] {
        &self.order
    }

    /// The edge use of `lu` whose start vertex scans first.
    pub fn scan_max_of_loop(
        &self,
        arena: &MeshArena,
        lu: LoopUseKey,
    ) -> Result<brep_lite_topology::EdgeUseKey> {
        let mut best: Option<(brep_lite_topology::EdgeUseKey, Point2<f64>)> = None;
        for eu in arena.loop_edge_uses(lu) {
            let vu = arena
                .edge_use(eu)
                .ok_or(brep_lite_topology::Error::EdgeUseNotFound(eu))?
                .vu;
            let coord = self.coord(vu)?;
            let better = match &best {
                None => true,
                Some((_, best_coord)) => {
                    scan_cmp(&coord, best_coord, self.dist_tol) == std::cmp::Ordering::Less
                }
            };
            if better {
                best = Some((eu, coord));
            }
        }
        best.map(|(eu, _)| eu)
            .ok_or(Error::Topology(brep_lite_topology::Error::LoopUseNotFound(lu)))
    }

    /// Re-registers every vertex use of a loop (after an orientation swap
    /// moved the loop onto this side of the face pair).
    pub fn reregister_loop(&mut self, arena: &MeshArena, lu: LoopUseKey) -> Result<()> {
        for vu in arena.loop_vertex_uses(lu) {
            self.insert_use(arena, vu)?;
        }
        Ok(())
    }

    /// Scans for distinct vertices projecting within tolerance of each
    /// other — un-fused input the producer should have merged.
    fn check_fused(&self, arena: &MeshArena) -> Result<()> {
        for pair in self.order.windows(2) {
            let (vu_a, vu_b) = (pair[0], pair[1]);
            let va = arena
                .vertex_use(vu_a)
                .ok_or(brep_lite_topology::Error::VertexUseNotFound(vu_a))?
                .vertex;
            let vb = arena
                .vertex_use(vu_b)
                .ok_or(brep_lite_topology::Error::VertexUseNotFound(vu_b))?
                .vertex;
            if va == vb {
                continue;
            }
            let pa = self.pts[self.by_use[&vu_a]];
            let pb = self.pts[self.by_use[&vu_b]];
            if (pa - pb).norm() <= self.dist_tol {
                return Err(Error::UnfusedVertices { a: va, b: vb });
            }
        }
        Ok(())
    }
}
