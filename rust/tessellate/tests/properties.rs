// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cross-cutting properties of the triangulation pipeline.

use approx::assert_relative_eq;
use brep_lite_tessellate::{
    triangulate, triangulate_face_use, Error, FaceOutcome, FaceProjection, Tolerance,
};
use brep_lite_tessellate::predicates::exact_eq;
use brep_lite_topology::{
    check::verify_face_use, make_face, make_face_with_holes, FaceUseKey, LoopOrientation,
    MeshArena,
};
use nalgebra::Vector3;

fn total_area(arena: &MeshArena, fu: FaceUseKey) -> f64 {
    let normal = arena.face(arena.face_use(fu).unwrap().face).unwrap().normal;
    arena
        .face_use_loops(fu)
        .into_iter()
        .map(|lu| arena.loop_area_about(lu, &normal).unwrap())
        .sum()
}

/// Every output loop has exactly 3 vertices with consistent outer winding.
#[test]
fn outputs_are_canonical_triangles() {
    let mut arena = MeshArena::new();
    let v = [
        arena.add_vertex(0.0, 0.0, 0.0),
        arena.add_vertex(6.0, 0.0, 0.0),
        arena.add_vertex(6.0, 2.0, 0.0),
        arena.add_vertex(3.0, 1.0, 0.0),
        arena.add_vertex(3.0, 4.0, 0.0),
        arena.add_vertex(0.0, 4.0, 0.0),
    ];
    let fu = make_face(&mut arena, &v).unwrap();
    let normal = arena.face(arena.face_use(fu).unwrap().face).unwrap().normal;

    triangulate_face_use(&mut arena, fu, &Tolerance::default()).unwrap();

    for lu in arena.face_use_loops(fu) {
        assert_eq!(arena.loop_edge_count(lu), 3);
        assert_eq!(arena.distinct_vertex_count(lu), 3);
        assert_eq!(
            arena.loop_use(lu).unwrap().orientation,
            LoopOrientation::Outer
        );
        assert!(arena.loop_area_about(lu, &normal).unwrap() > 0.0);
    }
    verify_face_use(&arena, fu).unwrap();
}

/// Total signed output area equals the original multiply-connected face
/// area within floating tolerance.
#[test]
fn area_is_conserved() {
    let mut arena = MeshArena::new();
    let v = [
        arena.add_vertex(0.0, 0.0, 0.0),
        arena.add_vertex(8.0, 0.0, 0.0),
        arena.add_vertex(8.0, 6.0, 0.0),
        arena.add_vertex(4.0, 2.0, 0.0), // reflex
        arena.add_vertex(0.0, 6.0, 0.0),
    ];
    let h = vec![
        arena.add_vertex(1.0, 1.0, 0.0),
        arena.add_vertex(1.0, 2.0, 0.0),
        arena.add_vertex(2.0, 2.0, 0.0),
        arena.add_vertex(2.0, 1.0, 0.0),
    ];
    let fu = make_face_with_holes(&mut arena, &v, &[h]).unwrap();
    let before = arena.face_use_area(fu).unwrap();

    triangulate_face_use(&mut arena, fu, &Tolerance::default()).unwrap();

    assert_relative_eq!(total_area(&arena, fu), before, epsilon = 1e-9);
}

/// An already-triangulated face passes through untouched, and a second run
/// over a freshly triangulated face changes nothing.
#[test]
fn triangulation_is_idempotent() {
    let mut arena = MeshArena::new();
    let v = [
        arena.add_vertex(0.0, 0.0, 0.0),
        arena.add_vertex(5.0, 0.0, 0.0),
        arena.add_vertex(5.0, 5.0, 0.0),
        arena.add_vertex(0.0, 5.0, 0.0),
    ];
    let fu = make_face(&mut arena, &v).unwrap();

    triangulate_face_use(&mut arena, fu, &Tolerance::default()).unwrap();
    let loops_after = arena.face_use_loops(fu);
    let eu_count = arena.edge_use_count();
    let vu_count = arena.vertex_use_count();

    let outcome = triangulate_face_use(&mut arena, fu, &Tolerance::default()).unwrap();
    assert_eq!(outcome, FaceOutcome::Triangulated);
    assert_eq!(arena.face_use_loops(fu), loops_after);
    assert_eq!(arena.edge_use_count(), eu_count);
    assert_eq!(arena.vertex_use_count(), vu_count);
}

/// An N-vertex convex loop with no holes yields exactly N − 2 triangles.
#[test]
fn convex_polygon_law() {
    for n in 3..=12usize {
        let mut arena = MeshArena::new();
        let verts: Vec<_> = (0..n)
            .map(|i| {
                let theta = (i as f64) * std::f64::consts::TAU / (n as f64);
                arena.add_vertex(theta.cos(), theta.sin(), 0.0)
            })
            .collect();
        let fu = make_face(&mut arena, &verts).unwrap();

        triangulate_face_use(&mut arena, fu, &Tolerance::default()).unwrap();

        assert_eq!(
            arena.face_use_loops(fu).len(),
            n - 2,
            "convex {n}-gon must give {} triangles",
            n - 2
        );
        verify_face_use(&arena, fu).unwrap();
    }
}

/// All uses of one vertex across the loops of a face project to
/// bit-identical 2D coordinates before any cut occurs.
#[test]
fn shared_vertex_projection_law() {
    let mut arena = MeshArena::new();
    // Tilted plane so the projection involves real trigonometry.
    let v = [
        arena.add_vertex(0.0, 0.0, 0.0),
        arena.add_vertex(4.0, 0.0, 2.0),
        arena.add_vertex(4.0, 4.0, 2.0),
        arena.add_vertex(0.0, 4.0, 0.0),
    ];
    // Hole loop pinched onto outer vertices v[0] and v[2]: those vertices
    // get several uses each.
    let h = vec![
        v[0],
        arena.add_vertex(1.0, 2.0, 0.5),
        v[2],
        arena.add_vertex(3.0, 2.0, 1.5),
    ];
    let fu = make_face_with_holes(&mut arena, &v, &[h]).unwrap();

    let tol = Tolerance::default();
    let proj = FaceProjection::build(&arena, fu, &tol).unwrap();

    for vk in [v[0], v[2]] {
        let coords: Vec<_> = arena
            .vertex_uses_of(vk)
            .filter(|&vu| proj.contains(vu))
            .map(|vu| proj.coord(vu).unwrap())
            .collect();
        assert_eq!(coords.len(), 2);
        assert!(
            exact_eq(&coords[0], &coords[1]),
            "uses of one vertex must project bit-identically"
        );
    }
}

/// Mesh-wide triangulation continues past input-geometry failures and
/// reports them per face.
#[test]
fn mesh_run_reports_bad_faces_and_continues() {
    let mut arena = MeshArena::new();

    // Good face.
    let g = [
        arena.add_vertex(0.0, 0.0, 0.0),
        arena.add_vertex(1.0, 0.0, 0.0),
        arena.add_vertex(1.0, 1.0, 0.0),
        arena.add_vertex(0.0, 1.0, 0.0),
    ];
    let good = make_face(&mut arena, &g).unwrap();

    // Bad face: two coincident but unfused vertices make a zero-length
    // edge.
    let b = [
        arena.add_vertex(5.0, 0.0, 0.0),
        arena.add_vertex(6.0, 0.0, 0.0),
        arena.add_vertex(6.0, 0.0, 0.0),
        arena.add_vertex(5.5, 1.0, 0.0),
    ];
    let bad = arena
        .add_face_from_loops(&[(b.to_vec(), LoopOrientation::Outer)], Vector3::z())
        .unwrap();

    let err = triangulate(&mut arena, &Tolerance::default()).unwrap_err();
    let Error::FacesFailed(failures) = err else {
        panic!("expected per-face failure report");
    };
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].face_use, bad);
    assert!(failures[0].error.is_input_geometry());

    // The good face was still triangulated.
    assert_eq!(arena.face_use_loops(good).len(), 2);
    for lu in arena.face_use_loops(good) {
        assert_eq!(arena.loop_edge_count(lu), 3);
    }
}

/// A clean mesh triangulates with `Ok(())`.
#[test]
fn mesh_run_ok_on_clean_input() {
    let mut arena = MeshArena::new();
    for i in 0..3 {
        let dx = 3.0 * i as f64;
        let v = [
            arena.add_vertex(dx, 0.0, 0.0),
            arena.add_vertex(dx + 2.0, 0.0, 0.0),
            arena.add_vertex(dx + 2.0, 2.0, 0.0),
            arena.add_vertex(dx, 2.0, 0.0),
        ];
        make_face(&mut arena, &v).unwrap();
    }

    triangulate(&mut arena, &Tolerance::default()).unwrap();

    for fu in arena.forward_face_uses().collect::<Vec<_>>() {
        for lu in arena.face_use_loops(fu) {
            assert_eq!(arena.loop_edge_count(lu), 3);
        }
    }
}
