use approx::assert_relative_eq;
use brick_kernel::{
    Kernel, KernelId, KernelIntrospect, KernelSolidHandle, MockKernel, ShellSide, Sketch,
    TruckKernel, Workplane,
};
use brick_types::{Axis, EdgeSelector, FaceSelector, SketchMode};
use modeling_ops::boolean::{
    execute_boolean, execute_union_all, require_single_lump, BooleanKind,
};
use modeling_ops::chamfer::execute_chamfer;
use modeling_ops::diff::{self, congruent};
use modeling_ops::extrude::{execute_extrude, execute_symmetric_extrude};
use modeling_ops::fillet::execute_fillet;
use modeling_ops::select::{select_edges, select_faces};
use modeling_ops::shell::execute_shell;
use modeling_ops::sweep::execute_sweep;
use modeling_ops::types::OpError;

/// Helper: a centered `w × h × d` block standing on z = `z0`.
fn block(kernel: &mut MockKernel, w: f64, h: f64, d: f64, z0: f64) -> KernelSolidHandle {
    let sketch = Sketch::new().rect(w, h, SketchMode::Add);
    execute_extrude(kernel, &sketch, &Workplane::xy_at(z0), d)
        .unwrap()
        .handle
}

// ── Snapshot Tests ────────────────────────────────────────────────────────

#[test]
fn snapshot_captures_correct_entity_counts() {
    let mut kernel = MockKernel::new();
    let handle = block(&mut kernel, 2.0, 3.0, 5.0, 0.0);

    let snap = diff::snapshot(&kernel, &handle);
    assert_eq!(snap.faces.len(), 6, "Box has 6 faces");
    assert_eq!(snap.edges.len(), 12, "Box has 12 edges");
    assert_eq!(snap.vertices.len(), 8, "Box has 8 vertices");
}

#[test]
fn congruent_blocks_in_separate_kernels() {
    let mut k1 = MockKernel::new();
    let mut k2 = MockKernel::new();
    // Allocate something first so ids differ between the kernels.
    block(&mut k2, 1.0, 1.0, 1.0, 50.0);
    let a = block(&mut k1, 3.0, 2.0, 1.0, 0.0);
    let b = block(&mut k2, 3.0, 2.0, 1.0, 0.0);

    let sa = diff::snapshot(&k1, &a);
    let sb = diff::snapshot(&k2, &b);
    assert!(congruent(&sa, &sb, 1e-6));
}

#[test]
fn congruence_detects_moved_solid() {
    let mut kernel = MockKernel::new();
    let a = block(&mut kernel, 3.0, 2.0, 1.0, 0.0);
    let b = block(&mut kernel, 3.0, 2.0, 1.0, 0.5);
    let sa = diff::snapshot(&kernel, &a);
    let sb = diff::snapshot(&kernel, &b);
    assert!(!congruent(&sa, &sb, 1e-6));
}

// ── Extrude Tests ──────────────────────────────────────────────────────────

#[test]
fn extrude_rect_gives_box() {
    let mut kernel = MockKernel::new();
    let sketch = Sketch::new().rect(2.0, 3.0, SketchMode::Add);
    let result = execute_extrude(&mut kernel, &sketch, &Workplane::xy(), 5.0).unwrap();

    assert_eq!(result.diagnostics.faces_after, 6);
    let bb = kernel.bounding_box(&result.handle).unwrap();
    assert_eq!(bb.to_array(), [-1.0, -1.5, 0.0, 1.0, 1.5, 5.0]);
}

#[test]
fn extrude_array_fuses_regions() {
    let mut kernel = MockKernel::new();
    let sketch = Sketch::new()
        .rarray(16.0, 16.0, 2, 3)
        .circle(4.75, SketchMode::Add)
        .circle(3.55, SketchMode::Subtract);
    let result = execute_extrude(&mut kernel, &sketch, &Workplane::xy_at(9.4), 1.8).unwrap();

    // Six separate hollow posts: four faces each.
    assert_eq!(result.diagnostics.faces_after, 24);
    assert_eq!(kernel.list_lumps(&result.handle).len(), 6);
    assert!(result.diagnostics.warnings.iter().any(|w| w.contains("disjoint")));
}

#[test]
fn extrude_empty_sketch_returns_no_faces() {
    let mut kernel = MockKernel::new();
    let result = execute_extrude(&mut kernel, &Sketch::new(), &Workplane::xy(), 1.0);
    assert!(matches!(result, Err(OpError::NoFaces)));
}

#[test]
fn extrude_rejects_non_positive_depth() {
    let mut kernel = MockKernel::new();
    let sketch = Sketch::new().rect(1.0, 1.0, SketchMode::Add);
    for depth in [0.0, -1.0, f64::NAN] {
        let result = execute_extrude(&mut kernel, &sketch, &Workplane::xy(), depth);
        assert!(matches!(result, Err(OpError::InvalidParameter { .. })));
    }
}

#[test]
fn symmetric_extrude_is_centered_on_plane() {
    let mut kernel = MockKernel::new();
    let sketch = Sketch::new().polygon(
        &[[-5.0, 0.0], [5.0, 0.0], [5.0, 4.0], [-5.0, 2.0]],
        SketchMode::Add,
    );
    let result = execute_symmetric_extrude(&mut kernel, &sketch, &Workplane::yz(), 3.0).unwrap();

    let bb = kernel.bounding_box(&result.handle).unwrap();
    assert_relative_eq!(bb.min[0], -3.0, epsilon = 1e-9);
    assert_relative_eq!(bb.max[0], 3.0, epsilon = 1e-9);
    assert_relative_eq!(bb.min[1], -5.0, epsilon = 1e-9);
    assert_relative_eq!(bb.max[2], 4.0, epsilon = 1e-9);
}

// ── Sweep Tests ────────────────────────────────────────────────────────────

#[test]
fn sweep_circle_spans_path() {
    let mut kernel = MockKernel::new();
    let path = [[0.0, -10.0, 5.0], [0.0, 0.0, 5.0], [0.0, 10.0, 5.0]];
    let plane = Workplane::new(path[0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]);
    let sketch = Sketch::new().circle(2.0, SketchMode::Add);
    let result = execute_sweep(&mut kernel, &sketch, &plane, &path).unwrap();

    let bb = kernel.bounding_box(&result.handle).unwrap();
    assert!(bb.min[1] < -9.9 && bb.max[1] > 9.9);
    assert_relative_eq!(bb.max[2], 7.0, epsilon = 1e-9);
}

#[test]
fn sweep_needs_two_points() {
    let mut kernel = MockKernel::new();
    let sketch = Sketch::new().circle(1.0, SketchMode::Add);
    let result = execute_sweep(&mut kernel, &sketch, &Workplane::xy(), &[[0.0; 3]]);
    assert!(matches!(result, Err(OpError::InvalidParameter { .. })));
}

// ── Boolean Tests ──────────────────────────────────────────────────────────

#[test]
fn boolean_union_of_stacked_blocks_is_one_lump() {
    let mut kernel = MockKernel::new();
    let plate = block(&mut kernel, 10.0, 10.0, 1.0, 0.0);
    let peg = block(&mut kernel, 2.0, 2.0, 1.0, 1.0);

    let result = execute_boolean(&mut kernel, &plate, &peg, BooleanKind::Union).unwrap();
    assert_eq!(kernel.list_lumps(&result.handle).len(), 1);
    assert!(result.diagnostics.warnings.is_empty());
    assert_eq!(result.diagnostics.faces_before, 12);
    assert_eq!(result.diagnostics.faces_after, 11);
}

#[test]
fn boolean_union_of_disjoint_blocks_warns() {
    let mut kernel = MockKernel::new();
    let a = block(&mut kernel, 1.0, 1.0, 1.0, 0.0);
    let b = block(&mut kernel, 1.0, 1.0, 1.0, 5.0);

    let result = execute_boolean(&mut kernel, &a, &b, BooleanKind::Union).unwrap();
    assert_eq!(result.diagnostics.warnings.len(), 1);
}

#[test]
fn single_lump_check_rejects_disjoint_union() {
    let mut kernel = MockKernel::new();
    let a = block(&mut kernel, 1.0, 1.0, 1.0, 0.0);
    let b = block(&mut kernel, 1.0, 1.0, 1.0, 5.0);
    assert!(require_single_lump(&kernel, &a).is_ok());

    let result = execute_union_all(&mut kernel, &[a, b]).unwrap();
    assert!(result.diagnostics.warnings[0].contains("2 disjoint lumps"));
    let err = require_single_lump(&kernel, &result.handle).unwrap_err();
    assert!(matches!(err, OpError::Disjoint { lumps: 2 }));
}

#[test]
fn boolean_subtract_carves_cavity() {
    let mut kernel = MockKernel::new();
    let a = block(&mut kernel, 10.0, 10.0, 10.0, 0.0);
    let b = block(&mut kernel, 2.0, 2.0, 2.0, 4.0);

    let result = execute_boolean(&mut kernel, &a, &b, BooleanKind::Subtract).unwrap();
    assert_eq!(result.diagnostics.faces_after, 12);
}

#[test]
fn boolean_intersect_disjoint_is_kernel_error() {
    let mut kernel = MockKernel::new();
    let a = block(&mut kernel, 1.0, 1.0, 1.0, 0.0);
    let b = block(&mut kernel, 1.0, 1.0, 1.0, 10.0);

    let result = execute_boolean(&mut kernel, &a, &b, BooleanKind::Intersect);
    assert!(matches!(result, Err(OpError::Kernel(_))));
}

#[test]
fn union_all_rejects_empty_list() {
    let mut kernel = MockKernel::new();
    let result = execute_union_all(&mut kernel, &[]);
    assert!(matches!(result, Err(OpError::InvalidParameter { .. })));
}

#[test]
fn union_all_single_body_is_identity() {
    let mut kernel = MockKernel::new();
    let a = block(&mut kernel, 1.0, 1.0, 1.0, 0.0);
    let result = execute_union_all(&mut kernel, std::slice::from_ref(&a)).unwrap();
    assert_eq!(result.handle, a);
}

// ── Fillet / Chamfer Tests ─────────────────────────────────────────────────

#[test]
fn fillet_vertical_edges_adds_four_faces() {
    let mut kernel = MockKernel::new();
    let handle = block(&mut kernel, 4.0, 4.0, 4.0, 0.0);
    let edges = select_edges(&kernel, &handle, &EdgeSelector::ParallelTo(Axis::Z));
    assert_eq!(edges.len(), 4);

    let result = execute_fillet(&mut kernel, &handle, &edges, 0.6).unwrap();
    assert_eq!(result.diagnostics.faces_after, 10);
    let cylinders = select_faces(
        &kernel,
        &result.handle,
        &FaceSelector::SurfaceType("cylindrical".to_string()),
    );
    assert_eq!(cylinders.len(), 4);
}

#[test]
fn fillet_empty_selection_is_an_error() {
    let mut kernel = MockKernel::new();
    let handle = block(&mut kernel, 4.0, 4.0, 4.0, 0.0);
    let result = execute_fillet(&mut kernel, &handle, &[], 0.6);
    assert!(matches!(result, Err(OpError::EmptySelection { .. })));
}

#[test]
fn fillet_rejects_zero_radius() {
    let mut kernel = MockKernel::new();
    let handle = block(&mut kernel, 4.0, 4.0, 4.0, 0.0);
    let edges = kernel.list_edges(&handle);
    let result = execute_fillet(&mut kernel, &handle, &edges, 0.0);
    assert!(matches!(result, Err(OpError::InvalidParameter { .. })));
}

#[test]
fn chamfer_bottom_edge_adds_planar_face() {
    let mut kernel = MockKernel::new();
    let fin = block(&mut kernel, 3.2, 1.0, 9.4, 0.0);
    let sel = EdgeSelector::ParallelTo(Axis::Y)
        & EdgeSelector::Min(Axis::Z)
        & EdgeSelector::Max(Axis::X);
    let edges = select_edges(&kernel, &fin, &sel);
    assert_eq!(edges.len(), 1);

    let result = execute_chamfer(&mut kernel, &fin, &edges, 2.0, 0.2).unwrap();
    assert_eq!(result.diagnostics.faces_after, 7);
}

#[test]
fn chamfer_rejects_negative_length() {
    let mut kernel = MockKernel::new();
    let fin = block(&mut kernel, 3.2, 1.0, 9.4, 0.0);
    let edges = kernel.list_edges(&fin);
    let result = execute_chamfer(&mut kernel, &fin, &edges[..1], 2.0, -0.2);
    assert!(matches!(result, Err(OpError::InvalidParameter { .. })));
}

// ── Shell Tests ────────────────────────────────────────────────────────────

#[test]
fn shell_inward_keeps_outer_box() {
    let mut kernel = MockKernel::new();
    let handle = block(&mut kernel, 4.0, 4.0, 4.0, 0.0);
    let bottom = select_faces(&kernel, &handle, &FaceSelector::Min(Axis::Z));

    let result = execute_shell(&mut kernel, &handle, &bottom, 0.5, ShellSide::Inward).unwrap();
    assert_eq!(result.diagnostics.faces_after, 10);
    let bb = kernel.bounding_box(&result.handle).unwrap();
    assert_eq!(bb.to_array(), [-2.0, -2.0, 0.0, 2.0, 2.0, 4.0]);
}

#[test]
fn shell_outward_grows_box() {
    let mut kernel = MockKernel::new();
    let handle = block(&mut kernel, 4.0, 4.0, 4.0, 0.0);
    let result = execute_shell(&mut kernel, &handle, &[], 1.0, ShellSide::Outward).unwrap();
    let bb = kernel.bounding_box(&result.handle).unwrap();
    assert_eq!(bb.to_array(), [-3.0, -3.0, -1.0, 3.0, 3.0, 5.0]);
}

#[test]
fn shell_unknown_face_is_kernel_error() {
    let mut kernel = MockKernel::new();
    let handle = block(&mut kernel, 1.0, 1.0, 1.0, 0.0);
    let result = execute_shell(
        &mut kernel,
        &handle,
        &[KernelId(99_999)],
        0.1,
        ShellSide::Inward,
    );
    assert!(matches!(result, Err(OpError::Kernel(_))));
}

// ── Truck Backend ──────────────────────────────────────────────────────────

#[test]
fn truck_extrude_and_union() {
    let mut kernel = TruckKernel::new();
    let plate = execute_extrude(
        &mut kernel,
        &Sketch::new().rect(10.0, 10.0, SketchMode::Add),
        &Workplane::xy(),
        2.0,
    )
    .unwrap();
    assert_eq!(plate.diagnostics.faces_after, 6);

    let bb = kernel.bounding_box(&plate.handle).unwrap();
    assert_relative_eq!(bb.max[2], 2.0, epsilon = 1e-6);
}

#[test]
fn truck_fillet_is_not_supported() {
    let mut kernel = TruckKernel::new();
    let plate = execute_extrude(
        &mut kernel,
        &Sketch::new().rect(10.0, 10.0, SketchMode::Add),
        &Workplane::xy(),
        2.0,
    )
    .unwrap();
    let edges = select_edges(&kernel, &plate.handle, &EdgeSelector::ParallelTo(Axis::Z));
    assert_eq!(edges.len(), 4);
    let result = execute_fillet(&mut kernel, &plate.handle, &edges, 0.6);
    assert!(matches!(
        result,
        Err(OpError::Kernel(brick_kernel::KernelError::NotSupported { .. }))
    ));
}
