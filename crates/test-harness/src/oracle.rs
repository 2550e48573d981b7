//! Verification oracles: pure functions returning pass/fail verdicts.
//!
//! Each oracle returns an `OracleVerdict` with diagnostic detail, not panics.
//! This lets a test collect all failures in one pass.

use std::collections::BTreeMap;

use brick_factory::{stud_positions, tube_positions, Brick, DimensionTable, SlopeProfile};
use brick_kernel::{KernelIntrospect, KernelSolidHandle};
use modeling_ops::{congruent, snapshot};

use crate::helpers::{cylinders_at, face_min_z, face_signatures, near};

/// Tolerance for matching a cylinder axis to a grid position.
const AXIS_TOL: f64 = 1e-6;

/// The result of a single oracle check.
#[derive(Debug, Clone)]
pub struct OracleVerdict {
    pub oracle_name: String,
    pub passed: bool,
    pub detail: String,
    pub value: Option<f64>,
}

impl OracleVerdict {
    fn pass(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: true,
            detail,
            value: None,
        }
    }

    fn fail(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: false,
            detail,
            value: None,
        }
    }

    fn judge(name: &str, passed: bool, detail: String, value: f64) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed,
            detail,
            value: Some(value),
        }
    }
}

// ── Shape Oracles ───────────────────────────────────────────────────────────

/// Check the solid's bounding box against expected corners.
pub fn check_bounding_box(
    introspect: &dyn KernelIntrospect,
    solid: &KernelSolidHandle,
    expected_min: [f64; 3],
    expected_max: [f64; 3],
    tol: f64,
) -> OracleVerdict {
    let Some(bb) = introspect.bounding_box(solid) else {
        return OracleVerdict::fail("bounding_box", "solid has no lumps".to_string());
    };
    for i in 0..3 {
        if !near(bb.min[i], expected_min[i], tol) || !near(bb.max[i], expected_max[i], tol) {
            return OracleVerdict::fail(
                "bounding_box",
                format!(
                    "axis {}: expected [{:.3}, {:.3}], got [{:.3}, {:.3}] (tol={})",
                    i, expected_min[i], expected_max[i], bb.min[i], bb.max[i], tol
                ),
            );
        }
    }
    OracleVerdict::pass(
        "bounding_box",
        format!(
            "({:.2}, {:.2}, {:.2}) -> ({:.2}, {:.2}, {:.2})",
            bb.min[0], bb.min[1], bb.min[2], bb.max[0], bb.max[1], bb.max[2]
        ),
    )
}

/// Check that a brick's footprint matches its derived dimensions and that
/// it stands on `z = 0`.
pub fn check_footprint(introspect: &dyn KernelIntrospect, brick: &Brick, tol: f64) -> OracleVerdict {
    let Some(bb) = introspect.bounding_box(&brick.handle) else {
        return OracleVerdict::fail("footprint", "solid has no lumps".to_string());
    };
    let size = [bb.max[0] - bb.min[0], bb.max[1] - bb.min[1]];
    let want = [brick.dims.outer_height, brick.dims.outer_width];
    let ok = near(size[0], want[0], tol) && near(size[1], want[1], tol) && near(bb.min[2], 0.0, tol);
    let detail = format!(
        "{:.3} x {:.3} from z={:.3} (expected {:.3} x {:.3} from z=0)",
        size[0], size[1], bb.min[2], want[0], want[1]
    );
    OracleVerdict::judge("footprint", ok, detail, size[0] * size[1])
}

/// Check that the solid is exactly one connected piece.
pub fn check_single_lump(introspect: &dyn KernelIntrospect, solid: &KernelSolidHandle) -> OracleVerdict {
    let lumps = introspect.list_lumps(solid).len();
    OracleVerdict::judge(
        "single_lump",
        lumps == 1,
        format!("{} connected piece(s)", lumps),
        lumps as f64,
    )
}

// ── Connector Oracles ───────────────────────────────────────────────────────

/// Count stud positions carrying both stud walls above the top of the base.
pub fn check_stud_census(
    introspect: &dyn KernelIntrospect,
    brick: &Brick,
    table: &DimensionTable,
    expected: usize,
) -> OracleVerdict {
    let faces = face_signatures(introspect, &brick.handle);
    let top = brick.dims.solid_thickness;
    let found = stud_positions(table, &brick.grid)
        .into_iter()
        .filter(|&xy| {
            cylinders_at(&faces, xy, AXIS_TOL)
                .filter(|s| s.centroid.is_some_and(|c| c[2] > top))
                .count()
                >= 2
        })
        .count();
    OracleVerdict::judge(
        "stud_census",
        found == expected,
        format!("{} studs (expected {})", found, expected),
        found as f64,
    )
}

/// Count interior tube positions carrying both tube walls down to `z = 0`.
pub fn check_tube_census(
    introspect: &dyn KernelIntrospect,
    brick: &Brick,
    table: &DimensionTable,
    expected: usize,
) -> OracleVerdict {
    let faces = face_signatures(introspect, &brick.handle);
    let found = tube_positions(table, &brick.grid)
        .into_iter()
        .filter(|&xy| {
            cylinders_at(&faces, xy, AXIS_TOL)
                .filter(|s| face_min_z(s).is_some_and(|z| near(z, 0.0, 1e-6)))
                .count()
                >= 2
        })
        .count();
    OracleVerdict::judge(
        "tube_census",
        found == expected,
        format!("{} tubes (expected {})", found, expected),
        found as f64,
    )
}

/// Count chamfered ledge fins per wall, keyed `+X`, `-X`, `+Y`, `-Y`.
///
/// A ledge chamfer is a planar face near the bottom whose normal points
/// down and inward at once.
pub fn ledge_census(
    introspect: &dyn KernelIntrospect,
    solid: &KernelSolidHandle,
    table: &DimensionTable,
) -> BTreeMap<&'static str, usize> {
    let mut census = BTreeMap::new();
    for sig in face_signatures(introspect, solid) {
        let (Some(n), Some(c)) = (sig.normal, sig.centroid) else {
            continue;
        };
        if sig.surface_type.as_deref() != Some("planar")
            || n[2] > -1e-6
            || c[2] > table.unit_thickness / 2.0
        {
            continue;
        }
        let key = if n[0].abs() > n[1].abs() && n[0].abs() > 1e-6 {
            if c[0] > 0.0 {
                "+X"
            } else {
                "-X"
            }
        } else if n[1].abs() > 1e-6 {
            if c[1] > 0.0 {
                "+Y"
            } else {
                "-Y"
            }
        } else {
            continue;
        };
        *census.entry(key).or_insert(0) += 1;
    }
    census
}

/// Check the ledge count on each of the four walls.
pub fn check_ledges_per_wall(
    introspect: &dyn KernelIntrospect,
    solid: &KernelSolidHandle,
    table: &DimensionTable,
    expected_x_walls: usize,
    expected_y_walls: usize,
) -> OracleVerdict {
    let census = ledge_census(introspect, solid, table);
    let count = |k: &str| census.get(k).copied().unwrap_or(0);
    let ok = count("+X") == expected_x_walls
        && count("-X") == expected_x_walls
        && count("+Y") == expected_y_walls
        && count("-Y") == expected_y_walls;
    OracleVerdict::judge(
        "ledges_per_wall",
        ok,
        format!(
            "{:?} (expected {} on X walls, {} on Y walls)",
            census, expected_x_walls, expected_y_walls
        ),
        census.values().sum::<usize>() as f64,
    )
}

/// Check that the connector radii keep their mating order: stud hollow,
/// tube hollow, stud inside the tube bore, and tube plus stud spanning the
/// diagonal pitch.
pub fn check_mating_order(table: &DimensionTable) -> OracleVerdict {
    let bore = table.inner_cylinder_radius - table.inner_cylinder_thickness;
    let stud_bore = table.stud_radius - table.stud_thickness;
    let diagonal = table.stud_spacing * std::f64::consts::SQRT_2 / 2.0;
    let grip = table.inner_cylinder_radius + table.stud_radius;
    let ok = stud_bore > 0.0 && bore > 0.0 && table.stud_radius < bore && grip >= diagonal;
    OracleVerdict::judge(
        "mating_order",
        ok,
        format!(
            "stud bore {:.3} < stud {:.3} < tube bore {:.3}; grip {:.3} vs diagonal {:.3}",
            stud_bore, table.stud_radius, bore, grip, diagonal
        ),
        bore - table.stud_radius,
    )
}

// ── Profile Oracles ─────────────────────────────────────────────────────────

/// Check that a profile starts and ends exactly on the requested thicknesses
/// and never leaves the band between them.
pub fn check_profile(profile: &SlopeProfile, width: f64, start: f64, end: f64) -> OracleVerdict {
    let (first, last) = (profile.first(), profile.last());
    if !near(first[0], -width / 2.0, 1e-9) || !near(first[1], start, 1e-12) {
        return OracleVerdict::fail("profile", format!("starts at {:?}", first));
    }
    if !near(last[0], width / 2.0, 1e-9) || !near(last[1], end, 1e-12) {
        return OracleVerdict::fail("profile", format!("ends at {:?}", last));
    }
    let (lo, hi) = (start.min(end), start.max(end));
    if let Some(p) = profile
        .points
        .iter()
        .find(|p| p[1] < lo - 1e-9 || p[1] > hi + 1e-9)
    {
        return OracleVerdict::fail("profile", format!("sample {:?} outside [{}, {}]", p, lo, hi));
    }
    OracleVerdict::pass(
        "profile",
        format!("{} samples ({})", profile.points.len(), profile.easing),
    )
}

// ── Congruence ──────────────────────────────────────────────────────────────

/// Check that two solids have matching topology and geometry.
pub fn check_congruent(
    introspect: &dyn KernelIntrospect,
    a: &KernelSolidHandle,
    b: &KernelSolidHandle,
    tol: f64,
) -> OracleVerdict {
    let (sa, sb) = (snapshot(introspect, a), snapshot(introspect, b));
    let detail = format!(
        "F {}/{} E {}/{} V {}/{}",
        sa.faces.len(),
        sb.faces.len(),
        sa.edges.len(),
        sb.edges.len(),
        sa.vertices.len(),
        sb.vertices.len()
    );
    if congruent(&sa, &sb, tol) {
        OracleVerdict::pass("congruent", detail)
    } else {
        OracleVerdict::fail("congruent", detail)
    }
}

// ── Combined Checks ─────────────────────────────────────────────────────────

/// Run the checks that hold for every finished brick.
pub fn run_brick_checks(
    introspect: &dyn KernelIntrospect,
    brick: &Brick,
    table: &DimensionTable,
) -> Vec<OracleVerdict> {
    vec![
        check_footprint(introspect, brick, 1e-6),
        check_single_lump(introspect, &brick.handle),
        check_tube_census(introspect, brick, table, brick.grid.tube_count()),
        check_mating_order(table),
    ]
}
