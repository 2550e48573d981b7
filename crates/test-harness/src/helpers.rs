//! Helper functions: error type, tracing setup, face censuses.

use std::collections::BTreeMap;

use brick_kernel::{KernelIntrospect, KernelSolidHandle};
use brick_types::{TopoKind, TopoSignature};
use tracing_subscriber::EnvFilter;

// ── Error Type ──────────────────────────────────────────────────────────────

/// Unified error type for the test harness.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("build failed: {0}")]
    Build(#[from] brick_factory::BrickError),

    #[error("assertion failed: {detail}")]
    AssertionFailed { detail: String },

    #[error("oracle failure ({oracle}): {detail}")]
    OracleFailure { oracle: String, detail: String },

    #[error("solid has no bounding box")]
    EmptySolid,
}

// ── Tracing ─────────────────────────────────────────────────────────────────

/// Install a fmt subscriber filtered by `RUST_LOG` that writes through the
/// test capture. Safe to call from every test; only the first call wins.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ── Face Queries ────────────────────────────────────────────────────────────

/// Signatures of every face on `solid`.
pub fn face_signatures(
    introspect: &dyn KernelIntrospect,
    solid: &KernelSolidHandle,
) -> Vec<TopoSignature> {
    introspect
        .compute_all_signatures(solid, TopoKind::Face)
        .into_iter()
        .map(|(_, sig)| sig)
        .collect()
}

/// Face count per surface type, sorted by type name.
pub fn surface_census(
    introspect: &dyn KernelIntrospect,
    solid: &KernelSolidHandle,
) -> BTreeMap<String, usize> {
    let mut census = BTreeMap::new();
    for sig in face_signatures(introspect, solid) {
        let ty = sig.surface_type.unwrap_or_else(|| "unknown".to_string());
        *census.entry(ty).or_insert(0) += 1;
    }
    census
}

/// Cylindrical faces whose axis passes within `tol` of `xy`.
pub fn cylinders_at<'a>(
    faces: &'a [TopoSignature],
    xy: [f64; 2],
    tol: f64,
) -> impl Iterator<Item = &'a TopoSignature> + 'a {
    faces.iter().filter(move |sig| {
        sig.surface_type.as_deref() == Some("cylindrical")
            && sig
                .centroid
                .is_some_and(|c| (c[0] - xy[0]).abs() < tol && (c[1] - xy[1]).abs() < tol)
    })
}

/// Lowest Z reached by a face, from its bounding box.
pub fn face_min_z(sig: &TopoSignature) -> Option<f64> {
    sig.bbox.map(|b| b[2])
}

/// Whether `a` and `b` agree within `tol`.
pub fn near(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}
