//! Rich assertion helpers with diagnostic output.
//!
//! Every failure names its context and shows expected vs actual, so a
//! scenario can report the first broken property without panicking.

use brick_factory::{Brick, BuildStage};
use brick_kernel::{KernelIntrospect, KernelSolidHandle};

use crate::helpers::{surface_census, HarnessError};
use crate::oracle::OracleVerdict;

/// Turn a failed verdict into an error.
pub fn assert_verdict(verdict: &OracleVerdict, ctx: &str) -> Result<(), HarnessError> {
    if verdict.passed {
        Ok(())
    } else {
        Err(HarnessError::OracleFailure {
            oracle: format!("{}/{}", ctx, verdict.oracle_name),
            detail: verdict.detail.clone(),
        })
    }
}

/// Fail on the first failed verdict in `verdicts`.
pub fn assert_all_pass(verdicts: &[OracleVerdict], ctx: &str) -> Result<(), HarnessError> {
    verdicts.iter().try_for_each(|v| assert_verdict(v, ctx))
}

/// Assert the horizontal extent of a solid, in millimetres.
pub fn assert_footprint(
    introspect: &dyn KernelIntrospect,
    solid: &KernelSolidHandle,
    expected: [f64; 2],
    tol: f64,
    ctx: &str,
) -> Result<(), HarnessError> {
    let bb = introspect
        .bounding_box(solid)
        .ok_or(HarnessError::EmptySolid)?;
    let size = [bb.max[0] - bb.min[0], bb.max[1] - bb.min[1]];
    for i in 0..2 {
        if (size[i] - expected[i]).abs() > tol {
            return Err(HarnessError::AssertionFailed {
                detail: format!(
                    "[{}] footprint axis {}: expected {:.3}, got {:.3} (tol={})",
                    ctx, i, expected[i], size[i], tol,
                ),
            });
        }
    }
    Ok(())
}

/// Assert the highest point of a solid.
pub fn assert_top(
    introspect: &dyn KernelIntrospect,
    solid: &KernelSolidHandle,
    expected: f64,
    tol: f64,
    ctx: &str,
) -> Result<(), HarnessError> {
    let bb = introspect
        .bounding_box(solid)
        .ok_or(HarnessError::EmptySolid)?;
    if (bb.max[2] - expected).abs() > tol {
        return Err(HarnessError::AssertionFailed {
            detail: format!(
                "[{}] top: expected z={:.3}, got z={:.3} (tol={})",
                ctx, expected, bb.max[2], tol
            ),
        });
    }
    Ok(())
}

/// Assert the exact stage sequence a brick went through.
pub fn assert_stages(brick: &Brick, expected: &[BuildStage], ctx: &str) -> Result<(), HarnessError> {
    let actual = brick.trace.stage_names();
    if actual == expected {
        Ok(())
    } else {
        Err(HarnessError::AssertionFailed {
            detail: format!(
                "[{}] build {}: expected stages {:?}, got {:?}",
                ctx, brick.trace.build_id, expected, actual
            ),
        })
    }
}

/// Assert that at least `min` faces of a surface type are present.
pub fn assert_has_surfaces(
    introspect: &dyn KernelIntrospect,
    solid: &KernelSolidHandle,
    surface_type: &str,
    min: usize,
    ctx: &str,
) -> Result<(), HarnessError> {
    let census = surface_census(introspect, solid);
    let found = census.get(surface_type).copied().unwrap_or(0);
    if found >= min {
        Ok(())
    } else {
        Err(HarnessError::AssertionFailed {
            detail: format!(
                "[{}] expected at least {} {} faces, got {} ({:?})",
                ctx, min, surface_type, found, census
            ),
        })
    }
}
