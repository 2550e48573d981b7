//! Slope profile: a sampled curve from one thickness to another across the
//! width of a part.

use std::f64::consts::PI;

use brick_types::Easing;
use tracing::warn;

use crate::types::BrickError;

/// Evaluate a normalized easing law at `x` in `[0, 1]`.
pub fn ease(law: Easing, x: f64) -> f64 {
    match law {
        Easing::Line => x,
        Easing::Sine => (1.0 - (PI * x).cos()) / 2.0,
        Easing::Quad => {
            if x < 0.5 {
                2.0 * x * x
            } else {
                1.0 - 2.0 * (1.0 - x).powi(2)
            }
        }
        Easing::Cubic => {
            if x < 0.5 {
                4.0 * x.powi(3)
            } else {
                1.0 - (-2.0 * x + 2.0).powi(3) / 2.0
            }
        }
    }
}

/// Resolve an easing name.
///
/// Unknown names fail with `InvalidEasing` when `strict`; otherwise they
/// are logged and replaced by [`Easing::Line`].
pub fn resolve_easing(name: &str, strict: bool) -> Result<Easing, BrickError> {
    match Easing::from_name(name) {
        Some(law) => Ok(law),
        None if strict => Err(BrickError::InvalidEasing {
            name: name.to_string(),
        }),
        None => {
            warn!(name, fallback = %Easing::Line, "unknown easing law");
            Ok(Easing::Line)
        }
    }
}

/// Sampled slope curve in the (Y, Z) plane.
#[derive(Debug, Clone, PartialEq)]
pub struct SlopeProfile {
    pub easing: Easing,
    /// `(y, z)` samples from `-width/2` to `+width/2`.
    pub points: Vec<[f64; 2]>,
}

impl SlopeProfile {
    /// Sample `resolution + 1` points. Endpoints are pinned to the exact
    /// start and end thickness.
    pub fn generate(width: f64, start: f64, end: f64, easing: Easing, resolution: u32) -> Self {
        let n = resolution.max(1);
        let points = (0..=n)
            .map(|i| {
                let x = i as f64 / n as f64;
                let z = if i == 0 {
                    start
                } else if i == n {
                    end
                } else {
                    ease(easing, x) * (end - start) + start
                };
                [(x - 0.5) * width, z]
            })
            .collect();
        Self { easing, points }
    }

    pub fn first(&self) -> [f64; 2] {
        self.points.first().copied().unwrap_or([0.0; 2])
    }

    pub fn last(&self) -> [f64; 2] {
        self.points.last().copied().unwrap_or([0.0; 2])
    }

    /// Closed cross-section down to `z = 0`, counter-clockwise.
    ///
    /// A linear law needs only its two endpoints; other laws follow every
    /// sample.
    pub fn outline(&self) -> Vec<[f64; 2]> {
        let (first, last) = (self.first(), self.last());
        let mut pts = vec![[first[0], 0.0], [last[0], 0.0]];
        match self.easing {
            Easing::Line => pts.extend([last, first]),
            _ => pts.extend(self.points.iter().rev().copied()),
        }
        pts
    }

    /// The samples lifted to 3D on the plane `x = 0`.
    pub fn path(&self) -> Vec<[f64; 3]> {
        self.points.iter().map(|p| [0.0, p[0], p[1]]).collect()
    }
}
