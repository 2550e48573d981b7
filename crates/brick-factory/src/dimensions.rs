//! Calibration constants of the connector standard and the per-part
//! dimensions derived from them.

use brick_types::{Easing, GridSpec};
use serde::{Deserialize, Serialize};

use crate::types::{BrickError, ConfigError};

/// Every fixed constant the builders use, in millimetres.
///
/// `Default` gives the calibrated reference values. A JSON document may
/// override any subset of fields; missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionTable {
    /// Outer wall thickness of base and slope skin.
    pub wall: f64,
    pub stud_radius: f64,
    /// Grid pitch between connector centers.
    pub stud_spacing: f64,
    pub stud_height: f64,
    pub stud_thickness: f64,
    /// Clearance taken off each outer face of the footprint.
    pub base_shrink: f64,
    pub inner_cylinder_radius: f64,
    pub inner_cylinder_thickness: f64,
    /// Height of one layer before `thickness_epsilon` is taken off.
    pub unit_thickness: f64,
    pub thickness_epsilon: f64,
    pub ledge_thickness: f64,
    pub ledge_length: f64,
    /// Chamfer on the inner bottom edge of each ledge fin.
    pub ledge_chamfer: [f64; 2],
    pub groove_radius: f64,
    pub side_fillet: f64,
    pub top_fillet: f64,
    /// Segments in a slope profile.
    pub profile_resolution: u32,
    pub default_easing: Easing,
}

impl Default for DimensionTable {
    fn default() -> Self {
        let wall = 1.2;
        Self {
            wall,
            stud_radius: 9.5 / 2.0,
            stud_spacing: 16.0,
            stud_height: 3.75,
            stud_thickness: wall,
            base_shrink: 0.2,
            inner_cylinder_radius: 6.65,
            inner_cylinder_thickness: wall - 0.2,
            unit_thickness: 9.5,
            thickness_epsilon: 0.1,
            ledge_thickness: 1.0,
            ledge_length: 3.2,
            ledge_chamfer: [2.0, 0.2],
            groove_radius: 4.8,
            side_fillet: 0.6,
            top_fillet: 0.4,
            profile_resolution: 8,
            default_easing: Easing::Line,
        }
    }
}

impl DimensionTable {
    /// Parse a (possibly partial) table from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let table: DimensionTable = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    /// Check positivity and the mating order between connector features.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("wall", self.wall),
            ("stud_radius", self.stud_radius),
            ("stud_spacing", self.stud_spacing),
            ("stud_height", self.stud_height),
            ("stud_thickness", self.stud_thickness),
            ("inner_cylinder_radius", self.inner_cylinder_radius),
            ("inner_cylinder_thickness", self.inner_cylinder_thickness),
            ("unit_thickness", self.unit_thickness),
            ("ledge_thickness", self.ledge_thickness),
            ("ledge_length", self.ledge_length),
            ("ledge_chamfer[0]", self.ledge_chamfer[0]),
            ("ledge_chamfer[1]", self.ledge_chamfer[1]),
            ("groove_radius", self.groove_radius),
            ("side_fillet", self.side_fillet),
            ("top_fillet", self.top_fillet),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return violated(format!("{} must be positive, got {}", name, value));
            }
        }
        for (name, value) in [
            ("base_shrink", self.base_shrink),
            ("thickness_epsilon", self.thickness_epsilon),
        ] {
            if !value.is_finite() || value < 0.0 {
                return violated(format!("{} must not be negative, got {}", name, value));
            }
        }

        if self.stud_radius <= self.stud_thickness {
            return violated("stud wall is thicker than the stud radius".to_string());
        }
        if self.inner_cylinder_radius <= self.inner_cylinder_thickness {
            return violated("tube wall is thicker than the tube radius".to_string());
        }
        let tube_bore = self.inner_cylinder_radius - self.inner_cylinder_thickness;
        if self.stud_radius >= tube_bore {
            return violated(format!(
                "stud radius {} must stay below tube bore {}",
                self.stud_radius, tube_bore
            ));
        }
        // A tube sits on the diagonal between four studs and must touch them.
        let diagonal = self.stud_spacing * std::f64::consts::SQRT_2 / 2.0;
        if self.inner_cylinder_radius + self.stud_radius < diagonal {
            return violated(format!(
                "tube ({}) and stud ({}) radii do not reach the grid diagonal {:.3}",
                self.inner_cylinder_radius, self.stud_radius, diagonal
            ));
        }
        let ledge_reach = self.stud_spacing / 2.0 - self.base_shrink - self.ledge_length;
        if self.stud_radius < ledge_reach {
            return violated(format!(
                "ledges stop {:.3} from a stud center, beyond stud radius {}",
                ledge_reach, self.stud_radius
            ));
        }
        let groove_outer = self.groove_radius + self.wall;
        if groove_outer >= self.unit_thickness - self.thickness_epsilon
            || groove_outer >= self.stud_spacing - self.base_shrink
        {
            return violated(format!(
                "groove wall radius {} leaves no clearance inside one unit",
                groove_outer
            ));
        }
        if self.profile_resolution < 8 {
            return violated(format!(
                "profile_resolution must be at least 8, got {}",
                self.profile_resolution
            ));
        }
        Ok(())
    }

    /// Solid thickness of `units` stacked layers.
    pub fn layer_thickness(&self, units: u32) -> f64 {
        self.unit_thickness * units as f64 - self.thickness_epsilon
    }
}

fn violated(reason: String) -> Result<(), ConfigError> {
    Err(ConfigError::Constraint { reason })
}

/// Scalar sizes of one part, derived once from its grid and the table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Footprint along X.
    pub outer_height: f64,
    /// Footprint along Y.
    pub outer_width: f64,
    pub inner_height: f64,
    pub inner_width: f64,
    pub solid_thickness: f64,
}

impl Dimensions {
    pub fn derive(table: &DimensionTable, grid: &GridSpec) -> Result<Self, BrickError> {
        for (name, value) in [
            ("height", grid.height),
            ("width", grid.width),
            ("thickness", grid.thickness),
        ] {
            if value < 1 {
                return Err(BrickError::InvalidDimension {
                    reason: format!("{} must be at least 1, got {}", name, value),
                });
            }
        }

        let outer_height = table.stud_spacing * grid.height as f64 - 2.0 * table.base_shrink;
        let outer_width = table.stud_spacing * grid.width as f64 - 2.0 * table.base_shrink;
        let dims = Self {
            outer_height,
            outer_width,
            inner_height: outer_height - 2.0 * table.wall,
            inner_width: outer_width - 2.0 * table.wall,
            solid_thickness: table.layer_thickness(grid.thickness),
        };

        if dims.inner_height <= 0.0 || dims.inner_width <= 0.0 {
            return Err(BrickError::InvalidDimension {
                reason: format!(
                    "walls leave no cavity ({:.3} x {:.3})",
                    dims.inner_height, dims.inner_width
                ),
            });
        }
        if dims.solid_thickness <= 0.0 {
            return Err(BrickError::InvalidDimension {
                reason: format!("solid thickness {:.3} is not positive", dims.solid_thickness),
            });
        }
        Ok(dims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_table_is_valid() {
        DimensionTable::default().validate().unwrap();
    }

    #[test]
    fn mating_radii_keep_their_order() {
        let t = DimensionTable::default();
        let stud_bore = t.stud_radius - t.stud_thickness;
        let tube_bore = t.inner_cylinder_radius - t.inner_cylinder_thickness;
        assert!(stud_bore < t.stud_radius);
        assert!(t.stud_radius < tube_bore);
        assert!(tube_bore < t.inner_cylinder_radius);
        assert!(t.inner_cylinder_radius < t.stud_spacing / 2.0);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let table = DimensionTable::from_json(r#"{"stud_height": 4.0}"#).unwrap();
        assert_eq!(table.stud_height, 4.0);
        assert_eq!(table.stud_radius, 4.75);
        assert_eq!(table.default_easing, Easing::Line);
    }

    #[test]
    fn json_with_bad_order_is_rejected() {
        let err = DimensionTable::from_json(r#"{"stud_radius": 6.0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Constraint { .. }));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = DimensionTable::from_json("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn low_resolution_is_rejected() {
        let table = DimensionTable {
            profile_resolution: 4,
            ..DimensionTable::default()
        };
        assert!(table.validate().is_err());
    }

    #[test]
    fn derive_two_by_four() {
        let dims =
            Dimensions::derive(&DimensionTable::default(), &GridSpec::new(2, 4, 4)).unwrap();
        assert_relative_eq!(dims.outer_height, 31.6, epsilon = 1e-9);
        assert_relative_eq!(dims.outer_width, 63.6, epsilon = 1e-9);
        assert_relative_eq!(dims.inner_height, 29.2, epsilon = 1e-9);
        assert_relative_eq!(dims.inner_width, 61.2, epsilon = 1e-9);
        assert_relative_eq!(dims.solid_thickness, 37.9, epsilon = 1e-9);
    }

    #[test]
    fn derive_rejects_zero_cells() {
        let err = Dimensions::derive(&DimensionTable::default(), &GridSpec::new(0, 2, 1))
            .unwrap_err();
        assert!(matches!(err, BrickError::InvalidDimension { .. }));
    }
}
