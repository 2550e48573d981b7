use serde::{Deserialize, Serialize};

/// Footprint of a part in grid cells plus its height in layers.
///
/// `height` counts cells along X, `width` counts cells along Y and
/// `thickness` counts stacked unit layers along Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSpec {
    pub height: u32,
    pub width: u32,
    pub thickness: u32,
}

impl GridSpec {
    pub fn new(height: u32, width: u32, thickness: u32) -> Self {
        Self {
            height,
            width,
            thickness,
        }
    }

    /// Number of studs on the top face.
    pub fn stud_count(&self) -> usize {
        self.height as usize * self.width as usize
    }

    /// Number of interior grid intersections, i.e. support tube positions.
    pub fn tube_count(&self) -> usize {
        self.height.saturating_sub(1) as usize * self.width.saturating_sub(1) as usize
    }
}

fn default_slope_name() -> String {
    "line".to_string()
}

/// A caller's request for one part, expressed as plain parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BrickRequest {
    /// A rectangular brick with studs on top.
    Rectangle {
        height: u32,
        width: u32,
        thickness: u32,
    },
    /// A sloped brick whose top rises from `thickness_begin` to
    /// `thickness_end` layers across the width axis.
    Slope {
        height: u32,
        width: u32,
        thickness_begin: u32,
        thickness_end: u32,
        /// Easing law name; see [`crate::Easing`].
        #[serde(default = "default_slope_name")]
        slope: String,
    },
}
