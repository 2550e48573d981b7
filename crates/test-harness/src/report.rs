//! Structured text reports of a finished brick.
//!
//! Reports are plain text, not JSON, so a failing test can print one and
//! a reader sees the whole build at a glance.

use std::collections::BTreeMap;
use std::fmt;

use brick_factory::{Brick, DimensionTable};
use brick_kernel::KernelIntrospect;

use crate::helpers::surface_census;
use crate::oracle::{run_brick_checks, OracleVerdict};

/// A complete brick report with all sections.
pub struct BrickReport {
    pub build_id: String,
    pub grid: (u32, u32, u32),
    pub footprint: (f64, f64, f64),
    pub stages: Vec<(String, usize)>,
    pub topology: (usize, usize, usize),
    pub lumps: usize,
    pub surfaces: BTreeMap<String, usize>,
    pub bounding_box: Option<([f64; 3], [f64; 3])>,
    pub oracle_results: Vec<OracleVerdict>,
    pub warnings: Vec<String>,
}

impl BrickReport {
    /// Collect a report for `brick`, running the standard brick checks.
    pub fn collect(introspect: &dyn KernelIntrospect, brick: &Brick, table: &DimensionTable) -> Self {
        let solid = &brick.handle;
        Self {
            build_id: brick.trace.build_id.to_string(),
            grid: (brick.grid.height, brick.grid.width, brick.grid.thickness),
            footprint: (
                brick.dims.outer_height,
                brick.dims.outer_width,
                brick.dims.solid_thickness,
            ),
            stages: brick
                .trace
                .stages
                .iter()
                .map(|r| (format!("{:?}", r.stage), r.faces))
                .collect(),
            topology: (
                introspect.list_vertices(solid).len(),
                introspect.list_edges(solid).len(),
                introspect.list_faces(solid).len(),
            ),
            lumps: introspect.list_lumps(solid).len(),
            surfaces: surface_census(introspect, solid),
            bounding_box: introspect.bounding_box(solid).map(|bb| (bb.min, bb.max)),
            oracle_results: run_brick_checks(introspect, brick, table),
            warnings: brick.trace.warnings.clone(),
        }
    }

    pub fn all_passed(&self) -> bool {
        self.oracle_results.iter().all(|v| v.passed)
    }

    /// Format the report as text.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str("=== Brick Report ===\n\n");
        out.push_str(&format!("Build: {}\n", self.build_id));
        out.push_str(&format!(
            "Grid: {} x {} x {} | Footprint: {:.1} x {:.1}, base {:.1}\n",
            self.grid.0, self.grid.1, self.grid.2, self.footprint.0, self.footprint.1, self.footprint.2,
        ));

        out.push_str(&format!("\nStages ({}):\n", self.stages.len()));
        for (i, (stage, faces)) in self.stages.iter().enumerate() {
            out.push_str(&format!("  [{}] {} ({} faces)\n", i, stage, faces));
        }

        let (v, e, f) = self.topology;
        out.push_str(&format!(
            "\nSolid: V={} E={} F={} | {} lump(s)\n",
            v, e, f, self.lumps
        ));
        if !self.surfaces.is_empty() {
            let parts: Vec<String> = self
                .surfaces
                .iter()
                .map(|(ty, n)| format!("{} {}", n, ty))
                .collect();
            out.push_str(&format!("Surfaces: {}\n", parts.join(", ")));
        }

        if let Some((min, max)) = self.bounding_box {
            out.push_str(&format!(
                "\nBounding Box: ({:.1}, {:.1}, {:.1}) -> ({:.1}, {:.1}, {:.1})\n",
                min[0], min[1], min[2], max[0], max[1], max[2],
            ));
        }

        if !self.oracle_results.is_empty() {
            out.push_str(&format!(
                "\nOracle Results ({} checks):\n",
                self.oracle_results.len()
            ));
            for v in &self.oracle_results {
                let status = if v.passed { "PASS" } else { "FAIL" };
                out.push_str(&format!("  [{}] {}: {}\n", status, v.oracle_name, v.detail));
            }
        }

        if self.warnings.is_empty() {
            out.push_str("\nWarnings: none\n");
        } else {
            out.push_str(&format!("\nWarnings ({}):\n", self.warnings.len()));
            for w in &self.warnings {
                out.push_str(&format!("  {}\n", w));
            }
        }

        out
    }
}

impl fmt::Display for BrickReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}
