//! Test harness for the brick pipeline.
//!
//! Provides oracles, assertions and reports for checking finished bricks
//! against their connector-grid properties.
//!
//! # Key Components
//!
//! - [`oracle`]: Verification functions returning pass/fail verdicts
//! - [`assertions`]: Assertion helpers with diagnostics
//! - [`report`]: Structured text description of a build
//! - [`helpers`]: Error type, tracing setup, face censuses

pub mod assertions;
pub mod helpers;
pub mod oracle;
pub mod report;

pub use helpers::{init_tracing, HarnessError};
pub use oracle::OracleVerdict;
pub use report::BrickReport;
