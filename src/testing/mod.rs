//! # Scenarios & Assertions
//!
//! Each scenario is a self-contained check against the live service: it logs
//! in, performs any setup calls, issues the call under test and records
//! assertion results. The runner executes scenarios strictly in sequence and
//! collects a report.

pub mod assertion;
pub mod report;
pub mod runner;
pub mod scenarios;

pub use assertion::{Assertion, AssertionOperator, AssertionResult, AssertionTarget, Checks};
pub use report::{RunReport, ScenarioOutcome};
pub use runner::{run_scenario, run_suite};
pub use scenarios::{Context, Scenario, ScenarioError, ScenarioKind};
