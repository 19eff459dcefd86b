use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::history::HistoryEntry;

use super::assertion::AssertionResult;
use super::scenarios::{Scenario, ScenarioError, ScenarioKind};

/// Outcome of a single scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub name: String,
    pub kind: ScenarioKind,
    pub passed: bool,
    pub duration_ms: u128,
    pub assertions: Vec<AssertionResult>,
    pub error: Option<String>,
    pub requests: Vec<HistoryEntry>,
}

impl ScenarioOutcome {
    pub fn new(
        scenario: Scenario,
        result: Result<Vec<AssertionResult>, ScenarioError>,
        requests: Vec<HistoryEntry>,
        duration_ms: u128,
    ) -> Self {
        let (assertions, error) = match result {
            Ok(assertions) => (assertions, None),
            Err(err) => (Vec::new(), Some(err.to_string())),
        };
        let passed = error.is_none() && assertions.iter().all(|result| result.passed);

        Self {
            name: scenario.name().to_string(),
            kind: scenario.kind(),
            passed,
            duration_ms,
            assertions,
            error,
            requests,
        }
    }
}

/// Summary report for a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: u64,
    pub environment: Option<String>,
    pub base_url: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u128,
    pub outcomes: Vec<ScenarioOutcome>,
}

impl RunReport {
    pub fn new(started_at: u64, environment: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            started_at,
            environment,
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn push(&mut self, outcome: ScenarioOutcome) {
        self.total += 1;
        if outcome.passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
        self.outcomes.push(outcome);
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &ScenarioOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.passed)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "petcheck against {}{}",
            self.base_url,
            self.environment
                .as_deref()
                .map(|env| format!(" ({env})"))
                .unwrap_or_default()
        );

        for outcome in &self.outcomes {
            let mark = if outcome.passed { "PASS" } else { "FAIL" };
            let _ = writeln!(out, "{mark} {} [{}] {} ms", outcome.name, outcome.kind, outcome.duration_ms);

            if outcome.passed {
                continue;
            }
            if let Some(error) = &outcome.error {
                let _ = writeln!(out, "     error: {error}");
            }
            for assertion in outcome.assertions.iter().filter(|a| !a.passed) {
                let _ = writeln!(out, "     expected {} (actual: {})", assertion.description, assertion.actual);
            }
            for request in &outcome.requests {
                let status = request
                    .status
                    .map(|status| status.to_string())
                    .unwrap_or_else(|| "no response".to_string());
                let _ = writeln!(out, "     {} {} -> {status}", request.method, request.url);
            }
        }

        let _ = writeln!(
            out,
            "{} scenarios, {} passed, {} failed in {} ms",
            self.total, self.passed, self.failed, self.duration_ms
        );
        out
    }
}
