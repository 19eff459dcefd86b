use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::ApiResponse;

/// Target of an assertion within the HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssertionTarget {
    StatusCode,
    JsonPath(String),
    JsonLength(String),
    Body,
}

/// Comparison operator for an assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssertionOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    GreaterThan,
    LessThan,
    Exists,
}

impl Display for AssertionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AssertionOperator::Equals => "==",
            AssertionOperator::NotEquals => "!=",
            AssertionOperator::Contains => "contains",
            AssertionOperator::NotContains => "does not contain",
            AssertionOperator::GreaterThan => ">",
            AssertionOperator::LessThan => "<",
            AssertionOperator::Exists => "exists",
        };
        write!(f, "{label}")
    }
}

/// A single assertion that can be evaluated against a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assertion {
    pub target: AssertionTarget,
    pub operator: AssertionOperator,
    pub expected: String,
}

impl Assertion {
    pub fn status(operator: AssertionOperator, expected: u16) -> Self {
        Self {
            target: AssertionTarget::StatusCode,
            operator,
            expected: expected.to_string(),
        }
    }

    pub fn json_path(path: &str, operator: AssertionOperator, expected: impl Into<String>) -> Self {
        Self {
            target: AssertionTarget::JsonPath(path.to_string()),
            operator,
            expected: expected.into(),
        }
    }

    pub fn json_length(path: &str, operator: AssertionOperator, expected: usize) -> Self {
        Self {
            target: AssertionTarget::JsonLength(path.to_string()),
            operator,
            expected: expected.to_string(),
        }
    }

    pub fn body(operator: AssertionOperator, expected: impl Into<String>) -> Self {
        Self {
            target: AssertionTarget::Body,
            operator,
            expected: expected.into(),
        }
    }

    pub fn evaluate(&self, response: &ApiResponse) -> AssertionResult {
        let actual = match &self.target {
            AssertionTarget::StatusCode => Some(response.status.to_string()),
            AssertionTarget::JsonPath(path) => response.field(path).map(value_text),
            AssertionTarget::JsonLength(path) => response
                .field(path)
                .and_then(Value::as_array)
                .map(|items| items.len().to_string()),
            AssertionTarget::Body => Some(response.text()),
        };

        let passed = compare(self.operator, actual.as_deref(), &self.expected);
        AssertionResult {
            description: self.to_string(),
            passed,
            actual: actual.unwrap_or_else(|| "<missing>".to_string()),
        }
    }
}

impl Display for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            AssertionTarget::StatusCode => write!(f, "status")?,
            AssertionTarget::JsonPath(path) => write!(f, "json `{path}`")?,
            AssertionTarget::JsonLength(path) => write!(f, "length of `{path}`")?,
            AssertionTarget::Body => write!(f, "body")?,
        }
        match self.operator {
            AssertionOperator::Exists => write!(f, " exists"),
            operator => write!(f, " {operator} {:?}", self.expected),
        }
    }
}

/// Result of evaluating an assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionResult {
    pub description: String,
    pub passed: bool,
    pub actual: String,
}

/// Assertion results gathered while a scenario runs.
#[derive(Debug, Clone, Default)]
pub struct Checks {
    results: Vec<AssertionResult>,
}

impl Checks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect(&mut self, response: &ApiResponse, assertion: Assertion) -> bool {
        let result = assertion.evaluate(response);
        let passed = result.passed;
        self.results.push(result);
        passed
    }

    /// Record a check the scenario computed itself.
    pub fn ensure(&mut self, description: impl Into<String>, passed: bool, actual: impl Into<String>) -> bool {
        self.results.push(AssertionResult {
            description: description.into(),
            passed,
            actual: actual.into(),
        });
        passed
    }

    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|result| result.passed)
    }

    pub fn into_results(self) -> Vec<AssertionResult> {
        self.results
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn compare(operator: AssertionOperator, actual: Option<&str>, expected: &str) -> bool {
    match operator {
        AssertionOperator::Exists => actual.is_some(),
        AssertionOperator::Equals => actual == Some(expected),
        AssertionOperator::NotEquals => actual.is_some_and(|actual| actual != expected),
        AssertionOperator::Contains => actual.is_some_and(|actual| actual.contains(expected)),
        AssertionOperator::NotContains => actual.is_none_or(|actual| !actual.contains(expected)),
        AssertionOperator::GreaterThan => numeric(actual, expected).is_some_and(|(a, e)| a > e),
        AssertionOperator::LessThan => numeric(actual, expected).is_some_and(|(a, e)| a < e),
    }
}

fn numeric(actual: Option<&str>, expected: &str) -> Option<(f64, f64)> {
    let actual = actual?.trim().parse::<f64>().ok()?;
    let expected = expected.trim().parse::<f64>().ok()?;
    Some((actual, expected))
}
