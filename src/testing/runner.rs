use std::time::Instant;

use tracing::{info, warn};

use crate::history::unix_timestamp;

use super::report::{RunReport, ScenarioOutcome};
use super::scenarios::{Context, Scenario};

/// Run `scenarios` one after another against the shared client.
pub async fn run_suite(ctx: &Context, scenarios: &[Scenario]) -> RunReport {
    let started = Instant::now();
    let mut report = RunReport::new(
        unix_timestamp(),
        ctx.settings.environment.clone(),
        ctx.client.base_url().as_str(),
    );

    for &scenario in scenarios {
        report.push(run_scenario(ctx, scenario).await);
    }

    report.duration_ms = started.elapsed().as_millis();
    info!(
        total = report.total,
        passed = report.passed,
        failed = report.failed,
        duration_ms = report.duration_ms as u64,
        "run finished"
    );
    report
}

pub async fn run_scenario(ctx: &Context, scenario: Scenario) -> ScenarioOutcome {
    ctx.client.clear_history();
    let started = Instant::now();

    let result = scenario.run(ctx).await.map(|checks| checks.into_results());
    let requests = ctx.client.take_history();
    let outcome = ScenarioOutcome::new(scenario, result, requests, started.elapsed().as_millis());

    if outcome.passed {
        info!(scenario = %scenario, "passed");
    } else {
        warn!(
            scenario = %scenario,
            error = outcome.error.as_deref().unwrap_or(""),
            "failed"
        );
    }
    outcome
}
