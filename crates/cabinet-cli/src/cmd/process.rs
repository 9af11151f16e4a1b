use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use cabinet_agent::Orchestrator;
use cabinet_core::config::Config;
use cabinet_core::types::LifecycleEvent;

use crate::output::{print_checks, print_json};

pub fn run(config_path: Option<&Path>, event_path: &Path, json: bool) -> Result<()> {
    let data = read_input(event_path)?;
    let event = LifecycleEvent::from_slice(&data)
        .with_context(|| format!("failed to decode event from {}", event_path.display()))?;
    let config = Config::resolve(config_path)?;
    let orchestrator = Orchestrator::new(cabinet_agent::live(&config)?);

    let rt = tokio::runtime::Runtime::new()?;
    let report = rt.block_on(orchestrator.report(&event));

    if json {
        return print_json(&report);
    }

    let snapshot = &report.snapshot;
    println!(
        "{} {} {}: {}",
        snapshot.event_id, snapshot.action, snapshot.subject_id, snapshot.decision
    );
    if let Some(details) = &snapshot.details {
        println!("  {details}");
    }
    if let Some(reason) = &snapshot.policy_reason {
        println!("  policy: {reason}");
    }
    if let Some(plan) = &snapshot.plan {
        println!("  plan: {}", plan.narrative);
    }
    if !snapshot.check_results.is_empty() {
        println!();
        print_checks(&snapshot.check_results);
    }
    println!();
    println!("{}", report.brief.safety);
    for recommendation in &report.brief.recommendations {
        println!("  - {recommendation}");
    }
    Ok(())
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        return Ok(buf);
    }
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}
