/// Ledger Engine: Scenario Replay Harness
///
/// Loads scenario fixtures (genesis + contracts + expected outcomes),
/// runs each one twice through the engine, and compares outcomes and
/// final state hashes.
///
/// Usage: ledger_replay [FIXTURE.json]
/// Log level is taken from RUST_LOG.

use std::error::Error;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use ledger_engine::scenario::{run_scenario, Scenario};

const DEFAULT_FIXTURES: [&str; 2] = [
    "tests/fixtures/scenarios.json",
    "ledger_engine/tests/fixtures/scenarios.json",
];

fn main() -> Result<ExitCode, Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let path = match std::env::args().nth(1) {
        Some(p) => p,
        None => DEFAULT_FIXTURES
            .iter()
            .find(|p| Path::new(p).exists())
            .map(|p| p.to_string())
            .ok_or("no fixture file given and none found at the default paths")?,
    };

    let data = fs::read_to_string(&path)?;
    let scenarios: Vec<Scenario> = serde_json::from_str(&data)?;
    println!("Loaded {} scenarios from: {}", scenarios.len(), path);

    let mut passed = 0;
    for scenario in &scenarios {
        let first = run_scenario(scenario);
        let second = run_scenario(scenario);
        let deterministic = first.hash == second.hash;

        if first.passed() && deterministic {
            passed += 1;
            println!("[PASS] {}: hash={}", first.name, first.hash);
        } else {
            println!("[FAIL] {}:", first.name);
            for m in &first.mismatches {
                println!("  {}", m);
            }
            if !deterministic {
                println!("  Determinism fail: run1={} run2={}", first.hash, second.hash);
            }
        }
    }

    println!("\n===========================================");
    println!("Results: {}/{} passed", passed, scenarios.len());
    if passed == scenarios.len() {
        println!("[OK] All scenarios PASSED.");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("[FAIL] Some scenarios failed.");
        Ok(ExitCode::FAILURE)
    }
}
