use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::domain::models::{CompatReport, JsonOut, Outcome, ReleaseDecision};
use crate::services::baseline::read_snapshot;
use crate::services::gate::{self, GateRequest, GateRun};
use crate::services::{differ, policy};

pub fn handle_release_commands(cli: &Cli, cfg: &Config) -> anyhow::Result<bool> {
    match &cli.command {
        Commands::ReleasePrepare {
            release_tag,
            baseline,
            artifact,
            skip_binary,
            update_baselines,
        } => {
            let run = gate::run(
                cfg,
                &GateRequest {
                    release_tag: release_tag.clone(),
                    baseline_tag: baseline.clone(),
                    artifacts: artifact.clone(),
                    skip_binary: *skip_binary,
                    update_baselines: *update_baselines,
                },
            )?;
            print_gate_run(cli.json, &run)?;
            exit_for(&run.decision);
            Ok(true)
        }
        Commands::Verify {
            release_tag,
            baseline,
            artifact,
            skip_binary,
        } => {
            let run = gate::run(
                cfg,
                &GateRequest {
                    release_tag: release_tag.clone(),
                    baseline_tag: baseline.clone(),
                    artifacts: artifact.clone(),
                    skip_binary: *skip_binary,
                    update_baselines: false,
                },
            )?;
            print_gate_run(cli.json, &run)?;
            exit_for(&run.decision);
            Ok(true)
        }
        Commands::Diff { baseline, current } => {
            let baseline_snap = read_snapshot(baseline)?;
            let current_snap = read_snapshot(current)?;
            let diff = differ::diff(&baseline_snap.symbol_set()?, &current_snap.symbol_set()?);
            let report = policy::classify(&diff, &cfg.policy);
            print_diff_report(cli.json, &baseline_snap.release_tag, &current_snap.release_tag, &report)?;
            if report.breaking_count > 0 {
                std::process::exit(1);
            }
            Ok(true)
        }
        _ => Ok(false),
    }
}

fn exit_for(decision: &ReleaseDecision) {
    if decision.outcome == Outcome::Fail {
        std::process::exit(1);
    }
}

fn print_gate_run(json: bool, run: &GateRun) -> anyhow::Result<()> {
    if json {
        let data = serde_json::json!({
            "decision": &run.decision,
            "entries": run.report.as_ref().map(|r| r.entries.as_slice()).unwrap_or_default(),
            "baseline": &run.baseline_tag,
            "stored": &run.stored,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut {
                ok: run.decision.outcome != Outcome::Fail,
                data
            })?
        );
        return Ok(());
    }

    match &run.baseline_tag {
        Some(tag) => println!(
            "release {}: {} (baseline {})",
            run.decision.tag,
            run.decision.outcome.as_str(),
            tag
        ),
        None => println!(
            "release {}: {}",
            run.decision.tag,
            run.decision.outcome.as_str()
        ),
    }
    for reason in &run.decision.reasons {
        println!("  - {}", reason);
    }
    if let Some(report) = &run.report {
        for entry in &report.entries {
            println!("{}\t{}", entry.severity.as_str(), entry.reason);
        }
        println!(
            "{} breaking, {} unchanged",
            report.breaking_count, report.unchanged_count
        );
    }
    if let Some(stored) = &run.stored {
        println!("baseline stored: {} v{}", stored.release_tag, stored.version);
    }
    Ok(())
}

fn print_diff_report(
    json: bool,
    baseline_tag: &str,
    current_tag: &str,
    report: &CompatReport,
) -> anyhow::Result<()> {
    if json {
        let data = serde_json::json!({
            "baseline": baseline_tag,
            "current": current_tag,
            "entries": &report.entries,
            "breaking_count": report.breaking_count,
            "unchanged_count": report.unchanged_count,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut {
                ok: report.breaking_count == 0,
                data
            })?
        );
        return Ok(());
    }

    println!("diff {} -> {}", baseline_tag, current_tag);
    for entry in &report.entries {
        println!("{}\t{}", entry.severity.as_str(), entry.reason);
    }
    println!(
        "{} breaking, {} unchanged",
        report.breaking_count, report.unchanged_count
    );
    Ok(())
}
