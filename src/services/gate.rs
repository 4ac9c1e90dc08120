use crate::config::Config;
use crate::domain::errors::GateError;
use crate::domain::models::{
    BaselineSnapshot, CompatReport, Outcome, ReleaseDecision, Severity, SymbolSet,
};
use crate::services::baseline::BaselineStore;
use crate::services::storage::{audit, now_secs};
use crate::services::{differ, extractor, policy, sync_ledger};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Idle,
    Validating,
    Extracting,
    Diffing,
    Deciding,
    Passed,
    Failed,
    Skipped,
}

impl GateState {
    fn name(&self) -> &'static str {
        match self {
            GateState::Idle => "idle",
            GateState::Validating => "validating",
            GateState::Extracting => "extracting",
            GateState::Diffing => "diffing",
            GateState::Deciding => "deciding",
            GateState::Passed => "passed",
            GateState::Failed => "failed",
            GateState::Skipped => "skipped",
        }
    }
}

pub struct GateRequest {
    pub release_tag: String,
    pub baseline_tag: Option<String>,
    pub artifacts: Vec<PathBuf>,
    pub skip_binary: bool,
    pub update_baselines: bool,
}

/// Everything a command handler needs to report one gate run.
pub struct GateRun {
    pub decision: ReleaseDecision,
    pub report: Option<CompatReport>,
    pub baseline_tag: Option<String>,
    pub stored: Option<BaselineSnapshot>,
}

/// Drives one release verification from `Idle` to a terminal state.
///
/// Fatal validation/extraction errors abort with no partial decision;
/// breaking changes produce a complete `fail` decision with every breaking
/// symbol enumerated. Terminal states are final: the gate is re-invoked per
/// release, never resumed.
pub fn run(cfg: &Config, req: &GateRequest) -> anyhow::Result<GateRun> {
    let store = BaselineStore::new(&cfg.baselines.dir);
    let log_root = audit_root(&cfg.baselines.dir);
    let mut state = advance(&log_root, GateState::Idle, GateState::Validating);

    let record = match sync_ledger::load_sync_record(Path::new(&cfg.upstream.record_path))
        .and_then(|r| sync_ledger::validate_sync_record(&r, &cfg.upstream).map(|_| r))
    {
        Ok(record) => record,
        Err(err) => {
            audit(
                &log_root,
                "gate_abort",
                serde_json::json!({"tag": &req.release_tag, "state": state.name(), "error": err.to_string()}),
            );
            return Err(err);
        }
    };

    if req.skip_binary {
        state = advance(&log_root, state, GateState::Deciding);
        state = advance(&log_root, state, GateState::Skipped);
        let decision = ReleaseDecision {
            tag: req.release_tag.clone(),
            outcome: Outcome::Skipped,
            reasons: vec![format!(
                "skipped binary verification for '{}': --skip-binary",
                req.release_tag
            )],
        };
        audit_decision(&log_root, state, &decision);
        return Ok(GateRun {
            decision,
            report: None,
            baseline_tag: None,
            stored: None,
        });
    }

    state = advance(&log_root, state, GateState::Extracting);
    let artifacts = resolve_artifacts(cfg, req)?;
    let mut sets = Vec::new();
    for artifact in &artifacts {
        sets.push(extractor::extract_symbols(artifact, &cfg.extract)?);
    }
    let current = extractor::merge_symbol_sets(sets)?;

    state = advance(&log_root, state, GateState::Diffing);
    let baseline = match select_baseline(&store, req) {
        Ok(snapshot) => snapshot,
        Err(err) if is_missing_baseline(&err) && req.update_baselines => {
            // First baseline for this tag: nothing to compare against.
            let stored = store.create(&snapshot_from(req, &record.commit, &current), false)?;
            state = advance(&log_root, state, GateState::Passed);
            let decision = ReleaseDecision {
                tag: req.release_tag.clone(),
                outcome: Outcome::Pass,
                reasons: vec![format!(
                    "first baseline for '{}': stored without comparison",
                    req.release_tag
                )],
            };
            audit_decision(&log_root, state, &decision);
            return Ok(GateRun {
                decision,
                report: None,
                baseline_tag: None,
                stored: Some(stored),
            });
        }
        Err(err) => {
            audit(
                &log_root,
                "gate_abort",
                serde_json::json!({"tag": &req.release_tag, "state": state.name(), "error": err.to_string()}),
            );
            return Err(err);
        }
    };

    let diff = differ::diff(&baseline.symbol_set()?, &current);

    state = advance(&log_root, state, GateState::Deciding);
    let report = policy::classify(&diff, &cfg.policy);
    let reasons: Vec<String> = report
        .entries
        .iter()
        .filter(|e| e.severity == Severity::Breaking || e.reason.starts_with("allowed"))
        .map(|e| e.reason.clone())
        .collect();

    state = advance(
        &log_root,
        state,
        if report.breaking_count == 0 {
            GateState::Passed
        } else {
            GateState::Failed
        },
    );
    let decision = ReleaseDecision {
        tag: req.release_tag.clone(),
        outcome: if state == GateState::Passed {
            Outcome::Pass
        } else {
            Outcome::Fail
        },
        reasons,
    };

    let stored = if state == GateState::Passed && req.update_baselines {
        // The flag doubles as the supersession confirmation for an
        // existing tag.
        Some(store.create(&snapshot_from(req, &record.commit, &current), true)?)
    } else {
        None
    };

    audit_decision(&log_root, state, &decision);
    Ok(GateRun {
        decision,
        report: Some(report),
        baseline_tag: Some(baseline.release_tag),
        stored,
    })
}

fn advance(log_root: &Path, from: GateState, to: GateState) -> GateState {
    audit(
        log_root,
        "gate_transition",
        serde_json::json!({"from": from.name(), "to": to.name()}),
    );
    to
}

fn audit_decision(log_root: &Path, state: GateState, decision: &ReleaseDecision) {
    audit(
        log_root,
        "release_decision",
        serde_json::json!({
            "tag": &decision.tag,
            "state": state.name(),
            "outcome": decision.outcome.as_str(),
            "reasons": &decision.reasons,
        }),
    );
}

fn audit_root(baselines_dir: &str) -> PathBuf {
    let dir = Path::new(baselines_dir);
    dir.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(dir)
        .to_path_buf()
}

fn resolve_artifacts(cfg: &Config, req: &GateRequest) -> anyhow::Result<Vec<PathBuf>> {
    let artifacts: Vec<PathBuf> = if req.artifacts.is_empty() {
        cfg.extract.artifacts.iter().map(PathBuf::from).collect()
    } else {
        req.artifacts.clone()
    };
    if artifacts.is_empty() {
        anyhow::bail!("no artifacts configured; set [extract].artifacts or pass --artifact");
    }
    Ok(artifacts)
}

fn select_baseline(store: &BaselineStore, req: &GateRequest) -> anyhow::Result<BaselineSnapshot> {
    match &req.baseline_tag {
        Some(tag) => store.get(tag),
        None => store.latest(),
    }
}

fn is_missing_baseline(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<GateError>(),
        Some(GateError::MissingBaseline(_))
    )
}

pub fn snapshot_from(req: &GateRequest, upstream_commit: &str, set: &SymbolSet) -> BaselineSnapshot {
    BaselineSnapshot {
        release_tag: req.release_tag.clone(),
        upstream_commit: upstream_commit.to_string(),
        created_at: now_secs(),
        version: 1,
        symbols: set.to_sorted_vec(),
    }
}
