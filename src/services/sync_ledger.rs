use crate::config::UpstreamConfig;
use crate::domain::errors::GateError;
use crate::domain::models::SyncRecord;
use anyhow::Context;
use std::path::Path;

pub fn load_sync_record(path: &Path) -> anyhow::Result<SyncRecord> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        GateError::MismatchedUpstream(format!(
            "unable to read sync record '{}': {}",
            path.display(),
            e
        ))
    })?;
    let record: SyncRecord = serde_json::from_str(&raw).map_err(|e| {
        GateError::MismatchedUpstream(format!("invalid sync record '{}': {}", path.display(), e))
    })?;
    Ok(record)
}

/// Hard validation of the recorded upstream identity against the canonical
/// configured values. Runs before any extraction; a mismatch blocks the
/// whole pipeline regardless of symbol content.
pub fn validate_sync_record(record: &SyncRecord, canon: &UpstreamConfig) -> anyhow::Result<()> {
    if record.remote_url != canon.remote_url {
        return Err(GateError::MismatchedUpstream(format!(
            "remote '{}' does not match canonical '{}'",
            record.remote_url, canon.remote_url
        ))
        .into());
    }

    let pattern = regex::Regex::new(&canon.ref_pattern)
        .with_context(|| format!("invalid upstream.ref_pattern '{}'", canon.ref_pattern))?;
    if !pattern.is_match(&record.git_ref) {
        return Err(GateError::MismatchedUpstream(format!(
            "ref '{}' does not match pattern '{}'",
            record.git_ref, canon.ref_pattern
        ))
        .into());
    }

    if !is_full_commit(&record.commit) {
        return Err(GateError::MismatchedUpstream(format!(
            "commit '{}' is not a full 40-hex identifier",
            record.commit
        ))
        .into());
    }

    if record.verified_at.trim().is_empty() {
        return Err(GateError::MismatchedUpstream(
            "sync record has an empty verifiedAt date".to_string(),
        )
        .into());
    }

    Ok(())
}

fn is_full_commit(commit: &str) -> bool {
    commit.len() == 40
        && commit
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
