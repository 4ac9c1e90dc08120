use crate::config::ExtractConfig;
use crate::domain::errors::GateError;
use crate::domain::models::{Symbol, SymbolKind, SymbolSet, Visibility};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::process::Command;

/// One line of an export listing before filtering/canonicalization.
#[derive(Debug, PartialEq)]
struct RawExport {
    name: String,
    code: char,
    size: Option<u64>,
}

/// Extracts the filtered, fingerprinted export surface of one artifact.
///
/// Deterministic for a fixed input binary. An artifact with zero exports,
/// or zero exports matching the filter, is invalid input rather than an
/// empty-but-valid set.
pub fn extract_symbols(artifact: &Path, cfg: &ExtractConfig) -> anyhow::Result<SymbolSet> {
    if !artifact.is_file() {
        return Err(extraction_error(artifact, "artifact does not exist or is not a file").into());
    }

    let listing = run_list_tool(artifact, cfg.list_tool.as_deref())?;
    let raw = parse_export_listing(&listing);
    if raw.is_empty() {
        return Err(extraction_error(artifact, "artifact has no exported symbols").into());
    }

    let mut set = SymbolSet::new();
    for export in raw {
        let Some(name) = canonicalize_symbol(&export.name, &cfg.export_prefix) else {
            continue;
        };
        let Some((kind, visibility)) = classify_nm_code(export.code) else {
            continue;
        };
        let (fingerprint, low_confidence) = fingerprint(&name, kind, export.size);
        set.insert(Symbol {
            name,
            kind,
            visibility,
            fingerprint,
            low_confidence,
            introduced_in: None,
        })?;
    }

    if set.is_empty() {
        return Err(extraction_error(
            artifact,
            &format!(
                "no exported symbols match prefix '{}'",
                cfg.export_prefix
            ),
        )
        .into());
    }
    Ok(set)
}

/// Unions per-artifact sets for builds that share one logical ABI.
/// The same identity with conflicting fingerprints is a build
/// inconsistency and fails the merge outright.
pub fn merge_symbol_sets(sets: Vec<SymbolSet>) -> anyhow::Result<SymbolSet> {
    let mut merged = SymbolSet::new();
    for set in sets {
        for symbol in set.iter() {
            merged.insert(symbol.clone())?;
        }
    }
    Ok(merged)
}

fn extraction_error(artifact: &Path, reason: &str) -> GateError {
    GateError::SymbolExtraction {
        path: artifact.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Runs the first available export-listing tool. The configured override
/// takes precedence; otherwise `nm` then `llvm-nm` are tried.
fn run_list_tool(artifact: &Path, tool_override: Option<&[String]>) -> anyhow::Result<String> {
    let path = artifact.display().to_string();
    let commands: Vec<Vec<String>> = match tool_override {
        Some(cmd) if !cmd.is_empty() => {
            let mut c: Vec<String> = cmd.to_vec();
            c.push(path);
            vec![c]
        }
        _ => vec![
            vec![
                "nm".into(),
                "-D".into(),
                "--defined-only".into(),
                "-S".into(),
                path.clone(),
            ],
            vec![
                "llvm-nm".into(),
                "-D".into(),
                "--defined-only".into(),
                "--print-size".into(),
                path,
            ],
        ],
    };

    let mut failures = Vec::new();
    for cmd in &commands {
        let output = match Command::new(&cmd[0]).args(&cmd[1..]).output() {
            // tool not installed; try the next candidate
            Err(_) => continue,
            Ok(o) => o,
        };
        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }
        failures.push(format!(
            "{}: {}",
            cmd[0],
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    let reason = if failures.is_empty() {
        "no export listing tool available (install nm or llvm-nm)".to_string()
    } else {
        failures.join(" | ")
    };
    Err(extraction_error(artifact, &reason).into())
}

/// Parses `nm`-style output. Accepted line shapes:
/// `<addr> <size> <code> <name>`, `<addr> <code> <name>`, `<code> <name>`.
/// File headers (`lib.so:`) and blank lines are skipped.
fn parse_export_listing(output: &str) -> Vec<RawExport> {
    let mut exports = Vec::new();
    for raw_line in output.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.ends_with(':') {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 2 || tokens.len() > 4 {
            continue;
        }
        let code_token = tokens[tokens.len() - 2];
        if code_token.len() != 1 {
            continue;
        }
        let size = if tokens.len() == 4 {
            u64::from_str_radix(tokens[1], 16).ok()
        } else {
            None
        };
        exports.push(RawExport {
            name: tokens[tokens.len() - 1].to_string(),
            code: code_token.chars().next().unwrap_or('?'),
            size,
        });
    }
    exports
}

/// Strips one leading underscore and a trailing `@N` stdcall decoration,
/// then applies the export prefix filter.
fn canonicalize_symbol(raw: &str, prefix: &str) -> Option<String> {
    let mut base = raw.strip_prefix('_').unwrap_or(raw);
    if let Some((left, right)) = base.rsplit_once('@') {
        if !right.is_empty() && right.bytes().all(|b| b.is_ascii_digit()) {
            base = left;
        }
    }
    if !prefix.is_empty() && !base.starts_with(prefix) {
        return None;
    }
    Some(base.to_string())
}

/// Maps an `nm` symbol type code to kind and visibility. Codes outside the
/// exported text/data/alias space (undefined, absolute, debug) are dropped.
fn classify_nm_code(code: char) -> Option<(SymbolKind, Visibility)> {
    let visibility = if code.is_uppercase() {
        Visibility::Public
    } else {
        Visibility::Hidden
    };
    let kind = match code {
        'T' | 't' | 'W' | 'w' => SymbolKind::Function,
        'D' | 'd' | 'B' | 'b' | 'R' | 'r' | 'G' | 'g' | 'S' | 's' | 'V' | 'v' => SymbolKind::Data,
        'I' | 'i' => SymbolKind::Alias,
        _ => return None,
    };
    Some((kind, visibility))
}

/// Fingerprint from the shape information the listing resolves: data
/// objects incorporate their reported size; everything else falls back to
/// name+kind and is flagged low-confidence.
fn fingerprint(name: &str, kind: SymbolKind, size: Option<u64>) -> (String, bool) {
    match (kind, size) {
        (SymbolKind::Data, Some(size)) => {
            (hash_payload(&format!("{}:{}:{}", kind.as_str(), name, size)), false)
        }
        _ => (hash_payload(&format!("{}:{}", kind.as_str(), name)), true),
    }
}

fn hash_payload(payload: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hex::encode(hasher.finalize())
}
