use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::domain::models::{BaselineSnapshot, JsonOut, SyncStatusReport};
use crate::services::baseline::BaselineStore;
use crate::services::output::{print_one, print_out};
use crate::services::storage::{now_secs, write_atomic};
use crate::services::{extractor, sync_ledger};
use std::path::{Path, PathBuf};

pub fn handle_admin_commands(cli: &Cli, cfg: &Config) -> anyhow::Result<bool> {
    match &cli.command {
        Commands::ShowBaseline { tag } => {
            let store = BaselineStore::new(&cfg.baselines.dir);
            let snapshot = store.get(tag)?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&JsonOut {
                        ok: true,
                        data: &snapshot
                    })?
                );
            } else {
                println!("releaseTag: {}", snapshot.release_tag);
                println!("upstreamCommit: {}", snapshot.upstream_commit);
                println!("version: {}", snapshot.version);
                println!("createdAt: {}", snapshot.created_at);
                for symbol in &snapshot.symbols {
                    println!(
                        "{}\t{}\t{}",
                        symbol.kind.as_str(),
                        symbol.name,
                        short_fingerprint(&symbol.fingerprint)
                    );
                }
            }
            Ok(true)
        }
        Commands::Baselines => {
            let store = BaselineStore::new(&cfg.baselines.dir);
            let items = store.list()?;
            print_out(cli.json, &items, |i| {
                format!(
                    "{}\tv{}\t{}\t{} symbols",
                    i.release_tag, i.version, i.created_at, i.symbol_count
                )
            })?;
            Ok(true)
        }
        Commands::Snapshot {
            release_tag,
            artifact,
            output,
        } => {
            let record = sync_ledger::load_sync_record(Path::new(&cfg.upstream.record_path))?;
            sync_ledger::validate_sync_record(&record, &cfg.upstream)?;

            let artifacts: Vec<PathBuf> = if artifact.is_empty() {
                cfg.extract.artifacts.iter().map(PathBuf::from).collect()
            } else {
                artifact.clone()
            };
            if artifacts.is_empty() {
                anyhow::bail!("no artifacts configured; set [extract].artifacts or pass --artifact");
            }
            let mut sets = Vec::new();
            for a in &artifacts {
                sets.push(extractor::extract_symbols(a, &cfg.extract)?);
            }
            let merged = extractor::merge_symbol_sets(sets)?;
            let snapshot = BaselineSnapshot {
                release_tag: release_tag.clone(),
                upstream_commit: record.commit.clone(),
                created_at: now_secs(),
                version: 1,
                symbols: merged.to_sorted_vec(),
            };

            match output {
                Some(path) => {
                    write_atomic(path, &serde_json::to_string_pretty(&snapshot)?)?;
                    print_one(cli.json, &snapshot, |s| {
                        format!(
                            "snapshot written: {} ({} symbols) -> {}",
                            s.release_tag,
                            s.symbols.len(),
                            path.display()
                        )
                    })?;
                }
                None => {
                    print_one(cli.json, &snapshot, |s| {
                        serde_json::to_string_pretty(s).unwrap_or_default()
                    })?;
                }
            }
            Ok(true)
        }
        Commands::SyncStatus => {
            let record = sync_ledger::load_sync_record(Path::new(&cfg.upstream.record_path))?;
            sync_ledger::validate_sync_record(&record, &cfg.upstream)?;
            let report = SyncStatusReport {
                remote_url: record.remote_url,
                git_ref: record.git_ref,
                commit: record.commit,
                verified_at: record.verified_at,
                status: "ok".to_string(),
            };
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&JsonOut {
                        ok: true,
                        data: report
                    })?
                );
            } else {
                println!("remoteUrl: {}", report.remote_url);
                println!("ref: {}", report.git_ref);
                println!("commit: {}", report.commit);
                println!("verifiedAt: {}", report.verified_at);
                println!("status: {}", report.status);
            }
            Ok(true)
        }
        _ => Ok(false),
    }
}

fn short_fingerprint(fingerprint: &str) -> String {
    fingerprint.chars().take(12).collect()
}
