use crate::config::DEFAULT_CONFIG_PATH;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "abigate", version, about = "ABI release gate for the native interop library")]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(
        long,
        global = true,
        default_value = DEFAULT_CONFIG_PATH,
        help = "Path to the abigate TOML config"
    )]
    pub config: String,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    ReleasePrepare {
        #[arg(long)]
        release_tag: String,
        #[arg(long, help = "Baseline tag to compare against (default: latest)")]
        baseline: Option<String>,
        #[arg(long, help = "Artifact path override (repeatable)")]
        artifact: Vec<PathBuf>,
        #[arg(long, help = "Skip extraction and diff; decision becomes skipped")]
        skip_binary: bool,
        #[arg(long, help = "Store the verified symbol set as the tag's baseline")]
        update_baselines: bool,
    },
    Verify {
        #[arg(long, default_value = "current")]
        release_tag: String,
        #[arg(long, help = "Baseline tag to compare against (default: latest)")]
        baseline: Option<String>,
        #[arg(long, help = "Artifact path override (repeatable)")]
        artifact: Vec<PathBuf>,
        #[arg(long, help = "Skip extraction and diff; decision becomes skipped")]
        skip_binary: bool,
    },
    ShowBaseline {
        tag: String,
    },
    Baselines,
    Snapshot {
        #[arg(long, default_value = "current")]
        release_tag: String,
        #[arg(long, help = "Artifact path override (repeatable)")]
        artifact: Vec<PathBuf>,
        #[arg(long, help = "Write the snapshot JSON to a file instead of stdout")]
        output: Option<PathBuf>,
    },
    Diff {
        #[arg(long, help = "Baseline snapshot file")]
        baseline: PathBuf,
        #[arg(long, help = "Current snapshot file")]
        current: PathBuf,
    },
    SyncStatus,
}
