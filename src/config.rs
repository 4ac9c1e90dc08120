use crate::domain::models::PolicyConfig;
use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "abigate.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub upstream: UpstreamConfig,
    pub extract: ExtractConfig,
    #[serde(default)]
    pub baselines: BaselineConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
}

/// Canonical upstream identity the working tree must match.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    pub remote_url: String,
    pub ref_pattern: String,
    #[serde(default = "default_record_path")]
    pub record_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractConfig {
    #[serde(default)]
    pub artifacts: Vec<String>,
    pub export_prefix: String,
    /// Export-listing command override; the artifact path is appended.
    /// When unset, `nm`/`llvm-nm` candidates are tried in order.
    #[serde(default)]
    pub list_tool: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BaselineConfig {
    #[serde(default = "default_baselines_dir")]
    pub dir: String,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            dir: default_baselines_dir(),
        }
    }
}

fn default_record_path() -> String {
    "upstream/sync-record.json".to_string()
}

fn default_baselines_dir() -> String {
    "abi/baselines".to_string()
}

pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("unable to read config '{}'", path.display()))?;
    let cfg: Config =
        toml::from_str(&raw).with_context(|| format!("invalid config '{}'", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_parses_with_defaults() {
        let cfg: Config = toml::from_str(
            r#"
[upstream]
remote_url = "https://github.com/acme/engine.git"
ref_pattern = "^refs/heads/m[0-9]+$"

[extract]
export_prefix = "lrtc_"
"#,
        )
        .unwrap();
        assert_eq!(cfg.upstream.record_path, "upstream/sync-record.json");
        assert_eq!(cfg.baselines.dir, "abi/baselines");
        assert!(cfg.policy.allow.is_empty());
        assert!(cfg.extract.list_tool.is_none());
    }

    #[test]
    fn policy_allow_entries_parse() {
        let cfg: Config = toml::from_str(
            r#"
[upstream]
remote_url = "u"
ref_pattern = "r"

[extract]
export_prefix = "lrtc_"

[[policy.allow]]
symbol = "lrtc_legacy_init"
kind = "function"
justification = "superseded by lrtc_init_ex in r4"
"#,
        )
        .unwrap();
        assert_eq!(cfg.policy.allow.len(), 1);
        assert_eq!(cfg.policy.allow[0].symbol, "lrtc_legacy_init");
    }
}
