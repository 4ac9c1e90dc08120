use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const REMOTE_URL: &str = "https://github.com/acme/engine.git";
pub const COMMIT: &str = "0123456789abcdef0123456789abcdef01234567";

pub const DEFAULT_LISTING: &str = "\
build/libinterop.so:
0000000000001139 0000000000000020 T lrtc_init
0000000000001170 0000000000000034 T lrtc_shutdown
0000000000004010 0000000000000008 D lrtc_version_string
0000000000000000 A __abs_marker
                 U free
";

pub struct TestEnv {
    _tmp: TempDir,
    pub root: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().join("repo");
        fs::create_dir_all(&root).expect("create repo root");

        write_fixture_tree(&root);

        Self { _tmp: tmp, root }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("abigate").expect("abigate binary");
        cmd.current_dir(&self.root);
        cmd
    }

    pub fn run_json(&self, args: &[&str]) -> Value {
        let out = self
            .cmd()
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }

    /// Runs expecting the given non-zero exit code and parses the JSON body.
    pub fn run_json_code(&self, args: &[&str], code: i32) -> Value {
        let out = self
            .cmd()
            .arg("--json")
            .args(args)
            .assert()
            .code(code)
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }

    /// (Re)writes an artifact stub plus the canned listing the fake list
    /// tool serves for it.
    pub fn write_artifact(&self, rel: &str, listing: &str) {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create artifact dir");
        }
        fs::write(&path, b"\x7fELF-stub").expect("write artifact stub");
        fs::write(self.root.join(format!("{}.nm", rel)), listing).expect("write listing");
    }

    pub fn write_sync_record(&self, remote_url: &str, git_ref: &str, commit: &str) {
        let record = serde_json::json!({
            "remoteUrl": remote_url,
            "ref": git_ref,
            "commit": commit,
            "verifiedAt": "2026-08-01"
        });
        fs::write(
            self.root.join("upstream/sync-record.json"),
            serde_json::to_string_pretty(&record).expect("serialize sync record"),
        )
        .expect("write sync record");
    }

    pub fn allow_symbol(&self, symbol: &str, kind: &str, justification: &str) {
        let config_path = self.root.join("abigate.toml");
        let mut raw = fs::read_to_string(&config_path).expect("read config");
        raw.push_str(&format!(
            "\n[[policy.allow]]\nsymbol = \"{}\"\nkind = \"{}\"\njustification = \"{}\"\n",
            symbol, kind, justification
        ));
        fs::write(config_path, raw).expect("write config");
    }

    pub fn baselines_dir(&self) -> PathBuf {
        self.root.join("abi/baselines")
    }
}

fn write_fixture_tree(root: &Path) {
    fs::create_dir_all(root.join("upstream")).expect("create upstream dir");
    fs::create_dir_all(root.join("tools")).expect("create tools dir");
    fs::create_dir_all(root.join("build")).expect("create build dir");

    fs::write(
        root.join("abigate.toml"),
        format!(
            r#"[upstream]
remote_url = "{}"
ref_pattern = "^refs/heads/m[0-9]+$"
record_path = "upstream/sync-record.json"

[extract]
artifacts = ["build/libinterop.so"]
export_prefix = "lrtc_"
list_tool = ["tools/fake-nm"]

[baselines]
dir = "abi/baselines"
"#,
            REMOTE_URL
        ),
    )
    .expect("write config");

    let record = serde_json::json!({
        "remoteUrl": REMOTE_URL,
        "ref": "refs/heads/m120",
        "commit": COMMIT,
        "verifiedAt": "2026-08-01"
    });
    fs::write(
        root.join("upstream/sync-record.json"),
        serde_json::to_string_pretty(&record).expect("serialize sync record"),
    )
    .expect("write sync record");

    // Canned listing tool: prints `<artifact>.nm` for whatever artifact
    // path it is invoked with.
    let script = "#!/bin/sh\nwhile [ \"$#\" -gt 1 ]; do shift; done\ncat \"$1.nm\"\n";
    let tool = root.join("tools/fake-nm");
    fs::write(&tool, script).expect("write fake-nm");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).expect("chmod fake-nm");
    }

    fs::write(root.join("build/libinterop.so"), b"\x7fELF-stub").expect("write artifact stub");
    fs::write(root.join("build/libinterop.so.nm"), DEFAULT_LISTING).expect("write listing");
}
