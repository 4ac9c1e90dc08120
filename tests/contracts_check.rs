mod common;

use common::TestEnv;
use jsonschema::JSONSchema;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

fn load_schema(name: &str) -> Value {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let raw = fs::read_to_string(root.join("docs/contracts").join(name)).unwrap();
    serde_json::from_str(&raw).unwrap()
}

fn validate(schema_name: &str, data: &Value) {
    let schema = load_schema(schema_name);
    let validator = JSONSchema::compile(&schema).expect("compile schema");
    let msgs: Vec<String> = match validator.validate(data) {
        Ok(()) => return,
        Err(errors) => errors.map(|e| e.to_string()).collect(),
    };
    panic!("schema validation failed: {}", msgs.join(" | "));
}

#[test]
fn contracts_check() {
    let env = TestEnv::new();

    let first = env.run_json(&[
        "release-prepare",
        "--release-tag",
        "r1",
        "--update-baselines",
    ]);
    assert_eq!(first["ok"], true);
    validate("decision.schema.json", &first["data"]);

    let shown = env.run_json(&["show-baseline", "r1"]);
    assert_eq!(shown["ok"], true);
    validate("snapshot.schema.json", &shown["data"]);

    let listed = env.run_json(&["baselines"]);
    assert_eq!(listed["ok"], true);
    validate("baselines.schema.json", &listed["data"]);

    let sync = env.run_json(&["sync-status"]);
    assert_eq!(sync["ok"], true);
    validate("sync-status.schema.json", &sync["data"]);

    // a failing decision also satisfies the contract
    env.write_artifact(
        "build/libinterop.so",
        "0000000000001139 0000000000000020 T lrtc_init\n",
    );
    let failed = env.run_json_code(&["release-prepare", "--release-tag", "r2"], 1);
    assert_eq!(failed["ok"], false);
    validate("decision.schema.json", &failed["data"]);

    let skipped = env.run_json(&["verify", "--skip-binary"]);
    validate("decision.schema.json", &skipped["data"]);
}
