use std::fs;
use std::path::{Path, PathBuf};

use codegen::GenerationError;
use pipeline::{generate, validate, PipelineError, PipelineOptions};
use schema::SchemaSnapshot;
use types::TargetLanguage;

fn canonical_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../resources/schema/circular-wallet.json")
}

fn options(schema: &Path, out: &Path) -> PipelineOptions {
    PipelineOptions::builder().schema(schema).output_dir(out).build().expect("options")
}

/// Write an edited copy of the canonical snapshot.
fn write_edited(dir: &Path, name: &str, edit: impl FnOnce(SchemaSnapshot) -> SchemaSnapshot) -> PathBuf {
    let base = SchemaSnapshot::from_file(canonical_path()).expect("canonical");
    let snapshot = edit(base);
    let path = dir.join(name);
    snapshot.to_file(&path).expect("write snapshot");
    path
}

#[test]
fn test_generate_writes_the_documented_layout() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("generated");
    let report = generate(&options(&canonical_path(), &out)).expect("run");
    assert!(report.is_success(), "{}", report);
    assert_eq!(report.succeeded.len(), 4);
    assert!(out.join("openapi.json").is_file());
    assert!(out.join("mock/routes.json").is_file());
    for target in TargetLanguage::ALL {
        let target_dir = out.join(target.as_str());
        assert!(target_dir.join(target.sdk_file()).is_file(), "{} sdk", target);
        assert!(target_dir.join(target.test_file()).is_file(), "{} suite", target);
        assert!(target_dir.join(target.driver_file()).is_file(), "{} driver", target);
    }
    assert!(!out.join(pipeline::staging::STAGING_DIR).exists());
}

#[test]
fn test_generation_is_deterministic() {
    let dir = tempfile::tempdir().expect("tempdir");
    let first = dir.path().join("a");
    let second = dir.path().join("b");
    generate(&options(&canonical_path(), &first)).expect("first");
    generate(&options(&canonical_path(), &second)).expect("second");
    for target in TargetLanguage::ALL {
        for file in [target.sdk_file(), target.test_file(), target.driver_file()] {
            let a = fs::read(first.join(target.as_str()).join(file)).expect("a");
            let b = fs::read(second.join(target.as_str()).join(file)).expect("b");
            assert_eq!(a, b, "{}/{} differs between runs", target, file);
        }
    }
    assert_eq!(
        fs::read(first.join("openapi.json")).expect("a"),
        fs::read(second.join("openapi.json")).expect("b")
    );
}

#[test]
fn test_failing_target_is_isolated() {
    let dir = tempfile::tempdir().expect("tempdir");
    let schema = write_edited(dir.path(), "schema.json", |base| {
        let (version, wire) = (base.schema_version().to_string(), base.wire_version().to_string());
        let (types, endpoints, mut helpers) = base.into_parts();
        let hex_fix = helpers.iter_mut().find(|h| h.name == "hexFix").expect("hexFix");
        hex_fix.implementations.insert("go".into(), "return {{p:nothing}}".into());
        SchemaSnapshot::new(version, wire, types, endpoints, helpers)
    });
    let out = dir.path().join("generated");
    let report = generate(&options(&schema, &out)).expect("run");

    assert!(!report.is_success());
    assert_eq!(report.failed_targets(), vec![TargetLanguage::Go]);
    assert!(matches!(report.failures[0], GenerationError::UnknownPlaceholder { .. }));
    assert_eq!(report.succeeded.len(), 3);
    assert!(!out.join("go").exists(), "a failed target leaves no artifact");
    assert!(out.join("python").join(TargetLanguage::Python.sdk_file()).is_file());
}

#[test]
fn test_failed_target_keeps_previous_artifacts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("generated");
    let mut go_only = options(&canonical_path(), &out);
    go_only.targets = vec![TargetLanguage::Go];
    generate(&go_only).expect("first run");
    let before = fs::read_to_string(out.join("go").join(TargetLanguage::Go.sdk_file())).expect("sdk");

    let schema = write_edited(dir.path(), "schema.json", |base| {
        let (version, wire) = (base.schema_version().to_string(), base.wire_version().to_string());
        let (types, endpoints, mut helpers) = base.into_parts();
        let hex_fix = helpers.iter_mut().find(|h| h.name == "hexFix").expect("hexFix");
        hex_fix.implementations.insert("go".into(), "return {{p:nothing}}".into());
        SchemaSnapshot::new(version, wire, types, endpoints, helpers)
    });
    go_only.schema_path = schema;
    let report = generate(&go_only).expect("second run");
    assert!(!report.is_success());
    let after = fs::read_to_string(out.join("go").join(TargetLanguage::Go.sdk_file())).expect("sdk");
    assert_eq!(before, after);
}

#[test]
fn test_breaking_baseline_blocks_before_writing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let baseline = write_edited(dir.path(), "baseline.json", |base| {
        let wire = base.wire_version().to_string();
        let (types, mut endpoints, helpers) = base.into_parts();
        let check = endpoints.iter_mut().find(|e| e.name == "checkWallet").expect("checkWallet");
        check.params.iter_mut().for_each(|p| p.required = false);
        // Same major version: the tightening is not acknowledged by a bump.
        SchemaSnapshot::new("1.0.0", wire, types, endpoints, helpers)
    });
    let out = dir.path().join("generated");
    let mut opts = options(&canonical_path(), &out);
    opts.baseline_path = Some(baseline);

    let err = generate(&opts).expect_err("blocked");
    assert!(matches!(err, PipelineError::Analysis(analysis::AnalysisError::Breaking(_))), "{}", err);
    assert!(!out.exists());

    opts.acknowledge_breaking = true;
    let report = generate(&opts).expect("acknowledged");
    let regression = report.regression.expect("regression report");
    assert!(regression.acknowledged_by.is_some());
}

#[test]
fn test_invalid_schema_is_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let schema = write_edited(dir.path(), "schema.json", |base| {
        let (version, wire) = (base.schema_version().to_string(), base.wire_version().to_string());
        let (types, mut endpoints, helpers) = base.into_parts();
        endpoints[0].response = "NoSuchType".into();
        SchemaSnapshot::new(version, wire, types, endpoints, helpers)
    });
    let err = validate(&options(&schema, dir.path())).expect_err("invalid");
    assert!(err.to_string().contains("NoSuchType"), "{}", err);

    let missing = validate(&options(&dir.path().join("absent.json"), dir.path())).expect_err("missing");
    assert!(matches!(missing, PipelineError::Schema(_)));
}
