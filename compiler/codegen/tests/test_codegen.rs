//! Rendering the canonical schema for every target.

use std::collections::BTreeSet;
use std::path::PathBuf;

use codegen::{
    build_route_table, generate_sdk, openapi_artifact, verify_route_table, ClientModel,
    GenerationContext, MethodSource,
};
use regex::Regex;
use schema::SchemaSnapshot;
use types::TargetLanguage;

fn canonical() -> GenerationContext {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../resources/schema/circular-wallet.json");
    let snapshot = SchemaSnapshot::from_file(&path).expect("canonical schema");
    GenerationContext::new(snapshot).expect("context")
}

fn surface(target: TargetLanguage, source: &str) -> BTreeSet<String> {
    let pattern = Regex::new(target.surface_pattern()).expect("pattern");
    pattern.captures_iter(source).map(|c| c[1].to_string()).collect()
}

#[test]
fn every_target_renders_every_method() {
    let ctx = canonical();
    let expected = ctx.registries().endpoints.len() + ctx.registries().helpers.len();
    assert_eq!(expected, 38);

    for target in TargetLanguage::ALL {
        let (model, artifact) =
            generate_sdk(&ctx, target).unwrap_or_else(|e| panic!("{}: {:?}", target, e));
        assert_eq!(model.methods.len(), expected, "{}", target);
        assert_eq!(model.endpoints().count(), 24);

        let idents: BTreeSet<String> = model.methods.iter().map(|m| m.ident.clone()).collect();
        assert_eq!(idents.len(), expected, "{} idents are distinct", target);
        assert_eq!(surface(target, &artifact.content), idents, "{} rendered surface", target);
    }
}

#[test]
fn rendering_is_deterministic() {
    for target in TargetLanguage::ALL {
        let (_, first) = generate_sdk(&canonical(), target).expect("first");
        let (_, second) = generate_sdk(&canonical(), target).expect("second");
        assert_eq!(first.content, second.content, "{}", target);
        assert_eq!(first.schema_hash, second.schema_hash);
    }
}

#[test]
fn sdk_docs_quote_the_canonical_example() {
    let ctx = canonical();
    let check = ctx.registries().endpoints.get("checkWallet").expect("checkWallet");
    let request = check.request_text();
    let response = check.response_text();
    assert_eq!(response, r#"{"Response":{"exists":true},"Result":200}"#);

    for target in TargetLanguage::ALL {
        let (_, artifact) = generate_sdk(&ctx, target).expect("sdk");
        assert!(artifact.content.contains(&request), "{} request example", target);
        assert!(artifact.content.contains(&response), "{} response example", target);
        assert!(artifact.content.contains(ctx.snapshot().short_hash()), "{} provenance", target);
    }
}

#[test]
fn check_wallet_normalizes_its_address() {
    let ctx = canonical();
    for target in TargetLanguage::ALL {
        let model = ClientModel::build(&ctx, target).expect("model");
        let method = model.method("checkWallet").expect("checkWallet");
        let address = method.params.iter().find(|p| p.wire_name == "Address").expect("Address");
        let normalizer = address.normalize.as_ref().expect("normalizer");
        assert_eq!(Some(normalizer.method.as_str()), model.method("hexFix").map(|m| m.ident.as_str()));
    }
}

#[test]
fn hex_fix_carries_its_test_table() {
    let ctx = canonical();
    let model = ClientModel::build(&ctx, TargetLanguage::Python).expect("model");
    let MethodSource::Helper { test_cases, .. } = &model.method("hexFix").expect("hexFix").source
    else {
        panic!("hexFix is a helper");
    };
    let cases: Vec<(String, String)> = test_cases
        .iter()
        .map(|c| (c.inputs[0].as_str().unwrap_or_default().to_string(), c.expected.to_string()))
        .collect();
    assert_eq!(
        cases,
        [("0x1234".to_string(), "\"1234\"".to_string()), ("abcd".to_string(), "\"abcd\"".to_string())]
    );
}

#[test]
fn openapi_has_one_path_per_endpoint() {
    let ctx = canonical();
    let artifact = openapi_artifact(&ctx).expect("openapi");
    let document: serde_json::Value = serde_json::from_str(&artifact.content).expect("json");
    let paths = document["paths"].as_object().expect("paths");
    assert_eq!(paths.len(), ctx.registries().endpoints.len());
    assert_eq!(
        paths["/operations/checkWallet"]["post"]["x-operation-selector"],
        serde_json::json!("checkWallet")
    );
    assert_eq!(document["info"]["x-schema-hash"], serde_json::json!(ctx.schema_hash()));
}

#[test]
fn route_table_serves_response_text() {
    let ctx = canonical();
    let table = build_route_table(&ctx);
    assert_eq!(table.len(), ctx.registries().endpoints.len());
    for endpoint in ctx.registries().endpoints.iter() {
        let route = table.get(&endpoint.dispatch_key).expect("route");
        assert_eq!(route.response, endpoint.response_text());
    }
    verify_route_table(&table, &ctx.registries().endpoints).expect("no mismatch");
}
