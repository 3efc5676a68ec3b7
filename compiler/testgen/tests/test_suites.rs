mod common;

use codegen::{generate_sdk, ArtifactKind};
use testgen::{generate_test_artifacts, suite_renderer_for, PARITY_MARKER};
use types::TargetLanguage;

#[test]
fn test_every_target_renders_suite_and_driver() {
    let ctx = common::context();
    for target in TargetLanguage::ALL {
        let (model, _) = generate_sdk(&ctx, target).expect("sdk");
        let artifacts = generate_test_artifacts(&ctx, &model).expect("tests");
        assert_eq!(artifacts.len(), 2);
        assert_eq!(artifacts[0].kind, ArtifactKind::TestSuite);
        assert_eq!(artifacts[0].path.to_str(), Some(format!("{}/{}", target.as_str(), target.test_file()).as_str()));
        assert_eq!(artifacts[1].kind, ArtifactKind::ParityDriver);
        assert_eq!(artifacts[1].path.to_str(), Some(format!("{}/{}", target.as_str(), target.driver_file()).as_str()));
        assert!(artifacts.iter().all(|a| a.schema_hash == ctx.schema_hash()));
        assert!(artifacts[1].content.contains(PARITY_MARKER.trim_end()), "{} driver prints the marker", target);
    }
}

#[test]
fn test_suites_name_tests_by_tier() {
    let ctx = common::context();
    let expected = [
        (TargetLanguage::Python, "test_unit_hex_fix_0", "test_integration_check_wallet"),
        (TargetLanguage::TypeScript, "unit_hexFix_0", "integration_checkWallet"),
        (TargetLanguage::Go, "TestUnitHexFix0", "TestIntegrationCheckWallet"),
        (TargetLanguage::Java, "unitHexFix0", "integrationCheckWallet"),
    ];
    for (target, unit, integration) in expected {
        let (model, _) = generate_sdk(&ctx, target).expect("sdk");
        let suite = suite_renderer_for(target).render_suite(&model).expect("suite");
        assert!(suite.contains(unit), "{} suite lacks {}", target, unit);
        assert!(suite.contains(integration), "{} suite lacks {}", target, integration);
    }
}

#[test]
fn test_one_integration_test_per_endpoint() {
    let ctx = common::context();
    let (model, _) = generate_sdk(&ctx, TargetLanguage::Python).expect("sdk");
    let suite = suite_renderer_for(TargetLanguage::Python).render_suite(&model).expect("suite");
    let integration = suite.matches("def test_integration_").count();
    assert_eq!(integration, ctx.registries().endpoints.len());
    // Helpers without test cases contribute nothing.
    assert!(!suite.contains("test_unit_get_formatted_timestamp"));
}

#[test]
fn test_drivers_list_every_endpoint() {
    let ctx = common::context();
    for target in TargetLanguage::ALL {
        let (model, _) = generate_sdk(&ctx, target).expect("sdk");
        let driver = suite_renderer_for(target).render_driver(&model).expect("driver");
        for endpoint in ctx.registries().endpoints.iter() {
            assert!(driver.contains(&format!("\"{}\"", endpoint.name)), "{} driver lacks {}", target, endpoint.name);
        }
    }
}
