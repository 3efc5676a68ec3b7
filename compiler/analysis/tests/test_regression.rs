mod common;

use analysis::{
    analyze, check_regression, Acknowledgement, AnalysisError, ChangeKind, RegressionCheck, RegressionState,
    Severity,
};
use common::{canonical, edited, endpoint};
use schema::{FieldDef, TypeKind};

#[test]
fn test_identical_snapshots_have_no_change() {
    let base = canonical();
    let report = check_regression(&base, &base, false);
    assert_eq!(report.state, RegressionState::NoChange);
    assert!(report.changes.is_empty());
    assert!(report.acknowledged_by.is_none());
}

#[test]
fn test_states_advance_in_order() {
    let base = canonical();
    let mut check = RegressionCheck::new(&base, &base);
    assert_eq!(check.state(), RegressionState::Clean);
    assert!(check.diff().is_empty());
    assert_eq!(check.state(), RegressionState::Diffing);
    assert!(!check.state().is_terminal());
    assert!(check.classify(false).state.is_terminal());
}

#[test]
fn test_removing_a_required_param_is_blocked() {
    let base = canonical();
    let current = edited(&base, "1.1.0", |_, endpoints, _| {
        endpoint(endpoints, "checkWallet").params.retain(|p| p.name != "Blockchain");
    });
    let report = check_regression(&base, &current, false);
    assert_eq!(report.state, RegressionState::Breaking { acknowledged: false });
    let breaking: Vec<_> = report.breaking().collect();
    assert_eq!(breaking.len(), 1);
    assert_eq!(breaking[0].subject, "endpoint checkWallet");
    assert_eq!(breaking[0].kind, ChangeKind::ParamRemoved { param: "Blockchain".into(), required: true });

    let error = report.into_result().expect_err("blocked");
    assert_eq!(error.changes.len(), 1);
    assert_eq!(error.current, "1.1.0");
}

#[test]
fn test_optional_response_field_is_non_breaking() {
    let base = canonical();
    let current = edited(&base, "1.1.0", |types, _, _| {
        let existence = types.iter_mut().find(|t| t.name == "WalletExistence").expect("type");
        if let TypeKind::Record { fields, .. } = &mut existence.kind {
            fields.push(FieldDef {
                name: "createdAt".into(),
                type_ref: "Timestamp".into(),
                required: false,
                description: String::new(),
            });
        }
    });
    let report = check_regression(&base, &current, false);
    assert_eq!(report.state, RegressionState::NonBreaking);
    assert_eq!(report.changes.len(), 1);
    assert_eq!(report.changes[0].severity, Severity::NonBreaking);
    assert!(report.into_result().is_ok());
}

#[test]
fn test_major_bump_acknowledges() {
    let base = canonical();
    let current = edited(&base, "2.0.0", |_, endpoints, _| {
        endpoints.retain(|e| e.name != "checkWallet");
    });
    let report = check_regression(&base, &current, false);
    assert_eq!(report.state, RegressionState::Breaking { acknowledged: true });
    assert_eq!(report.acknowledged_by, Some(Acknowledgement::MajorBump));
    assert!(report.into_result().is_ok());
}

#[test]
fn test_flag_acknowledges_a_minor_release() {
    let base = canonical();
    let current = edited(&base, "1.2.0", |_, endpoints, _| {
        endpoint(endpoints, "getWallet").response = "WalletExistence".into();
    });
    let report = check_regression(&base, &current, true);
    assert_eq!(report.acknowledged_by, Some(Acknowledgement::Flag));
    assert!(!report.state.is_blocked());
    assert!(analyze(&current, Some(&base), true).is_ok());
    assert!(matches!(analyze(&current, Some(&base), false), Err(AnalysisError::Breaking(_))));
}

#[test]
fn test_additions_are_non_breaking() {
    let base = canonical();
    let current = edited(&base, "1.1.0", |_, endpoints, _| {
        let mut extra = endpoints[0].clone();
        extra.name = "checkWalletV2".into();
        extra.dispatch_key = "checkWalletV2".into();
        endpoints.push(extra);
        endpoint(endpoints, "checkWallet").params[0].required = false;
    });
    let report = check_regression(&base, &current, false);
    assert_eq!(report.state, RegressionState::NonBreaking);
    let kinds: Vec<&ChangeKind> = report.changes.iter().map(|c| &c.kind).collect();
    assert!(kinds.contains(&&ChangeKind::EndpointAdded));
    assert!(kinds.contains(&&ChangeKind::ParamRequiredLoosened { param: "Blockchain".into() }));
}

#[test]
fn test_narrowed_contract_is_breaking() {
    let base = canonical();
    let current = edited(&base, "1.1.0", |types, _, _| {
        let address = types.iter_mut().find(|t| t.name == "Address").expect("type");
        if let TypeKind::CompositeContract { contracts, .. } = &mut address.kind {
            contracts.push(schema::Contract::Prefix { prefix: "0x".into() });
        }
    });
    let report = check_regression(&base, &current, false);
    assert_eq!(report.changes.len(), 1);
    assert_eq!(report.changes[0].kind, ChangeKind::ContractsNarrowed);
    assert!(report.state.is_blocked());
}
