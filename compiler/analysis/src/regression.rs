//! Schema regression (tier 4b)
//!
//! Diffs a prior snapshot against the current one and classifies each change
//! with a fixed rule table. Breaking changes block the run unless they are
//! acknowledged, either by an explicit flag or by a major version bump.
//!
//! ```text
//! Clean -> Diffing -> NoChange
//!                  -> NonBreaking
//!                  -> Breaking(blocked)
//!                  -> Breaking(acknowledged)
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use schema::{
    Contract, EndpointDefinition, FieldDef, HelperDefinition, ParamDef, SchemaSnapshot,
    TypeDefinition, TypeKind,
};
use serde::Serialize;
use thiserror::Error;
use types::SchemaVersion;

/// Classification of one change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Existing callers keep working
    NonBreaking,
    /// Existing callers may break
    Breaking,
}

/// What changed between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum ChangeKind {
    WireVersionChanged { from: String, to: String },
    EndpointRemoved,
    EndpointAdded,
    DispatchKeyChanged { from: String, to: String },
    ParamRemoved { param: String, required: bool },
    ParamAdded { param: String, required: bool },
    ParamTypeChanged { param: String, from: String, to: String },
    ParamRequiredTightened { param: String },
    ParamRequiredLoosened { param: String },
    ResponseTypeChanged { from: String, to: String },
    ErrorAdded { code: i64 },
    ErrorRemoved { code: i64 },
    ExampleChanged,
    TypeRemoved,
    TypeAdded,
    TypeKindChanged { from: String, to: String },
    ContractsNarrowed,
    ContractsLoosened,
    ContractsChanged,
    EnumVariantRemoved { variant: String },
    EnumVariantAdded { variant: String },
    FieldRemoved { field: String, required: bool },
    FieldAdded { field: String, required: bool },
    FieldTypeChanged { field: String, from: String, to: String },
    FieldRequiredTightened { field: String },
    FieldRequiredLoosened { field: String },
    RecordClosed,
    RecordOpened,
    ListItemChanged { from: String, to: String },
    HelperRemoved,
    HelperAdded,
    HelperSignatureChanged,
}

impl ChangeKind {
    /// The rule table.
    ///
    /// Removals, narrowed types and tightened required-ness break callers;
    /// additions and loosened required-ness do not. Removing an optional
    /// parameter breaks SDK call sites that pass it, so it is breaking too.
    pub fn severity(&self) -> Severity {
        use ChangeKind::*;
        match self {
            WireVersionChanged { .. }
            | EndpointRemoved
            | DispatchKeyChanged { .. }
            | ParamRemoved { .. }
            | ParamAdded { required: true, .. }
            | ParamTypeChanged { .. }
            | ParamRequiredTightened { .. }
            | ResponseTypeChanged { .. }
            | TypeRemoved
            | TypeKindChanged { .. }
            | ContractsNarrowed
            | ContractsChanged
            | EnumVariantRemoved { .. }
            | FieldRemoved { required: true, .. }
            | FieldTypeChanged { .. }
            | FieldRequiredTightened { .. }
            | RecordClosed
            | ListItemChanged { .. }
            | HelperRemoved
            | HelperSignatureChanged => Severity::Breaking,
            EndpointAdded
            | ParamAdded { required: false, .. }
            | ParamRequiredLoosened { .. }
            | ErrorAdded { .. }
            | ErrorRemoved { .. }
            | ExampleChanged
            | TypeAdded
            | ContractsLoosened
            | EnumVariantAdded { .. }
            | FieldRemoved { required: false, .. }
            | FieldAdded { .. }
            | FieldRequiredLoosened { .. }
            | RecordOpened
            | HelperAdded => Severity::NonBreaking,
        }
    }
}

/// One classified change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaChange {
    /// What changed (`endpoint checkWallet`, `type Address`, `snapshot`)
    pub subject: String,
    /// The change
    #[serde(flatten)]
    pub kind: ChangeKind,
    /// Its classification
    pub severity: Severity,
}

impl SchemaChange {
    fn new(subject: impl Into<String>, kind: ChangeKind) -> Self {
        let severity = kind.severity();
        Self { subject: subject.into(), kind, severity }
    }

    /// Whether the change breaks callers.
    pub fn is_breaking(&self) -> bool { self.severity == Severity::Breaking }
}

impl fmt::Display for SchemaChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {}: {:?}", self.severity, self.subject, self.kind)
    }
}

/// Why breaking changes were let through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Acknowledgement {
    /// Explicit acknowledgement flag
    Flag,
    /// The current snapshot bumps the major version
    MajorBump,
}

/// State of a regression check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegressionState {
    /// Nothing compared yet
    Clean,
    /// Changes collected, not yet classified
    Diffing,
    /// The snapshots are identical
    NoChange,
    /// Only non-breaking changes
    NonBreaking,
    /// Breaking changes, blocked or acknowledged
    Breaking {
        /// Whether the breaking changes were acknowledged
        acknowledged: bool,
    },
}

impl RegressionState {
    /// Whether the check has finished.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RegressionState::Clean | RegressionState::Diffing)
    }

    /// Whether the run must halt.
    pub fn is_blocked(&self) -> bool { matches!(self, RegressionState::Breaking { acknowledged: false }) }
}

impl fmt::Display for RegressionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RegressionState::Clean => "clean",
            RegressionState::Diffing => "diffing",
            RegressionState::NoChange => "no change",
            RegressionState::NonBreaking => "non-breaking",
            RegressionState::Breaking { acknowledged: false } => "breaking (blocked)",
            RegressionState::Breaking { acknowledged: true } => "breaking (acknowledged)",
        };
        f.write_str(s)
    }
}

/// Breaking changes without an acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} breaking change(s) from {previous} to {current} need acknowledgement", .changes.len())]
pub struct BreakingChange {
    /// Prior schema version
    pub previous: String,
    /// Current schema version
    pub current: String,
    /// The breaking changes
    pub changes: Vec<SchemaChange>,
}

/// Outcome of a finished regression check.
#[derive(Debug, Clone, Serialize)]
pub struct RegressionReport {
    /// Prior schema version
    pub previous: String,
    /// Current schema version
    pub current: String,
    /// Terminal state
    pub state: RegressionState,
    /// Every change, in diff order
    pub changes: Vec<SchemaChange>,
    /// Set when breaking changes were acknowledged
    pub acknowledged_by: Option<Acknowledgement>,
}

impl RegressionReport {
    /// The breaking changes.
    pub fn breaking(&self) -> impl Iterator<Item = &SchemaChange> { self.changes.iter().filter(|c| c.is_breaking()) }

    /// The non-breaking changes.
    pub fn non_breaking(&self) -> impl Iterator<Item = &SchemaChange> {
        self.changes.iter().filter(|c| !c.is_breaking())
    }

    /// `Err` when the state is blocked.
    pub fn into_result(self) -> Result<Self, BreakingChange> {
        if self.state.is_blocked() {
            Err(BreakingChange {
                changes: self.breaking().cloned().collect(),
                previous: self.previous,
                current: self.current,
            })
        } else {
            Ok(self)
        }
    }
}

/// A regression check between two snapshots.
pub struct RegressionCheck<'a> {
    previous: &'a SchemaSnapshot,
    current: &'a SchemaSnapshot,
    state: RegressionState,
    changes: Vec<SchemaChange>,
}

impl<'a> RegressionCheck<'a> {
    /// A check in the `Clean` state.
    pub fn new(previous: &'a SchemaSnapshot, current: &'a SchemaSnapshot) -> Self {
        Self { previous, current, state: RegressionState::Clean, changes: Vec::new() }
    }

    /// Current state.
    pub fn state(&self) -> RegressionState { self.state }

    /// Collect the changes (`Clean -> Diffing`). Later calls are no-ops.
    pub fn diff(&mut self) -> &[SchemaChange] {
        if self.state == RegressionState::Clean {
            self.changes = diff_snapshots(self.previous, self.current);
            self.state = RegressionState::Diffing;
        }
        &self.changes
    }

    /// Classify the collected changes into a terminal state.
    pub fn classify(mut self, acknowledge: bool) -> RegressionReport {
        self.diff();
        let acknowledged_by = if acknowledge {
            Some(Acknowledgement::Flag)
        } else if is_major_bump(self.previous.schema_version(), self.current.schema_version()) {
            Some(Acknowledgement::MajorBump)
        } else {
            None
        };

        let state = if self.changes.is_empty() {
            RegressionState::NoChange
        } else if self.changes.iter().any(SchemaChange::is_breaking) {
            RegressionState::Breaking { acknowledged: acknowledged_by.is_some() }
        } else {
            RegressionState::NonBreaking
        };
        let acknowledged_by =
            if matches!(state, RegressionState::Breaking { .. }) { acknowledged_by } else { None };

        tracing::info!(
            previous = self.previous.schema_version(),
            current = self.current.schema_version(),
            changes = self.changes.len(),
            %state,
            "regression check finished"
        );
        RegressionReport {
            previous: self.previous.schema_version().to_string(),
            current: self.current.schema_version().to_string(),
            state,
            changes: self.changes,
            acknowledged_by,
        }
    }
}

/// Run a full check between two snapshots.
pub fn check_regression(
    previous: &SchemaSnapshot,
    current: &SchemaSnapshot,
    acknowledge: bool,
) -> RegressionReport {
    RegressionCheck::new(previous, current).classify(acknowledge)
}

fn is_major_bump(previous: &str, current: &str) -> bool {
    match (SchemaVersion::parse(previous), SchemaVersion::parse(current)) {
        (Ok(p), Ok(c)) => c.is_major_bump_from(&p),
        _ => {
            tracing::warn!(previous, current, "unparseable schema version; no major bump assumed");
            false
        }
    }
}

fn by_name<'a, T>(items: &'a [T], name: impl Fn(&'a T) -> &'a str) -> BTreeMap<&'a str, &'a T> {
    items.iter().map(|i| (name(i), i)).collect()
}

/// Diff two snapshots in one pass over each side.
pub fn diff_snapshots(previous: &SchemaSnapshot, current: &SchemaSnapshot) -> Vec<SchemaChange> {
    let mut out = Vec::new();
    if previous.wire_version() != current.wire_version() {
        out.push(SchemaChange::new(
            "snapshot",
            ChangeKind::WireVersionChanged {
                from: previous.wire_version().to_string(),
                to: current.wire_version().to_string(),
            },
        ));
    }

    let types = by_name(current.types(), |t| &t.name);
    for old in previous.types() {
        let subject = format!("type {}", old.name);
        match types.get(old.name.as_str()) {
            Some(new) => diff_type(&subject, old, new, &mut out),
            None => out.push(SchemaChange::new(subject, ChangeKind::TypeRemoved)),
        }
    }
    let old_types = by_name(previous.types(), |t| &t.name);
    for new in current.types().iter().filter(|t| !old_types.contains_key(t.name.as_str())) {
        out.push(SchemaChange::new(format!("type {}", new.name), ChangeKind::TypeAdded));
    }

    let endpoints = by_name(current.endpoints(), |e| &e.name);
    for old in previous.endpoints() {
        let subject = format!("endpoint {}", old.name);
        match endpoints.get(old.name.as_str()) {
            Some(new) => diff_endpoint(&subject, old, new, &mut out),
            None => out.push(SchemaChange::new(subject, ChangeKind::EndpointRemoved)),
        }
    }
    let old_endpoints = by_name(previous.endpoints(), |e| &e.name);
    for new in current.endpoints().iter().filter(|e| !old_endpoints.contains_key(e.name.as_str())) {
        out.push(SchemaChange::new(format!("endpoint {}", new.name), ChangeKind::EndpointAdded));
    }

    let helpers = by_name(current.helpers(), |h| &h.name);
    for old in previous.helpers() {
        let subject = format!("helper {}", old.name);
        match helpers.get(old.name.as_str()) {
            Some(new) if !same_signature(old, new) =>
                out.push(SchemaChange::new(subject, ChangeKind::HelperSignatureChanged)),
            Some(_) => {}
            None => out.push(SchemaChange::new(subject, ChangeKind::HelperRemoved)),
        }
    }
    let old_helpers = by_name(previous.helpers(), |h| &h.name);
    for new in current.helpers().iter().filter(|h| !old_helpers.contains_key(h.name.as_str())) {
        out.push(SchemaChange::new(format!("helper {}", new.name), ChangeKind::HelperAdded));
    }
    out
}

fn same_signature(old: &HelperDefinition, new: &HelperDefinition) -> bool {
    let shape = |h: &HelperDefinition| -> Vec<(String, String, bool)> {
        h.params.iter().map(|p| (p.name.clone(), p.type_ref.clone(), p.required)).collect()
    };
    shape(old) == shape(new) && old.returns == new.returns
}

fn diff_params(subject: &str, old: &[ParamDef], new: &[ParamDef], out: &mut Vec<SchemaChange>) {
    let new_by_name = by_name(new, |p| &p.name);
    for p in old {
        match new_by_name.get(p.name.as_str()) {
            None => out.push(SchemaChange::new(
                subject,
                ChangeKind::ParamRemoved { param: p.name.clone(), required: p.required },
            )),
            Some(q) => {
                if p.type_ref != q.type_ref {
                    out.push(SchemaChange::new(
                        subject,
                        ChangeKind::ParamTypeChanged {
                            param: p.name.clone(),
                            from: p.type_ref.clone(),
                            to: q.type_ref.clone(),
                        },
                    ));
                }
                match (p.required, q.required) {
                    (false, true) => out.push(SchemaChange::new(
                        subject,
                        ChangeKind::ParamRequiredTightened { param: p.name.clone() },
                    )),
                    (true, false) => out.push(SchemaChange::new(
                        subject,
                        ChangeKind::ParamRequiredLoosened { param: p.name.clone() },
                    )),
                    _ => {}
                }
            }
        }
    }
    let old_by_name = by_name(old, |p| &p.name);
    for q in new.iter().filter(|q| !old_by_name.contains_key(q.name.as_str())) {
        out.push(SchemaChange::new(
            subject,
            ChangeKind::ParamAdded { param: q.name.clone(), required: q.required },
        ));
    }
}

fn diff_endpoint(
    subject: &str,
    old: &EndpointDefinition,
    new: &EndpointDefinition,
    out: &mut Vec<SchemaChange>,
) {
    if old.dispatch_key != new.dispatch_key {
        out.push(SchemaChange::new(
            subject,
            ChangeKind::DispatchKeyChanged { from: old.dispatch_key.clone(), to: new.dispatch_key.clone() },
        ));
    }
    diff_params(subject, &old.params, &new.params, out);
    if old.response != new.response {
        out.push(SchemaChange::new(
            subject,
            ChangeKind::ResponseTypeChanged { from: old.response.clone(), to: new.response.clone() },
        ));
    }
    let old_codes: BTreeSet<i64> = old.errors.iter().map(|e| e.code).collect();
    let new_codes: BTreeSet<i64> = new.errors.iter().map(|e| e.code).collect();
    for code in old_codes.difference(&new_codes) {
        out.push(SchemaChange::new(subject, ChangeKind::ErrorRemoved { code: *code }));
    }
    for code in new_codes.difference(&old_codes) {
        out.push(SchemaChange::new(subject, ChangeKind::ErrorAdded { code: *code }));
    }
    if old.example_request != new.example_request || old.example_response != new.example_response {
        out.push(SchemaChange::new(subject, ChangeKind::ExampleChanged));
    }
}

fn flatten(contracts: &[Contract]) -> Vec<&Contract> {
    let mut out = Vec::new();
    for c in contracts {
        match c {
            Contract::All { contracts } => out.extend(flatten(contracts)),
            other => out.push(other),
        }
    }
    out
}

fn diff_contracts(subject: &str, old: &[Contract], new: &[Contract], out: &mut Vec<SchemaChange>) {
    let old = flatten(old);
    let new = flatten(new);
    let added = new.iter().any(|c| !old.contains(c));
    let removed = old.iter().any(|c| !new.contains(c));
    let kind = match (added, removed) {
        (false, false) => return,
        (true, false) => ChangeKind::ContractsNarrowed,
        (false, true) => ChangeKind::ContractsLoosened,
        (true, true) => ChangeKind::ContractsChanged,
    };
    out.push(SchemaChange::new(subject, kind));
}

fn diff_fields(subject: &str, old: &[FieldDef], new: &[FieldDef], out: &mut Vec<SchemaChange>) {
    let new_by_name = by_name(new, |f| &f.name);
    for f in old {
        match new_by_name.get(f.name.as_str()) {
            None => out.push(SchemaChange::new(
                subject,
                ChangeKind::FieldRemoved { field: f.name.clone(), required: f.required },
            )),
            Some(g) => {
                if f.type_ref != g.type_ref {
                    out.push(SchemaChange::new(
                        subject,
                        ChangeKind::FieldTypeChanged {
                            field: f.name.clone(),
                            from: f.type_ref.clone(),
                            to: g.type_ref.clone(),
                        },
                    ));
                }
                match (f.required, g.required) {
                    (false, true) => out.push(SchemaChange::new(
                        subject,
                        ChangeKind::FieldRequiredTightened { field: f.name.clone() },
                    )),
                    (true, false) => out.push(SchemaChange::new(
                        subject,
                        ChangeKind::FieldRequiredLoosened { field: f.name.clone() },
                    )),
                    _ => {}
                }
            }
        }
    }
    let old_by_name = by_name(old, |f| &f.name);
    for g in new.iter().filter(|g| !old_by_name.contains_key(g.name.as_str())) {
        out.push(SchemaChange::new(
            subject,
            ChangeKind::FieldAdded { field: g.name.clone(), required: g.required },
        ));
    }
}

fn diff_type(subject: &str, old: &TypeDefinition, new: &TypeDefinition, out: &mut Vec<SchemaChange>) {
    match (&old.kind, &new.kind) {
        (TypeKind::Scalar { scalar: a }, TypeKind::Scalar { scalar: b }) if a == b => {}
        (
            TypeKind::CompositeContract { base: a, contracts: old_contracts },
            TypeKind::CompositeContract { base: b, contracts: new_contracts },
        ) if a == b => diff_contracts(subject, old_contracts, new_contracts, out),
        (TypeKind::Enum { variants: a }, TypeKind::Enum { variants: b }) => {
            for v in a.iter().filter(|v| !b.contains(v)) {
                out.push(SchemaChange::new(subject, ChangeKind::EnumVariantRemoved { variant: v.clone() }));
            }
            for v in b.iter().filter(|v| !a.contains(v)) {
                out.push(SchemaChange::new(subject, ChangeKind::EnumVariantAdded { variant: v.clone() }));
            }
        }
        (
            TypeKind::Record { fields: a, additional_fields: open_a },
            TypeKind::Record { fields: b, additional_fields: open_b },
        ) => {
            diff_fields(subject, a, b, out);
            match (open_a, open_b) {
                (true, false) => out.push(SchemaChange::new(subject, ChangeKind::RecordClosed)),
                (false, true) => out.push(SchemaChange::new(subject, ChangeKind::RecordOpened)),
                _ => {}
            }
        }
        (TypeKind::List { item: a }, TypeKind::List { item: b }) =>
            if a != b {
                out.push(SchemaChange::new(
                    subject,
                    ChangeKind::ListItemChanged { from: a.clone(), to: b.clone() },
                ));
            },
        (a, b) => {
            let describe = |k: &TypeKind| match k {
                TypeKind::Scalar { scalar } => format!("scalar {}", scalar),
                TypeKind::CompositeContract { base, .. } => format!("composite_contract {}", base),
                other => other.tag().to_string(),
            };
            out.push(SchemaChange::new(
                subject,
                ChangeKind::TypeKindChanged { from: describe(a), to: describe(b) },
            ));
        }
    }
}
