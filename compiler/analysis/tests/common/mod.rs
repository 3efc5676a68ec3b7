#![allow(dead_code)]

use std::path::PathBuf;

use schema::{EndpointDefinition, HelperDefinition, SchemaSnapshot, TypeDefinition};

pub fn canonical() -> SchemaSnapshot {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../resources/schema/circular-wallet.json");
    SchemaSnapshot::from_file(&path).expect("canonical schema")
}

/// Rebuild `base` with edited definitions.
pub fn edited(
    base: &SchemaSnapshot,
    version: &str,
    edit: impl FnOnce(&mut Vec<TypeDefinition>, &mut Vec<EndpointDefinition>, &mut Vec<HelperDefinition>),
) -> SchemaSnapshot {
    let mut types = base.types().to_vec();
    let mut endpoints = base.endpoints().to_vec();
    let mut helpers = base.helpers().to_vec();
    edit(&mut types, &mut endpoints, &mut helpers);
    SchemaSnapshot::new(version, base.wire_version(), types, endpoints, helpers)
}

pub fn endpoint<'a>(endpoints: &'a mut [EndpointDefinition], name: &str) -> &'a mut EndpointDefinition {
    endpoints.iter_mut().find(|e| e.name == name).expect("endpoint")
}
