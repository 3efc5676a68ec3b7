#![allow(dead_code)]

use std::path::PathBuf;

use codegen::GenerationContext;
use schema::SchemaSnapshot;

pub fn canonical() -> SchemaSnapshot {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../resources/schema/circular-wallet.json");
    SchemaSnapshot::from_file(&path).expect("canonical schema")
}

pub fn context() -> GenerationContext { GenerationContext::new(canonical()).expect("context") }
