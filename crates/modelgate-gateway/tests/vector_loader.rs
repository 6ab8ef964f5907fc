//! JSON test vector loader for policy decision tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::fs;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PolicyVector {
    pub description: String,
    /// Full gateway config, written as JSON (valid YAML).
    pub config: serde_json::Value,
    pub cases: Vec<Case>,
}

#[derive(Debug, Deserialize)]
pub struct Case {
    pub model: String,
    pub method: String,
    pub ip: String,
    pub expect: Expect,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Expect {
    Pass,
    Deny { status: u16, error: String },
}

pub fn load(name: &str) -> PolicyVector {
    let s = fs::read_to_string(format!("tests/vectors/{name}")).unwrap();
    serde_json::from_str(&s).unwrap()
}
