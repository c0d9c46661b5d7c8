// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for env contract validation and merging

use super::*;

fn contract(entries: &[(&str, Option<&str>)]) -> IndexMap<String, EnvDecl> {
    entries
        .iter()
        .map(|(name, default)| {
            (
                name.to_string(),
                EnvDecl {
                    default: default.map(str::to_string),
                },
            )
        })
        .collect()
}

fn provided(entries: &[(&str, &str)]) -> HashMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn required_vars_provided_is_valid() {
    let job = contract(&[("VERSION", None), ("MODE", Some("prod"))]);
    let p = provided(&[("VERSION", "v1.0.0")]);
    assert!(validate_contract(&job, &p).is_ok());
}

#[test]
fn missing_required_var_rejected() {
    let job = contract(&[("VERSION", None), ("MODE", None)]);
    let p = provided(&[("VERSION", "v1.0.0")]);
    let err = validate_contract(&job, &p).unwrap_err();
    assert_eq!(err, EnvContractError::MissingRequired("MODE".to_string()));
    assert_eq!(
        err.to_string(),
        "required environment variable \"MODE\" not provided"
    );
}

#[test]
fn unknown_var_rejected() {
    let job = contract(&[("VERSION", None)]);
    let p = provided(&[("VERSION", "v1.0.0"), ("UNKNOWN", "x")]);
    let err = validate_contract(&job, &p).unwrap_err();
    assert_eq!(err, EnvContractError::Unknown("UNKNOWN".to_string()));
    assert!(err
        .to_string()
        .contains("unknown environment variable \"UNKNOWN\""));
}

#[test]
fn user_provided_reserved_var_rejected() {
    let job = contract(&[("VERSION", None)]);
    let p = provided(&[("VERSION", "v1.0.0"), ("HADES_RUN_ID", "123")]);
    let err = validate_contract(&job, &p).unwrap_err();
    assert_eq!(
        err,
        EnvContractError::ReservedProvided("HADES_RUN_ID".to_string())
    );
}

#[test]
fn contract_declaring_reserved_var_rejected() {
    let job = contract(&[("HADES_CUSTOM", None)]);
    let err = validate_contract(&job, &HashMap::new()).unwrap_err();
    assert_eq!(
        err,
        EnvContractError::ReservedInContract("HADES_CUSTOM".to_string())
    );
}

#[test]
fn optional_var_not_provided_is_valid() {
    let job = contract(&[("MODE", Some("prod"))]);
    assert!(validate_contract(&job, &HashMap::new()).is_ok());
}

#[test]
fn reserved_prefix_is_case_sensitive() {
    // lowercase "hades_" is an ordinary (if unknown) key, not reserved
    let job = contract(&[("hades_thing", None)]);
    let p = provided(&[("hades_thing", "x")]);
    assert!(validate_contract(&job, &p).is_ok());
}

#[test]
fn merge_provided_overrides_default() {
    let job = contract(&[("MODE", Some("prod"))]);
    let merged = merge_env(&job, &provided(&[("MODE", "staging")]));
    assert_eq!(merged.get("MODE"), Some(&"staging".to_string()));
}

#[test]
fn merge_uses_default_when_not_provided() {
    let job = contract(&[("MODE", Some("prod")), ("VERSION", None)]);
    let merged = merge_env(&job, &provided(&[("VERSION", "v1")]));
    assert_eq!(merged.get("MODE"), Some(&"prod".to_string()));
    assert_eq!(merged.get("VERSION"), Some(&"v1".to_string()));
    assert_eq!(merged.len(), 2);
}

#[test]
fn layer_env_is_right_biased() {
    let plan = provided(&[("A", "plan"), ("B", "plan")]);
    let step = provided(&[("B", "step"), ("C", "step")]);
    let cli = provided(&[("C", "cli")]);
    let layered = layer_env(&[&plan, &step, &cli]);
    assert_eq!(layered.get("A"), Some(&"plan".to_string()));
    assert_eq!(layered.get("B"), Some(&"step".to_string()));
    assert_eq!(layered.get("C"), Some(&"cli".to_string()));
}

#[test]
fn spec_example_merged_env() {
    // job env {VERSION: required, MODE: default "prod"}, provided {VERSION: v1}
    let job = contract(&[("VERSION", None), ("MODE", Some("prod"))]);
    let p = provided(&[("VERSION", "v1")]);
    validate_contract(&job, &p).unwrap();
    let merged = merge_env(&job, &p);
    assert_eq!(merged.get("VERSION"), Some(&"v1".to_string()));
    assert_eq!(merged.get("MODE"), Some(&"prod".to_string()));
}
