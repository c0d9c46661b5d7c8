// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Env-contract validation and layered merging.
//!
//! A job declares its environment contract; plans, steps, and the CLI
//! provide values in layers. Validation happens against the fully layered
//! map, before the runtime overlays its own `HADES_*` variables.

use crate::job::EnvDecl;
use indexmap::IndexMap;
use std::collections::HashMap;
use thiserror::Error;

/// Env keys with this prefix are reserved for the runtime.
pub const RESERVED_ENV_PREFIX: &str = "HADES_";

/// Contract violations. All are configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvContractError {
    #[error("job cannot define HADES_* environment variables: {0}")]
    ReservedInContract(String),
    #[error("user cannot provide HADES_* environment variables: {0}")]
    ReservedProvided(String),
    #[error("unknown environment variable {0:?} (not defined in job env contract)")]
    Unknown(String),
    #[error("required environment variable {0:?} not provided")]
    MissingRequired(String),
}

/// Validate provided values against a job's env contract.
///
/// Rejects reserved `HADES_*` keys on either side, provided keys the
/// contract does not declare, and required keys no layer provided.
pub fn validate_contract(
    contract: &IndexMap<String, EnvDecl>,
    provided: &HashMap<String, String>,
) -> Result<(), EnvContractError> {
    for name in contract.keys() {
        if name.starts_with(RESERVED_ENV_PREFIX) {
            return Err(EnvContractError::ReservedInContract(name.clone()));
        }
    }

    // Sort provided keys so the first violation reported is deterministic.
    let mut provided_keys: Vec<&String> = provided.keys().collect();
    provided_keys.sort();
    for name in provided_keys {
        if name.starts_with(RESERVED_ENV_PREFIX) {
            return Err(EnvContractError::ReservedProvided(name.clone()));
        }
        if !contract.contains_key(name) {
            return Err(EnvContractError::Unknown(name.clone()));
        }
    }

    for (name, decl) in contract {
        if decl.default.is_none() && !provided.contains_key(name) {
            return Err(EnvContractError::MissingRequired(name.clone()));
        }
    }

    Ok(())
}

/// Merge a contract's defaults with provided values; provided wins.
pub fn merge_env(
    contract: &IndexMap<String, EnvDecl>,
    provided: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut merged = HashMap::new();
    for (name, decl) in contract {
        if let Some(default) = &decl.default {
            merged.insert(name.clone(), default.clone());
        }
    }
    for (name, value) in provided {
        merged.insert(name.clone(), value.clone());
    }
    merged
}

/// Right-biased union of env layers (later layers win).
pub fn layer_env(layers: &[&HashMap<String, String>]) -> HashMap<String, String> {
    let mut merged = HashMap::new();
    for layer in layers {
        for (name, value) in *layer {
            merged.insert(name.clone(), value.clone());
        }
    }
    merged
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
