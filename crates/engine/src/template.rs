// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Template rendering for the `template` action.

use minijinja::{context, Environment};
use std::collections::HashMap;

/// Render template `source` with the context `{ Env, Host, Target }`.
pub fn render(
    name: &str,
    source: &str,
    env: &HashMap<String, String>,
    host: &str,
    target: &str,
) -> Result<String, minijinja::Error> {
    let mut environment = Environment::new();
    environment.add_template(name, source)?;
    let template = environment.get_template(name)?;
    template.render(context! { Env => env, Host => host, Target => target })
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
