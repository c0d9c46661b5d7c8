// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `template`: render a local template file to a remote path.

use crate::error::ExecError;
use crate::runtime::Runtime;
use std::path::Path;

pub async fn execute(src: &str, dst: &str, rt: &mut Runtime<'_>) -> Result<(), ExecError> {
    let source = std::fs::read_to_string(src)
        .map_err(|e| ExecError::ActionFailed(format!("failed to read template file {src}: {e}")))?;

    let rendered = crate::template::render(src, &source, rt.env, &rt.host.name, rt.target)
        .map_err(|e| ExecError::ActionFailed(format!("failed to render template {src}: {e}")))?;

    snapshot(&rt.rendered_dir, src, &rendered);

    let mut data = rendered.as_bytes();
    rt.session
        .copy_file(rt.cancel, &mut data, dst, 0o644)
        .await
        .map_err(ExecError::from_session)
}

/// Keep a copy of the rendering under the run's log directory. Best-effort:
/// a failed snapshot never fails the action.
fn snapshot(rendered_dir: &Path, src: &str, rendered: &str) {
    let relative = Path::new(src)
        .components()
        .filter(|c| matches!(c, std::path::Component::Normal(_)))
        .collect::<std::path::PathBuf>();
    let path = rendered_dir.join(relative);
    let result = path
        .parent()
        .map(std::fs::create_dir_all)
        .unwrap_or(Ok(()))
        .and_then(|()| std::fs::write(&path, rendered));
    if let Err(e) = result {
        tracing::warn!(src, path = %path.display(), error = %e, "failed to snapshot rendered template");
    }
}

pub fn dry_run(src: &str, dst: &str) -> String {
    format!("template: {src} -> {dst}")
}
