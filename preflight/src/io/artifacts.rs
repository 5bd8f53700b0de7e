//! Output artifacts written under the `--output` directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

pub const REPORT_FILE: &str = "report.json";
pub const TX_PLAN_JSON_FILE: &str = "tx-plan.json";
pub const TX_PLAN_MARKDOWN_FILE: &str = "tx-plan.md";

/// Pretty JSON with a trailing newline, written atomically.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut buf = serde_json::to_string_pretty(value)
        .with_context(|| format!("serialize {}", path.display()))?;
    buf.push('\n');
    write_atomic(path, &buf)
}

pub fn write_text(path: &Path, contents: &str) -> Result<()> {
    write_atomic(path, contents)
}

pub fn artifact_path(output_dir: &Path, file_name: &str) -> PathBuf {
    output_dir.join(file_name)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("artifact path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);
    debug!(path = %path.display(), bytes = contents.len(), "writing artifact");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp artifact {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace artifact {}", path.display()))?;
    Ok(())
}
