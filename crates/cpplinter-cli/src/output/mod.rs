//! Report formatters

pub mod json;
pub mod pretty;

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Writes `content` to `path`, or to stdout when no path is given. Missing
/// parent directories are created.
pub fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            fs::write(path, content)
                .with_context(|| format!("failed to write {}", path.display()))
        }
        None => {
            println!("{}", content);
            Ok(())
        }
    }
}
