//! File group expansion
//!
//! Turns the `src`/`dest` entries of a target into [`FileGroup`]s. Paths stay
//! relative to the workspace root, which is also where the compiler runs.
//!
//! - Literal paths are kept as written, whether or not they exist, so the task
//!   can report the missing ones.
//! - Glob patterns expand to the matching files, in sorted order.
//! - A pattern prefixed with `!` removes every path collected so far that it
//!   matches.

use std::path::{Path, PathBuf};

use closure_task_protocol::FileGroup;

use crate::configs::tasks::FileGroupConfig;
use crate::types::{TaskError, TaskResult};

/// Expand every configured group of a target
pub fn expand_file_groups(root: &Path, groups: &[FileGroupConfig]) -> TaskResult<Vec<FileGroup>> {
    groups
        .iter()
        .map(|group| {
            let patterns = group
                .src
                .as_ref()
                .map(|src| src.patterns())
                .unwrap_or_default();
            Ok(FileGroup::new(
                expand_sources(root, &patterns)?,
                group.dest.as_ref().map(PathBuf::from),
            ))
        })
        .collect()
}

/// Expand source patterns relative to `root`
pub fn expand_sources(root: &Path, patterns: &[&str]) -> TaskResult<Vec<PathBuf>> {
    let mut sources: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        if let Some(negated) = pattern.strip_prefix('!') {
            let matcher = glob::Pattern::new(negated).map_err(|e| {
                TaskError::Config(format!("Invalid source pattern '{}': {}", pattern, e))
            })?;
            sources.retain(|path| !matcher.matches_path(path));
            continue;
        }

        if !is_glob(pattern) {
            push_unique(&mut sources, PathBuf::from(pattern));
            continue;
        }

        let escaped_root = glob::Pattern::escape(&root.to_string_lossy());
        let full_pattern = Path::new(&escaped_root).join(pattern);
        let entries = glob::glob(&full_pattern.to_string_lossy()).map_err(|e| {
            TaskError::Config(format!("Invalid source pattern '{}': {}", pattern, e))
        })?;

        for entry in entries {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    tracing::warn!(pattern = %pattern, error = %e, "Skipping unreadable path");
                    continue;
                }
            };
            if !path.is_file() {
                continue;
            }
            let relative = path.strip_prefix(root).map(Path::to_path_buf).unwrap_or(path);
            push_unique(&mut sources, relative);
        }
    }

    Ok(sources)
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

fn push_unique(sources: &mut Vec<PathBuf>, path: PathBuf) {
    if !sources.contains(&path) {
        sources.push(path);
    }
}
