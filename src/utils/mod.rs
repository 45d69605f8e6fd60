//! Utilities for path collection, naming and object-graph lookups.

use crate::{Result, error::SpliceError};
use lopdf::{Document, Object};
use std::path::PathBuf;

/// Maximum number of `Reference` hops followed by [`resolve`].
const MAX_REFERENCE_HOPS: usize = 16;

/// Expand multiple glob patterns into filesystem paths.
///
/// Accepts anything iterable with items that convert to `&str`, e.g.:
/// `&[&str]`, `Vec<String>`, or `Vec<&str>`.
///
/// A pattern without glob metacharacters is passed through as-is even if it
/// matches nothing, so a missing file is reported by the loader instead of
/// silently dropped.
///
/// Errors:
/// - Propagates `glob` parse errors.
/// - Propagates filesystem errors from glob iterator.
pub fn collect_paths_for_patterns<T>(patterns: T) -> Result<Vec<PathBuf>>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let mut resolved_paths = Vec::new();

    for pattern in patterns.into_iter() {
        let paths = collect_paths_for_pattern(pattern)?;
        resolved_paths.extend(paths);
    }

    Ok(resolved_paths)
}

fn collect_paths_for_pattern<P: AsRef<str>>(pattern: P) -> Result<Vec<PathBuf>> {
    let pattern = pattern.as_ref();
    if !is_glob(pattern) {
        return Ok(vec![PathBuf::from(pattern)]);
    }

    let mut resolved_paths = Vec::new();

    let paths = glob::glob(pattern).map_err(|err| SpliceError::Other {
        message: err.to_string(),
    })?;

    for entry in paths {
        let path = entry.map_err(|err| SpliceError::Other {
            message: err.to_string(),
        })?;
        resolved_paths.push(path);
    }

    if resolved_paths.is_empty() {
        log::warn!("pattern '{pattern}' matched no files");
    }

    Ok(resolved_paths)
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Follow `Reference` objects until a direct object is reached.
///
/// Returns `None` for dangling references and for chains longer than a few
/// hops.
pub fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    let mut current = obj;
    for _ in 0..MAX_REFERENCE_HOPS {
        match current {
            Object::Reference(id) => current = doc.get_object(*id).ok()?,
            _ => return Some(current),
        }
    }
    None
}

/// Drop a trailing `.pdf` extension, in any letter case.
pub fn strip_pdf_extension(name: &str) -> &str {
    let len = name.len();
    if len >= 4 && name.is_char_boundary(len - 4) && name[len - 4..].eq_ignore_ascii_case(".pdf") {
        &name[..len - 4]
    } else {
        name
    }
}

/// Format file size as human-readable string.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
