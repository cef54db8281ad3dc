//! Output path resolution
//!
//! Mirrors a source file's position under the input root onto the output
//! root. Handles:
//! - Trailing separators on either root (comparison is per component)
//! - Case differences between the root and the discovered path, which
//!   show up on case-insensitive filesystems
//! - Extension substitution (`.tga` and `tga` are both accepted)

use std::io;
use std::path::{Component, Path, PathBuf};

/// Normalize a path component for case-insensitive comparison
fn normalize_component(component: Component<'_>) -> String {
    component.as_os_str().to_string_lossy().to_lowercase()
}

/// Express `path` relative to `root`
///
/// Tries an exact component match first, then a case-insensitive one.
/// Returns `None` if `path` does not lie under `root` or equals it.
pub fn relative_path(root: &Path, path: &Path) -> Option<PathBuf> {
    if let Ok(rel) = path.strip_prefix(root) {
        return (!rel.as_os_str().is_empty()).then(|| rel.to_path_buf());
    }

    let mut remaining = path.components();
    for root_component in root.components() {
        match remaining.next() {
            Some(c) if normalize_component(c) == normalize_component(root_component) => {}
            _ => return None,
        }
    }

    let rel = remaining.as_path();
    (!rel.as_os_str().is_empty()).then(|| rel.to_path_buf())
}

/// Compute where a converted file goes
///
/// `input/a/b.dds` with output root `out` and extension `.tga` becomes
/// `out/a/b.tga`. When `source` cannot be made relative to `input_root`
/// it is returned unchanged; callers must treat that as "do not write".
pub fn resolve_output_path(
    input_root: &Path,
    source: &Path,
    output_root: &Path,
    new_extension: &str,
) -> PathBuf {
    if input_root.as_os_str().is_empty() || source.as_os_str().is_empty() {
        return source.to_path_buf();
    }

    match relative_path(input_root, source) {
        Some(relative) => {
            let mut out = output_root.join(relative);
            out.set_extension(new_extension.trim_start_matches('.'));
            out
        }
        None => source.to_path_buf(),
    }
}

/// Check a file extension case-insensitively (`armor.DDS` matches `dds`)
pub fn has_extension(path: &Path, extension: &str) -> bool {
    let wanted = extension.trim_start_matches('.');
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(wanted))
        .unwrap_or(false)
}

/// Create a directory and all its parents
///
/// Safe when sibling workers race to create the same ancestor:
/// "already exists" counts as success as long as the path is a directory.
pub fn ensure_dir_all(dir: &Path) -> io::Result<()> {
    match std::fs::create_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(e) => Err(e),
    }
}
