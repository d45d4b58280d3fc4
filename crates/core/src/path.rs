//! Root-restricted path resolution
//!
//! Every file the server hands out, and every file the client writes,
//! must resolve as a direct child of a known directory root. This is the
//! defense against path traversal on both sides of the wire.

use std::path::{Component, Path, PathBuf};

/// Resolve `name` as a direct child of `root`.
///
/// Returns `None` unless `name` is a single normal path component (no
/// separators, not `.`/`..`) and the joined path sits immediately under
/// `root`.
#[must_use]
pub fn resolve_direct_child(root: &Path, name: &str) -> Option<PathBuf> {
    let candidate = Path::new(name);
    let mut components = candidate.components();
    let only = match (components.next(), components.next()) {
        (Some(Component::Normal(component)), None) => component,
        _ => return None,
    };

    // A backslash is a separator on Windows but an ordinary character in
    // a unix path component; it is never a legitimate artifact name.
    if only.to_string_lossy().contains(['/', '\\']) {
        return None;
    }

    let path = root.join(only);
    (path.parent() == Some(root)).then_some(path)
}
