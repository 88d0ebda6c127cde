//! Conversions between filesystem paths and manifest keys.
//!
//! Manifest keys are relative to the tree root and always use forward-slash
//! separators, whatever the native separator is.

use std::path::{Component, Path, PathBuf};

use crate::error::{ClientError, ClientResult};

/// Derive the manifest key for `path`, which must live under `root`.
pub fn manifest_key(root: &Path, path: &Path) -> ClientResult<String> {
    let rel = path
        .strip_prefix(root)
        .map_err(|_| ClientError::PathEscapesRoot(path.display().to_string()))?;
    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(part) => {
                let part = part
                    .to_str()
                    .ok_or_else(|| ClientError::NonUnicodePath(path.to_path_buf()))?;
                parts.push(part);
            }
            _ => return Err(ClientError::PathEscapesRoot(path.display().to_string())),
        }
    }
    Ok(parts.join("/"))
}

/// Resolve a manifest key to a destination path under `dest`.
///
/// Keys come off the wire, so traversal components are rejected: a hostile
/// manifest must not be able to write outside the checkout destination.
pub fn dest_path(dest: &Path, key: &str) -> ClientResult<PathBuf> {
    if key.is_empty() || key.starts_with('/') {
        return Err(ClientError::PathEscapesRoot(key.to_string()));
    }
    let mut path = dest.to_path_buf();
    for part in key.split('/') {
        if part.is_empty() || part == "." || part == ".." {
            return Err(ClientError::PathEscapesRoot(key.to_string()));
        }
        path.push(part);
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_key_is_slash_separated() {
        let root = Path::new("/work/tree");
        let key = manifest_key(root, &root.join("sub").join("b.txt")).unwrap();
        assert_eq!(key, "sub/b.txt");
    }

    #[test]
    fn manifest_key_for_top_level_entry() {
        let root = Path::new("/work/tree");
        assert_eq!(manifest_key(root, &root.join("a.txt")).unwrap(), "a.txt");
    }

    #[test]
    fn manifest_key_rejects_outside_paths() {
        let root = Path::new("/work/tree");
        assert!(manifest_key(root, Path::new("/elsewhere/file")).is_err());
    }

    #[test]
    fn dest_path_joins_components() {
        let dest = Path::new("/out");
        assert_eq!(
            dest_path(dest, "sub/b.txt").unwrap(),
            Path::new("/out/sub/b.txt")
        );
    }

    #[test]
    fn dest_path_rejects_traversal() {
        let dest = Path::new("/out");
        for key in ["../escape", "a/../../b", "/abs", "", "a//b", "."] {
            assert!(dest_path(dest, key).is_err(), "key: {key:?}");
        }
    }
}
