//! Guard: confine user-supplied file references to the log root.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum GuardError {
    #[error("path escapes log root: {reference}")]
    PathEscape { reference: String },

    #[error("log root {path} cannot be resolved: {source}")]
    InvalidRoot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// An absolute path that the guard has confirmed lives under the root.
///
/// Only [`PathGuard::resolve`] hands these out. The file itself may not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef(PathBuf);

impl FileRef {
    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

pub struct PathGuard {
    root: PathBuf,
}

impl PathGuard {
    /// Canonicalize `root` once. A root that does not exist yet is accepted
    /// and resolved as far as the filesystem allows.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, GuardError> {
        let root = root.as_ref();
        let invalid = |source: io::Error| GuardError::InvalidRoot {
            path: root.to_path_buf(),
            source,
        };

        let absolute = std::path::absolute(root).map_err(invalid)?;
        let root = resolve_lenient(&absolute).map_err(invalid)?;
        debug!(root = %root.display(), "Path guard initialised");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `reference` against the root and reject anything outside it.
    ///
    /// Absolute references are taken as is; relative ones are joined under
    /// the root. Containment is checked per path component, so a sibling
    /// such as `<root>-old` never passes as a child of `<root>`.
    pub fn resolve(&self, reference: &str) -> Result<FileRef, GuardError> {
        let candidate = if Path::new(reference).is_absolute() {
            PathBuf::from(reference)
        } else {
            self.root.join(reference)
        };

        let resolved = match resolve_lenient(&candidate) {
            Ok(path) => path,
            Err(e) => {
                warn!(reference, error = %e, "Rejected file reference: resolution failed");
                return Err(GuardError::PathEscape {
                    reference: reference.to_string(),
                });
            }
        };

        if !resolved.starts_with(&self.root) {
            warn!(
                reference,
                resolved = %resolved.display(),
                root = %self.root.display(),
                "Rejected file reference outside log root"
            );
            return Err(GuardError::PathEscape {
                reference: reference.to_string(),
            });
        }

        Ok(FileRef(resolved))
    }
}

/// Canonicalize `path` component by component.
///
/// Existing prefixes go through `fs::canonicalize`, which expands symlinks.
/// Components that do not exist are appended lexically, with `..` popping
/// the previous component. Errors other than "not found" are returned so the
/// caller can fail closed.
fn resolve_lenient(path: &Path) -> io::Result<PathBuf> {
    let mut resolved = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Prefix(prefix) => resolved.push(prefix.as_os_str()),
            Component::RootDir => resolved.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(name) => {
                resolved.push(name);
                match fs::symlink_metadata(&resolved) {
                    Ok(_) => resolved = fs::canonicalize(&resolved)?,
                    Err(e) if e.kind() == io::ErrorKind::PermissionDenied => return Err(e),
                    // NotFound, or a parent that is a regular file.
                    Err(_) => {}
                }
            }
        }
    }

    Ok(resolved)
}
