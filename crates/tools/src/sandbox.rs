//! Path containment for file tools.
//!
//! Tool arguments come straight from model output, so every path is
//! resolved relative to the configured data root and rejected if it could
//! escape it.

use lucy_core::error::ToolError;
use std::path::{Component, Path, PathBuf};

/// Resolve `arg` under `root`. Empty and `.` mean the root itself.
pub fn resolve_under(tool_name: &str, root: &Path, arg: &str) -> Result<PathBuf, ToolError> {
    let arg = arg.trim().trim_matches(|c| c == '"' || c == '\'');
    if arg.is_empty() || arg == "." {
        return Ok(root.to_path_buf());
    }

    let requested = Path::new(arg);
    for component in requested.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => {
                return Err(ToolError::PermissionDenied {
                    tool_name: tool_name.into(),
                    reason: format!("Path traversal detected in '{arg}'"),
                });
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(ToolError::PermissionDenied {
                    tool_name: tool_name.into(),
                    reason: format!("Path '{arg}' must be relative to the data root"),
                });
            }
        }
    }

    let joined = root.join(requested);

    // Symlinks inside the root may still point outside it.
    if let (Ok(real_root), Ok(real)) = (root.canonicalize(), joined.canonicalize()) {
        if !real.starts_with(&real_root) {
            return Err(ToolError::PermissionDenied {
                tool_name: tool_name.into(),
                reason: format!("Path '{arg}' is outside the data root"),
            });
        }
    }

    Ok(joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_and_empty_are_root() {
        let root = Path::new("/srv/data");
        assert_eq!(resolve_under("t", root, ".").unwrap(), root);
        assert_eq!(resolve_under("t", root, "  ").unwrap(), root);
    }

    #[test]
    fn relative_paths_are_joined() {
        let root = Path::new("/srv/data");
        assert_eq!(
            resolve_under("t", root, "sensors/logs").unwrap(),
            PathBuf::from("/srv/data/sensors/logs")
        );
        assert_eq!(
            resolve_under("t", root, "\"notes\"").unwrap(),
            PathBuf::from("/srv/data/notes")
        );
    }

    #[test]
    fn traversal_rejected() {
        let root = Path::new("/srv/data");
        assert!(matches!(
            resolve_under("t", root, "../etc"),
            Err(ToolError::PermissionDenied { .. })
        ));
        assert!(resolve_under("t", root, "a/../../b").is_err());
    }

    #[test]
    fn absolute_rejected() {
        assert!(resolve_under("t", Path::new("/srv/data"), "/etc/passwd").is_err());
    }
}
