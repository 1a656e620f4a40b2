//! Whole-file writes

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{GitCtxError, Result};

/// Replace `path` with `contents` via a temp file and rename.
///
/// Creates the parent directory if missing. When the target already exists its
/// permissions are carried over, otherwise `mode` is applied (Unix only).
pub fn write_atomic(path: &Path, contents: &str, mode: u32) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            GitCtxError::Io(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    let tmp_path = tmp_path_for(path);
    fs::write(&tmp_path, contents).map_err(|e| {
        GitCtxError::Io(format!(
            "Failed to write temp file {}: {}",
            tmp_path.display(),
            e
        ))
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = match fs::metadata(path) {
            Ok(meta) => meta.permissions(),
            Err(_) => fs::Permissions::from_mode(mode),
        };
        if let Err(e) = fs::set_permissions(&tmp_path, permissions) {
            let _ = fs::remove_file(&tmp_path);
            return Err(GitCtxError::Io(format!(
                "Failed to set permissions on {}: {}",
                tmp_path.display(),
                e
            )));
        }
    }
    #[cfg(not(unix))]
    let _ = mode;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        GitCtxError::Io(format!(
            "Failed to rename temp file to {}: {}",
            path.display(),
            e
        ))
    })?;

    debug!("Wrote {} ({} bytes)", path.display(), contents.len());
    Ok(())
}

/// Read a file, treating a missing file as empty
pub fn read_or_empty(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(GitCtxError::Io(format!(
            "Failed to read {}: {}",
            path.display(),
            e
        ))),
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
