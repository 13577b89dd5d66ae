//! Error helper functions for creating actionable error messages

use std::io;
use std::path::Path;

/// Check if an IO error is a permission denied error
pub fn is_permission_denied(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::PermissionDenied
}

/// Check if an IO error is a "not found" error
pub fn is_not_found(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::NotFound
}

/// Describe a failed file operation, with fixes for the common causes.
///
/// `operation` is a gerund such as "reading" or "writing".
pub fn file_error(path: &Path, operation: &str, err: &io::Error) -> String {
    let base = format!("Failed {} '{}'", operation, path.display());

    if is_permission_denied(err) {
        format!(
            "{}\n\n\
             Cause: Permission denied\n\n\
             Possible fixes:\n\
             1. Check file permissions: ls -l '{}'\n\
             2. Grant access with: chmod u+rw '{}'\n\
             3. Narrow the run with --glob to skip files you cannot modify",
            base,
            path.display(),
            path.display()
        )
    } else if is_not_found(err) {
        format!(
            "{}\n\n\
             Cause: File not found (it may have been removed during the run)\n\n\
             Possible fixes:\n\
             1. Re-run once other processes stop changing the tree\n\
             2. Check the path is correct",
            base
        )
    } else {
        base
    }
}

/// Describe a directory that could not be listed
pub fn dir_list_error(path: &Path) -> String {
    format!(
        "Failed to list directory '{}'\n\n\
         Possible fixes:\n\
         1. Check directory permissions: ls -ld '{}'\n\
         2. Use --glob to select files without walking this directory",
        path.display(),
        path.display()
    )
}
