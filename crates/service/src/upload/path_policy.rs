//! Validates a requested upload directory against the configured whitelist
//! and composes the object key.

const SEPARATOR: char = '/';

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("object_name is required")]
    MissingObjectName,
    #[error("invalid directory for uploading: '{0}'")]
    InvalidDirectory(String),
    #[error("this server does not support uploading to directories")]
    DirectoryUploadsUnsupported,
}

/// Resolve the requested `dir` and `object_name` into a relative object key.
///
/// With a non-empty whitelist the directory (trimmed of separators) must
/// match one entry exactly. With an empty whitelist any directory is refused;
/// there is no "everything allowed" mode.
///
/// Leading separators on `object_name` are dropped so the key never starts
/// with `/`. Otherwise `object_name` is taken as given: it is not checked for
/// traversal sequences, and query decoding has already replaced invalid
/// UTF-8 with U+FFFD, so such bytes reach the key as that character.
pub fn resolve(
    upload_dirs: &[String],
    dir: Option<&str>,
    object_name: &str,
) -> Result<String, PathError> {
    let object_name = object_name.trim_start_matches(SEPARATOR);
    if object_name.is_empty() {
        return Err(PathError::MissingObjectName);
    }

    let dir = dir.map(trim_separators).unwrap_or_default();

    if !upload_dirs.is_empty() {
        let allowed = upload_dirs
            .iter()
            .any(|candidate| trim_separators(candidate) == dir);
        if !allowed {
            return Err(PathError::InvalidDirectory(dir.to_string()));
        }
        return Ok(join(dir, object_name));
    }

    if !dir.is_empty() {
        return Err(PathError::DirectoryUploadsUnsupported);
    }

    Ok(object_name.to_string())
}

fn trim_separators(raw: &str) -> &str {
    raw.trim_matches(SEPARATOR)
}

fn join(dir: &str, object_name: &str) -> String {
    if dir.is_empty() {
        object_name.to_string()
    } else {
        format!("{}{}{}", dir, SEPARATOR, object_name)
    }
}
