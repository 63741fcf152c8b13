//! Script path resolution.
//!
//! Maps a logical script identifier to `{scripts_root}/{identifier}`.
//! The root directory is created on demand; the script file never is.

use std::path::{Path, PathBuf};

use crate::error::ScriptError;

/// Longest identifier accepted by [`is_safe_identifier`].
pub const MAX_IDENTIFIER_LEN: usize = 128;

/// Whether `identifier` is a plain file name that stays inside the root.
///
/// Allowed characters: ASCII alphanumerics, hyphen, underscore, dot. A
/// leading dot is rejected, which also rules out `.` and `..`.
pub fn is_safe_identifier(identifier: &str) -> bool {
    !identifier.is_empty()
        && identifier.len() <= MAX_IDENTIFIER_LEN
        && !identifier.starts_with('.')
        && identifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
}

/// Resolves script identifiers against a fixed scripts directory.
#[derive(Debug, Clone)]
pub struct ScriptLocator {
    root: PathBuf,
}

impl ScriptLocator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `identifier` to an existing script file.
    ///
    /// Ensures the scripts root exists first. Fails with
    /// [`ScriptError::InvalidIdentifier`] for unsafe names and
    /// [`ScriptError::NotFound`] when no regular file exists at the path.
    pub async fn locate(&self, identifier: &str) -> Result<PathBuf, ScriptError> {
        if !is_safe_identifier(identifier) {
            return Err(ScriptError::InvalidIdentifier(identifier.to_string()));
        }

        tokio::fs::create_dir_all(&self.root).await?;

        let path = self.root.join(identifier);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            _ => Err(ScriptError::NotFound(path)),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::scripting::test_helpers::write_script;

    #[test]
    fn safe_identifiers() {
        assert!(is_safe_identifier("drill_analyzer.py"));
        assert!(is_safe_identifier("pose-v2.sh"));
        assert!(!is_safe_identifier(""));
        assert!(!is_safe_identifier(".."));
        assert!(!is_safe_identifier(".hidden"));
        assert!(!is_safe_identifier("../etc/passwd"));
        assert!(!is_safe_identifier("nested/script.py"));
        assert!(!is_safe_identifier("script.py; rm -rf /"));
        assert!(!is_safe_identifier(&"a".repeat(MAX_IDENTIFIER_LEN + 1)));
    }

    #[tokio::test]
    async fn locate_existing_script() {
        let dir = tempfile::tempdir().expect("temp dir");
        let expected = write_script(dir.path(), "echo.sh", "cat\n");
        let locator = ScriptLocator::new(dir.path());

        let path = locator.locate("echo.sh").await.expect("locate");
        assert_eq!(path, expected);
    }

    #[tokio::test]
    async fn missing_root_is_created_but_script_is_not() {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = dir.path().join("nested").join("python_scripts");
        let locator = ScriptLocator::new(&root);

        let result = locator.locate("drill_analyzer.py").await;

        assert_matches!(result, Err(ScriptError::NotFound(path)) => {
            assert_eq!(path, root.join("drill_analyzer.py"));
        });
        assert!(root.is_dir(), "scripts root should have been created");
        assert!(!root.join("drill_analyzer.py").exists());
    }

    #[tokio::test]
    async fn directory_is_not_a_script() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::create_dir(dir.path().join("subdir")).expect("mkdir");
        let locator = ScriptLocator::new(dir.path());

        assert_matches!(locator.locate("subdir").await, Err(ScriptError::NotFound(_)));
    }

    #[tokio::test]
    async fn traversal_is_rejected_before_touching_the_filesystem() {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = dir.path().join("never-created");
        let locator = ScriptLocator::new(&root);

        assert_matches!(
            locator.locate("../outside.sh").await,
            Err(ScriptError::InvalidIdentifier(_))
        );
        assert!(!root.exists());
    }
}
