//! Manages the on-disk artifact tree for a single run, rooted at
//! `<root>/specs/<run-id>/`: `spec.md`, `research.md`, `plan.md`,
//! `data-model.md`, `quickstart.md`, `contracts/<name>.yaml`, and a `code/`
//! subtree split into `tests/` and `src/`.

use std::path::{Path, PathBuf};

use acp_utils::atomic_write::write_file_atomic;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact path escapes the run directory: {0}")]
    PathEscape(String),
    #[error("artifact '{0}' not found")]
    NotFound(String),
    #[error("I/O error for artifact '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Which of the two code sub-directories a generated file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeArtifactKind {
    Test,
    Implementation,
}

impl CodeArtifactKind {
    const fn subdir(self) -> &'static str {
        match self {
            Self::Test => "tests",
            Self::Implementation => "src",
        }
    }
}

/// Root-relative view over one run's artifact tree.
pub struct ArtifactStore {
    run_dir: PathBuf,
}

impl ArtifactStore {
    #[must_use]
    pub fn new(root: &Path, run_id: &str) -> Self {
        Self {
            run_dir: root.join("specs").join(run_id),
        }
    }

    #[must_use]
    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// Create the run directory tree (`contracts/`, `code/tests/`, `code/src/`).
    ///
    /// # Errors
    ///
    /// Returns an I/O error if any directory cannot be created.
    pub fn create_run_dir(&self) -> Result<(), ArtifactError> {
        for dir in ["contracts", "code/tests", "code/src"] {
            let path = self.run_dir.join(dir);
            std::fs::create_dir_all(&path).map_err(|source| ArtifactError::Io {
                path: path.display().to_string(),
                source,
            })?;
        }
        Ok(())
    }

    /// Resolve a path relative to the run directory, rejecting traversal and
    /// absolute components.
    fn validated_path(&self, rel: &str) -> Result<PathBuf, ArtifactError> {
        if Path::new(rel).is_absolute() || rel.split('/').any(|segment| segment == "..") {
            return Err(ArtifactError::PathEscape(rel.to_string()));
        }
        Ok(self.run_dir.join(rel))
    }

    /// Write a top-level markdown artifact (`spec.md`, `research.md`, ...),
    /// overwriting any prior content atomically.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Io`] on write failure.
    pub fn write_text(&self, name: &str, content: &str) -> Result<(), ArtifactError> {
        let path = self.validated_path(name)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ArtifactError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }
        write_file_atomic(&path, content).map_err(|source| ArtifactError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// Read a previously written artifact.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::NotFound`] if the file is absent.
    pub fn read_text(&self, name: &str) -> Result<String, ArtifactError> {
        let path = self.validated_path(name)?;
        std::fs::read_to_string(&path).map_err(|_| ArtifactError::NotFound(name.to_string()))
    }

    /// Write a named API contract under `contracts/<name>.yaml`.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Io`] on write failure.
    pub fn write_contract(&self, name: &str, content: &str) -> Result<(), ArtifactError> {
        self.write_text(&format!("contracts/{name}.yaml"), content)
    }

    /// List contract file stems under `contracts/`, sorted.
    #[must_use]
    pub fn list_contracts(&self) -> Vec<String> {
        list_file_stems(&self.run_dir.join("contracts"), "yaml")
    }

    /// Write a generated code artifact into `code/tests/` or `code/src/`.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Io`] on write failure.
    pub fn write_code_artifact(
        &self,
        kind: CodeArtifactKind,
        path: &str,
        content: &str,
    ) -> Result<(), ArtifactError> {
        self.write_text(&format!("code/{}/{path}", kind.subdir()), content)
    }

    /// List code artifact relative paths (including the `code/tests/` or
    /// `code/src/` prefix) for the given kind, sorted.
    #[must_use]
    pub fn list_code_artifacts(&self, kind: CodeArtifactKind) -> Vec<String> {
        let dir = self.run_dir.join("code").join(kind.subdir());
        let Ok(entries) = std::fs::read_dir(&dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .flatten()
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        names.sort();
        names
    }

    /// Highest run ordinal already present under `<root>/specs/`, or 0 if
    /// none exist. Combined with `CheckpointStore::highest_ordinal`, callers
    /// take the max of the two so a checkpoint-only or artifact-only partial
    /// run never collides with a fresh allocation.
    #[must_use]
    pub fn highest_ordinal(specs_root: &Path) -> u32 {
        let Ok(entries) = std::fs::read_dir(specs_root) else {
            return 0;
        };
        entries
            .flatten()
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter_map(|name| name.split('-').next().map(str::to_string))
            .filter_map(|s| s.parse::<u32>().ok())
            .max()
            .unwrap_or(0)
    }
}

fn list_file_stems(dir: &Path, extension: &str) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut stems: Vec<String> = entries
        .flatten()
        .filter_map(|entry| {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some(extension) {
                path.file_stem().and_then(|s| s.to_str()).map(str::to_string)
            } else {
                None
            }
        })
        .collect();
    stems.sort();
    stems
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_run_dir_builds_expected_tree() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path(), "001-demo");
        store.create_run_dir().unwrap();

        assert!(store.run_dir().join("contracts").is_dir());
        assert!(store.run_dir().join("code/tests").is_dir());
        assert!(store.run_dir().join("code/src").is_dir());
    }

    #[test]
    fn write_then_read_text_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path(), "001-demo");
        store.create_run_dir().unwrap();

        store.write_text("spec.md", "# Spec\n").unwrap();
        assert_eq!(store.read_text("spec.md").unwrap(), "# Spec\n");
    }

    #[test]
    fn write_text_overwrites_idempotently() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path(), "001-demo");
        store.create_run_dir().unwrap();

        store.write_text("spec.md", "first").unwrap();
        store.write_text("spec.md", "second").unwrap();
        assert_eq!(store.read_text("spec.md").unwrap(), "second");
    }

    #[test]
    fn read_missing_artifact_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path(), "001-demo");
        assert!(matches!(store.read_text("spec.md"), Err(ArtifactError::NotFound(_))));
    }

    #[test]
    fn path_traversal_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path(), "001-demo");
        assert!(matches!(
            store.write_text("../escape.md", "x"),
            Err(ArtifactError::PathEscape(_))
        ));
    }

    #[test]
    fn contracts_are_written_and_listed() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path(), "001-demo");
        store.create_run_dir().unwrap();

        store.write_contract("auth-api", "name: auth-api\n").unwrap();
        store.write_contract("users-api", "name: users-api\n").unwrap();

        assert_eq!(store.list_contracts(), vec!["auth-api", "users-api"]);
    }

    #[test]
    fn code_artifacts_are_written_into_their_own_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path(), "001-demo");
        store.create_run_dir().unwrap();

        store
            .write_code_artifact(CodeArtifactKind::Test, "auth_test.rs", "fn test() {}")
            .unwrap();
        store
            .write_code_artifact(CodeArtifactKind::Implementation, "auth.rs", "fn auth() {}")
            .unwrap();

        assert_eq!(
            store.list_code_artifacts(CodeArtifactKind::Test),
            vec!["auth_test.rs"]
        );
        assert_eq!(
            store.list_code_artifacts(CodeArtifactKind::Implementation),
            vec!["auth.rs"]
        );
    }

    #[test]
    fn highest_ordinal_scans_specs_directory() {
        let dir = tempfile::tempdir().unwrap();
        let specs_root = dir.path().join("specs");
        std::fs::create_dir_all(specs_root.join("001-a")).unwrap();
        std::fs::create_dir_all(specs_root.join("007-b")).unwrap();

        assert_eq!(ArtifactStore::highest_ordinal(&specs_root), 7);
    }

    #[test]
    fn highest_ordinal_is_zero_when_specs_root_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(ArtifactStore::highest_ordinal(&dir.path().join("specs")), 0);
    }
}
