//! Artifact persistence.
//!
//! Everything the pipeline produces can be written under one output
//! directory: single generated files, assessment JSON documents, error
//! logs, and whole project bundles. Persistence is the one concern that
//! does not degrade to a fallback; a failed write surfaces as a
//! [`PersistenceError`].
//!
//! Layout under the base directory:
//!
//! ```text
//! generated_code/   one .py file per code save
//! generated_tests/  one .py file per test save
//! assessments/      scores, structures, error logs (JSON)
//! projects/         one directory per exported bundle
//! ```

use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::error::ErrorLog;
use crate::generation::{FileBundle, ProjectStructure};

const CODE_DIR: &str = "generated_code";
const TESTS_DIR: &str = "generated_tests";
const ASSESSMENTS_DIR: &str = "assessments";
const PROJECTS_DIR: &str = "projects";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("could not create artifact directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not write artifact {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not list artifacts under {path}: {source}")]
    List {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not encode {what} as JSON: {source}")]
    Encode {
        what: String,
        source: serde_json::Error,
    },
}

/// One stored file, as reported by [`ArtifactStore::list_artifacts`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactEntry {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified: DateTime<Utc>,
}

/// Writes pipeline outputs under a single base directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    base_dir: PathBuf,
}

impl ArtifactStore {
    /// Open (and create) the artifact tree under `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let base_dir = base_dir.into();
        for sub in [CODE_DIR, TESTS_DIR, ASSESSMENTS_DIR, PROJECTS_DIR] {
            create_dir(&base_dir.join(sub))?;
        }
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Save one generated source file, named after the requirement.
    pub fn save_code(&self, name: &str, code: &str) -> Result<PathBuf, PersistenceError> {
        let path = self.timestamped(CODE_DIR, &sanitize(name), ".py");
        write_file(&path, code)?;
        tracing::info!(path = %path.display(), "saved generated code");
        Ok(path)
    }

    /// Save one generated test file.
    pub fn save_tests(&self, name: &str, tests: &str) -> Result<PathBuf, PersistenceError> {
        let stem = format!("test_{}", sanitize(name));
        let path = self.timestamped(TESTS_DIR, &stem, ".py");
        write_file(&path, tests)?;
        tracing::info!(path = %path.display(), "saved generated tests");
        Ok(path)
    }

    /// Save any serializable document as pretty JSON under assessments/.
    pub fn save_assessment<T: Serialize>(
        &self,
        name: &str,
        assessment: &T,
    ) -> Result<PathBuf, PersistenceError> {
        let json = serde_json::to_string_pretty(assessment).map_err(|source| {
            PersistenceError::Encode {
                what: format!("assessment '{name}'"),
                source,
            }
        })?;
        let path = self.timestamped(ASSESSMENTS_DIR, &sanitize(name), ".json");
        write_file(&path, &json)?;
        tracing::info!(path = %path.display(), "saved assessment");
        Ok(path)
    }

    /// Save a decoded project structure for later inspection.
    pub fn save_structure(
        &self,
        structure: &ProjectStructure,
    ) -> Result<PathBuf, PersistenceError> {
        let stem = format!("{}_structure", sanitize(&structure.project_name));
        let json =
            serde_json::to_string_pretty(structure).map_err(|source| PersistenceError::Encode {
                what: format!("structure '{}'", structure.project_name),
                source,
            })?;
        let path = self.timestamped(ASSESSMENTS_DIR, &stem, ".json");
        write_file(&path, &json)?;
        Ok(path)
    }

    /// Snapshot an error log alongside the run it belongs to.
    pub fn save_error_log(&self, name: &str, log: &ErrorLog) -> Result<PathBuf, PersistenceError> {
        let document = serde_json::json!({
            "summary": log.summary(),
            "records": log.snapshot(),
        });
        let json =
            serde_json::to_string_pretty(&document).map_err(|source| PersistenceError::Encode {
                what: format!("error log '{name}'"),
                source,
            })?;
        let stem = format!("{}_errors", sanitize(name));
        let path = self.timestamped(ASSESSMENTS_DIR, &stem, ".json");
        write_file(&path, &json)?;
        Ok(path)
    }

    /// Export a whole bundle as a project directory.
    ///
    /// Main and additional files keep their relative paths; test files go
    /// under `tests/`. Returns the created project directory.
    pub fn save_bundle(
        &self,
        project_name: &str,
        bundle: &FileBundle,
    ) -> Result<PathBuf, PersistenceError> {
        let project_dir = self.timestamped(PROJECTS_DIR, &sanitize(project_name), "");
        create_dir(&project_dir)?;

        let sections = [
            (None, &bundle.main_files),
            (Some("tests"), &bundle.test_files),
            (None, &bundle.additional_files),
        ];
        for (subdir, files) in sections {
            for (filename, content) in files {
                let Some(relative) = safe_relative(filename) else {
                    tracing::warn!(file = %filename, "skipping file with unsafe path");
                    continue;
                };
                let mut path = project_dir.clone();
                if let Some(subdir) = subdir {
                    path.push(subdir);
                }
                path.push(relative);
                if let Some(parent) = path.parent() {
                    create_dir(parent)?;
                }
                write_file(&path, content)?;
            }
        }

        tracing::info!(
            path = %project_dir.display(),
            files = bundle.file_count(),
            "exported project bundle"
        );
        Ok(project_dir)
    }

    /// Every stored file, newest first.
    pub fn list_artifacts(&self) -> Result<Vec<ArtifactEntry>, PersistenceError> {
        let mut entries = Vec::new();
        for entry in walkdir::WalkDir::new(&self.base_dir) {
            let entry = entry.map_err(|err| PersistenceError::List {
                path: self.base_dir.clone(),
                source: err.into(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let metadata = entry.metadata().map_err(|err| PersistenceError::List {
                path: entry.path().to_path_buf(),
                source: err.into(),
            })?;
            let modified = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());
            entries.push(ArtifactEntry {
                path: entry.path().to_path_buf(),
                size_bytes: metadata.len(),
                modified,
            });
        }
        entries.sort_by(|a, b| b.modified.cmp(&a.modified).then(b.path.cmp(&a.path)));
        Ok(entries)
    }

    /// `{dir}/{stem}_{timestamp}{ext}`, uniquified when a second save lands
    /// in the same second.
    fn timestamped(&self, dir: &str, stem: &str, ext: &str) -> PathBuf {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let base = self.base_dir.join(dir);
        let mut path = base.join(format!("{stem}_{timestamp}{ext}"));
        let mut counter = 1;
        while path.exists() {
            path = base.join(format!("{stem}_{timestamp}_{counter}{ext}"));
            counter += 1;
        }
        path
    }
}

fn create_dir(path: &Path) -> Result<(), PersistenceError> {
    std::fs::create_dir_all(path).map_err(|source| PersistenceError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, content: &str) -> Result<(), PersistenceError> {
    std::fs::write(path, content).map_err(|source| PersistenceError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Keep letters, digits, `-` and `_`; everything else becomes `_`. Long
/// names are cut so the timestamp suffix still fits comfortably.
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .take(50)
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "artifact".to_string()
    } else {
        cleaned
    }
}

/// Interpret a bundle filename as a relative path, refusing anything that
/// would escape the project directory.
fn safe_relative(filename: &str) -> Option<PathBuf> {
    let path = Path::new(filename);
    let mut clean = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if clean.as_os_str().is_empty() {
        None
    } else {
        Some(clean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    fn store() -> (tempfile::TempDir, ArtifactStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("out")).unwrap();
        (dir, store)
    }

    #[test]
    fn new_creates_the_artifact_tree() {
        let (_dir, store) = store();
        for sub in [CODE_DIR, TESTS_DIR, ASSESSMENTS_DIR, PROJECTS_DIR] {
            assert!(store.base_dir().join(sub).is_dir());
        }
    }

    #[test]
    fn code_saves_are_sanitized_and_timestamped() {
        let (_dir, store) = store();
        let path = store.save_code("my app! v2", "print('hi')\n").unwrap();

        let filename = path.file_name().unwrap().to_str().unwrap();
        assert!(filename.starts_with("my_app__v2_"));
        assert!(filename.ends_with(".py"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "print('hi')\n");
    }

    #[test]
    fn same_second_saves_do_not_clobber() {
        let (_dir, store) = store();
        let first = store.save_code("app", "one").unwrap();
        let second = store.save_code("app", "two").unwrap();

        assert_ne!(first, second);
        assert_eq!(std::fs::read_to_string(&first).unwrap(), "one");
        assert_eq!(std::fs::read_to_string(&second).unwrap(), "two");
    }

    #[test]
    fn assessments_are_pretty_json() {
        let (_dir, store) = store();
        let path = store
            .save_assessment("api score", &serde_json::json!({"overall_score": 82.5}))
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"overall_score\": 82.5"));
        assert!(path.to_str().unwrap().contains("assessments"));
    }

    #[test]
    fn bundles_export_with_tests_separated() {
        let (_dir, store) = store();
        let mut main_files = IndexMap::new();
        main_files.insert("main.py".to_string(), "print('main')".to_string());
        let mut test_files = IndexMap::new();
        test_files.insert("test_main.py".to_string(), "assert True".to_string());
        let mut additional_files = IndexMap::new();
        additional_files.insert("scripts/deploy.sh".to_string(), "#!/bin/bash".to_string());

        let bundle = FileBundle {
            main_files,
            test_files,
            additional_files,
        };
        let project = store.save_bundle("demo", &bundle).unwrap();

        assert!(project.join("main.py").is_file());
        assert!(project.join("tests").join("test_main.py").is_file());
        assert!(project.join("scripts").join("deploy.sh").is_file());
    }

    #[test]
    fn traversal_attempts_are_skipped() {
        let (_dir, store) = store();
        let mut main_files = IndexMap::new();
        main_files.insert("../escape.py".to_string(), "nope".to_string());
        main_files.insert("/etc/evil.py".to_string(), "nope".to_string());
        main_files.insert("ok.py".to_string(), "fine".to_string());

        let bundle = FileBundle {
            main_files,
            test_files: IndexMap::new(),
            additional_files: IndexMap::new(),
        };
        let project = store.save_bundle("demo", &bundle).unwrap();

        assert!(project.join("ok.py").is_file());
        assert!(!project.parent().unwrap().join("escape.py").exists());
        let exported: Vec<_> = walkdir::WalkDir::new(&project)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .collect();
        assert_eq!(exported.len(), 1);
    }

    #[test]
    fn listing_sees_every_saved_artifact() {
        let (_dir, store) = store();
        store.save_code("app", "code").unwrap();
        store.save_tests("app", "tests").unwrap();
        store
            .save_assessment("app", &serde_json::json!({"score": 1}))
            .unwrap();

        let listed = store.list_artifacts().unwrap();
        assert_eq!(listed.len(), 3);
        assert!(listed.iter().all(|entry| entry.size_bytes > 0));
        // newest first
        assert!(listed.windows(2).all(|w| w[0].modified >= w[1].modified));
    }

    #[test]
    fn error_logs_serialize_with_summary_and_records() {
        use crate::error::{ErrorKind, ErrorRecord};

        let (_dir, store) = store();
        let log = ErrorLog::new();
        log.record(ErrorRecord::new(
            ErrorKind::Transport,
            "connection refused",
            "suggest_tech_stacks",
        ));

        let path = store.save_error_log("run", &log).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"total_errors\": 1"));
        assert!(content.contains("connection refused"));
    }

    #[test]
    fn sanitize_keeps_safe_characters_only() {
        assert_eq!(sanitize("task-api_v1"), "task-api_v1");
        assert_eq!(sanitize("hello world!"), "hello_world_");
        assert_eq!(sanitize("  "), "artifact");
        assert_eq!(sanitize(""), "artifact");
    }
}
