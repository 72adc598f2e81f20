use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::error::{Error, Result};

// The paths below are specific to this npm release.
pub const TARGET_PACKAGE_NAME: &str = "npm";
pub const TARGET_VERSION: &str = "9.8.1";

pub const BACKUP_SUFFIX: &str = "_ORIG";
pub const SCRIPT_EXTENSION: &str = "js";
pub const LIB_DIR_NAME: &str = "lib";
pub const PACKAGE_JSON_NAME: &str = "package.json";

const CHANGED_FILES: [&str; 3] = ["npm", "commands/install", "utils/cmd-list"];
const ADDED_FILES: [&str; 1] = ["commands/download"];
const ADDED_DIRS: [&str; 2] = ["download", "offliner"];

/// Package name and exact version a target installation must report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetIdentity {
    pub name: String,
    pub version: String,
}

impl TargetIdentity {
    pub fn npm() -> Self {
        Self {
            name: TARGET_PACKAGE_NAME.to_string(),
            version: TARGET_VERSION.to_string(),
        }
    }
}

impl Default for TargetIdentity {
    fn default() -> Self {
        Self::npm()
    }
}

/// The fixed set of library paths touched by an install.
///
/// Entries are extension-less and `/`-separated, relative to the target's
/// library directory. The lists cannot be changed after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetManifest {
    changed_files: Vec<String>,
    added_files: Vec<String>,
    added_dirs: Vec<String>,
}

impl TargetManifest {
    pub fn new<C, A, D>(changed_files: C, added_files: A, added_dirs: D) -> Result<Self>
    where
        C: IntoIterator,
        C::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        let manifest = Self {
            changed_files: changed_files.into_iter().map(Into::into).collect(),
            added_files: added_files.into_iter().map(Into::into).collect(),
            added_dirs: added_dirs.into_iter().map(Into::into).collect(),
        };

        for entry in manifest
            .changed_files
            .iter()
            .chain(&manifest.added_files)
        {
            validate_rel_entry(entry)?;
            if entry.ends_with(BACKUP_SUFFIX) {
                return Err(Error::invalid_argument(format!(
                    "manifest entry '{entry}' would collide with a backup name"
                )));
            }
        }
        for dir in &manifest.added_dirs {
            validate_rel_entry(dir)?;
            if dir.contains('/') {
                return Err(Error::invalid_argument(format!(
                    "added directory '{dir}' must be a top-level name"
                )));
            }
        }

        let mut seen = BTreeSet::new();
        for entry in manifest
            .changed_files
            .iter()
            .chain(&manifest.added_files)
            .chain(&manifest.added_dirs)
        {
            if !seen.insert(entry.as_str()) {
                return Err(Error::invalid_argument(format!(
                    "duplicate manifest entry '{entry}'"
                )));
            }
        }

        Ok(manifest)
    }

    /// The manifest of the npm-two-stage patch set.
    pub fn npm_two_stage() -> Result<Self> {
        Self::new(CHANGED_FILES, ADDED_FILES, ADDED_DIRS)
    }

    pub fn changed_files(&self) -> &[String] {
        &self.changed_files
    }

    pub fn added_files(&self) -> &[String] {
        &self.added_files
    }

    pub fn added_dirs(&self) -> &[String] {
        &self.added_dirs
    }

    /// Added files that live directly in the library directory.
    pub fn top_level_added_files(&self) -> impl Iterator<Item = &str> {
        self.added_files
            .iter()
            .map(String::as_str)
            .filter(|name| !name.contains('/'))
    }

    /// Added files that live in a subdirectory of the library directory.
    pub fn deep_added_files(&self) -> impl Iterator<Item = &str> {
        self.added_files
            .iter()
            .map(String::as_str)
            .filter(|name| name.contains('/'))
    }

    /// Distinct parent directories of changed files that are not top-level.
    pub fn changed_file_dirs(&self) -> Vec<&str> {
        let mut dirs = Vec::new();
        for name in &self.changed_files {
            if let Some((dir, _)) = name.rsplit_once('/') {
                if !dirs.contains(&dir) {
                    dirs.push(dir);
                }
            }
        }
        dirs
    }

    pub fn script_name(name: &str) -> String {
        format!("{name}.{SCRIPT_EXTENSION}")
    }

    pub fn backup_name(name: &str) -> String {
        format!("{name}{BACKUP_SUFFIX}.{SCRIPT_EXTENSION}")
    }

    /// Ending shared by every backup file name.
    pub fn backup_file_ending() -> String {
        format!("{BACKUP_SUFFIX}.{SCRIPT_EXTENSION}")
    }
}

/// Converts a `/`-separated manifest entry into a platform path.
pub fn rel_path(name: &str) -> PathBuf {
    name.split('/').filter(|part| !part.is_empty()).collect()
}

fn validate_rel_entry(entry: &str) -> Result<()> {
    if entry.trim().is_empty() {
        return Err(Error::invalid_argument("manifest entries must not be empty"));
    }
    if entry.starts_with('/') || entry.contains('\\') {
        return Err(Error::invalid_argument(format!(
            "manifest entry '{entry}' must be a relative '/'-separated path"
        )));
    }
    if entry
        .split('/')
        .any(|part| part.is_empty() || part == "." || part == "..")
    {
        return Err(Error::invalid_argument(format!(
            "manifest entry '{entry}' contains an invalid component"
        )));
    }
    Ok(())
}
