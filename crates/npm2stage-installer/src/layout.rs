use anyhow::{Context, Result};
use npm2stage_core::{rel_path, TargetManifest, LIB_DIR_NAME};
use std::path::{Path, PathBuf};

pub const SOURCE_ENV_VAR: &str = "NPM2STAGE_SOURCE";

/// Paths inside a target npm installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpmLayout {
    npm_dir: PathBuf,
}

impl NpmLayout {
    pub fn new(npm_dir: impl Into<PathBuf>) -> Self {
        Self {
            npm_dir: npm_dir.into(),
        }
    }

    pub fn npm_dir(&self) -> &Path {
        &self.npm_dir
    }

    pub fn lib_dir(&self) -> PathBuf {
        self.npm_dir.join(LIB_DIR_NAME)
    }

    pub fn script_path(&self, name: &str) -> PathBuf {
        self.lib_dir()
            .join(rel_path(&TargetManifest::script_name(name)))
    }

    pub fn backup_path(&self, name: &str) -> PathBuf {
        self.lib_dir()
            .join(rel_path(&TargetManifest::backup_name(name)))
    }

    pub fn lib_subdir(&self, name: &str) -> PathBuf {
        self.lib_dir().join(rel_path(name))
    }
}

/// Paths inside the project's own copy of the replacement files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLayout {
    root: PathBuf,
}

impl SourceLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn script_path(&self, name: &str) -> PathBuf {
        self.root.join(rel_path(&TargetManifest::script_name(name)))
    }

    pub fn dir_path(&self, name: &str) -> PathBuf {
        self.root.join(rel_path(name))
    }
}

pub fn default_source_dir() -> Result<PathBuf> {
    if let Some(value) = std::env::var_os(SOURCE_ENV_VAR) {
        if !value.is_empty() {
            return Ok(PathBuf::from(value));
        }
    }

    let exe = std::env::current_exe().context("cannot locate the running executable")?;
    let exe_dir = exe
        .parent()
        .with_context(|| format!("executable has no parent directory: {}", exe.display()))?;
    Ok(exe_dir.join("npm-two-stage").join("src"))
}
