use npm2stage_core::{Result, TargetIdentity, TargetManifest};
use std::path::PathBuf;

/// What an operation patches: the expected package identity and the paths it touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchProfile {
    pub identity: TargetIdentity,
    pub manifest: TargetManifest,
}

impl PatchProfile {
    pub fn new(identity: TargetIdentity, manifest: TargetManifest) -> Self {
        Self { identity, manifest }
    }

    pub fn npm_two_stage() -> Result<Self> {
        Ok(Self::new(
            TargetIdentity::npm(),
            TargetManifest::npm_two_stage()?,
        ))
    }
}

/// Where the target npm installation lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetLocation {
    /// The globally active npm, located by asking npm itself.
    Live,
    /// An npm home directory given by the user. It need not be the active one.
    Path(PathBuf),
}

impl TargetLocation {
    pub fn from_arg(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) => Self::Path(path),
            None => Self::Live,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live)
    }
}
