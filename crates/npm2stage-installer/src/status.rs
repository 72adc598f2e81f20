use npm2stage_core::{Error, Result, TargetManifest};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::events::ProgressSink;
use crate::fs_utils::{list_dir_names, path_present};
use crate::layout::NpmLayout;
use crate::npm_query::run_command_stdout;
use crate::preflight::{finish_failure, prepare_target};
use crate::types::{PatchProfile, TargetLocation};

/// Presence of each expected item in one category, in manifest order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresenceSet {
    entries: Vec<(String, bool)>,
    present: usize,
    missing: usize,
}

impl PresenceSet {
    pub(crate) fn record(&mut self, item: impl Into<String>, present: bool) {
        self.entries.push((item.into(), present));
        if present {
            self.present += 1;
        } else {
            self.missing += 1;
        }
    }

    pub fn present(&self) -> usize {
        self.present
    }

    pub fn missing(&self) -> usize {
        self.missing
    }

    pub fn entries(&self) -> &[(String, bool)] {
        &self.entries
    }

    pub fn is_present(&self, item: &str) -> Option<bool> {
        self.entries
            .iter()
            .find(|(name, _)| name == item)
            .map(|(_, present)| *present)
    }

    pub fn missing_items(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, present)| !present)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// On-disk evidence gathered by a status query. Backups and standard files are
/// keyed by the standard file name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallationState {
    pub standard: PresenceSet,
    pub backup: PresenceSet,
    pub added: PresenceSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallationHealth {
    NotInstalled,
    FullyInstalled,
    Incomplete,
    StandardFilesMissing,
}

impl InstallationHealth {
    pub fn description(self) -> &'static str {
        match self {
            Self::NotInstalled => "npm-two-stage is not installed at this location.",
            Self::FullyInstalled => "npm-two-stage is fully installed at this location.",
            Self::Incomplete => "Incomplete npm-two-stage installation found - cleanup required.",
            Self::StandardFilesMissing => {
                "Files expected in a standard npm installation are missing!"
            }
        }
    }
}

impl InstallationState {
    pub fn health(&self) -> InstallationHealth {
        if self.standard.missing > 0 {
            return InstallationHealth::StandardFilesMissing;
        }
        if self.backup.missing == 0 && self.added.missing == 0 {
            InstallationHealth::FullyInstalled
        } else if self.backup.present > 0 || self.added.present > 0 {
            InstallationHealth::Incomplete
        } else {
            InstallationHealth::NotInstalled
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub npm_dir: PathBuf,
    pub state: InstallationState,
    pub health: InstallationHealth,
}

pub fn status(
    profile: &PatchProfile,
    location: &TargetLocation,
    sink: &mut dyn ProgressSink,
) -> Result<StatusReport> {
    status_with_runner(profile, location, sink, &mut run_command_stdout)
}

pub fn status_with_runner<RunCommand>(
    profile: &PatchProfile,
    location: &TargetLocation,
    sink: &mut dyn ProgressSink,
    run: &mut RunCommand,
) -> Result<StatusReport>
where
    RunCommand: FnMut(&mut Command) -> anyhow::Result<String>,
{
    let inspected = prepare_target(profile, location, sink, run).and_then(|layout| {
        let state = inspect_installation(&layout, &profile.manifest)?;
        Ok((layout, state))
    });
    let (layout, state) = inspected.map_err(|err| finish_failure(err, sink))?;

    report_state(&state, sink);
    let health = state.health();
    Ok(StatusReport {
        npm_dir: layout.npm_dir().to_path_buf(),
        state,
        health,
    })
}

/// Reads which expected files exist. Read-only.
pub fn inspect_installation(
    layout: &NpmLayout,
    manifest: &TargetManifest,
) -> Result<InstallationState> {
    let mut state = InstallationState::default();

    for name in manifest.changed_files() {
        let script = TargetManifest::script_name(name);
        state
            .backup
            .record(script.clone(), probe(&layout.backup_path(name))?);
        state
            .standard
            .record(script, probe(&layout.script_path(name))?);
    }

    let entries = list_dir_names(&layout.lib_dir())?;
    let top_level_items = manifest
        .top_level_added_files()
        .map(TargetManifest::script_name)
        .chain(manifest.added_dirs().iter().cloned());
    for item in top_level_items {
        let present = entries.contains(&item);
        state.added.record(item, present);
    }

    for name in manifest.deep_added_files() {
        let present = probe(&layout.script_path(name))?;
        state.added.record(TargetManifest::script_name(name), present);
    }

    Ok(state)
}

fn probe(path: &Path) -> Result<bool> {
    path_present(path).map_err(|err| Error::io(err, format!("failed to probe {}", path.display())))
}

fn report_state(state: &InstallationState, sink: &mut dyn ProgressSink) {
    let backup = &state.backup;
    if backup.present == 0 {
        sink.progress("No backups present.");
    } else if backup.missing == 0 {
        sink.progress("All backups present.");
    } else {
        sink.progress("Incomplete set of backups present.");
        sink.progress(&format!("Missing: {}", backup.missing_items().join(", ")));
    }

    let standard = &state.standard;
    if standard.missing == 0 {
        sink.progress("No standard files missing.");
    } else {
        sink.progress("Some standard files are missing.");
        sink.progress(&format!("Missing: {}", standard.missing_items().join(", ")));
    }

    let added = &state.added;
    if added.present == 0 {
        sink.progress("No new files present.");
    } else if added.missing == 0 {
        sink.progress("All expected new files present.");
    } else {
        sink.progress("Some expected new files are missing.");
        sink.progress(&format!("Missing: {}", added.missing_items().join(", ")));
    }

    sink.progress(state.health().description());
}
