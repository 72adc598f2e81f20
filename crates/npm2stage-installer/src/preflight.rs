use npm2stage_core::{Error, ErrorKind, Result};
use std::fs;
use std::io;
use std::process::Command;

use crate::events::ProgressSink;
use crate::layout::NpmLayout;
use crate::npm_query::resolve_target_with_runner;
use crate::types::{PatchProfile, TargetLocation};
use crate::version_gate::check_version_with_runner;

/// Locates the target, checks its identity and confirms its library directory
/// is reachable. Nothing is modified.
pub(crate) fn prepare_target<RunCommand>(
    profile: &PatchProfile,
    location: &TargetLocation,
    sink: &mut dyn ProgressSink,
    run: &mut RunCommand,
) -> Result<NpmLayout>
where
    RunCommand: FnMut(&mut Command) -> anyhow::Result<String>,
{
    sink.progress(&format!(
        "Checking npm version {}...",
        if location.is_live() {
            "(live)"
        } else {
            "at given path"
        }
    ));
    let layout = resolve_target_with_runner(location, run)?;
    let explicit_dir = (!location.is_live()).then(|| layout.npm_dir());
    check_version_with_runner(&profile.identity, explicit_dir, run)?;

    sink.progress(&format!("Target npm home is {}", layout.npm_dir().display()));
    expect_lib_dir(&layout)?;
    Ok(layout)
}

fn expect_lib_dir(layout: &NpmLayout) -> Result<()> {
    let lib_dir = layout.lib_dir();
    match fs::metadata(&lib_dir) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(Error::new(
            ErrorKind::BadInstallation,
            format!("{} at supposed npm path is not a directory", lib_dir.display()),
        )),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Err(Error::io_as(
            ErrorKind::BadInstallation,
            err,
            "Unable to access lib directory at supposed npm path",
        )),
        Err(err) => Err(Error::io(
            err,
            format!("failed to access {}", lib_dir.display()),
        )),
    }
}

/// Final step on every failed operation: make sure the error is classified
/// and tell the user what the classification means.
pub(crate) fn finish_failure(err: Error, sink: &mut dyn ProgressSink) -> Error {
    let err = err.or_kind(ErrorKind::FilesystemActionFailed);
    match err.kind() {
        Some(ErrorKind::WrongVersion) => {
            sink.diagnostic("Wrong version of npm for this version of npm-two-stage.")
        }
        Some(ErrorKind::ManagerNotFound) => sink.diagnostic("npm not found at given location."),
        Some(ErrorKind::BadInstallation) => sink.diagnostic(&err.to_string()),
        _ => {}
    }
    err
}
