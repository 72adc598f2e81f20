use npm2stage_core::{ErrorKind, Result, TargetManifest};
use std::path::PathBuf;
use std::process::Command;

use crate::backups::restore_all;
use crate::events::ProgressSink;
use crate::fs_utils::{prune, remove_files};
use crate::layout::NpmLayout;
use crate::npm_query::run_command_stdout;
use crate::preflight::{finish_failure, prepare_target};
use crate::types::{PatchProfile, TargetLocation};

/// Removes everything install added and puts the original files back.
///
/// Safe to run against a partly installed or partly removed target: items
/// that are already gone are noted rather than treated as failures.
pub fn uninstall(
    profile: &PatchProfile,
    location: &TargetLocation,
    sink: &mut dyn ProgressSink,
) -> Result<NpmLayout> {
    uninstall_with_runner(profile, location, sink, &mut run_command_stdout)
}

pub fn uninstall_with_runner<RunCommand>(
    profile: &PatchProfile,
    location: &TargetLocation,
    sink: &mut dyn ProgressSink,
    run: &mut RunCommand,
) -> Result<NpmLayout>
where
    RunCommand: FnMut(&mut Command) -> anyhow::Result<String>,
{
    run_uninstall(profile, location, sink, run).map_err(|err| finish_failure(err, sink))
}

fn run_uninstall<RunCommand>(
    profile: &PatchProfile,
    location: &TargetLocation,
    sink: &mut dyn ProgressSink,
    run: &mut RunCommand,
) -> Result<NpmLayout>
where
    RunCommand: FnMut(&mut Command) -> anyhow::Result<String>,
{
    let layout = prepare_target(profile, location, sink, run)?;
    let manifest = &profile.manifest;

    // Replacements of changed files go away when their backups are renamed back.
    sink.progress("Removing items added by npm-two-stage install:");
    for name in manifest.changed_files().iter().chain(manifest.added_files()) {
        sink.progress(&format!("  {}", TargetManifest::script_name(name)));
    }
    for dir in manifest.added_dirs() {
        sink.progress(&format!("  {dir}/"));
    }
    remove_added_items(&layout, manifest, sink)?;

    sink.progress("Restoring backed-up original files:");
    for name in manifest.changed_files() {
        sink.progress(&format!("  {}", TargetManifest::script_name(name)));
    }
    restore_all(&layout, manifest.changed_files(), sink)?;
    Ok(layout)
}

/// Deletes added files, then added directories. Anything already missing is
/// noted and skipped.
pub(crate) fn remove_added_items(
    layout: &NpmLayout,
    manifest: &TargetManifest,
    sink: &mut dyn ProgressSink,
) -> Result<()> {
    let files = manifest
        .added_files()
        .iter()
        .map(|name| layout.script_path(name))
        .collect::<Vec<PathBuf>>();
    remove_files(&files, sink).map_err(|err| err.or_kind(ErrorKind::FilesystemActionFailed))?;

    for dir in manifest.added_dirs() {
        match prune(&layout.lib_subdir(dir)) {
            Ok(()) => {}
            Err(err) if err.is_not_found() => {
                sink.diagnostic(&format!("Could not find directory {dir} for removal"));
            }
            Err(err) => {
                sink.diagnostic(&format!("Unable to remove directory {dir} ({err})"));
                return Err(err.or_kind(ErrorKind::FilesystemActionFailed));
            }
        }
    }
    Ok(())
}
