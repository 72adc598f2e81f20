use npm2stage_core::{Error, ErrorKind, Result};
use std::fs;
use std::process::Command;

use crate::backups::{backup_all, restore_all};
use crate::events::ProgressSink;
use crate::fs_utils::{copy_file_exclusive, graft};
use crate::layout::{NpmLayout, SourceLayout};
use crate::leftovers::expect_no_leftovers;
use crate::npm_query::run_command_stdout;
use crate::preflight::{finish_failure, prepare_target};
use crate::types::{PatchProfile, TargetLocation};
use crate::uninstall::remove_added_items;

pub fn install(
    profile: &PatchProfile,
    location: &TargetLocation,
    source: &SourceLayout,
    sink: &mut dyn ProgressSink,
) -> Result<NpmLayout> {
    install_with_runner(profile, location, source, sink, &mut run_command_stdout)
}

pub fn install_with_runner<RunCommand>(
    profile: &PatchProfile,
    location: &TargetLocation,
    source: &SourceLayout,
    sink: &mut dyn ProgressSink,
    run: &mut RunCommand,
) -> Result<NpmLayout>
where
    RunCommand: FnMut(&mut Command) -> anyhow::Result<String>,
{
    run_install(profile, location, source, sink, run).map_err(|err| finish_failure(err, sink))
}

fn run_install<RunCommand>(
    profile: &PatchProfile,
    location: &TargetLocation,
    source: &SourceLayout,
    sink: &mut dyn ProgressSink,
    run: &mut RunCommand,
) -> Result<NpmLayout>
where
    RunCommand: FnMut(&mut Command) -> anyhow::Result<String>,
{
    let layout = prepare_target(profile, location, sink, run)?;
    expect_no_leftovers(&layout, &profile.manifest)?;

    let changed = profile.manifest.changed_files();
    sink.progress("Backing up files to be replaced:");
    for name in changed {
        sink.progress(&format!("  {}.js", name));
    }
    backup_all(&layout, changed, sink)?;

    // From here on the target has been modified.
    if let Err(err) = copy_in(profile, &layout, source, sink) {
        clean_up(profile, &layout, sink);
        return Err(err);
    }
    Ok(layout)
}

fn copy_in(
    profile: &PatchProfile,
    layout: &NpmLayout,
    source: &SourceLayout,
    sink: &mut dyn ProgressSink,
) -> Result<()> {
    let manifest = &profile.manifest;
    let files = manifest
        .changed_files()
        .iter()
        .chain(manifest.added_files())
        .collect::<Vec<_>>();

    sink.progress("Copying into target directory:");
    for name in &files {
        sink.progress(&format!("  {}.js", name));
    }
    for dir in manifest.added_dirs() {
        sink.progress(&format!("  {dir}/"));
    }

    let source_metadata = fs::metadata(source.root()).map_err(|err| {
        Error::io_as(
            ErrorKind::BadProjectSource,
            err,
            format!("cannot access project source {}", source.root().display()),
        )
    })?;
    if !source_metadata.is_dir() {
        return Err(Error::new(
            ErrorKind::BadProjectSource,
            format!("project source {} is not a directory", source.root().display()),
        ));
    }

    // The target was validated and its files moved aside, so a copy failure
    // points at the project's own files.
    for name in files {
        copy_file_exclusive(&source.script_path(name), &layout.script_path(name))
            .map_err(|err| err.or_kind(ErrorKind::BadProjectSource))?;
    }

    let lib_dir = layout.lib_dir();
    for dir in manifest.added_dirs() {
        graft(&source.dir_path(dir), &lib_dir, sink)?;
    }
    Ok(())
}

// Must not fail: problems are reported and the original error wins.
fn clean_up(profile: &PatchProfile, layout: &NpmLayout, sink: &mut dyn ProgressSink) {
    sink.progress("Installation failed; removing added items and restoring backups...");
    if let Err(err) = remove_added_items(layout, &profile.manifest, sink) {
        sink.diagnostic(&format!("Cleanup could not remove every added item: {err}"));
    }
    if let Err(err) = restore_all(layout, profile.manifest.changed_files(), sink) {
        sink.diagnostic(&format!("Cleanup could not restore every backup: {err}"));
    }
}
