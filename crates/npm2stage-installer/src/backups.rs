use npm2stage_core::{Error, ErrorKind, Result, TargetManifest};
use std::fs;

use crate::events::ProgressSink;
use crate::layout::NpmLayout;

/// Renames each changed file to its backup name, in order.
///
/// On the first failure every rename already made is undone before the
/// failure is returned, so no partial backup state survives.
pub fn backup_all(layout: &NpmLayout, names: &[String], sink: &mut dyn ProgressSink) -> Result<()> {
    for (index, name) in names.iter().enumerate() {
        let original = layout.script_path(name);
        let backup = layout.backup_path(name);
        if let Err(err) = fs::rename(&original, &backup) {
            let failure = Error::io_as(
                ErrorKind::BadInstallation,
                err,
                format!("failed to back up {}", original.display()),
            );
            sink.diagnostic("Error while renaming files; restoring original names...");
            for done in &names[..index] {
                let backup = layout.backup_path(done);
                let original = layout.script_path(done);
                fs::rename(&backup, &original).map_err(|err| {
                    Error::io_as(
                        ErrorKind::FilesystemActionFailed,
                        err,
                        format!("failed to restore {}", original.display()),
                    )
                })?;
            }
            return Err(failure);
        }
    }
    Ok(())
}

/// Renames each backup back to its original name.
///
/// Every name is attempted; failures are collected and reported together once
/// the last one has been tried.
pub fn restore_all(
    layout: &NpmLayout,
    names: &[String],
    sink: &mut dyn ProgressSink,
) -> Result<()> {
    let mut failed = Vec::new();
    for name in names {
        let backup = layout.backup_path(name);
        let original = layout.script_path(name);
        let script = TargetManifest::script_name(name);
        match fs::rename(&backup, &original) {
            Ok(()) => {}
            Err(err) => {
                sink.diagnostic(&format!("Unable to restore {script} ({})", err.kind()));
                failed.push(script);
            }
        }
    }

    if failed.is_empty() {
        return Ok(());
    }
    Err(Error::new(
        ErrorKind::FilesystemActionFailed,
        format!("unable to restore {}", failed.join(", ")),
    ))
}
