use npm2stage_core::{Error, ErrorKind, Result, TargetManifest};

use crate::fs_utils::{list_dir_names, path_present};
use crate::layout::NpmLayout;

/// Fails with `LeftoversDetected` when the library directory shows any sign of
/// an earlier install or uninstall that did not finish.
///
/// Any file carrying the backup suffix counts, whichever file it once backed up.
pub fn expect_no_leftovers(layout: &NpmLayout, manifest: &TargetManifest) -> Result<()> {
    let lib_dir = layout.lib_dir();
    let entries =
        list_dir_names(&lib_dir).map_err(|err| err.or_kind(ErrorKind::BadInstallation))?;
    let top_level_items = manifest
        .top_level_added_files()
        .map(TargetManifest::script_name)
        .chain(manifest.added_dirs().iter().cloned());
    for item in top_level_items {
        if entries.contains(&item) {
            return Err(leftovers_error(&item));
        }
    }

    let backup_ending = TargetManifest::backup_file_ending();
    let mut scanned_dirs = vec![lib_dir];
    scanned_dirs.extend(
        manifest
            .changed_file_dirs()
            .into_iter()
            .map(|dir| layout.lib_subdir(dir)),
    );
    for dir in &scanned_dirs {
        let names = list_dir_names(dir).map_err(|err| err.or_kind(ErrorKind::BadInstallation))?;
        if let Some(name) = names.iter().find(|name| name.ends_with(&backup_ending)) {
            return Err(Error::new(
                ErrorKind::LeftoversDetected,
                format!("old backup {name} in target location"),
            ));
        }
    }

    for name in manifest.deep_added_files() {
        let path = layout.script_path(name);
        let present = path_present(&path).map_err(|err| {
            Error::io_as(
                ErrorKind::BadInstallation,
                err,
                format!("failed to probe {}", path.display()),
            )
        })?;
        if present {
            return Err(leftovers_error(&TargetManifest::script_name(name)));
        }
    }
    Ok(())
}

fn leftovers_error(item: &str) -> Error {
    Error::new(
        ErrorKind::LeftoversDetected,
        format!("evidence of previous npm-two-stage installation ({item}) in target location"),
    )
}
