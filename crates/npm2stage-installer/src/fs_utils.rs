use npm2stage_core::{Error, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::events::ProgressSink;

/// Copies directory `src` into directory `dest`, as `dest/<name of src>`.
///
/// Entries that are neither regular files nor directories are left out with a
/// diagnostic. If anything fails after the new directory was created, the
/// partial copy is removed before the original error is returned.
pub fn graft(src: &Path, dest: &Path, sink: &mut dyn ProgressSink) -> Result<()> {
    if src.as_os_str().is_empty() {
        return Err(Error::invalid_argument("Source argument must not be empty"));
    }
    if dest.as_os_str().is_empty() {
        return Err(Error::invalid_argument(
            "Destination argument must not be empty",
        ));
    }
    let Some(name) = src.file_name() else {
        return Err(Error::invalid_argument(format!(
            "Source argument has no final component: {}",
            src.display()
        )));
    };

    let target = dest.join(name);
    fs::create_dir(&target)
        .map_err(|err| Error::io(err, format!("failed to create {}", target.display())))?;

    if let Err(err) = copy_entries(src, &target, sink) {
        if let Err(cleanup_err) = prune(&target) {
            sink.diagnostic(&format!(
                "Unable to remove partial copy {} ({cleanup_err})",
                target.display()
            ));
        }
        return Err(err);
    }
    Ok(())
}

fn copy_entries(src: &Path, dest: &Path, sink: &mut dyn ProgressSink) -> Result<()> {
    let mut pending = vec![(src.to_path_buf(), dest.to_path_buf())];
    while let Some((src_dir, dest_dir)) = pending.pop() {
        for src_path in read_dir_paths(&src_dir)? {
            let Some(name) = src_path.file_name() else {
                continue;
            };
            let dest_path = dest_dir.join(name);
            let metadata = fs::symlink_metadata(&src_path)
                .map_err(|err| Error::io(err, format!("failed to stat {}", src_path.display())))?;

            if metadata.is_dir() {
                fs::create_dir(&dest_path).map_err(|err| {
                    Error::io(err, format!("failed to create {}", dest_path.display()))
                })?;
                pending.push((src_path, dest_path));
            } else if metadata.is_file() {
                copy_file_exclusive(&src_path, &dest_path)?;
            } else {
                sink.diagnostic(&format!(
                    "Not a regular file or a directory, omitting {}",
                    src_path.display()
                ));
            }
        }
    }
    Ok(())
}

/// Removes directory `dir` and everything beneath it.
pub fn prune(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() {
        return Err(Error::invalid_argument(
            "Target directory argument must not be empty",
        ));
    }

    // A directory is removed on its second visit, once its children are gone.
    let mut stack = vec![(dir.to_path_buf(), false)];
    while let Some((current, emptied)) = stack.pop() {
        if emptied {
            fs::remove_dir(&current)
                .map_err(|err| Error::io(err, format!("failed to remove {}", current.display())))?;
            continue;
        }

        let children = read_dir_paths(&current)?;
        stack.push((current, true));
        for child in children {
            let metadata = fs::symlink_metadata(&child)
                .map_err(|err| Error::io(err, format!("failed to stat {}", child.display())))?;
            if metadata.is_dir() {
                stack.push((child, false));
            } else {
                fs::remove_file(&child)
                    .map_err(|err| Error::io(err, format!("failed to remove {}", child.display())))?;
            }
        }
    }
    Ok(())
}

/// Deletes each listed file in order. Files that are already gone are noted
/// and skipped; any other failure stops the sequence.
pub fn remove_files(paths: &[PathBuf], sink: &mut dyn ProgressSink) -> Result<()> {
    if paths.iter().any(|path| path.as_os_str().is_empty()) {
        return Err(Error::invalid_argument(
            "Path list can only contain non-empty paths",
        ));
    }

    for path in paths {
        match fs::remove_file(path) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                sink.diagnostic(&format!(
                    "Could not find file {} for removal",
                    path.display()
                ));
            }
            Err(err) => {
                return Err(Error::io(
                    err,
                    format!("failed to remove {}", path.display()),
                ));
            }
        }
    }
    Ok(())
}

/// Copies a regular file, refusing to overwrite anything at `dest`.
pub fn copy_file_exclusive(src: &Path, dest: &Path) -> Result<()> {
    let mut reader = fs::File::open(src)
        .map_err(|err| Error::io(err, format!("failed to open {}", src.display())))?;
    let permissions = reader
        .metadata()
        .map_err(|err| Error::io(err, format!("failed to stat {}", src.display())))?
        .permissions();
    let mut writer = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dest)
        .map_err(|err| Error::io(err, format!("failed to create {}", dest.display())))?;

    let copied = io::copy(&mut reader, &mut writer)
        .and_then(|_| writer.flush())
        .and_then(|()| fs::set_permissions(dest, permissions));
    if let Err(err) = copied {
        drop(writer);
        let _ = fs::remove_file(dest);
        return Err(Error::io(
            err,
            format!("failed to copy {} to {}", src.display(), dest.display()),
        ));
    }
    Ok(())
}

pub(crate) fn list_dir_names(dir: &Path) -> Result<Vec<String>> {
    Ok(read_dir_paths(dir)?
        .iter()
        .filter_map(|path| path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .collect())
}

/// Probes for `path`, treating "not found" as absence rather than failure.
pub(crate) fn path_present(path: &Path) -> io::Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

fn read_dir_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .map_err(|err| Error::io(err, format!("failed to read {}", dir.display())))?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|err| Error::io(err, format!("failed to read {}", dir.display())))?;
        paths.push(entry.path());
    }
    Ok(paths)
}
