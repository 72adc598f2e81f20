use npm2stage_core::{Error, ErrorKind, PackageJson, Result, TargetIdentity, PACKAGE_JSON_NAME};
use std::fs;
use std::io;
use std::path::Path;
use std::process::Command;

use crate::npm_query::{live_npm_version_with_runner, run_command_stdout};

/// Confirms that the npm at `npm_dir`, or the live npm when no directory is
/// given, is the one release this tool knows how to patch.
pub fn check_version(identity: &TargetIdentity, npm_dir: Option<&Path>) -> Result<()> {
    check_version_with_runner(identity, npm_dir, &mut run_command_stdout)
}

pub fn check_version_with_runner<RunCommand>(
    identity: &TargetIdentity,
    npm_dir: Option<&Path>,
    run: &mut RunCommand,
) -> Result<()>
where
    RunCommand: FnMut(&mut Command) -> anyhow::Result<String>,
{
    match npm_dir {
        // `npm --version` describes whichever npm is active, which need not be
        // the one at the given path.
        Some(npm_dir) => check_package_json(identity, npm_dir),
        None => {
            let found = live_npm_version_with_runner(run)?;
            expect_version(identity, &found)
        }
    }
}

fn check_package_json(identity: &TargetIdentity, npm_dir: &Path) -> Result<()> {
    let path = npm_dir.join(PACKAGE_JSON_NAME);
    let raw = fs::read_to_string(&path).map_err(|err| {
        let kind = if err.kind() == io::ErrorKind::NotFound {
            ErrorKind::ManagerNotFound
        } else {
            ErrorKind::BadInstallation
        };
        Error::io_as(kind, err, format!("failed to read {}", path.display()))
    })?;

    let package = PackageJson::from_json_str(&raw).map_err(|_| {
        Error::new(
            ErrorKind::BadInstallation,
            format!("failed to parse package.json at {}", npm_dir.display()),
        )
    })?;

    if package.name.as_deref() != Some(identity.name.as_str()) {
        return Err(Error::new(
            ErrorKind::ManagerNotFound,
            format!("package at {} is not {}", npm_dir.display(), identity.name),
        ));
    }
    expect_version(identity, package.version.as_deref().unwrap_or_default())
}

fn expect_version(identity: &TargetIdentity, found: &str) -> Result<()> {
    if found != identity.version {
        return Err(Error::new(
            ErrorKind::WrongVersion,
            format!(
                "wrong version of {}: found {}, expected {}",
                identity.name,
                if found.is_empty() { "none" } else { found },
                identity.version
            ),
        ));
    }
    Ok(())
}
