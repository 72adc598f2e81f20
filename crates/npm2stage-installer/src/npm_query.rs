use anyhow::{anyhow, Context};
use npm2stage_core::{Error, ErrorKind, Result, TARGET_PACKAGE_NAME};
use std::path::PathBuf;
use std::process::Command;

use crate::layout::NpmLayout;
use crate::types::TargetLocation;

pub fn npm_program() -> &'static str {
    if cfg!(windows) {
        "npm.cmd"
    } else {
        "npm"
    }
}

pub(crate) fn build_npm_root_command() -> Command {
    let mut command = Command::new(npm_program());
    command.arg("root").arg("-g");
    command
}

pub(crate) fn build_npm_version_command() -> Command {
    let mut command = Command::new(npm_program());
    command.arg("--version");
    command
}

/// Runs `command` and returns its standard output.
pub fn run_command_stdout(command: &mut Command) -> anyhow::Result<String> {
    let output = command
        .output()
        .with_context(|| format!("{command:?}: command failed to start"))?;
    if output.status.success() {
        return String::from_utf8(output.stdout)
            .with_context(|| format!("{command:?}: output is not valid UTF-8"));
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    Err(anyhow!(
        "{command:?}: status={} stdout='{}' stderr='{}'",
        output.status,
        stdout.trim(),
        stderr.trim()
    ))
}

pub(crate) fn live_npm_dir_with_runner<RunCommand>(run: &mut RunCommand) -> Result<PathBuf>
where
    RunCommand: FnMut(&mut Command) -> anyhow::Result<String>,
{
    let stdout = run(&mut build_npm_root_command()).map_err(|err| {
        Error::new(
            ErrorKind::ManagerNotFound,
            format!("could not get information from `npm root -g`: {err:#}"),
        )
    })?;
    let root = stdout.trim();
    if root.is_empty() {
        return Err(Error::new(
            ErrorKind::ManagerNotFound,
            "`npm root -g` reported no global root",
        ));
    }
    Ok(PathBuf::from(root).join(TARGET_PACKAGE_NAME))
}

pub(crate) fn live_npm_version_with_runner<RunCommand>(run: &mut RunCommand) -> Result<String>
where
    RunCommand: FnMut(&mut Command) -> anyhow::Result<String>,
{
    let stdout = run(&mut build_npm_version_command()).map_err(|err| {
        Error::new(
            ErrorKind::ManagerNotFound,
            format!("could not get information from `npm --version`: {err:#}"),
        )
    })?;
    Ok(stdout.trim().to_string())
}

pub fn resolve_target_with_runner<RunCommand>(
    location: &TargetLocation,
    run: &mut RunCommand,
) -> Result<NpmLayout>
where
    RunCommand: FnMut(&mut Command) -> anyhow::Result<String>,
{
    match location {
        TargetLocation::Live => Ok(NpmLayout::new(live_npm_dir_with_runner(run)?)),
        TargetLocation::Path(path) => {
            if path.as_os_str().is_empty() {
                return Err(Error::invalid_argument("npm path must not be empty"));
            }
            let absolute = std::path::absolute(path).map_err(|err| {
                Error::io_as(
                    ErrorKind::InvalidArgument,
                    err,
                    format!("cannot resolve npm path {}", path.display()),
                )
            })?;
            Ok(NpmLayout::new(absolute))
        }
    }
}
