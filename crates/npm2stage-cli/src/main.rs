use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use npm2stage_core::ErrorKind;
use npm2stage_installer::{
    default_source_dir, install, status, uninstall, PatchProfile, SourceLayout, TargetLocation,
    SOURCE_ENV_VAR,
};

mod render;

use render::{current_output_style, render_error_line, render_status_line, OutputStyle, TerminalSink};

const PROGRAM_NAME: &str = "npm2stage";

const HELP_ADDENDUM: &str = "\
NPM_PATH (the path to the target npm installation) may be omitted with the
commands install, status and uninstall; the globally active npm is then used.";

const ADVICE_TO_UNINSTALL: &str = "
   The remains of a previous installation of npm-two-stage were found.
   This complicates the current installation, so it will be aborted.
   The best action to take now is to run 'npm2stage uninstall' using the
   same npm-two-stage version as when the previous installation was run.";

const INSTALL_SUCCESS: &str = "Installation of npm-two-stage was successful.";
const UNINSTALL_SUCCESS: &str = "Removal of npm-two-stage was successful.";

#[derive(Parser, Debug)]
#[command(name = PROGRAM_NAME, version)]
#[command(about = "Installs npm-two-stage over npm 9.8.1", long_about = None)]
#[command(after_help = HELP_ADDENDUM)]
struct Cli {
    /// Directory holding the npm-two-stage replacement files
    #[arg(long, global = true, env = SOURCE_ENV_VAR, value_name = "DIR")]
    source: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Installs npm-two-stage over npm at given path or live location
    #[command(visible_alias = "i")]
    Install {
        npm_path: Option<PathBuf>,
        /// No console output unless error
        #[arg(short, long)]
        silent: bool,
    },
    /// Removes all traces of npm-two-stage from npm at given path or live location
    #[command(visible_alias = "un")]
    Uninstall {
        npm_path: Option<PathBuf>,
        /// No console output unless error
        #[arg(short, long)]
        silent: bool,
    },
    /// Reports the condition of npm-two-stage artifacts at given path or live location
    Status { npm_path: Option<PathBuf> },
    /// Prints a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Commands {
    fn is_silent(&self) -> bool {
        match self {
            Self::Install { silent, .. } | Self::Uninstall { silent, .. } => *silent,
            Self::Status { .. } | Self::Completions { .. } => false,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let style = current_output_style();
    let silent = cli.command.is_silent();

    match run_cli(cli, style) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            for line in failure_lines(style, &err, !silent) {
                eprintln!("{line}");
            }
            ExitCode::from(exit_code_for(&err))
        }
    }
}

fn run_cli(cli: Cli, style: OutputStyle) -> Result<()> {
    let profile = PatchProfile::npm_two_stage()?;

    match cli.command {
        Commands::Install { npm_path, silent } => {
            let source = SourceLayout::new(resolve_source_dir(cli.source)?);
            let location = TargetLocation::from_arg(npm_path);
            let mut sink = TerminalSink::start(style, silent, "install");
            let outcome = install(&profile, &location, &source, &mut sink);
            sink.finish();
            outcome?;
            if !silent {
                println!();
                println!("{}", render_status_line(style, "ok", INSTALL_SUCCESS));
            }
        }
        Commands::Uninstall { npm_path, silent } => {
            let location = TargetLocation::from_arg(npm_path);
            let mut sink = TerminalSink::start(style, silent, "uninstall");
            let outcome = uninstall(&profile, &location, &mut sink);
            sink.finish();
            outcome?;
            if !silent {
                println!();
                println!("{}", render_status_line(style, "ok", UNINSTALL_SUCCESS));
            }
        }
        Commands::Status { npm_path } => {
            let location = TargetLocation::from_arg(npm_path);
            let mut sink = TerminalSink::start(style, false, "status");
            let outcome = status(&profile, &location, &mut sink);
            sink.finish();
            outcome?;
        }
        Commands::Completions { shell } => {
            let mut stdout = io::stdout().lock();
            write_completions(shell, &mut stdout)?;
        }
    }

    Ok(())
}

fn resolve_source_dir(flag: Option<PathBuf>) -> Result<PathBuf> {
    match flag {
        Some(dir) => Ok(dir),
        None => default_source_dir(),
    }
}

fn write_completions<W: Write>(shell: Shell, writer: &mut W) -> Result<()> {
    let mut command = Cli::command();
    let mut generated = Vec::new();
    clap_complete::generate(shell, &mut command, PROGRAM_NAME, &mut generated);
    writer
        .write_all(&generated)
        .with_context(|| "failed writing generated completion script")?;
    Ok(())
}

fn classified(err: &anyhow::Error) -> Option<&npm2stage_core::Error> {
    err.downcast_ref::<npm2stage_core::Error>()
}

fn exit_code_for(err: &anyhow::Error) -> u8 {
    let code = classified(err).map_or(1, npm2stage_core::Error::exit_code);
    u8::try_from(code).unwrap_or(1)
}

fn failure_lines(style: OutputStyle, err: &anyhow::Error, show_advice: bool) -> Vec<String> {
    let message = match classified(err) {
        Some(engine_err) => engine_err.to_string(),
        None => format!("{err:#}"),
    };
    let mut lines = vec![render_error_line(style, &message)];
    let leftovers = classified(err).is_some_and(|engine_err| {
        engine_err.is_kind(ErrorKind::LeftoversDetected)
    });
    if show_advice && leftovers {
        lines.push(ADVICE_TO_UNINSTALL.to_string());
    }
    lines
}
