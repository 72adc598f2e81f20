use std::io::{self, IsTerminal};
use std::time::Duration;

use anstyle::{AnsiColor, Effects, Style};
use indicatif::{ProgressBar, ProgressStyle};
use npm2stage_installer::ProgressSink;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum OutputStyle {
    Plain,
    Rich,
}

pub(crate) fn current_output_style() -> OutputStyle {
    resolve_output_style(io::stdout().is_terminal(), io::stderr().is_terminal())
}

pub(crate) fn resolve_output_style(stdout_is_tty: bool, _stderr_is_tty: bool) -> OutputStyle {
    if stdout_is_tty {
        OutputStyle::Rich
    } else {
        OutputStyle::Plain
    }
}

/// Streams engine events to the terminal while an operation runs.
///
/// In rich mode a spinner tracks the operation and lines are printed above it.
pub(crate) struct TerminalSink {
    style: OutputStyle,
    silent: bool,
    spinner: Option<ProgressBar>,
}

impl TerminalSink {
    pub(crate) fn start(style: OutputStyle, silent: bool, label: &str) -> Self {
        let spinner = if style == OutputStyle::Rich && !silent {
            let spinner = ProgressBar::new_spinner();
            if let Ok(template) = ProgressStyle::with_template("{spinner:.cyan.bold} {msg}") {
                spinner.set_style(template.tick_chars(progress_tick_chars(label)));
            }
            spinner.set_message(label.to_string());
            spinner.enable_steady_tick(Duration::from_millis(80));
            Some(spinner)
        } else {
            None
        };

        Self {
            style,
            silent,
            spinner,
        }
    }

    pub(crate) fn finish(mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn emit(&self, line: String) {
        if self.silent {
            return;
        }
        match &self.spinner {
            Some(spinner) => spinner.println(line),
            None => println!("{line}"),
        }
    }
}

impl ProgressSink for TerminalSink {
    fn progress(&mut self, message: &str) {
        self.emit(render_progress_line(self.style, message));
    }

    fn diagnostic(&mut self, message: &str) {
        self.emit(render_diagnostic_line(self.style, message));
    }
}

pub(crate) fn render_status_line(style: OutputStyle, status: &str, message: &str) -> String {
    match style {
        OutputStyle::Plain => message.to_string(),
        OutputStyle::Rich => match status_badge(status) {
            Some(badge) => format!("{badge} {message}"),
            None => message.to_string(),
        },
    }
}

pub(crate) fn render_progress_line(style: OutputStyle, message: &str) -> String {
    // Step headings end with a colon; the items under them are pre-indented.
    if style == OutputStyle::Rich && message.ends_with(':') {
        return format!("   {}", colorize(section_style(), message));
    }
    format!("   {message}")
}

pub(crate) fn render_diagnostic_line(style: OutputStyle, message: &str) -> String {
    format!("   {}", render_status_line(style, "warn", message))
}

pub(crate) fn render_error_line(style: OutputStyle, message: &str) -> String {
    match style {
        OutputStyle::Plain => format!("ERROR: {message}"),
        OutputStyle::Rich => format!("{} {message}", colorize(error_style(), "ERROR:")),
    }
}

fn status_badge(status: &str) -> Option<&'static str> {
    match status {
        "ok" => Some("[OK]"),
        "warn" => Some("[WARN]"),
        "err" => Some("[ERR]"),
        "step" => Some("[..]"),
        _ => None,
    }
}

fn progress_tick_chars(label: &str) -> &'static str {
    match label {
        "install" => ".oO@* ",
        "uninstall" => "\\|/- ",
        _ => "|/-\\ ",
    }
}

fn section_style() -> Style {
    Style::new()
        .fg_color(Some(AnsiColor::BrightBlue.into()))
        .effects(Effects::BOLD)
}

fn error_style() -> Style {
    Style::new()
        .fg_color(Some(AnsiColor::BrightRed.into()))
        .effects(Effects::BOLD)
}

fn colorize(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}
