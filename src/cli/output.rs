//! Colored status output on stderr.
//!
//! Listings and JSON reports go to stdout; everything printed here goes to
//! stderr so it can be piped without noise.

use std::io::{IsTerminal, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Verbosity-aware status printer.
#[derive(Debug, Clone, Copy)]
pub struct OutputManager {
    verbose: bool,
    quiet: bool,
    color: bool,
}

impl OutputManager {
    /// Create a manager; `quiet` wins over `verbose`.
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose: verbose && !quiet,
            quiet,
            color: std::io::stderr().is_terminal(),
        }
    }

    /// Only shown with `--verbose`.
    pub fn verbose(&self, message: &str) {
        if self.verbose {
            self.write(None, false, message);
        }
    }

    pub fn progress(&self, message: &str) {
        if !self.quiet {
            self.write(Some(Color::Cyan), false, message);
        }
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            self.write(Some(Color::Green), true, message);
        }
    }

    /// Warnings are shown even in quiet mode.
    pub fn warn(&self, message: &str) {
        self.write(Some(Color::Yellow), true, &format!("warning: {message}"));
    }

    pub fn section(&self, title: &str) {
        if !self.quiet {
            self.write(Some(Color::Cyan), true, &format!("\n{title}"));
        }
    }

    pub fn indent(&self, message: &str) {
        if !self.quiet {
            self.write(None, false, &format!("  {message}"));
        }
    }

    fn write(&self, color: Option<Color>, bold: bool, message: &str) {
        let choice = if self.color {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        let mut stream = StandardStream::stderr(choice);
        // A closed stderr must not abort the run.
        let _ = stream.set_color(ColorSpec::new().set_fg(color).set_bold(bold));
        let _ = writeln!(stream, "{message}");
        let _ = stream.reset();
    }
}
