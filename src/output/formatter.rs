//! Message formatting and display.
//!
//! Status lines go to stdout; warnings and errors go to stderr so they stay
//! visible when stdout is piped (for example `outline --json`).
//!
//! # Examples
//!
//! ```
//! use pdfsplice::output::formatter::OutputFormatter;
//!
//! let formatter = OutputFormatter::new(false, false);
//! formatter.info("Splitting report.pdf...");
//! formatter.success("Wrote 3 file(s)");
//! ```

use std::io;

use crate::config::{MergeConfig, SplitConfig};

/// Level of output message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    /// Informational message.
    Info,
    /// Success message.
    Success,
    /// Warning message.
    Warning,
    /// Error message.
    Error,
    /// Debug/verbose message.
    Debug,
}

impl MessageLevel {
    fn prefix(self) -> &'static str {
        match self {
            Self::Info => "",
            Self::Success => "✓ ",
            Self::Warning => "⚠ ",
            Self::Error => "✗ ",
            Self::Debug => "→ ",
        }
    }

    fn color(self) -> &'static str {
        match self {
            Self::Info => "",
            Self::Success => "\x1b[32m", // Green
            Self::Warning => "\x1b[33m", // Yellow
            Self::Error => "\x1b[31m",   // Red
            Self::Debug => "\x1b[36m",   // Cyan
        }
    }

    fn to_stderr(self) -> bool {
        matches!(self, Self::Warning | Self::Error)
    }
}

/// Output formatter with configurable verbosity.
#[derive(Debug, Clone)]
pub struct OutputFormatter {
    /// Whether to suppress non-error output.
    quiet: bool,
    /// Whether to show verbose output.
    verbose: bool,
    /// Whether to use colored output.
    colored: bool,
}

impl OutputFormatter {
    /// Create a new output formatter.
    pub fn new(quiet: bool, verbose: bool) -> Self {
        Self {
            quiet,
            verbose,
            colored: Self::should_use_color(),
        }
    }

    /// Create a formatter for a split run.
    pub fn for_split(config: &SplitConfig) -> Self {
        Self::new(config.quiet, config.verbose)
    }

    /// Create a formatter for a merge run.
    pub fn for_merge(config: &MergeConfig) -> Self {
        Self::new(config.quiet, config.verbose)
    }

    /// Create a quiet formatter (only warnings and errors).
    pub fn quiet() -> Self {
        Self::new(true, false)
    }

    /// Returns true if stdout is a TTY and TERM is set.
    fn should_use_color() -> bool {
        use std::io::IsTerminal;
        io::stdout().is_terminal() && std::env::var("TERM").is_ok()
    }

    /// Print an informational message. Suppressed in quiet mode.
    pub fn info(&self, message: &str) {
        if !self.quiet {
            self.print_message(MessageLevel::Info, message);
        }
    }

    /// Print a success message. Suppressed in quiet mode.
    pub fn success(&self, message: &str) {
        if !self.quiet {
            self.print_message(MessageLevel::Success, message);
        }
    }

    /// Print a warning message, even in quiet mode.
    pub fn warning(&self, message: &str) {
        self.print_message(MessageLevel::Warning, message);
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        self.print_message(MessageLevel::Error, message);
    }

    /// Print a message only in verbose mode.
    pub fn debug(&self, message: &str) {
        if self.verbose {
            self.print_message(MessageLevel::Debug, message);
        }
    }

    fn print_message(&self, level: MessageLevel, message: &str) {
        let line = self.render(level, message);
        if level.to_stderr() {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }

    fn render(&self, level: MessageLevel, message: &str) -> String {
        let prefix = level.prefix();
        let color = level.color();
        if self.colored && !color.is_empty() {
            format!("{color}{prefix}{message}\x1b[0m")
        } else {
            format!("{prefix}{message}")
        }
    }

    /// Print a labelled value. Only shown in verbose mode.
    pub fn detail(&self, label: &str, value: &str) {
        if self.verbose {
            println!("  {label}: {value}");
        }
    }

    /// Print a numbered list item. Suppressed in quiet mode.
    pub fn list_item(&self, index: usize, message: &str) {
        if !self.quiet {
            println!("  {index}. {message}");
        }
    }

    /// Check if non-error output should be shown.
    pub fn should_print(&self) -> bool {
        !self.quiet
    }

    /// Check if verbose output should be shown.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Check if quiet mode is enabled.
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new(false, false)
    }
}
