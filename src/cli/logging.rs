// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Coloured terminal output for the CLI.
//!
//! The library never prints. Only the `render` command logs, through the macros
//! below, and `verbose!`/`section!` are silenced by `--verbose false`.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;

/// Global verbosity flag.
static VERBOSE: AtomicBool = AtomicBool::new(true);

/// Set the global verbosity flag.
pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::Relaxed);
}

/// Check if verbose output is enabled.
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

/// Message kind, selecting prefix, colour, and output stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Plain stdout line.
    Info,
    /// Yellow prefix on stderr.
    Warn,
    /// Red prefix on stderr.
    Error,
    /// Green check on stdout.
    Success,
    /// Stdout line shown only when verbose.
    Verbose,
    /// Bold cyan header shown only when verbose.
    Section,
}

impl Level {
    const fn to_stderr(self) -> bool {
        matches!(self, Self::Warn | Self::Error)
    }

    const fn gated(self) -> bool {
        matches!(self, Self::Verbose | Self::Section)
    }
}

/// Format one log line for `level`.
#[must_use]
pub fn render_line(level: Level, args: fmt::Arguments<'_>) -> String {
    match level {
        Level::Info | Level::Verbose => args.to_string(),
        Level::Warn => format!("{} {args}", "WARNING ⚠️".yellow().bold()),
        Level::Error => format!("{} {args}", "Error:".red().bold()),
        Level::Success => format!("{} {args}", "✅".green()),
        Level::Section => format!("\n{}", args.to_string().cyan().bold()),
    }
}

/// Print one log line. Used by the logging macros.
pub fn emit(level: Level, args: fmt::Arguments<'_>) {
    if level.gated() && !is_verbose() {
        return;
    }
    let line = render_line(level, args);
    if level.to_stderr() {
        eprintln!("{line}");
    } else {
        println!("{line}");
    }
}

/// Macro for standard info messages.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::cli::logging::emit($crate::cli::logging::Level::Info, format_args!($($arg)*))
    };
}

/// Macro for warning messages.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::cli::logging::emit($crate::cli::logging::Level::Warn, format_args!($($arg)*))
    };
}

/// Macro for error messages.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::cli::logging::emit($crate::cli::logging::Level::Error, format_args!($($arg)*))
    };
}

/// Macro for success messages.
#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        $crate::cli::logging::emit($crate::cli::logging::Level::Success, format_args!($($arg)*))
    };
}

/// Macro for verbose messages.
#[macro_export]
macro_rules! verbose {
    ($($arg:tt)*) => {
        $crate::cli::logging::emit($crate::cli::logging::Level::Verbose, format_args!($($arg)*))
    };
}

/// Macro for section headers.
#[macro_export]
macro_rules! section {
    ($($arg:tt)*) => {
        $crate::cli::logging::emit($crate::cli::logging::Level::Section, format_args!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_toggle() {
        set_verbose(true);
        assert!(is_verbose());

        set_verbose(false);
        assert!(!is_verbose());

        set_verbose(true);
        assert!(is_verbose());
    }

    #[test]
    fn test_render_line() {
        colored::control::set_override(false);
        assert_eq!(render_line(Level::Info, format_args!("a {}", 1)), "a 1");
        assert_eq!(render_line(Level::Error, format_args!("boom")), "Error: boom");
        assert_eq!(render_line(Level::Warn, format_args!("x")), "WARNING ⚠️ x");
        assert_eq!(render_line(Level::Section, format_args!("Run")), "\nRun");
        colored::control::unset_override();
    }

    #[test]
    fn test_levels() {
        assert!(Level::Warn.to_stderr() && Level::Error.to_stderr());
        assert!(!Level::Info.to_stderr());
        assert!(Level::Verbose.gated() && Level::Section.gated());
        assert!(!Level::Success.gated());
    }
}
