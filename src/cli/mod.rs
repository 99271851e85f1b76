// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Command-line interface for rendering overlays.
//!
//! This module contains argument parsing, the coloured logging macros, and the
//! `render` command implementation.

/// CLI arguments.
pub mod args;

/// Coloured logging macros.
pub mod logging;

/// Render command.
pub mod render;
