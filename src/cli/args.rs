// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::EffectMode;

/// CLI arguments parser.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = r#"Render Options:
    --source, -s <SOURCE>        Input frames (image, directory, or glob)
    --results, -r <FILE>         Recorded results, one JSON object per line
    --effect <EFFECT>            Segmentation effect: mask, cutout, both [default: mask]
    --width <W> --height <H>     Logical surface size [default: frame size]
    --pixel-ratio <R>            Device pixel ratio [default: 1]
    --face-topology <FILE>       JSON array of [a, b] face tessellation pairs [default: Delaunay mesh]
    --segmentation <BOOL>        Load recorded segmentation masks [default: true]
    --selfie <BOOL>              Mirror frames before rendering [default: true]
    --save                       Save rendered frames to runs/overlay/render
    --show                       Display frames in a window
    --verbose <BOOL>             Show verbose output [default: true]

Examples:
    holistic-overlay render --source frames/ --results results.jsonl --save
    holistic-overlay render -s "frames/*.png" -r results.jsonl --effect cutout --show
    holistic-overlay render -s frame.jpg -r results.jsonl --pixel-ratio 2 --face-topology tess.json"#)]
pub struct Cli {
    #[command(subcommand)]
    /// Subcommand to execute.
    pub command: Commands,
}

/// Commands for the CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render landmark overlays for recorded perception results
    Render(RenderArgs),
}

/// Arguments for the render command.
#[derive(Args, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct RenderArgs {
    /// Input frames (image, directory, or glob)
    #[arg(short, long)]
    pub source: String,

    /// Recorded results, one JSON object per line
    #[arg(short, long)]
    pub results: PathBuf,

    /// Segmentation effect: mask, cutout, or both
    #[arg(long, default_value_t = EffectMode::Mask)]
    pub effect: EffectMode,

    /// Logical surface width (defaults to the frame width)
    #[arg(long)]
    pub width: Option<u32>,

    /// Logical surface height (defaults to the frame height)
    #[arg(long)]
    pub height: Option<u32>,

    /// Device pixel ratio of the surface
    #[arg(long, default_value_t = 1.0)]
    pub pixel_ratio: f32,

    /// JSON array of [a, b] face tessellation pairs, replacing the derived mesh
    #[arg(long)]
    pub face_topology: Option<PathBuf>,

    /// Load recorded segmentation masks
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub segmentation: bool,

    /// Mirror frames before rendering
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub selfie: bool,

    /// Save rendered frames to runs/overlay/render
    #[arg(long, default_value_t = false)]
    pub save: bool,

    /// Display frames in a window
    #[arg(long, default_value_t = false)]
    pub show: bool,

    /// Show verbose output
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_render_args_defaults() {
        let args = Cli::parse_from(["app", "render", "--source", "frames/", "--results", "r.jsonl"]);
        let Commands::Render(render) = args.command;
        assert_eq!(render.source, "frames/");
        assert_eq!(render.results, PathBuf::from("r.jsonl"));
        assert_eq!(render.effect, EffectMode::Mask);
        assert!(render.width.is_none() && render.height.is_none());
        assert!((render.pixel_ratio - 1.0).abs() < f32::EPSILON);
        assert!(render.segmentation && render.selfie && render.verbose);
        assert!(!render.save && !render.show);
    }

    #[test]
    fn test_render_args_custom() {
        let args = Cli::parse_from([
            "app",
            "render",
            "-s",
            "a.png",
            "-r",
            "r.jsonl",
            "--effect",
            "cutout",
            "--width",
            "640",
            "--height",
            "480",
            "--pixel-ratio",
            "2",
            "--selfie",
            "false",
            "--verbose",
            "false",
            "--save",
        ]);
        let Commands::Render(render) = args.command;
        assert_eq!(render.effect, EffectMode::Cutout);
        assert_eq!((render.width, render.height), (Some(640), Some(480)));
        assert!((render.pixel_ratio - 2.0).abs() < f32::EPSILON);
        assert!(!render.selfie);
        assert!(!render.verbose);
        assert!(render.save);
    }

    #[test]
    fn test_render_args_reject_unknown_effect() {
        let parsed = Cli::try_parse_from([
            "app", "render", "-s", "a.png", "-r", "r.jsonl", "--effect", "sparkle",
        ]);
        assert!(parsed.is_err());
    }
}
