// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::process;

use clap::Parser;

use holistic_overlay::cli::args::{Cli, Commands};
use holistic_overlay::cli::logging::set_verbose;
use holistic_overlay::cli::render::run_render;
use holistic_overlay::{error, success};

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => {
            set_verbose(args.verbose);
            match run_render(&args) {
                Ok(summary) => {
                    success!(
                        "Rendered {}/{} frames, saved {}",
                        summary.rendered,
                        summary.frames,
                        summary.saved
                    );
                }
                Err(e) => {
                    error!("{e}");
                    process::exit(1);
                }
            }
        }
    }
}
