use clap::Parser;
use log::{error, info};
use std::path::Path;
use std::process::ExitCode;

use labelme2coco::{resize::resize_directory, ResizeArgs};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = ResizeArgs::parse();

    if args.width == 0 || args.height == 0 {
        error!("Target size must be non-zero, got {}x{}", args.width, args.height);
        return ExitCode::FAILURE;
    }

    match resize_directory(
        Path::new(&args.input_dir),
        Path::new(&args.output_dir),
        args.width,
        args.height,
    ) {
        Ok(summary) => {
            info!(
                "Resized {} images ({} failed)",
                summary.resized, summary.failed
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to resize images: {}", e);
            ExitCode::FAILURE
        }
    }
}
