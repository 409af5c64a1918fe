use clap::Parser;
use log::{error, info};
use std::process::ExitCode;

use labelme2coco::{process_coco_dataset, Args};

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match args.to_convert_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Starting LabelMe to COCO conversion process...");

    match process_coco_dataset(&config) {
        Ok(_) => {
            info!("COCO format JSON files created with resized images and labels.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to process dataset: {}", e);
            ExitCode::FAILURE
        }
    }
}
