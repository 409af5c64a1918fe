use clap::Parser;
use log::{error, info};
use std::path::Path;
use std::process::ExitCode;

use labelme2coco::visualize::{
    load_coco_file, load_predictions, render_annotations, render_predictions, VisualizeSummary,
};
use labelme2coco::{ConvertError, VisualizeArgs};

fn run(args: &VisualizeArgs) -> Result<VisualizeSummary, ConvertError> {
    let doc = load_coco_file(Path::new(&args.annotations))?;
    let image_dir = Path::new(&args.image_dir);
    let output_dir = Path::new(&args.output_dir);
    info!("Visualization directory: {}", output_dir.display());

    match &args.predictions {
        Some(predictions) => {
            let predictions = load_predictions(Path::new(predictions))?;
            render_predictions(&predictions, &doc, image_dir, output_dir, args.threshold)
        }
        None => render_annotations(&doc, image_dir, output_dir, args.num_images),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = VisualizeArgs::parse();

    match run(&args) {
        Ok(summary) => {
            info!(
                "Rendered {} images with {} boxes ({} skipped)",
                summary.rendered, summary.boxes_drawn, summary.skipped
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Visualization failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
