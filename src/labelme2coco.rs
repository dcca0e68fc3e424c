use clap::Parser;
use log::{error, info};

use labelme_prep::{process_coco_dataset, setup_coco_output_directories, CocoArgs};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = CocoArgs::parse();

    for dir in &args.json_dirs {
        if !dir.exists() {
            error!("The specified json_dir does not exist: {}", dir.display());
            return;
        }
    }

    info!("Starting the LabelMe to COCO conversion process...");

    match setup_coco_output_directories(&args.output_dir) {
        Ok(output_dirs) => {
            if let Err(e) = process_coco_dataset(&args, &output_dirs) {
                error!("Failed to process dataset: {}", e);
            }
        }
        Err(e) => error!("Failed to set up output directories: {}", e),
    }
}
