use clap::Parser;
use log::{error, info};

use labelme_prep::{process_yolo_dataset, setup_yolo_output_directories, YoloArgs};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = YoloArgs::parse();

    for dir in &args.json_dirs {
        if !dir.exists() {
            error!("The specified json_dir does not exist: {}", dir.display());
            return;
        }
    }

    info!("Starting the LabelMe to YOLO conversion process...");

    match setup_yolo_output_directories(&args.output_dir) {
        Ok(output_dirs) => {
            if let Err(e) = process_yolo_dataset(&args, &output_dirs) {
                error!("Failed to process dataset: {}", e);
            }
        }
        Err(e) => error!("Failed to set up output directories: {}", e),
    }
}
