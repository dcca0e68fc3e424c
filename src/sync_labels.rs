use clap::Parser;
use log::{error, info};

use labelme_prep::{sync_labels_and_images, SyncArgs};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = SyncArgs::parse();

    for (name, dir) in [("images_dir", &args.images_dir), ("labels_dir", &args.labels_dir)] {
        if !dir.exists() {
            error!("The specified {} does not exist: {}", name, dir.display());
            return;
        }
    }

    match sync_labels_and_images(&args) {
        Ok(report) if report.dry_run => info!(
            "Dry run complete: {} of {} label file(s) are orphans.",
            report.orphan_labels.len(),
            report.labels_seen
        ),
        Ok(report) => info!(
            "Sync complete: removed {} of {} label file(s).",
            report.removed(),
            report.labels_seen
        ),
        Err(e) => error!("Failed to sync labels and images: {}", e),
    }
}
