use clap::Parser;
use log::{error, info};

use labelme_prep::{unify_labels, UnifyArgs};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = UnifyArgs::parse();

    if !args.json_dir.exists() {
        error!(
            "The specified json_dir does not exist: {}",
            args.json_dir.display()
        );
        return;
    }

    match unify_labels(&args) {
        Ok(stats) => info!(
            "Unified labels in {} of {} files ({} skipped).",
            stats.files_modified, stats.files_seen, stats.files_skipped
        ),
        Err(e) => error!("Failed to unify labels: {}", e),
    }
}
