//! Command line and environment configuration for the simulator.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::Parser;

use crate::verdict::MatchMode;

#[derive(Debug, Parser)]
#[command(name = "binwise-sim")]
#[command(about = "Replay one random image per dataset category against a Binwise endpoint")]
pub(crate) struct Args {
    /// Endpoint the images are uploaded to.
    #[arg(long, env = "CLOUD_FUNCTION_URL")]
    pub(crate) url: Option<String>,

    /// Dataset root containing one subdirectory per category.
    #[arg(long, env = "DATASET_PATH")]
    pub(crate) dataset: Option<PathBuf>,

    /// Pause after every upload cycle.
    #[arg(long, default_value_t = 2)]
    pub(crate) delay_secs: u64,

    /// How a prediction is compared with the category name.
    #[arg(long, value_enum, default_value = "exact")]
    pub(crate) match_mode: MatchMode,

    /// Seed for the per-category image choice.
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub(crate) log: String,
}

impl Args {
    /// Endpoint and dataset root, both of which must be configured.
    pub(crate) fn target(&self) -> Result<(String, PathBuf)> {
        match (&self.url, &self.dataset) {
            (Some(url), Some(dataset)) if !url.trim().is_empty() => {
                Ok((url.clone(), dataset.clone()))
            }
            _ => bail!("Please set CLOUD_FUNCTION_URL and DATASET_PATH (or --url and --dataset)"),
        }
    }

    pub(crate) fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}
