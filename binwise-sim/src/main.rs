//! Simulated capture device: uploads one random image per dataset category to a
//! Binwise endpoint and reports whether the prediction matched the category.

mod config;
mod dataset;
mod driver;
mod upload;
mod verdict;

use anyhow::Result;
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use reqwest::Client;
use tracing_subscriber::EnvFilter;

use crate::config::Args;
use crate::driver::Simulator;
use crate::upload::HttpUploader;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&args.log))
        .with_target(false)
        .init();

    let (url, dataset) = args.target()?;

    let client = Client::builder().user_agent("binwise-sim/0.1").build()?;
    let simulator = Simulator::new(
        HttpUploader::new(client, url),
        dataset,
        args.delay(),
        args.match_mode,
    );

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    simulator.run(&mut rng).await
}
