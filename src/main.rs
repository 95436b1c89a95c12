mod app;
mod args;
mod detector;
mod fingers;
mod link;
mod model_download;
mod nod;
mod overlay;
mod pipeline;
mod protocol;
mod types;
mod window;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = args::Args::parse();
    app::run(args)
}
