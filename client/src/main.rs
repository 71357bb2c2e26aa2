use anyhow::Result;
use clap::Parser;
use client::{
    cli::{app::App, args::Cli},
    config,
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(error) = run().await {
        error!("voicefi exited with error: {:#}", error);
        eprintln!("Error: {error:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    crates::observability::init_observability("voicefi")?;

    let dotenvy_env = config::config_loader::with_base_url_override(
        config::config_loader::load()?,
        cli.api_base_url.as_deref(),
    )?;
    info!(
        stage = %dotenvy_env.stage,
        api_base_url = %dotenvy_env.api.base_url,
        "ENV has been loaded"
    );

    let app = App::new(dotenvy_env)?;
    app.run(cli.command).await
}
