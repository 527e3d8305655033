use anyhow::Result;
use clap::Parser;

mod args;
mod cmd;
mod io;
mod output;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = args::Cli::parse();
    output::init(cli.json);

    if let Err(err) = cmd::dispatch(cli).await {
        output::eprintln_line(&format!("error: {err:#}"));
        std::process::exit(1);
    }
    Ok(())
}
