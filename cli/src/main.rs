use clap::Parser;
use neighborly_cli::Cli;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // A missing .env is fine; the config file and real environment still apply.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = neighborly_cli::run(cli).await {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
