use clap::Parser;
use codescope::cli::{run, Cli};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("codescope=info"));
    fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "codescope exited with an error");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
