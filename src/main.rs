use clap::Parser;

use finplan::api::{Cli, Command, run_cli, run_http_server};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    // Logs go to stderr so calculator output on stdout stays valid JSON.
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Command::Serve { port, store } = cli.command {
        if let Err(e) = run_http_server(port, store).await {
            tracing::error!("Server error: {e}");
            std::process::exit(1);
        }
        return;
    }

    match run_cli(cli.command) {
        Some(Ok(json)) => println!("{json}"),
        Some(Err(e)) => {
            tracing::error!("Failed to render result: {e}");
            std::process::exit(1);
        }
        None => {}
    }
}
