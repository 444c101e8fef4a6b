//! Veer — a remote-controllable browser session behind an HTTP API.

use {
    clap::Parser,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use veer_browser::{LaunchOptions, SessionController, cdp::CdpEngine};

#[derive(Parser)]
#[command(name = "veer", about = "Veer — remote browser sessions over HTTP")]
struct Cli {
    /// Address to bind to.
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// Port to listen on.
    #[arg(long, env = "API_PORT", default_value_t = 3000)]
    port: u16,

    /// Run the browser with a visible window instead of headless.
    #[arg(long, default_value_t = false)]
    headed: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, default_value_t = false)]
    json_logs: bool,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_telemetry(&cli);

    let options = LaunchOptions {
        headless: !cli.headed,
        ..LaunchOptions::default()
    };
    let controller = SessionController::new(Box::new(CdpEngine::new()), options);

    veer_gateway::server::start(&cli.bind, cli.port, controller).await
}
