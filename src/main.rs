use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use rust_bankdesk::cli::{self, Cli, Context};
use rust_bankdesk::config::BankConfig;
use rust_bankdesk::interactive;

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Peek at the log level before the config load so its own messages show
    let level = std::fs::read_to_string(&cli.config)
        .ok()
        .and_then(|s| toml::from_str::<BankConfig>(&s).ok())
        .map(|c| c.logging.level)
        .unwrap_or_else(|| "info".to_string());
    init_tracing(&level);

    let mut config = BankConfig::load_or_default(&cli.config);
    if let Some(url) = cli.backend_url {
        config.backend.base_url = url;
    }

    let ctx = match Context::build(config) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Startup failed: {}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(command) => cli::dispatch(&ctx, command).await,
        None => interactive::run(&ctx).await,
    };

    if let Err(e) = result {
        error!("{}", e);
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }
}
