use clap::Parser;
use pr_reviewer_lib::config::Config;
use pr_reviewer_lib::{db, services};
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    // Missing .env is fine; real environment variables still apply
    let _ = dotenvy::dotenv();

    let config = Config::parse();

    // RUST_LOG wins over LOG_LEVEL when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    fmt().with_env_filter(filter).init();

    if let Err(e) = config.validate() {
        log::error!("Invalid configuration: {}", e);
        return ExitCode::FAILURE;
    }

    let pool = match db::initialize_with(&config.database_path, &config.pool_settings()).await {
        Ok(pool) => pool,
        Err(e) => {
            log::error!(
                "Failed to open database at {}: {}",
                config.database_path.display(),
                e
            );
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = services::server::run_server(&config, pool.clone()).await {
        log::error!("{}", e);
        pool.close().await;
        return ExitCode::FAILURE;
    }

    pool.close().await;
    ExitCode::SUCCESS
}
