#![cfg(not(tarpaulin_include))]

use sales_dashboard::app;
use sales_dashboard::config::{Config, DEFAULT_CONFIG_FILE};
use std::env;

/// Main entry point for the dashboard web server
///
/// Reads the configuration and serves the dashboard until the process is stopped.
///
/// # Arguments
/// * Optional path to a JSON config file, `dashboard.json` by default. A
///   missing file means built-in defaults.
///
/// # Returns
/// * `Result<(), Box<dyn std::error::Error>>` - Success or error object
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let config_path = args.get(1).map(String::as_str).unwrap_or(DEFAULT_CONFIG_FILE);
    let config = Config::load(config_path)?;

    println!(
        "Starting dashboard for {} on http://{}",
        config.primary_path.display(),
        config.bind_addr
    );
    app::run(config).await
}
