//! Clinex Server CLI
//!
//! Starts the extraction HTTP server.

use anyhow::Context;
use clinex_server::{
    config::{load_api_key, ServerConfig},
    init_tracing, start_server,
};
use std::env;
use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let args: Vec<String> = env::args().collect();

    let mut config = if args.len() > 2 && args[1] == "--config" {
        let config_path = &args[2];
        ServerConfig::from_file(config_path)
            .with_context(|| format!("loading config from {}", config_path))?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        return Ok(());
    } else {
        ServerConfig::default()
    };

    init_tracing();

    config.apply_env_overrides(|key| env::var(key).ok())?;
    let api_key = load_api_key(|key| env::var(key).ok())?;

    start_server(config, api_key).await?;

    Ok(())
}

fn print_help() {
    println!("Clinex Server - Clinical note extraction over HTTP");
    println!();
    println!("USAGE:");
    println!("    clinex-server [--config <path-to-config.toml>]");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("ENVIRONMENT:");
    println!("    GROQ_API_KEY       API key for the completion provider (required)");
    println!("    CLINEX_BIND_ADDR   Override bind address, e.g. 0.0.0.0:8000");
    println!("    RUST_LOG           Log filter (default: clinex_server=info,...)");
    println!();
    println!("A .env file in the working directory is loaded if present.");
}
