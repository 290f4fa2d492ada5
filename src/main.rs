// src/main.rs

mod cli;
mod commands;
mod config;
mod error;
mod hook;
mod ip;
mod models;
mod render;
mod store;

use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use std::process;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version land here too
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    if let Err(e) = init_tracing(cli.debug) {
        eprintln!("{}", e);
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(debug: bool) -> std::result::Result<(), String> {
    let level = if debug { "debug" } else { "error" };
    let filter = tracing_subscriber::EnvFilter::try_from_env("OPL_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| format!("failed to initialize tracing subscriber: {error}"))
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.folder)?;
    tracing::debug!(log_root = %config.log_root.display(), "configuration loaded");

    match cli.command {
        Commands::Cmd { no_ip, run, command } => commands::handle_cmd(&config, command, no_ip, run),
        Commands::Act { activity, ip, no_ip } => commands::handle_act(&config, activity, ip, no_ip),
        Commands::Show {
            location,
            format,
            schema,
            sorted,
        } => commands::handle_show(&config, location, format, schema, sorted),
        Commands::Hook { action } => commands::handle_hook(action),
    }
}
