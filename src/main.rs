//! Sumi - article pipeline for a markdown blog.

mod activity;
mod article;
mod cli;
mod config;
mod core;
mod generator;
mod logger;
mod render;
mod search;
mod store;
mod utils;
mod watch;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::Config;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    logger::set_verbose(cli.verbose);

    let config = Config::load(&cli)?;

    match &cli.command {
        Commands::Build {} => cli::build::run_build(&config),
        Commands::Fix { dry } => cli::fix::run_fix(&config, *dry),
        Commands::Watch {} => watch::run_watch(&config),
        Commands::Render {
            target,
            output,
            plain,
        } => cli::render::run_render(&config, target, output.as_deref(), *plain),
        Commands::Search { query } => cli::search::run_search(&config, &query.join(" ")),
        Commands::Activity {} => activity::run_activity(&config),
    }
}
