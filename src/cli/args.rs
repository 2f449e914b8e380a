//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Sumi article pipeline CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Content directory path (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub content: Option<PathBuf>,

    /// Config file path (default: sumi.toml)
    #[arg(short = 'C', long, default_value = "sumi.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build the article index and sitemap
    #[command(visible_alias = "b")]
    Build {},

    /// Assign ids to articles that are missing one
    #[command(visible_alias = "f")]
    Fix {
        /// Report what would change without writing anything
        #[arg(short, long)]
        dry: bool,
    },

    /// Watch the content directory and rebuild on changes
    #[command(visible_alias = "w")]
    Watch {},

    /// Render one article to sanitized HTML
    #[command(visible_alias = "r")]
    Render {
        /// Article slug or id
        target: String,

        /// Write HTML to a file instead of stdout
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,

        /// Skip syntax highlighting of code blocks
        #[arg(short, long)]
        plain: bool,
    },

    /// Search the article index by keyword
    #[command(visible_alias = "s")]
    Search {
        /// Keywords, matched as substrings
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Summarize recent git commit activity
    #[command(visible_alias = "a")]
    Activity {},
}
