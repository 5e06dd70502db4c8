//! Command-line interface for NaukriMili.

mod commands;

use clap::{Parser, Subcommand};

/// NaukriMili - job aggregation and search daemon
#[derive(Parser)]
#[command(name = "naukrimili")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the API server as a background daemon
    #[command(alias = "serve", alias = "-d")]
    Daemon,

    /// Search jobs from the command line
    #[command(alias = "s")]
    Search {
        /// Search query
        query: Vec<String>,

        /// Filter by location
        #[arg(long)]
        location: Option<String>,

        /// Two letter country code
        #[arg(long)]
        country: Option<String>,

        /// Comma separated skills, e.g. rust,sql
        #[arg(long)]
        skills: Option<String>,

        /// Remote positions only
        #[arg(long)]
        remote: bool,

        /// Maximum number of results
        #[arg(long, default_value = "20")]
        limit: usize,

        /// Skip the external provider
        #[arg(long)]
        local_only: bool,
    },

    /// List locally stored active jobs
    #[command(alias = "ls", alias = "l")]
    List {
        /// Page number
        #[arg(default_value = "1")]
        page: u64,
    },

    /// Import jobs from a JSON file into the local store
    Import {
        /// Path to a JSON array of job objects
        path: String,

        /// Parse and report without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;
