use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "uritmpl", about = "RFC 6570 URI template expander", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Expand a template and print the result
    Expand {
        /// The URI template, e.g. "/users/{id}{?fields*}"
        template: String,

        /// Variables as a JSON object
        #[arg(long, conflicts_with = "var")]
        vars: Option<String>,

        /// A single scalar variable as NAME=VALUE (repeatable)
        #[arg(long, value_name = "NAME=VALUE")]
        var: Vec<String>,

        /// Require the expansion to be an absolute URL
        #[arg(long)]
        url: bool,
    },

    /// Extract variables from a URL and print them as JSON
    Extract {
        /// The URI template the URL was expanded from
        template: String,

        /// The concrete URL
        url: String,
    },

    /// Run uritemplate-test style JSON fixtures
    Check(CheckArgs),
}

#[derive(Args)]
pub struct CheckArgs {
    /// Fixture file, or directory to search for *.json fixtures
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Filter cases by group name or template text
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// List all discovered cases
    #[arg(short, long)]
    pub list: bool,

    /// Show each case as it completes with timing
    #[arg(short, long)]
    pub verbose: bool,

    /// Run fixture files sequentially instead of in parallel
    #[arg(short, long)]
    pub sequential: bool,
}
