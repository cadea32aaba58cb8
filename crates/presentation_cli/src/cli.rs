//! Command-line arguments

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use domain::BriefingProfile;

/// Weekly AI & data engineering brief, generated and mailed in one run
#[derive(Debug, Parser)]
#[command(name = "weekly-brief")]
#[command(author, version, about = "Generate, render and email the weekly brief", long_about = None)]
pub struct Cli {
    /// Verbosity level, overrides the configured log filter
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (defaults to ./config.toml when present)
    #[arg(short, long, global = true, env = "WEEKLY_BRIEF_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate the briefing, render it and send it
    Run {
        /// Briefing to produce: weekly or coaching
        #[arg(short, long, default_value = "weekly")]
        profile: BriefingProfile,

        /// Markdown or text file with the reader's goals (coaching only)
        #[arg(short, long, env = "COACHING_GOALS_FILE")]
        goals: Option<PathBuf>,

        /// Run as if today were this date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Render a markdown file to the email HTML without sending
    ///
    /// Example: weekly-brief render brief.md --output brief.html
    Render {
        /// Markdown input
        input: PathBuf,

        /// Write HTML here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(short, long, default_value = "weekly")]
        profile: BriefingProfile,

        /// Date used for the subject line (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Validate configuration and credentials without any network call
    CheckConfig {
        #[arg(short, long, default_value = "weekly")]
        profile: BriefingProfile,
    },
}

/// Log filter for a `-v` count, `None` keeps the configured filter
pub const fn log_filter_from_verbosity(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}
