//! Command-line interface definition for CISEval
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for authentication, browsing, and evaluation.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CISEval - command-line client for the CIS evaluation platform
///
/// Browse classes, evaluate students against the seven-criterion rubric,
/// and review evaluations and statistics.
#[derive(Parser, Debug, Clone)]
#[command(name = "ciseval")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the API base URL from config
    #[arg(long, env = "CISEVAL_API_BASE")]
    pub api_base: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for CISEval
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Log in and persist the session
    Login {
        /// Username; prompted interactively when omitted
        #[arg(short, long)]
        username: Option<String>,
    },

    /// Log out and clear the persisted session
    Logout,

    /// Show the current user's profile
    Profile,

    /// List available classes
    Classes,

    /// List the students of a class
    Students {
        /// Class identifier
        class_id: String,
    },

    /// Evaluate a student against the rubric (interactive)
    Evaluate {
        /// Class identifier (also used as the class year of the draft)
        class_id: String,

        /// Student identifier
        student_id: String,

        /// Student name (Kazakh variant)
        #[arg(long)]
        student_name: String,

        /// Student name (Russian variant); defaults to the Kazakh variant
        #[arg(long)]
        student_name_ru: Option<String>,
    },

    /// List your submitted evaluations
    Evaluations,

    /// Show evaluation statistics
    Stats {
        /// Show per-class statistics instead of the summary
        #[arg(long)]
        classes: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
