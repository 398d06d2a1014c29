use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "pandalive",
    author,
    version,
    about = "Resolve PandaLive rooms into playable HLS formats",
    long_about = None
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the configuration file
    #[arg(long, global = true, env = "PANDALIVE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Proxy URL for all requests
    #[arg(long, global = true, env = "PANDALIVE_PROXY")]
    pub proxy: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a single room URL
    Extract {
        /// Room URL, e.g. https://www.pandalive.co.kr/live/play/<id>
        url: String,

        /// Output format (defaults to the configured one)
        #[arg(short, long, value_enum)]
        output: Option<OutputFormat>,

        /// Write the result to a file instead of stdout
        #[arg(long)]
        output_file: Option<PathBuf>,

        /// Cookies to send, e.g. "sessKey=...; userLoginIdx=..."
        #[arg(long)]
        cookies: Option<String>,

        /// Extra extractor options as a JSON object
        #[arg(long)]
        extras: Option<String>,

        /// Request timeout in seconds (defaults to the configured one)
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    /// List supported platforms
    Platforms {
        /// Output format (defaults to the configured one)
        #[arg(short, long, value_enum)]
        output: Option<OutputFormat>,
    },

    /// Show or reset the configuration file
    Config {
        /// Print the current configuration
        #[arg(long, conflicts_with = "reset")]
        show: bool,

        /// Overwrite the configuration file with defaults
        #[arg(long)]
        reset: bool,
    },

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Json,
    JsonCompact,
    Table,
}

impl OutputFormat {
    pub fn is_json(&self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::JsonCompact)
    }
}
