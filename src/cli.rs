use clap::{ArgAction, Parser, Subcommand};

use crate::domain::{Encoding, ShareCount, Threshold};

/// Validates that threshold is at least 2
/// A threshold of 1 defeats the purpose of Shamir Secret Sharing
/// (any single share would be able to recover the entire secret)
fn validate_threshold(s: &str) -> Result<Threshold, String> {
    let value: u8 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a number between 2 and 255"))?;

    Threshold::new(value).map_err(|e| e.to_string())
}

fn validate_share_count(s: &str) -> Result<ShareCount, String> {
    let value: u8 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a number between 2 and 255"))?;

    ShareCount::new(value).map_err(|e| e.to_string())
}

fn validate_encoding(s: &str) -> Result<Encoding, String> {
    s.parse().map_err(|e: anyhow::Error| e.to_string())
}

#[derive(Parser)]
#[command(name = "safeparts")]
#[command(about = "Split a secret into shares and combine shares back into the secret")]
pub struct Cli {
    /// Log more (-v for info, -vv for debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Split a secret read from stdin into shares
    Split {
        /// Minimum number of shares needed to reconstruct (must be >= 2)
        #[arg(short = 'k', long, value_parser = validate_threshold)]
        threshold: Threshold,

        /// Number of shares to create
        #[arg(short = 'n', long, value_parser = validate_share_count)]
        shares: ShareCount,

        /// Share encoding
        #[arg(short, long, value_parser = validate_encoding, default_value = "mnemo-words")]
        encoding: Encoding,
    },
    /// Combine blank-line separated shares read from stdin
    Combine {
        /// Share encoding; detected from the input when omitted
        #[arg(short, long, value_parser = validate_encoding)]
        encoding: Option<Encoding>,
    },
    /// Print the encoding the input appears to use
    Detect,
    /// Print how many shares are needed to recover the secret a share belongs to
    Inspect {
        /// Share encoding; detected from the input when omitted
        #[arg(short, long, value_parser = validate_encoding)]
        encoding: Option<Encoding>,
    },
}

impl Cli {
    /// Default log filter for the requested verbosity
    #[must_use]
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
