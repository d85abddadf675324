//! srtp-sdes - SDES key material and SRTP authentication checks
//!
//! Decodes `a=crypto` attributes, derives session keys and computes or
//! verifies packet authentication tags from the command line.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "srtp-sdes")]
#[command(about = "SDES key material and SRTP authentication checks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered crypto suites
    Suites,

    /// Decode a crypto attribute (or a bare inline key) and show its layout
    Inspect {
        /// `a=crypto:...` line, or a base64 key||salt blob together with --suite
        input: String,

        /// Suite for a bare base64 blob
        #[arg(short, long)]
        suite: Option<String>,
    },

    /// Generate a crypto attribute with a fresh master key
    Generate {
        /// Suite to generate for (default: first preferred suite from config)
        #[arg(short, long)]
        suite: Option<String>,

        /// Crypto attribute tag number
        #[arg(short, long, default_value = "1")]
        tag: u32,
    },

    /// Derive session keys from a crypto attribute
    Derive {
        /// `a=crypto:...` line
        attribute: String,

        /// Derive SRTCP keys instead of SRTP keys
        #[arg(long)]
        rtcp: bool,

        /// Packet index (divided by the configured key derivation rate)
        #[arg(short, long, default_value = "0")]
        index: u64,
    },

    /// Compute an HMAC-SHA1 authentication tag
    Tag {
        #[command(flatten)]
        key: commands::KeyArg,

        /// Message to authenticate (UTF-8 text)
        message: String,

        /// Truncate to this suite's tag length (default: full digest)
        #[arg(short, long)]
        suite: Option<String>,
    },

    /// Verify an HMAC-SHA1 authentication tag
    Verify {
        #[command(flatten)]
        key: commands::KeyArg,

        /// Message that was authenticated (UTF-8 text)
        message: String,

        /// Presented tag, hex
        #[arg(short, long)]
        tag: String,

        /// Expect this suite's tag length (default: full digest)
        #[arg(short, long)]
        suite: Option<String>,
    },

    /// Show or update configuration
    Config {
        /// Preferred suites, most preferred first (replaces the stored list)
        #[arg(long, num_args = 1..)]
        prefer: Vec<String>,

        /// SRTP key derivation rate
        #[arg(long)]
        kdr: Option<u64>,

        /// Master key lifetime for generated attributes, in packets (0 = omit)
        #[arg(long)]
        lifetime: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Suites => {
            commands::list_suites();
        }
        Commands::Inspect { input, suite } => {
            commands::inspect(&input, suite.as_deref())?;
        }
        Commands::Generate { suite, tag } => {
            commands::generate(suite.as_deref(), tag)?;
        }
        Commands::Derive {
            attribute,
            rtcp,
            index,
        } => {
            commands::derive(&attribute, rtcp, index)?;
        }
        Commands::Tag {
            key,
            message,
            suite,
        } => {
            commands::tag(&key, &message, suite.as_deref())?;
        }
        Commands::Verify {
            key,
            message,
            tag,
            suite,
        } => {
            commands::verify(&key, &message, &tag, suite.as_deref())?;
        }
        Commands::Config {
            prefer,
            kdr,
            lifetime,
        } => {
            commands::config(prefer, kdr, lifetime)?;
        }
    }

    Ok(())
}
