//! CLI for urlsift.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use urlsift_core::config;

use commands::{run_features, run_predict, run_serve, run_train};

/// Top-level CLI for urlsift.
#[derive(Debug, Parser)]
#[command(name = "urlsift")]
#[command(about = "urlsift: lexical malicious-URL classifier", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Train a model from a CSV file with `url` and `label` columns.
    Train {
        /// Path to the labeled CSV file.
        data: PathBuf,
        /// Where to write the model (default: configured model path).
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
        /// Seed for the stratified train/evaluation split.
        #[arg(long, value_name = "N")]
        seed: Option<u64>,
    },

    /// Classify a single URL.
    Predict {
        /// URL to classify (de-fanged `[.]` forms are accepted).
        url: String,
        /// Model file to use (default: configured model path).
        #[arg(long, value_name = "PATH")]
        model: Option<PathBuf>,
        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the extracted feature vector of a URL as JSON.
    Features {
        /// URL to inspect.
        url: String,
    },

    /// Serve predictions over HTTP.
    Serve {
        /// Model file to serve (default: configured model path).
        #[arg(long, value_name = "PATH")]
        model: Option<PathBuf>,
        /// Listen address (default: `[server] bind` from config).
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Train { data, out, seed } => {
                tokio::task::spawn_blocking(move || run_train(&cfg, &data, out, seed)).await??;
            }
            CliCommand::Predict { url, model, json } => run_predict(&cfg, &url, model, json)?,
            CliCommand::Features { url } => run_features(&url)?,
            CliCommand::Serve { model, bind } => run_serve(&cfg, model, bind).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
