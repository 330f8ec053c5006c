//! Main entry point for the cabinet CLI

use std::process::ExitCode;

use cabinet_ca::cli::Cli;
use cabinet_common::LoggingTransformer;
use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize structured logging
    LoggingTransformer::init();

    cabinet_ca::cli::run(Cli::parse()).await
}
