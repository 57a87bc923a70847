// SPDX-License-Identifier: MIT
// Copyright (c) Microsoft Corporation.

use anyhow::anyhow;
use clap::Parser;
use credconv_cli::{cli, config, Context};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, EnvFilter};

fn main() -> Result<(), anyhow::Error> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
        .with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(EnvFilter::from_env("CREDCONV_LOG"));
    tracing::subscriber::set_global_default(registry)
        .expect("Programming error: set_global_default should only be called once.");

    let opts = cli::Cli::parse();
    match opts.command {
        cli::Command::Normalize {
            passphrase_file,
            key,
        } => credconv_cli::normalize(
            key.as_deref(),
            passphrase_file.as_deref(),
            std::io::stdout().lock(),
        ),
        cli::Command::Plan { current } => {
            let config = opts.config.ok_or_else(|| {
                anyhow!("A configuration file is required; see the `config` subcommand")
            })?;
            let context = Context::new(config, opts.credentials_directory)?;
            credconv_cli::plan(&context, &current, std::io::stdout().lock())
        }
        cli::Command::Config => {
            println!(
                "Current configuration:\n\n{}",
                opts.config.unwrap_or_else(config::example)
            );
            Ok(())
        }
    }
}
