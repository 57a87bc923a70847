// SPDX-License-Identifier: MIT
// Copyright (c) Microsoft Corporation.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{self, Config};

/// Normalize private keys and plan changes to credentials on a CI server.
///
/// Private keys may be given as RSA or DSA PEM, or as other PEM that holds an RSA key; all of
/// them are converted to the same canonical PEM before being compared.
///
/// Log configuration is provided using the "CREDCONV_LOG" environment variable with one or
/// more comma-separated directives. In short, filters can be plain verbosity levels ("trace",
/// "debug", "info", "warn", "error"), or more complex filtering at the span or event level.
///
/// The complete format is documented at
/// https://docs.rs/tracing-subscriber/0.3.19/tracing_subscriber/filter/struct.EnvFilter.html#directives.
#[derive(Parser, Debug)]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file.
    ///
    /// If no path is provided, the defaults are used. To view the defaults, run the `config`
    /// subcommand.
    #[arg(long, short, env = "CREDCONV_CONFIG", value_parser = config::load)]
    pub config: Option<Config>,

    /// The directory relative paths in the configuration file are resolved against.
    #[arg(long, env = "CREDENTIALS_DIRECTORY", default_value = ".")]
    pub credentials_directory: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Print the canonical PEM encoding of a private key.
    ///
    /// The dispatch branch used to read the key is logged at the debug level.
    Normalize {
        /// A file containing the passphrase of an encrypted key on its first line.
        #[arg(long)]
        passphrase_file: Option<PathBuf>,
        /// The file containing the private key; standard input is read if omitted.
        key: Option<PathBuf>,
    },
    /// Compare the configured credentials with the server's current state.
    ///
    /// One line is printed per configured credential: "<id>: create", "<id>: unchanged",
    /// "<id>: update (<fields>)", or "<id>: delete" for a credential configured with
    /// `ensure = "absent"` that the server still has.
    Plan {
        /// A TOML file mapping each credential ID to the properties the server reports for it.
        #[arg(long, env = "CREDCONV_CURRENT_STATE")]
        current: PathBuf,
    },
    /// Print the current configuration to standard output.
    ///
    /// If no config file is provided, the defaults are printed.
    Config,
}
