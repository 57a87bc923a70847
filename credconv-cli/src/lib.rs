// SPDX-License-Identifier: MIT
// Copyright (c) Microsoft Corporation.

#![doc = include_str!("../README.md")]

#[doc(hidden)]
pub mod cli;
pub mod config;
mod run;

use std::path::PathBuf;

#[doc(hidden)]
pub use run::{normalize, plan};

/// Unifying structure for the CLI options and configuration file.
#[derive(Debug, Clone)]
#[doc(hidden)]
pub struct Context {
    pub(crate) credentials_directory: PathBuf,
    pub(crate) config: config::Config,
}

impl Context {
    pub fn new(mut config: config::Config, credentials_directory: PathBuf) -> anyhow::Result<Self> {
        // systemd joins multiple credential directories with ':' and we can't know which to use.
        if credentials_directory
            .to_str()
            .ok_or(anyhow::anyhow!(
                "credentials_directory must be valid unicode characters"
            ))?
            .contains(':')
        {
            return Err(anyhow::anyhow!(
                "Multiple credentials directories are not supported"
            ));
        }
        config.fix_credentials(&credentials_directory)?;

        Ok(Self {
            credentials_directory,
            config,
        })
    }
}
