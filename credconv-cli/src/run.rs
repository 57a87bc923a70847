// SPDX-License-Identifier: MIT
// Copyright (c) Microsoft Corporation.

use std::{
    io::{Read, Write},
    path::Path,
};

use anyhow::Context as _;
use credconv::{
    key::KeyMaterial,
    plan::{plan_absent, Step},
    record::{PasswordCredential, PrivateKeyCredential, SecretTextCredential},
    remote::RemoteState,
    Secret,
};
use tracing::instrument;

use crate::Context;

/// Read a private key from the given file (or standard input) and write its canonical PEM
/// encoding to `output`.
#[instrument(skip_all, fields(key = ?key))]
pub fn normalize<W: Write>(
    key: Option<&Path>,
    passphrase_file: Option<&Path>,
    mut output: W,
) -> anyhow::Result<()> {
    let text = match key {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read private key {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read private key from standard input")?;
            text
        }
    };
    let passphrase = passphrase_file
        .map(|path| {
            Secret::try_from(path)
                .with_context(|| format!("failed to read passphrase {}", path.display()))
        })
        .transpose()?;

    let material = KeyMaterial::from_text(text);
    tracing::info!(branch = %material.branch(), "Normalizing private key");
    let pem = material.normalize_with_passphrase(passphrase.as_ref())?;
    output.write_all(pem.as_str().as_bytes())?;

    Ok(())
}

/// Compare the configured credentials with the current state recorded in `current` and write
/// one line per credential to `output`. Credentials that should be present come first, then
/// those that should be absent.
#[instrument(skip_all, fields(credentials_directory = ?context.credentials_directory))]
pub fn plan<W: Write>(context: &Context, current: &Path, mut output: W) -> anyhow::Result<()> {
    let state = std::fs::read_to_string(current)
        .with_context(|| format!("failed to read current state from {}", current.display()))?;
    let state: RemoteState = toml::from_str(&state).context("current state file is invalid")?;
    tracing::debug!(credentials = state.len(), "Read current state");

    let desired = context.config.desired()?;
    let mut steps: Vec<Step<'_>> = vec![];
    steps.extend(credconv::plan::plan(&desired.private_keys, &state)?);
    steps.extend(credconv::plan::plan(&desired.passwords, &state)?);
    steps.extend(credconv::plan::plan(&desired.secret_texts, &state)?);

    let absent = context.config.absent();
    steps.extend(plan_absent::<PrivateKeyCredential>(&absent.private_keys, &state)?);
    steps.extend(plan_absent::<PasswordCredential>(&absent.passwords, &state)?);
    steps.extend(plan_absent::<SecretTextCredential>(&absent.secret_texts, &state)?);

    for step in steps {
        writeln!(output, "{step}")?;
    }

    Ok(())
}
