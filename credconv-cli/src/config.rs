// SPDX-License-Identifier: MIT
// Copyright (c) Microsoft Corporation.

//! The configuration format for `credconv`.
//!
//! Configuration is provided via a command-line argument or environment variable
//! (`CREDCONV_CONFIG`). The configuration should be in TOML format.
//!
//! The [`Config`] lists the desired credentials, grouped by kind. Secret values are never
//! written in the configuration itself; each credential names files holding them. Relative
//! paths are resolved against the credentials directory (`CREDENTIALS_DIRECTORY`), which
//! works well with systemd's "LoadCredential" options.
//!
//! A credential with `ensure = "absent"` should not exist on the server. Only its `id` is
//! needed, and the files it names are never read.
//!
//! To validate your configuration, refer to the `credconv config` command.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context};
use credconv::{
    key::KeyMaterial,
    record::{PasswordCredential, PrivateKeyCredential, SecretTextCredential},
    Secret,
};
use serde::{Deserialize, Serialize};

/// The configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Private key credentials.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub private_keys: Vec<PrivateKey>,

    /// Username and password credentials.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub passwords: Vec<Password>,

    /// Secret text credentials.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secret_texts: Vec<SecretText>,
}

/// Whether a configured credential should exist on the server.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ensure {
    /// The credential should exist and match the configuration.
    #[default]
    Present,
    /// The credential should be deleted if the server has it.
    Absent,
}

impl Ensure {
    fn is_present(&self) -> bool {
        *self == Ensure::Present
    }
}

fn is_unset(path: &Path) -> bool {
    path.as_os_str().is_empty()
}

/// A private key credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivateKey {
    /// The identifier of the credential on the server.
    pub id: String,
    /// Whether the credential should exist; defaults to present.
    #[serde(default, skip_serializing_if = "Ensure::is_present")]
    pub ensure: Ensure,
    /// A free-text description of the credential.
    pub description: Option<String>,
    /// The username the key authenticates as.
    pub username: Option<String>,
    /// The path to the private key.
    ///
    /// RSA and DSA keys in PEM format are accepted. A file with no RSA or DSA header, such as
    /// a PKCS#8 key, is read as an RSA key. Required unless the credential is absent.
    #[serde(default, skip_serializing_if = "is_unset")]
    pub private_key_path: PathBuf,
    /// The path to a file containing the key's passphrase on its first line, if the key is
    /// encrypted.
    pub passphrase_path: Option<PathBuf>,
}

impl Default for PrivateKey {
    fn default() -> Self {
        Self {
            id: "deploy-key".to_string(),
            ensure: Ensure::Present,
            description: Some("Deployment key".to_string()),
            username: Some("jenkins".to_string()),
            private_key_path: PathBuf::from("deploy-key.pem"),
            passphrase_path: None,
        }
    }
}

impl PrivateKey {
    fn credential(&self) -> anyhow::Result<PrivateKeyCredential> {
        let key = std::fs::read_to_string(&self.private_key_path).with_context(|| {
            format!(
                "failed to read private key {}",
                self.private_key_path.display()
            )
        })?;
        let mut builder = PrivateKeyCredential::builder(&self.id)
            .key_material(KeyMaterial::from_text(key));
        if let Some(description) = &self.description {
            builder = builder.description(description);
        }
        if let Some(username) = &self.username {
            builder = builder.username(username);
        }
        if let Some(path) = &self.passphrase_path {
            builder = builder.passphrase(read_secret(path)?);
        }

        Ok(builder.build()?)
    }
}

/// A username and password credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Password {
    /// The identifier of the credential on the server.
    pub id: String,
    /// Whether the credential should exist; defaults to present.
    #[serde(default, skip_serializing_if = "Ensure::is_present")]
    pub ensure: Ensure,
    /// A free-text description of the credential.
    pub description: Option<String>,
    /// The username. Required unless the credential is absent.
    #[serde(default)]
    pub username: String,
    /// The path to a file containing the password on its first line.
    #[serde(default, skip_serializing_if = "is_unset")]
    pub password_path: PathBuf,
}

impl Password {
    fn credential(&self) -> anyhow::Result<PasswordCredential> {
        Ok(PasswordCredential::new(
            &self.id,
            self.description.clone(),
            &self.username,
            read_secret(&self.password_path)?,
        )?)
    }
}

/// A secret text credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretText {
    /// The identifier of the credential on the server.
    pub id: String,
    /// Whether the credential should exist; defaults to present.
    #[serde(default, skip_serializing_if = "Ensure::is_present")]
    pub ensure: Ensure,
    /// A free-text description of the credential.
    pub description: Option<String>,
    /// The path to a file containing the secret on its first line.
    #[serde(default, skip_serializing_if = "is_unset")]
    pub secret_path: PathBuf,
}

impl SecretText {
    fn credential(&self) -> anyhow::Result<SecretTextCredential> {
        Ok(SecretTextCredential::new(
            &self.id,
            self.description.clone(),
            read_secret(&self.secret_path)?,
        )?)
    }
}

fn read_secret(path: &Path) -> anyhow::Result<Secret> {
    Secret::try_from(path).with_context(|| format!("failed to read secret {}", path.display()))
}

/// Resolve a path relative to the credentials directory, failing if it does not exist there.
fn resolve(path: &mut PathBuf, credentials_dir: &Path, id: &str) -> anyhow::Result<()> {
    if is_unset(path) {
        return Err(anyhow!("Credential '{id}' is present but names no file"));
    }
    if path.is_absolute() {
        tracing::warn!(
            path = path.display().to_string(),
            id,
            "Path is absolute; consider using the credentials directory"
        );
        return Ok(());
    }

    let resolved = credentials_dir.join(&*path);
    if !resolved.exists() {
        return Err(anyhow!(
            "No file named '{}' found in credentials directory for credential '{id}'",
            path.display(),
        ));
    }
    *path = resolved;
    Ok(())
}

/// The IDs of configured credentials that should not exist on the server, by kind.
#[derive(Debug, Default)]
pub struct Absent<'c> {
    /// Private key credentials.
    pub private_keys: Vec<&'c str>,
    /// Username and password credentials.
    pub passwords: Vec<&'c str>,
    /// Secret text credentials.
    pub secret_texts: Vec<&'c str>,
}

/// The desired credentials, read from the files the configuration refers to.
#[derive(Debug)]
pub struct Desired {
    /// Private key credentials.
    pub private_keys: Vec<PrivateKeyCredential>,
    /// Username and password credentials.
    pub passwords: Vec<PasswordCredential>,
    /// Secret text credentials.
    pub secret_texts: Vec<SecretTextCredential>,
}

impl Config {
    /// Fix up any relative paths in the configuration file to use the provided credentials
    /// directory.
    ///
    /// # Errors
    ///
    /// If the referenced files don't exist, an error is returned. Credentials that should be
    /// absent are skipped.
    #[doc(hidden)]
    pub fn fix_credentials(&mut self, credentials_dir: &Path) -> anyhow::Result<()> {
        for key in self
            .private_keys
            .iter_mut()
            .filter(|key| key.ensure.is_present())
        {
            resolve(&mut key.private_key_path, credentials_dir, &key.id)?;
            if let Some(passphrase_path) = key.passphrase_path.as_mut() {
                resolve(passphrase_path, credentials_dir, &key.id)?;
            }
        }
        for password in self
            .passwords
            .iter_mut()
            .filter(|password| password.ensure.is_present())
        {
            resolve(&mut password.password_path, credentials_dir, &password.id)?;
        }
        for secret in self
            .secret_texts
            .iter_mut()
            .filter(|secret| secret.ensure.is_present())
        {
            resolve(&mut secret.secret_path, credentials_dir, &secret.id)?;
        }

        Ok(())
    }

    /// Check the configuration file for validity.
    ///
    /// Credential IDs must be unique across all kinds.
    #[doc(hidden)]
    pub fn validate(&self) -> anyhow::Result<()> {
        let mut seen = HashSet::new();
        self.private_keys
            .iter()
            .map(|key| key.id.as_str())
            .chain(self.passwords.iter().map(|password| password.id.as_str()))
            .chain(self.secret_texts.iter().map(|secret| secret.id.as_str()))
            .map(|id| {
                if seen.insert(id) {
                    Ok(())
                } else {
                    Err(anyhow!("Credential '{id}' is configured more than once"))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(())
    }

    /// Read every credential that should be present from disk.
    #[doc(hidden)]
    pub fn desired(&self) -> anyhow::Result<Desired> {
        Ok(Desired {
            private_keys: self
                .private_keys
                .iter()
                .filter(|key| key.ensure.is_present())
                .map(|key| {
                    key.credential()
                        .with_context(|| format!("credential '{}' is invalid", key.id))
                })
                .collect::<Result<Vec<_>, _>>()?,
            passwords: self
                .passwords
                .iter()
                .filter(|password| password.ensure.is_present())
                .map(|password| {
                    password
                        .credential()
                        .with_context(|| format!("credential '{}' is invalid", password.id))
                })
                .collect::<Result<Vec<_>, _>>()?,
            secret_texts: self
                .secret_texts
                .iter()
                .filter(|secret| secret.ensure.is_present())
                .map(|secret| {
                    secret
                        .credential()
                        .with_context(|| format!("credential '{}' is invalid", secret.id))
                })
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    /// The IDs of every credential that should be absent.
    #[doc(hidden)]
    pub fn absent(&self) -> Absent<'_> {
        Absent {
            private_keys: self
                .private_keys
                .iter()
                .filter(|key| key.ensure == Ensure::Absent)
                .map(|key| key.id.as_str())
                .collect(),
            passwords: self
                .passwords
                .iter()
                .filter(|password| password.ensure == Ensure::Absent)
                .map(|password| password.id.as_str())
                .collect(),
            secret_texts: self
                .secret_texts
                .iter()
                .filter(|secret| secret.ensure == Ensure::Absent)
                .map(|secret| secret.id.as_str())
                .collect(),
        }
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            toml::ser::to_string_pretty(&self).unwrap_or_default()
        )
    }
}

/// An example configuration, printed when no configuration file is given.
pub fn example() -> Config {
    Config {
        private_keys: vec![PrivateKey::default()],
        passwords: vec![],
        secret_texts: vec![],
    }
}

pub(crate) fn load(path: &str) -> anyhow::Result<Config> {
    let config = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read from path {path:?}"))?;
    tracing::info!(%path, "Read from configuration file");
    let config: Config = toml::from_str(&config)
        .inspect_err(|error| {
            eprintln!("Failed to parse configuration loaded from {path:?}:\n{error}");
            eprintln!("Example config file:\n\n{}", example());
        })
        .context("configuration file is invalid")?;
    config.validate()?;

    Ok(config)
}
