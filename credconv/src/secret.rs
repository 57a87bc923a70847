// SPDX-License-Identifier: MIT
// Copyright (c) Microsoft Corporation.

use std::path::Path;

/// String newtype with custom Display and Debug impls to avoid logging passphrases and other
/// secret values.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// The secret value.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Secret").field(&"*****").finish()
    }
}

impl std::fmt::Display for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Secret").field(&"*****").finish()
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl TryFrom<&Path> for Secret {
    type Error = std::io::Error;

    /// Read a secret from the first line of a file.
    ///
    /// If the first line does not contain a string, an error is returned.
    fn try_from(value: &Path) -> Result<Self, Self::Error> {
        let secret = std::fs::read_to_string(value)?
            .lines()
            .next()
            .and_then(|line| {
                let line = line.trim();
                if !line.is_empty() {
                    Some(line)
                } else {
                    None
                }
            })
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!(
                        "secret file {} does not contain a value on the first line",
                        value.display()
                    ),
                )
            })?
            .to_string();

        Ok(Self(secret))
    }
}
