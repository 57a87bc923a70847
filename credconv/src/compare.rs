// SPDX-License-Identifier: MIT
// Copyright (c) Microsoft Corporation.

//! Decide whether a credential on the server differs from its desired state.

use tracing::instrument;

use crate::{record::Credential, Error};

/// Extract every field of the credential, normalizing values where the kind requires it.
fn values<C: Credential>(credential: &C) -> Result<Vec<Option<String>>, Error> {
    C::FIELDS
        .iter()
        .map(|field| (field.value)(credential))
        .collect()
}

/// The names of all fields that differ between the current and desired credential.
///
/// Both credentials are fully normalized before any field is compared, so malformed key
/// material in either one is reported even if an earlier field already differs.
///
/// # Errors
///
/// Any error from normalizing a field, typically [`Error::InvalidKeyMaterial`].
#[instrument(skip_all, fields(id = desired.id(), kind = C::KIND))]
pub fn diff<C: Credential>(current: &C, desired: &C) -> Result<Vec<&'static str>, Error> {
    let current_values = values(current)?;
    let desired_values = values(desired)?;

    let changed = C::FIELDS
        .iter()
        .zip(current_values.iter().zip(desired_values.iter()))
        .filter(|(_, (was, wanted))| was != wanted)
        .map(|(field, _)| field.name)
        .collect::<Vec<_>>();
    if !changed.is_empty() {
        tracing::debug!(?changed, "credential differs from desired state");
    }

    Ok(changed)
}

/// Whether the current credential must be updated to match the desired one.
///
/// # Errors
///
/// See [`diff`].
pub fn needs_update<C: Credential>(current: &C, desired: &C) -> Result<bool, Error> {
    diff(current, desired).map(|changed| !changed.is_empty())
}
