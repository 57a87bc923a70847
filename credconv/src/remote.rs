// SPDX-License-Identifier: MIT
// Copyright (c) Microsoft Corporation.

//! Reading the current state of credentials as reported by the server.
//!
//! The server describes each credential as a flat map of property paths to values, for example
//! `credentials.privateKey` or `credentials.passphrase.plainText`. Which path holds which field
//! is declared by each kind's [`Credential::FIELDS`] table.

use std::collections::BTreeMap;

use crate::{record::Credential, Error};

/// The properties the server reports for one credential, keyed by property path.
pub type Properties = BTreeMap<String, String>;

/// The properties of every credential on the server, keyed by credential ID.
pub type RemoteState = BTreeMap<String, Properties>;

/// The property path holding the named field of a credential kind.
pub fn property_path<C: Credential>(field: &str) -> Option<&'static str> {
    C::FIELDS
        .iter()
        .find(|f| f.name == field)
        .map(|f| f.property)
}

/// Look up a field, treating an empty value as absent.
pub(crate) fn optional<'p, C: Credential>(
    properties: &'p Properties,
    field: &str,
) -> Option<&'p str> {
    property_path::<C>(field)
        .and_then(|path| properties.get(path))
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

pub(crate) fn required<'p, C: Credential>(
    properties: &'p Properties,
    field: &'static str,
) -> Result<&'p str, Error> {
    optional::<C>(properties, field).ok_or(Error::MissingRequiredField { field })
}

/// Read the current state of the credential with the given ID, if the server has one.
///
/// The credential's ID is taken from its properties when present and from the key of the
/// state map otherwise. A reported ID that differs from the key is logged as a warning and
/// kept, so comparing against the desired credential reports the `id` field as changed.
///
/// # Errors
///
/// [`Error::MissingRequiredField`] is returned if the server's properties lack a field the
/// credential kind requires.
pub fn current<C: Credential>(state: &RemoteState, id: &str) -> Result<Option<C>, Error> {
    let Some(properties) = state.get(id) else {
        tracing::debug!(id, kind = C::KIND, "no current credential found");
        return Ok(None);
    };

    let id_path = property_path::<C>("id").unwrap_or("credentials.id");
    let credential = if let Some(reported) = properties.get(id_path) {
        if reported != id {
            tracing::warn!(
                id,
                reported,
                kind = C::KIND,
                "server reports a different ID for the credential stored under this ID"
            );
        }
        C::from_properties(properties)
    } else {
        let mut properties = properties.clone();
        properties.insert(id_path.to_string(), id.to_string());
        C::from_properties(&properties)
    };
    let credential = credential.inspect_err(|error| {
        tracing::error!(id, kind = C::KIND, %error, "current credential is unreadable")
    })?;

    Ok(Some(credential))
}
