// SPDX-License-Identifier: MIT
// Copyright (c) Microsoft Corporation.

//! Plan the changes required to bring a set of credentials to their desired state.

use std::collections::HashSet;

use crate::{
    compare,
    record::Credential,
    remote::{self, RemoteState},
    Error,
};

/// What must happen to one credential.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Action {
    /// The server has no credential with this ID.
    Create,
    /// The server's credential differs in the listed fields.
    Update {
        /// Logical names of the differing fields.
        fields: Vec<&'static str>,
    },
    /// The server has a credential with this ID, but it should be absent.
    Delete,
    /// The server's credential already matches, or is absent as desired.
    Unchanged,
}

/// The planned [`Action`] for the credential with the given ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step<'a> {
    /// The credential ID.
    pub id: &'a str,
    /// The credential kind.
    pub kind: &'static str,
    /// What must happen to it.
    pub action: Action,
}

impl std::fmt::Display for Step<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.action {
            Action::Create => write!(f, "{}: create", self.id),
            Action::Update { fields } => write!(f, "{}: update ({})", self.id, fields.join(", ")),
            Action::Delete => write!(f, "{}: delete", self.id),
            Action::Unchanged => write!(f, "{}: unchanged", self.id),
        }
    }
}

/// Plan the action for each desired credential, in order.
///
/// The plan is all-or-nothing: if any credential cannot be normalized, on either side, no
/// plan is returned. A credential that is to be created is still normalized so that invalid
/// key material is caught before anything is sent to the server.
///
/// # Errors
///
/// [`Error::DuplicateId`] if an ID appears twice in `desired`, or any error from reading the
/// remote state or comparing credentials.
pub fn plan<'a, C: Credential>(
    desired: &'a [C],
    current: &RemoteState,
) -> Result<Vec<Step<'a>>, Error> {
    let mut seen = HashSet::new();
    desired
        .iter()
        .map(|credential| {
            let id = credential.id();
            if !seen.insert(id) {
                return Err(Error::DuplicateId(id.to_string()));
            }

            let action = match remote::current::<C>(current, id)? {
                None => {
                    C::FIELDS
                        .iter()
                        .try_for_each(|field| (field.value)(credential).map(drop))?;
                    Action::Create
                }
                Some(existing) => {
                    let fields = compare::diff(&existing, credential)?;
                    if fields.is_empty() {
                        Action::Unchanged
                    } else {
                        Action::Update { fields }
                    }
                }
            };
            tracing::info!(id, kind = C::KIND, ?action, "planned credential");

            Ok(Step {
                id,
                kind: C::KIND,
                action,
            })
        })
        .collect()
}

/// Plan the removal of each credential that should not exist on the server, in order.
///
/// A credential the server reports is deleted; one it does not report is already as desired.
/// The server's properties are not read, so a credential that is unreadable as `C` is still
/// deleted.
///
/// # Errors
///
/// [`Error::DuplicateId`] if an ID appears twice in `absent`.
pub fn plan_absent<'a, C: Credential>(
    absent: &[&'a str],
    current: &RemoteState,
) -> Result<Vec<Step<'a>>, Error> {
    let mut seen = HashSet::new();
    absent
        .iter()
        .map(|&id| {
            if !seen.insert(id) {
                return Err(Error::DuplicateId(id.to_string()));
            }

            let action = if current.contains_key(id) {
                Action::Delete
            } else {
                Action::Unchanged
            };
            tracing::info!(id, kind = C::KIND, ?action, "planned absent credential");

            Ok(Step {
                id,
                kind: C::KIND,
                action,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        key::{tests::rsa_pem, KeyMaterial},
        record::{PasswordCredential, PrivateKeyCredential, SecretTextCredential},
        remote::Properties,
    };

    fn key_credential(id: &str, key: String) -> PrivateKeyCredential {
        PrivateKeyCredential::builder(id)
            .username("jenkins")
            .key_material(KeyMaterial::from_text(key))
            .build()
            .unwrap()
    }

    fn server_copy(credential: &PrivateKeyCredential) -> Properties {
        Properties::from([
            ("credentials.id".to_string(), credential.id().to_string()),
            ("credentials.username".to_string(), "jenkins".to_string()),
            (
                "credentials.privateKey".to_string(),
                credential.private_key_pem().unwrap().into_string(),
            ),
        ])
    }

    #[test]
    fn create_update_unchanged() -> anyhow::Result<()> {
        let unchanged = key_credential("unchanged", rsa_pem());
        let created = key_credential("created", rsa_pem());
        let updated = PrivateKeyCredential::builder("updated")
            .username("jenkins")
            .key_material(KeyMaterial::from_text(rsa_pem()))
            .passphrase("hunter2")
            .build()?;

        let current = RemoteState::from([
            ("unchanged".to_string(), server_copy(&unchanged)),
            ("updated".to_string(), server_copy(&updated)),
        ]);
        let desired = vec![unchanged, created, updated];

        let steps = plan(&desired, &current)?;
        let lines = steps.iter().map(ToString::to_string).collect::<Vec<_>>();
        assert_eq!(
            lines,
            vec![
                "unchanged: unchanged",
                "created: create",
                "updated: update (passphrase)",
            ]
        );
        Ok(())
    }

    #[test]
    fn invalid_key_fails_the_whole_plan() {
        let desired = vec![
            key_credential("good", rsa_pem()),
            key_credential("bad", "not a key".to_string()),
        ];

        let error = plan(&desired, &RemoteState::new()).unwrap_err();
        assert!(matches!(error, Error::InvalidKeyMaterial { .. }));
    }

    #[test]
    fn duplicate_ids_are_rejected() -> anyhow::Result<()> {
        let desired = vec![
            PasswordCredential::new("svc", None, "bot", "a")?,
            PasswordCredential::new("svc", None, "bot", "b")?,
        ];

        let error = plan(&desired, &RemoteState::new()).unwrap_err();
        assert!(matches!(error, Error::DuplicateId(id) if id == "svc"));
        Ok(())
    }

    #[test]
    fn empty_description_converges() -> anyhow::Result<()> {
        let desired = vec![PrivateKeyCredential::builder("k")
            .description("")
            .username("jenkins")
            .key_material(KeyMaterial::from_text(rsa_pem()))
            .build()?];
        let mut properties = server_copy(&desired[0]);
        properties.insert("credentials.description".to_string(), String::new());
        let current = RemoteState::from([("k".to_string(), properties)]);

        let steps = plan(&desired, &current)?;
        assert_eq!(steps[0].action, Action::Unchanged);
        Ok(())
    }

    #[test]
    fn absent_credentials_are_deleted() -> anyhow::Result<()> {
        let current = RemoteState::from([(
            "old-token".to_string(),
            Properties::from([(
                "credentials.secret.plainText".to_string(),
                "s3cret".to_string(),
            )]),
        )]);

        let steps = plan_absent::<SecretTextCredential>(&["old-token", "never-existed"], &current)?;
        let lines = steps.iter().map(ToString::to_string).collect::<Vec<_>>();
        assert_eq!(lines, vec!["old-token: delete", "never-existed: unchanged"]);
        assert_eq!(steps[0].kind, "secret text");

        let error = plan_absent::<SecretTextCredential>(&["a", "a"], &current).unwrap_err();
        assert!(matches!(error, Error::DuplicateId(id) if id == "a"));
        Ok(())
    }
}
