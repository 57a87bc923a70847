// SPDX-License-Identifier: MIT
// Copyright (c) Microsoft Corporation.

//! The kinds of credentials that can be managed.
//!
//! Every kind implements [`Credential`], which describes its fields as a table of [`Field`]s:
//! the logical name of the field, where the server reports it, and how to extract a comparable
//! value from a record. The comparator in [`crate::compare`] and the reader in
//! [`crate::remote`] walk this table, so adding a credential kind only means writing its table.

use crate::{
    key::KeyMaterial,
    remote::{self, Properties},
    Error, Secret,
};

/// One comparable field of a credential kind.
pub struct Field<C> {
    /// The logical name of the field, used in diagnostics.
    pub name: &'static str,
    /// The property path where the server reports the field's current value.
    pub property: &'static str,
    /// Extract the comparable value of the field.
    ///
    /// Extraction may normalize the value, and so may fail.
    pub value: fn(&C) -> Result<Option<String>, Error>,
}

/// A credential kind managed on the server.
pub trait Credential: Sized + 'static {
    /// A short name for the kind, used in diagnostics.
    const KIND: &'static str;

    /// The fields compared to decide whether a credential needs an update.
    const FIELDS: &'static [Field<Self>];

    /// The identifier of the credential on the server.
    fn id(&self) -> &str;

    /// Build a credential from the properties the server reports for it.
    ///
    /// # Errors
    ///
    /// [`Error::MissingRequiredField`] is returned if a required property is absent.
    fn from_properties(properties: &Properties) -> Result<Self, Error>;
}

fn id<C: Credential>(credential: &C) -> Result<Option<String>, Error> {
    Ok(Some(credential.id().to_string()))
}

/// Empty optional values are stored as absent, matching how the server's properties are read.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

fn required_id(id: String) -> Result<String, Error> {
    if id.trim().is_empty() {
        Err(Error::MissingRequiredField { field: "id" })
    } else {
        Ok(id)
    }
}

/// A credential holding an SSH private key, an optional username, and the key's passphrase.
#[derive(Debug, Clone)]
pub struct PrivateKeyCredential {
    id: String,
    description: Option<String>,
    username: Option<String>,
    key_material: KeyMaterial,
    passphrase: Option<Secret>,
}

impl PrivateKeyCredential {
    /// Start building a private key credential with the given identifier.
    pub fn builder(id: impl Into<String>) -> PrivateKeyCredentialBuilder {
        PrivateKeyCredentialBuilder {
            id: id.into(),
            description: None,
            username: None,
            key_material: None,
            passphrase: None,
        }
    }

    /// The free-text description of the credential.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The username the key authenticates as.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// The private key, as configured.
    pub fn key_material(&self) -> &KeyMaterial {
        &self.key_material
    }

    /// The passphrase protecting the private key.
    pub fn passphrase(&self) -> Option<&Secret> {
        self.passphrase.as_ref()
    }

    /// The private key in canonical PEM, decrypted with the credential's passphrase if needed.
    pub fn private_key_pem(&self) -> Result<crate::key::CanonicalPem, Error> {
        self.key_material
            .normalize_with_passphrase(self.passphrase.as_ref())
    }
}

/// Builder for [`PrivateKeyCredential`].
#[derive(Debug)]
pub struct PrivateKeyCredentialBuilder {
    id: String,
    description: Option<String>,
    username: Option<String>,
    key_material: Option<KeyMaterial>,
    passphrase: Option<Secret>,
}

impl PrivateKeyCredentialBuilder {
    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the username.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the private key.
    pub fn key_material(mut self, key_material: KeyMaterial) -> Self {
        self.key_material = Some(key_material);
        self
    }

    /// Set the passphrase protecting the private key.
    pub fn passphrase(mut self, passphrase: impl Into<Secret>) -> Self {
        self.passphrase = Some(passphrase.into());
        self
    }

    /// Build the credential.
    ///
    /// The key material is not parsed here; that happens when the credential is compared. An
    /// empty description, username, or passphrase is treated as unset.
    ///
    /// # Errors
    ///
    /// [`Error::MissingRequiredField`] is returned if the identifier is blank or no key
    /// material (or only blank text) was provided.
    pub fn build(self) -> Result<PrivateKeyCredential, Error> {
        let id = required_id(self.id)?;
        let key_material = self
            .key_material
            .filter(|key| !key.is_blank())
            .ok_or(Error::MissingRequiredField {
                field: "private_key",
            })?;

        Ok(PrivateKeyCredential {
            id,
            description: non_empty(self.description),
            username: non_empty(self.username),
            key_material,
            passphrase: self.passphrase.filter(|p| !p.expose().is_empty()),
        })
    }
}

fn private_key(credential: &PrivateKeyCredential) -> Result<Option<String>, Error> {
    credential
        .private_key_pem()
        .map(|pem| Some(pem.into_string()))
}

impl Credential for PrivateKeyCredential {
    const KIND: &'static str = "private key";

    const FIELDS: &'static [Field<Self>] = &[
        Field {
            name: "id",
            property: "credentials.id",
            value: id,
        },
        Field {
            name: "description",
            property: "credentials.description",
            value: |c| Ok(c.description.clone()),
        },
        Field {
            name: "username",
            property: "credentials.username",
            value: |c| Ok(c.username.clone()),
        },
        Field {
            name: "private_key",
            property: "credentials.privateKey",
            value: private_key,
        },
        Field {
            name: "passphrase",
            property: "credentials.passphrase.plainText",
            value: |c| Ok(c.passphrase.as_ref().map(|p| p.expose().to_string())),
        },
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn from_properties(properties: &Properties) -> Result<Self, Error> {
        let mut builder = Self::builder(remote::required::<Self>(properties, "id")?);
        if let Some(description) = remote::optional::<Self>(properties, "description") {
            builder = builder.description(description);
        }
        if let Some(username) = remote::optional::<Self>(properties, "username") {
            builder = builder.username(username);
        }
        if let Some(passphrase) = remote::optional::<Self>(properties, "passphrase") {
            builder = builder.passphrase(passphrase);
        }
        let key = remote::required::<Self>(properties, "private_key")?;

        builder.key_material(KeyMaterial::from_text(key)).build()
    }
}

/// A username and password credential.
#[derive(Debug, Clone)]
pub struct PasswordCredential {
    id: String,
    description: Option<String>,
    username: String,
    password: Secret,
}

impl PasswordCredential {
    /// Create a new username and password credential.
    ///
    /// # Errors
    ///
    /// [`Error::MissingRequiredField`] is returned if the identifier or username is blank.
    pub fn new(
        id: impl Into<String>,
        description: Option<String>,
        username: impl Into<String>,
        password: impl Into<Secret>,
    ) -> Result<Self, Error> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(Error::MissingRequiredField { field: "username" });
        }
        Ok(Self {
            id: required_id(id.into())?,
            description: non_empty(description),
            username,
            password: password.into(),
        })
    }

    /// The username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The password.
    pub fn password(&self) -> &Secret {
        &self.password
    }
}

impl Credential for PasswordCredential {
    const KIND: &'static str = "password";

    const FIELDS: &'static [Field<Self>] = &[
        Field {
            name: "id",
            property: "credentials.id",
            value: id,
        },
        Field {
            name: "description",
            property: "credentials.description",
            value: |c| Ok(c.description.clone()),
        },
        Field {
            name: "username",
            property: "credentials.username",
            value: |c| Ok(Some(c.username.clone())),
        },
        Field {
            name: "password",
            property: "credentials.password.plainText",
            value: |c| Ok(Some(c.password.expose().to_string())),
        },
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn from_properties(properties: &Properties) -> Result<Self, Error> {
        Self::new(
            remote::required::<Self>(properties, "id")?,
            remote::optional::<Self>(properties, "description").map(str::to_string),
            remote::required::<Self>(properties, "username")?,
            remote::required::<Self>(properties, "password")?,
        )
    }
}

/// A credential holding a single secret string, such as an API token.
#[derive(Debug, Clone)]
pub struct SecretTextCredential {
    id: String,
    description: Option<String>,
    secret: Secret,
}

impl SecretTextCredential {
    /// Create a new secret text credential.
    ///
    /// # Errors
    ///
    /// [`Error::MissingRequiredField`] is returned if the identifier is blank.
    pub fn new(
        id: impl Into<String>,
        description: Option<String>,
        secret: impl Into<Secret>,
    ) -> Result<Self, Error> {
        Ok(Self {
            id: required_id(id.into())?,
            description: non_empty(description),
            secret: secret.into(),
        })
    }

    /// The secret.
    pub fn secret(&self) -> &Secret {
        &self.secret
    }
}

impl Credential for SecretTextCredential {
    const KIND: &'static str = "secret text";

    const FIELDS: &'static [Field<Self>] = &[
        Field {
            name: "id",
            property: "credentials.id",
            value: id,
        },
        Field {
            name: "description",
            property: "credentials.description",
            value: |c| Ok(c.description.clone()),
        },
        Field {
            name: "secret",
            property: "credentials.secret.plainText",
            value: |c| Ok(Some(c.secret.expose().to_string())),
        },
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn from_properties(properties: &Properties) -> Result<Self, Error> {
        Self::new(
            remote::required::<Self>(properties, "id")?,
            remote::optional::<Self>(properties, "description").map(str::to_string),
            remote::required::<Self>(properties, "secret")?,
        )
    }
}
