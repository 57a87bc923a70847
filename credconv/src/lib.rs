// SPDX-License-Identifier: MIT
// Copyright (c) Microsoft Corporation.
#![warn(missing_docs)]

/*!
# credconv

This crate decides whether credentials managed on a continuous-integration server need to be
changed. It normalizes private-key material, which can arrive as parsed OpenSSL key objects or
as PEM text in several shapes, to a single canonical PEM encoding, and then compares the
current state of a credential (as reported by the server) with the desired state.

Everything here is pure: reading the current state from the server and applying changes are
the caller's responsibility.

```no_run
use credconv::{compare, key::KeyMaterial, record::PrivateKeyCredential};

# fn main() -> Result<(), credconv::Error> {
let desired = PrivateKeyCredential::builder("deploy-key")
    .username("jenkins")
    .key_material(KeyMaterial::from_text(std::fs::read_to_string("id_rsa").unwrap()))
    .build()?;
# let current = desired.clone();
if compare::needs_update(&current, &desired)? {
    println!("deploy-key must be updated");
}
# Ok(())
# }
```
*/

pub mod compare;
pub mod error;
pub mod key;
pub mod plan;
pub mod record;
pub mod remote;
mod secret;

pub use error::Error;
pub use secret::Secret;
