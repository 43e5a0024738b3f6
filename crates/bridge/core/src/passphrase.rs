//! One-shot signing credentials.

use std::fmt;

/// A secret supplied by the consent UI after explicit approval.
///
/// The bridge never persists it: it travels from the approval to the single
/// signing call it authorizes and is dropped with the request. `Debug` and
/// `Display` output is redacted so the secret cannot leak through logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Passphrase(String);

impl Passphrase {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Grants access to the underlying secret for a signer.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Passphrase {
    fn from(secret: &str) -> Self {
        Self::new(secret)
    }
}

impl fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Passphrase(<redacted>)")
    }
}
