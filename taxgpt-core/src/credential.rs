//! The user's API credential.

use std::fmt;

/// A non-blank secret string, passed to the provider unmodified.
///
/// There is no upfront validation beyond "not blank": a wrong key is only
/// discovered when the provider rejects the request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a secret, or `None` if it is empty or only whitespace.
    pub fn new(secret: impl Into<String>) -> Option<Self> {
        let secret = secret.into();
        if secret.trim().is_empty() {
            None
        } else {
            Some(Self(secret))
        }
    }

    /// The raw secret, for the authorization header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}
