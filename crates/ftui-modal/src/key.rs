#![forbid(unsafe_code)]

//! Modal keys and key generation.
//!
//! Keys are short random alphanumeric tokens. They are unique within a
//! single store (the generator re-rolls on collision) but carry no
//! cryptographic guarantees.

use rand::distr::{Alphanumeric, SampleString};
use std::fmt;

/// Length of a freshly generated key.
pub const KEY_LEN: usize = 6;

/// Opaque identifier of a registry entry.
///
/// Stable for the entry's lifetime; also usable as a render identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModalKey(String);

impl ModalKey {
    /// Wrap an existing string as a key.
    ///
    /// Useful for addressing entries whose key was serialized elsewhere;
    /// keys created this way are not checked for uniqueness.
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ModalKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Generate a key for which `taken` returns false.
pub(crate) fn generate_key(taken: impl Fn(&ModalKey) -> bool) -> ModalKey {
    let mut rng = rand::rng();
    loop {
        let key = ModalKey(Alphanumeric.sample_string(&mut rng, KEY_LEN));
        if !taken(&key) {
            return key;
        }
        tracing::trace!(key = %key, "modal key collision, re-rolling");
    }
}
