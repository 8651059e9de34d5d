use secrecy::{ExposeSecret, Zeroize};

use crate::base32::{self, DecodeError};

/// Raw bytes of a shared secret that should be kept private as much as possible.
///
/// The content is wiped from memory once the key is dropped.
#[cfg_attr(test, derive(Debug, PartialEq))]
pub struct Key(Vec<u8>);

impl Key {
    #[must_use]
    pub fn new(content: Vec<u8>) -> Self {
        Self(content)
    }

    /// Decode a key from its Base32 text representation.
    pub fn from_base32(text: &str) -> Result<Self, DecodeError> {
        base32::decode(text).map(Self)
    }
}

impl Drop for Key {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl Zeroize for Key {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl ExposeSecret<Vec<u8>> for Key {
    fn expose_secret(&self) -> &Vec<u8> {
        &self.0
    }
}
