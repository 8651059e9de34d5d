//! # Totem Core
//!
//! Core component of **Totem** that is shared between all other components and serves as building
//! block. It contains the [`base32`] codec that secrets are exchanged in, the hash [`Algorithm`]s,
//! the [`ProvisioningUri`] format and the [`provider`] capabilities the generator depends on.

#![deny(rust_2018_idioms, clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::cast_possible_truncation)]

use std::{
    fmt::{self, Display},
    str::FromStr,
};

pub use key::Key;
pub use secrecy::ExposeSecret;

pub use self::uri::{ParseError, ProvisioningUri};

pub mod base32;
mod key;
pub mod provider;
mod uri;

/// Algorithm used in the OTP generation to create the final code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// SHA-1 algorithm, most common.
    #[default]
    Sha1,
    /// SHA(2)-256 algorithm.
    Sha256,
    /// SHA(2)-512 algorithm.
    Sha512,
}

impl Algorithm {
    /// Name of the algorithm as used in provisioning URIs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sha1 => "SHA1",
            Self::Sha256 => "SHA256",
            Self::Sha512 => "SHA512",
        }
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = UnsupportedAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s.eq_ignore_ascii_case("sha1") {
            Self::Sha1
        } else if s.eq_ignore_ascii_case("sha256") {
            Self::Sha256
        } else if s.eq_ignore_ascii_case("sha512") {
            Self::Sha512
        } else {
            return Err(UnsupportedAlgorithm(s.to_owned()));
        })
    }
}

/// The name didn't match any of the known [`Algorithm`]s.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("unsupported algorithm `{0}`")]
pub struct UnsupportedAlgorithm(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algorithm_from_str() {
        assert_eq!(Ok(Algorithm::Sha1), "sha1".parse());
        assert_eq!(Ok(Algorithm::Sha256), "SHA256".parse());
        assert_eq!(Ok(Algorithm::Sha512), "Sha512".parse());
        assert_eq!(
            Err(UnsupportedAlgorithm("md5".to_owned())),
            "md5".parse::<Algorithm>()
        );
    }

    #[test]
    fn algorithm_display() {
        assert_eq!("SHA256", Algorithm::Sha256.to_string());
    }
}
