//! # Totem Gen(erator)
//!
//! Generator component of **Totem**. It creates new secrets, computes HOTP
//! ([RFC 4226](https://www.rfc-editor.org/rfc/rfc4226)) and TOTP
//! ([RFC 6238](https://www.rfc-editor.org/rfc/rfc6238)) codes and verifies codes submitted by
//! users within a tolerance window.

#![deny(rust_2018_idioms, clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::cast_possible_truncation)]

use std::fmt::{self, Display};

use hmac::{
    digest::{InvalidLength, KeyInit},
    Hmac, Mac,
};
use sha1::Sha1;
use sha2::{Sha256, Sha512};
pub use totem_core::{Algorithm, Key, ProvisioningUri};
use totem_core::{
    base32::DecodeError,
    provider::{EntropyError, RenderError, TimeError},
    ExposeSecret, UnsupportedAlgorithm,
};

pub use crate::{
    auth::{Authenticator, DEFAULT_LENIENCY, DEFAULT_QR_SIZE},
    secret::{create_secret, DEFAULT_SECRET_BITS},
    totp::{Config, Totp, DEFAULT_DISCREPANCY},
};

mod auth;
mod secret;
mod totp;

/// Most common amount of digits for OTPs.
pub const DEFAULT_DIGITS: u8 = 6;
/// Most common amount of seconds a TOTP code is valid.
pub const DEFAULT_PERIOD: u64 = 30;

/// Errors that can occur when generating secrets or OTPs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The generator was configured with invalid settings.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
    /// The secret wasn't valid Base32 text.
    #[error("the secret is not valid Base32")]
    InvalidEncoding(#[from] DecodeError),
    /// A secure secret was requested but the entropy source doesn't provide secure randomness.
    #[error("the entropy source is not cryptographically secure")]
    InsecureEntropySource,
    /// The entropy source failed to provide random bytes.
    #[error(transparent)]
    Entropy(#[from] EntropyError),
    /// The time source failed to report the current time.
    #[error(transparent)]
    TimeSourceUnavailable(#[from] TimeError),
    /// The QR code renderer failed.
    #[error(transparent)]
    Render(#[from] RenderError),
    /// One of the checked time sources is too far off from the reference.
    #[error("time source #{index} differs from the reference by {difference} seconds")]
    TimeMismatch {
        /// Position of the time source in the checked list.
        index: usize,
        /// Absolute difference to the reference time in seconds.
        difference: u64,
    },
    /// The provided key was rejected by the MAC.
    #[error("the given key has an invalid length")]
    KeyLength(#[from] InvalidLength),
}

/// Reasons a [`Config`] is rejected.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("digits must be greater than zero")]
    ZeroDigits,
    #[error("period must be greater than zero")]
    ZeroPeriod,
    #[error(transparent)]
    UnsupportedAlgorithm(#[from] UnsupportedAlgorithm),
}

impl From<UnsupportedAlgorithm> for Error {
    fn from(value: UnsupportedAlgorithm) -> Self {
        Self::InvalidConfiguration(value.into())
    }
}

/// Create a new HOTP code from the given `key` and `counter`.
///
/// The result is truncated to the given amount of `digits`. Anything above 9 digits is
/// zero-padded only, as the truncated value never exceeds 31 bits.
pub fn hotp(key: &Key, counter: u64, digits: u8, algorithm: Algorithm) -> Result<OtpCode, Error> {
    let digest = mac(algorithm, key.expose_secret(), counter)?;

    Ok(OtpCode {
        value: digit(&digest, digits),
        digits,
    })
}

fn mac(algorithm: Algorithm, key: &[u8], counter: u64) -> Result<Vec<u8>, Error> {
    match algorithm {
        Algorithm::Sha1 => sign::<Hmac<Sha1>>(key, counter),
        Algorithm::Sha256 => sign::<Hmac<Sha256>>(key, counter),
        Algorithm::Sha512 => sign::<Hmac<Sha512>>(key, counter),
    }
}

fn sign<M: Mac + KeyInit>(key: &[u8], counter: u64) -> Result<Vec<u8>, Error> {
    let mut mac = <M as KeyInit>::new_from_slice(key)?;
    mac.update(&counter.to_be_bytes());

    Ok(mac.finalize().into_bytes().to_vec())
}

fn digit(digest: &[u8], digits: u8) -> u32 {
    let offset = usize::from(digest[digest.len() - 1] & 0xf);
    let bin_code = u32::from_be_bytes([
        digest[offset],
        digest[offset + 1],
        digest[offset + 2],
        digest[offset + 3],
    ]) & 0x7fff_ffff;

    10_u32
        .checked_pow(u32::from(digits))
        .map_or(bin_code, |modulus| bin_code % modulus)
}

/// A generated OTP code that can be used to verify identity against a service.
///
/// It contains the numeric value as well as the amount of digits, as the value might be shorter
/// than the needed amount of digits and must be shifted with zeroes to fulfill the length.
///
/// Call `to_string()` on an instance to get the final code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OtpCode {
    /// The truncated numeric value.
    pub value: u32,
    /// The desired amount of digits of the OTP.
    pub digits: u8,
}

impl Display for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0>1$}", self.value, usize::from(self.digits))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn digit() {
        let bytes = [
            0x1f, 0x86, 0x98, 0x69, 0x0e, 0x02, 0xca, 0x16, 0x61, 0x85, 0x50, 0xef, 0x7f, 0x19,
            0xda, 0x8e, 0x94, 0x5b, 0x55, 0x5a,
        ];

        assert_eq!(872_921, super::digit(&bytes, DEFAULT_DIGITS));
        assert_eq!(1_357_872_921, super::digit(&bytes, 10));
    }

    #[test]
    fn code_display() {
        let code = OtpCode {
            value: 123,
            digits: 6,
        };
        assert_eq!("000123", code.to_string());
    }

    #[test]
    fn rfc4226_vectors() {
        let key = Key::new(b"12345678901234567890".to_vec());
        let expected = [
            "755224", "287082", "359152", "969429", "338314", "254676", "287922", "162583",
            "399871", "520489",
        ];

        for (counter, code) in (0..).zip(expected) {
            assert_eq!(
                code,
                hotp(&key, counter, 6, Algorithm::Sha1).unwrap().to_string()
            );
        }
    }

    #[test]
    fn unsupported_algorithm_is_configuration_error() {
        let err = Error::from("md5".parse::<Algorithm>().unwrap_err());
        assert!(matches!(
            err,
            Error::InvalidConfiguration(ConfigError::UnsupportedAlgorithm(_))
        ));
    }
}
