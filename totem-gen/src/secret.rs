use totem_core::{
    base32::ALPHABET,
    provider::{EntropyError, EntropySource},
};
use tracing::{debug, warn};

use crate::Error;

/// Entropy of newly created secrets, as recommended by RFC 4226.
pub const DEFAULT_SECRET_BITS: u32 = 160;

/// Create a new random secret with at least `bits` of entropy, as Base32 text.
///
/// Every Base32 character carries 5 bits, so the secret is `ceil(bits / 5)` characters long.
/// Each character is picked from one random byte of which only the lower 5 bits are used.
///
/// If `require_secure` is set, the call fails before consuming any randomness unless the
/// `entropy` source reports to be cryptographically secure.
pub fn create_secret<E>(entropy: &E, bits: u32, require_secure: bool) -> Result<String, Error>
where
    E: EntropySource + ?Sized,
{
    let secure = entropy.is_cryptographically_secure();
    if !secure {
        if require_secure {
            return Err(Error::InsecureEntropySource);
        }
        warn!("creating secret from an insecure entropy source");
    }

    let count = bits.div_ceil(5) as usize;
    let bytes = entropy.random_bytes(count)?;

    if bytes.len() != count {
        return Err(EntropyError::new(format!(
            "requested {count} bytes but received {}",
            bytes.len()
        ))
        .into());
    }

    debug!(bits, length = count, "created new secret");

    Ok(bytes
        .iter()
        .map(|b| char::from(ALPHABET[usize::from(b & 0x1f)]))
        .collect())
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use pretty_assertions::assert_eq;
    use totem_core::base32;

    use super::*;

    /// Entropy source that hands out an incrementing byte sequence.
    struct Counting {
        secure: bool,
        calls: Cell<usize>,
    }

    impl Counting {
        fn new(secure: bool) -> Self {
            Self {
                secure,
                calls: Cell::new(0),
            }
        }
    }

    impl EntropySource for Counting {
        fn random_bytes(&self, count: usize) -> Result<Vec<u8>, EntropyError> {
            self.calls.set(self.calls.get() + 1);
            Ok((0..count).map(|i| i as u8).collect())
        }

        fn is_cryptographically_secure(&self) -> bool {
            self.secure
        }
    }

    struct Short;

    impl EntropySource for Short {
        fn random_bytes(&self, count: usize) -> Result<Vec<u8>, EntropyError> {
            Ok(vec![0; count / 2])
        }

        fn is_cryptographically_secure(&self) -> bool {
            true
        }
    }

    #[test]
    fn length_from_bits() {
        let entropy = Counting::new(true);

        assert_eq!(16, create_secret(&entropy, 80, true).unwrap().len());
        assert_eq!(65, create_secret(&entropy, 321, true).unwrap().len());
        assert_eq!(32, create_secret(&entropy, 160, true).unwrap().len());
        assert_eq!("", create_secret(&entropy, 0, true).unwrap());
    }

    #[test]
    fn maps_lower_bits_to_alphabet() {
        let secret = create_secret(&Counting::new(true), 8 * 5 * 5, true).unwrap();

        assert_eq!(
            "ABCDEFGHIJKLMNOPQRSTUVWXYZ234567ABCDEFGH",
            secret
        );
        assert!(base32::decode(&secret).is_ok());
    }

    #[test]
    fn insecure_source_rejected() {
        let entropy = Counting::new(false);
        let err = create_secret(&entropy, 80, true).unwrap_err();

        assert!(matches!(err, Error::InsecureEntropySource));
        assert_eq!(0, entropy.calls.get());
    }

    #[test]
    fn insecure_source_allowed() {
        let entropy = Counting::new(false);

        assert_eq!(16, create_secret(&entropy, 80, false).unwrap().len());
        assert_eq!(1, entropy.calls.get());
    }

    #[test]
    fn short_read() {
        assert!(matches!(
            create_secret(&Short, 80, true),
            Err(Error::Entropy(_))
        ));
    }
}
