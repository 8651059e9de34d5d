//! Base32 codec following [RFC 4648](https://www.rfc-editor.org/rfc/rfc4648#section-6), the
//! format shared secrets are exchanged in.
//!
//! Encoding never emits `=` padding. Decoding accepts input with or without padding and silently
//! discards trailing bits that don't form a full byte.

/// The RFC 4648 Base32 alphabet.
pub const ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";
/// Character used to pad encoded data to a multiple of 8 characters.
pub const PADDING: char = '=';

const INVALID: u8 = 0xff;

/// Reverse lookup from ASCII character to its 5-bit value, [`INVALID`] for anything outside the
/// alphabet.
const DECODE_TABLE: [u8; 128] = {
    let mut table = [INVALID; 128];
    let mut i = 0;
    while i < ALPHABET.len() {
        table[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    table
};

/// Error returned when the input contains a character outside of the Base32 alphabet.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid Base32 character `{character}` at position {position}")]
pub struct DecodeError {
    /// The offending character.
    pub character: char,
    /// Byte position of the character within the input.
    pub position: usize,
}

/// Encode the given bytes as unpadded Base32 text.
///
/// The last character is filled up with zero bits if the input length isn't a multiple of 5
/// bytes, so that [`decode`] reproduces the exact input.
#[must_use]
pub fn encode(data: &[u8]) -> String {
    let mut out = String::with_capacity((data.len() * 8 + 4) / 5);
    let mut buffer = 0_u32;
    let mut bits = 0_u32;

    for &byte in data {
        buffer = (buffer << 8) | u32::from(byte);
        bits += 8;

        while bits >= 5 {
            bits -= 5;
            out.push(char::from(ALPHABET[((buffer >> bits) & 0x1f) as usize]));
        }
    }

    if bits > 0 {
        out.push(char::from(ALPHABET[((buffer << (5 - bits)) & 0x1f) as usize]));
    }

    out
}

/// Decode Base32 text back into raw bytes.
///
/// Padding characters are skipped and any bits left over after the last full byte are dropped.
pub fn decode(text: &str) -> Result<Vec<u8>, DecodeError> {
    let mut out = Vec::with_capacity(text.len() * 5 / 8);
    let mut buffer = 0_u32;
    let mut bits = 0_u32;

    for (position, character) in text.char_indices() {
        if character == PADDING {
            continue;
        }

        let value = value_of(character).ok_or(DecodeError {
            character,
            position,
        })?;

        buffer = (buffer << 5) | u32::from(value);
        bits += 5;

        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
        }
    }

    Ok(out)
}

/// Map a single character of the alphabet to its 5-bit value.
#[inline]
fn value_of(c: char) -> Option<u8> {
    let value = *DECODE_TABLE.get(c as usize)?;
    (value != INVALID).then_some(value)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const RFC_VECTORS: &[(&str, &str, &str)] = &[
        ("", "", ""),
        ("f", "MY======", "MY"),
        ("fo", "MZXQ====", "MZXQ"),
        ("foo", "MZXW6===", "MZXW6"),
        ("foob", "MZXW6YQ=", "MZXW6YQ"),
        ("fooba", "MZXW6YTB", "MZXW6YTB"),
        ("foobar", "MZXW6YTBOI======", "MZXW6YTBOI"),
    ];

    #[test]
    fn encode_rfc_vectors() {
        for (plain, _, unpadded) in RFC_VECTORS {
            assert_eq!(*unpadded, encode(plain.as_bytes()));
        }
    }

    #[test]
    fn decode_rfc_vectors() {
        for (plain, padded, unpadded) in RFC_VECTORS {
            assert_eq!(plain.as_bytes(), decode(padded).unwrap().as_slice());
            assert_eq!(plain.as_bytes(), decode(unpadded).unwrap().as_slice());
        }
    }

    #[test]
    fn round_trip_any_length() {
        let data = (0..=255_u8).rev().collect::<Vec<_>>();

        for len in 0..=41 {
            let slice = &data[..len];
            assert_eq!(slice, decode(&encode(slice)).unwrap().as_slice());
        }
    }

    #[test]
    fn rfc6238_secret() {
        assert_eq!(
            "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ",
            encode(b"12345678901234567890")
        );
    }

    #[test]
    fn decode_rejects_outside_alphabet() {
        for (input, character, position) in [
            ("mzxw6", 'm', 0),
            ("MZXW0", '0', 4),
            ("MZX1", '1', 3),
            ("8MZX", '8', 0),
            ("MZ9X", '9', 2),
            ("MZ X", ' ', 2),
            ("MZÄX", 'Ä', 2),
        ] {
            assert_eq!(
                Err(DecodeError {
                    character,
                    position
                }),
                decode(input)
            );
        }
    }

    #[test]
    fn decode_drops_incomplete_bits() {
        // 3 characters carry 15 bits, only the first full byte survives.
        assert_eq!(vec![0x66], decode("MZX").unwrap());
    }
}
