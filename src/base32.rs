use std::str::from_utf8_unchecked;

use crate::{Error, TIME_LEN, TIME_MAX, ULID_LEN};

// cspell:disable-next-line
pub const ALPHABET: [u8; 32] = *b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

#[rustfmt::skip]
const DECODE: [i8; 256] = [
    /* 0x00 */  -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    /* 0x10 */  -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    /* 0x20 */  -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    /* 0x30 */   0,  1,  2,  3,  4,  5,  6,  7,  8,  9, -1, -1, -1, -1, -1, -1,
    /* 0x40 */  -1, 10, 11, 12, 13, 14, 15, 16, 17, -1, 18, 19, -1, 20, 21, -1,
    /* 0x50 */  22, 23, 24, 25, 26, -1, 27, 28, 29, 30, 31, -1, -1, -1, -1, -1,
    /* 0x60 */  -1, 10, 11, 12, 13, 14, 15, 16, 17, -1, 18, 19, -1, 20, 21, -1,
    /* 0x70 */  22, 23, 24, 25, 26, -1, 27, 28, 29, 30, 31, -1, -1, -1, -1, -1,
    /* 0x80 */  -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    /* 0x90 */  -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    /* 0xA0 */  -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    /* 0xB0 */  -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    /* 0xC0 */  -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    /* 0xD0 */  -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    /* 0xE0 */  -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    /* 0xF0 */  -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
];

/// Index of `c` in the alphabet, case-insensitive. I, L, O and U have none.
fn digit_of(c: u8) -> Option<u8> {
    u8::try_from(DECODE[usize::from(c)]).ok()
}

pub fn as_array(bytes: &[u8]) -> Result<&[u8; ULID_LEN], Error> {
    bytes
        .try_into()
        .map_err(|_| Error::InvalidFormat { length: bytes.len() })
}

/// Writes `n` as `buffer.len()` base-32 digits, most significant first.
///
/// Digits beyond the buffer width are silently dropped, so callers must
/// check `n < 32^width` themselves.
pub fn encode_time(mut n: u64, buffer: &mut [u8]) {
    for byte in buffer.iter_mut().rev() {
        *byte = ALPHABET[(n % 32) as usize];
        n /= 32;
    }
}

/// Maps each digit (`0..32`) through the alphabet.
pub fn encode_digits(digits: &[u8], buffer: &mut [u8]) {
    for (byte, &digit) in buffer.iter_mut().zip(digits) {
        *byte = ALPHABET[usize::from(digit)];
    }
}

/// Splits an 80-bit integer into 16 big-endian base-32 digits.
pub fn randomness_to_digits(mut n: u128, digits: &mut [u8]) {
    for digit in digits.iter_mut().rev() {
        *digit = (n & 0x1F) as u8;
        n >>= 5;
    }
}

/// Accumulates base-32 digits into an integer, least significant first.
///
/// Only used for fields up to 16 digits, which always fit into an `u128`.
pub fn decode_value(field: &[u8]) -> Result<u128, Error> {
    let mut sum = 0;
    for (position, &c) in field.iter().rev().enumerate() {
        let digit = digit_of(c).ok_or(Error::InvalidCharacter)?;
        sum += u128::from(digit) << (5 * position);
    }
    Ok(sum)
}

pub fn decode_time(field: &[u8]) -> Result<u64, Error> {
    if field.len() != TIME_LEN {
        return Err(Error::InvalidFormat { length: field.len() });
    }

    let value = decode_value(field)?;
    match u64::try_from(value) {
        Ok(millis) if millis <= TIME_MAX => Ok(millis),
        _ => Err(Error::TimestampOverflow),
    }
}

pub fn validate(buffer: &[u8; ULID_LEN]) -> Result<(), Error> {
    if buffer.iter().all(|&c| digit_of(c).is_some()) {
        Ok(())
    } else {
        Err(Error::InvalidAlphabet)
    }
}

/// Uppercases the buffer in place, rejecting characters outside the alphabet.
pub fn canonicalize(buffer: &mut [u8; ULID_LEN]) -> Result<&str, Error> {
    for byte in buffer.iter_mut() {
        let digit = digit_of(*byte).ok_or(Error::InvalidAlphabet)?;
        *byte = ALPHABET[usize::from(digit)];
    }

    // Safety: Above code guarantees valid UTF-8 (it returns early, when not)
    Ok(unsafe { from_utf8_unchecked(buffer) })
}

/// Views alphabet bytes as a string.
///
/// # Safety
///
/// Every byte must be taken from [`ALPHABET`] or be its lowercase form.
pub unsafe fn as_str(bytes: &[u8]) -> &str {
    unsafe { from_utf8_unchecked(bytes) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_excludes_ambiguous_letters() {
        for c in [b'I', b'L', b'O', b'U', b'i', b'l', b'o', b'u'] {
            assert_eq!(digit_of(c), None, "{}", c as char);
            assert!(!ALPHABET.contains(&c.to_ascii_uppercase()));
        }
    }

    #[test]
    fn test_decode_table_matches_alphabet() {
        for (index, &c) in ALPHABET.iter().enumerate() {
            assert_eq!(digit_of(c), Some(index as u8));
            assert_eq!(digit_of(c.to_ascii_lowercase()), Some(index as u8));
        }
        assert_eq!(DECODE.iter().filter(|&&d| d >= 0).count(), 32 + 22);
    }

    #[test]
    fn test_encode_time() {
        let mut buffer = [0; TIME_LEN];

        encode_time(0, &mut buffer);
        assert_eq!(&buffer, b"0000000000");

        encode_time(1_593_048_767_015, &mut buffer);
        assert_eq!(&buffer, b"01EBMHP6H7");

        encode_time(TIME_MAX, &mut buffer);
        assert_eq!(&buffer, b"7ZZZZZZZZZ");

        encode_time((1 << 50) - 1, &mut buffer);
        assert_eq!(&buffer, b"ZZZZZZZZZZ");
    }

    #[test]
    fn test_decode_time() {
        assert_eq!(decode_time(b"0001EH8YAE"), Ok(1_561_622_862));
        assert_eq!(decode_time(b"0001eh8yae"), Ok(1_561_622_862));
        assert_eq!(decode_time(b"7ZZZZZZZZZ"), Ok(TIME_MAX));
        assert_eq!(decode_time(b"8000000000"), Err(Error::TimestampOverflow));
        assert_eq!(decode_time(b"000000000U"), Err(Error::InvalidCharacter));
        assert_eq!(decode_time(b"00000-0000"), Err(Error::InvalidCharacter));
        assert_eq!(decode_time(b"0001EH8YA"), Err(Error::InvalidFormat { length: 9 }));
    }

    #[test]
    fn test_randomness_digits() {
        let mut digits = [0; 16];
        randomness_to_digits((1 << 80) - 1, &mut digits);
        assert_eq!(digits, [31; 16]);

        randomness_to_digits(33, &mut digits);
        assert_eq!(digits[14..], [1, 1]);
        assert!(digits[..14].iter().all(|&d| d == 0));

        let mut buffer = [0; 16];
        encode_digits(&digits, &mut buffer);
        assert_eq!(&buffer, b"0000000000000011");
        assert_eq!(decode_value(&buffer), Ok(33));
    }

    #[test]
    fn test_canonicalize() {
        // cspell:disable-next-line
        let mut buffer = *b"01an4z07by79ka1307sr9x4mv3";
        // cspell:disable-next-line
        assert_eq!(canonicalize(&mut buffer), Ok("01AN4Z07BY79KA1307SR9X4MV3"));

        let mut buffer = *b"0001eh8yaep8cxp4amwchhdbho";
        assert_eq!(canonicalize(&mut buffer), Err(Error::InvalidAlphabet));
    }

    #[test]
    fn test_as_array() {
        assert!(as_array(b"01AN4Z07BY79KA1307SR9X4MV3").is_ok());
        assert_eq!(as_array(b"").unwrap_err(), Error::InvalidFormat { length: 0 });
        assert_eq!(
            as_array(b"01AN4Z07BY79KA1307SR9X4MV3\n").unwrap_err(),
            Error::InvalidFormat { length: 27 }
        );
    }
}
