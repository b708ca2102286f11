//! # Case-Aware ULIDs
//!
//! This crate generates and parses ULIDs (Universally Unique Lexicographically Sortable Identifiers):
//! 26 characters of Crockford Base32, ten for a millisecond timestamp and sixteen for randomness.
//! ULIDs generated later sort after earlier ones, both as values and as plain strings.
//!
//! ## Generating ULIDs
//!
//! ULIDs are generated using the [`Ulid::generate()`] method. The flag selects lowercase output:
//!
//! ```
//! # use std::error::Error;
//! # fn main() -> Result<(), Box<dyn Error>> {
//! use crock_ulid::Ulid;
//!
//! let u = Ulid::generate(false)?;
//!
//! println!("Generated ULID: {u}");
//! # Ok(()) }
//! ```
//!
//! Within the same millisecond, the random part of the previous ULID is incremented
//! by one instead of drawing new randomness, so ULIDs from one generator are strictly increasing.
//! For control over the clock and the random source, create your own [`Generator`].
//!
//! ## Parsing ULIDs
//!
//! Parsing is case-insensitive, and the letters `I`, `L`, `O` and `U` are rejected:
//!
//! ```
//! # use std::error::Error;
//! # fn main() -> Result<(), Box<dyn Error>> {
//! use crock_ulid::{Error, Ulid};
//!
// cspell:disable-next-line
//! let u = Ulid::from_string("01an4z07by79ka1307sr9x4mv3", false)?;
// cspell:disable-next-line
//! assert_eq!(u.to_string(), "01AN4Z07BY79KA1307SR9X4MV3");
//!
//! assert_eq!(
//!     Ulid::from_string("0001EH8YAEP8CXP4AMWCHHDBHI", false),
//!     Err(Error::InvalidAlphabet)
//! );
//! # Ok(()) }
//! ```
//!
//! ## Feature Flags
//!
//! - **`rand`**: Utilizes the `rand` crate as the source for random numbers, enabled by default.
//!   Provides [`StdRandom`], [`Generator::new()`] and the process-wide generator.
//! - **`serde`**: Provides support for serialization and deserialization via `Serde`, optional.
//!

mod base32;
mod error;
mod generator;
#[cfg(feature = "serde")]
mod serde;
mod ulid;

use std::borrow::Cow;

pub use error::Error;
#[cfg(feature = "rand")]
pub use generator::{default_generator, StdRandom};
pub use generator::{Clock, Generator, RandomSource, SystemClock};
pub use ulid::Ulid;

/// Number of characters of a ULID string.
pub const ULID_LEN: usize = TIME_LEN + RANDOM_LEN;
/// Number of characters of the timestamp field.
pub const TIME_LEN: usize = 10;
/// Number of characters of the randomness field.
pub const RANDOM_LEN: usize = 16;

/// Largest valid timestamp (48 bits), around the year 10889.
pub const TIME_MAX: u64 = (1 << 48) - 1;

// Ten characters have room for 50 bits.
const TIME_ENCODABLE_MAX: u64 = (1 << (5 * TIME_LEN)) - 1;

const RANDOM_BITS: u32 = 80;
const RANDOM_MASK: u128 = (1 << RANDOM_BITS) - 1;

/// Canonicalizes a ULID string by converting it to uppercase.
///
/// If the input is already in canonical form, it returns a borrowed version of the input string
/// without allocating a new `String`.
///
/// # Errors
///
/// The string must have the correct length (26) and contain only characters of the alphabet.
///
/// # Example
///
/// ```
// cspell:disable-next-line
/// let s = "01an4z07by79ka1307sr9x4mv3";
///
// cspell:disable-next-line
/// assert_eq!(crock_ulid::canonicalize(s), Ok("01AN4Z07BY79KA1307SR9X4MV3".into()));
/// ```
pub fn canonicalize(ulid: &str) -> Result<Cow<'_, str>, Error> {
    let mut buffer = *base32::as_array(ulid.as_bytes())?;
    let cleaned = base32::canonicalize(&mut buffer)?;

    if cleaned == ulid {
        Ok(ulid.into())
    } else {
        Ok(cleaned.to_string().into())
    }
}

/// Checks a ULID string for validity.
///
/// To be valid, a ULID must have the correct length (26) and contain only characters
/// of the alphabet, in any case. The timestamp range is not checked.
///
/// # Errors
///
/// If the ULID string is not valid, an appropriate error is returned.
///
/// # Example
///
/// ```
/// use crock_ulid::Error;
///
/// assert!(crock_ulid::validate("01AN4Z07BY79KA1307SR9X4MV3").is_ok());
// cspell:disable-next-line
/// assert!(crock_ulid::validate("01an4z07by79ka1307sr9x4mv3").is_ok());
///
/// assert_eq!(crock_ulid::validate("not-a-valid-ulid"), Err(Error::InvalidFormat { length: 16 }));
/// assert_eq!(crock_ulid::validate("0001EH8YAEP8CXP4AMWCHHDBHU"), Err(Error::InvalidAlphabet));
/// ```
pub fn validate(ulid: &str) -> Result<(), Error> {
    let buffer = base32::as_array(ulid.as_bytes())?;
    base32::validate(buffer)
}

/// Encodes a millisecond timestamp as a ten character timestamp field.
///
/// # Errors
///
/// Fails with [`Error::TimestampOverflow`] if the timestamp does not fit into ten characters.
///
/// # Example
///
/// ```
/// assert_eq!(crock_ulid::encode_time(1_593_048_767_015).unwrap(), "01EBMHP6H7");
/// ```
pub fn encode_time(timestamp: u64) -> Result<String, Error> {
    if timestamp > TIME_ENCODABLE_MAX {
        return Err(Error::TimestampOverflow);
    }

    let mut buffer = [0; TIME_LEN];
    base32::encode_time(timestamp, &mut buffer);

    // Safety: `encode_time` writes alphabet bytes only
    Ok(unsafe { base32::as_str(&buffer) }.to_owned())
}

/// Decodes a ten character timestamp field, case-insensitive.
///
/// # Errors
///
/// - [`Error::InvalidFormat`] if the field is not ten characters long.
/// - [`Error::InvalidCharacter`] if it contains a character outside the alphabet.
/// - [`Error::TimestampOverflow`] if the value exceeds [`TIME_MAX`].
///
/// # Example
///
/// ```
/// use crock_ulid::Error;
///
/// assert_eq!(crock_ulid::decode_time("01EBMHP6H7"), Ok(1_593_048_767_015));
/// assert_eq!(crock_ulid::decode_time("ZZZZZZZZZZ"), Err(Error::TimestampOverflow));
/// ```
pub fn decode_time(field: &str) -> Result<u64, Error> {
    base32::decode_time(field.as_bytes())
}
