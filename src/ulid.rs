use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
    time::{Duration, SystemTime},
};

#[cfg(feature = "rand")]
use crate::generator;
use crate::{base32, Error, RANDOM_LEN, RANDOM_MASK, TIME_LEN, TIME_MAX, ULID_LEN};

/// A ULID together with the case it is rendered in.
///
/// The 26 characters are kept in canonical (uppercase) form. The `lowercase` flag
/// only changes how the ULID is printed: equality, ordering and hashing ignore it.
///
/// ```
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use crock_ulid::Ulid;
///
// cspell:disable-next-line
/// let upper = Ulid::from_string("01AN4Z07BY79KA1307SR9X4MV3", false)?;
// cspell:disable-next-line
/// let lower = Ulid::from_string("01AN4Z07BY79KA1307SR9X4MV3", true)?;
///
/// assert_eq!(upper, lower);
// cspell:disable-next-line
/// assert_eq!(lower.to_string(), "01an4z07by79ka1307sr9x4mv3");
/// # Ok(()) }
/// ```
#[derive(Clone, Copy)]
pub struct Ulid {
    chars: [u8; ULID_LEN],
    lowercase: bool,
}

impl Ulid {
    /// Generates a new ULID from the system clock using the process-wide generator.
    ///
    /// ULIDs generated within the same millisecond are strictly increasing.
    ///
    /// # Errors
    ///
    /// Fails if the system clock is before the Unix epoch, or if the randomness of the
    /// current millisecond is exhausted.
    ///
    /// # Example
    ///
    /// ```
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use crock_ulid::Ulid;
    ///
    /// let u1 = Ulid::generate(false)?;
    /// let u2 = Ulid::generate(false)?;
    ///
    /// assert!(u1 < u2);
    /// assert!(u1.to_string() < u2.to_string());
    /// # Ok(()) }
    /// ```
    #[cfg(feature = "rand")]
    pub fn generate(lowercase: bool) -> Result<Self, Error> {
        generator::default_generator().generate(lowercase)
    }

    /// Generates a new ULID for the given millisecond using the process-wide generator.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::TimestampOverflow`] if the timestamp does not fit into ten
    /// Base32 characters, and with [`Error::RandomnessExhausted`] if the randomness of
    /// this millisecond is used up.
    ///
    /// # Example
    ///
    /// ```
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use crock_ulid::Ulid;
    ///
    /// let u = Ulid::from_timestamp(1_593_048_767_015, false)?;
    ///
    /// assert_eq!(u.time(), "01EBMHP6H7");
    /// assert_eq!(u.to_timestamp()?, 1_593_048_767_015);
    /// # Ok(()) }
    /// ```
    #[cfg(feature = "rand")]
    pub fn from_timestamp(timestamp: u64, lowercase: bool) -> Result<Self, Error> {
        generator::default_generator().generate_with_timestamp(timestamp, lowercase)
    }

    /// Parses a ULID string.
    ///
    /// Parsing is case-insensitive. The returned ULID is rendered according to
    /// `lowercase`, regardless of the case of `value`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidFormat`] if `value` is not exactly 26 bytes long (no trimming is done).
    /// - [`Error::InvalidAlphabet`] if `value` contains a character outside the Crockford
    ///   Base32 alphabet, including `I`, `L`, `O` and `U`.
    pub fn from_string(value: &str, lowercase: bool) -> Result<Self, Error> {
        let mut chars = *base32::as_array(value.as_bytes())?;
        base32::canonicalize(&mut chars)?;
        Ok(Self { chars, lowercase })
    }

    /// Creates a ULID from a timestamp and randomness.
    ///
    /// # Errors
    ///
    /// Fails if the timestamp exceeds [`TIME_MAX`](crate::TIME_MAX) or the randomness
    /// exceeds 80 bits.
    ///
    /// # Example
    ///
    /// ```
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use crock_ulid::Ulid;
    ///
    /// let u = Ulid::from_parts(1_561_622_862, 1)?;
    ///
    /// assert_eq!(u.to_string(), "0001EH8YAE0000000000000001");
    /// assert_eq!(u.to_parts()?, (1_561_622_862, 1));
    /// # Ok(()) }
    /// ```
    pub fn from_parts(timestamp: u64, randomness: u128) -> Result<Self, Error> {
        if timestamp > TIME_MAX {
            return Err(Error::TimestampOverflow);
        }
        if randomness > RANDOM_MASK {
            return Err(Error::RandomnessOutOfRange);
        }

        let mut digits = [0; RANDOM_LEN];
        base32::randomness_to_digits(randomness, &mut digits);

        Ok(Self::from_fields(timestamp, &digits, false))
    }

    /// Builds a ULID from an encodable timestamp and digits in `0..32`.
    pub(crate) fn from_fields(timestamp: u64, digits: &[u8; RANDOM_LEN], lowercase: bool) -> Self {
        let mut chars = [0; ULID_LEN];
        let (time, randomness) = chars.split_at_mut(TIME_LEN);
        base32::encode_time(timestamp, time);
        base32::encode_digits(digits, randomness);
        Self { chars, lowercase }
    }

    /// Returns the encoded timestamp field (10 characters), in the rendered case.
    #[must_use]
    pub fn time(&self) -> String {
        self.render_field(&self.chars[..TIME_LEN])
    }

    /// Returns the encoded randomness field (16 characters), in the rendered case.
    #[must_use]
    pub fn randomness(&self) -> String {
        self.render_field(&self.chars[TIME_LEN..])
    }

    /// Returns `true` if this ULID is rendered in lowercase.
    #[must_use]
    pub const fn is_lowercase(&self) -> bool {
        self.lowercase
    }

    /// Returns a copy of this ULID rendered in the requested case.
    #[must_use]
    pub const fn with_lowercase(self, lowercase: bool) -> Self {
        Self {
            chars: self.chars,
            lowercase,
        }
    }

    /// Returns the canonical (uppercase) form without allocating.
    #[must_use]
    pub fn as_canonical_str(&self) -> &str {
        // Safety: `chars` only ever holds bytes of the alphabet
        unsafe { base32::as_str(&self.chars) }
    }

    /// Decodes the timestamp in milliseconds since the Unix epoch.
    ///
    /// # Errors
    ///
    /// The timestamp field can hold 50 bits, but only 48 bits are valid. A ULID which
    /// parsed successfully may still fail here with [`Error::TimestampOverflow`].
    ///
    /// # Example
    ///
    /// ```
    /// use crock_ulid::{Error, Ulid};
    ///
    /// let u = Ulid::from_string("0001EH8YAEP8CXP4AMWCHHDBHJ", false).unwrap();
    /// assert_eq!(u.to_timestamp(), Ok(1561622862));
    ///
    /// let u = Ulid::from_string("80000000000000000000000000", false).unwrap();
    /// assert_eq!(u.to_timestamp(), Err(Error::TimestampOverflow));
    /// ```
    pub fn to_timestamp(&self) -> Result<u64, Error> {
        base32::decode_time(&self.chars[..TIME_LEN])
    }

    /// Decodes the 80-bit randomness.
    #[must_use]
    pub fn randomness_value(&self) -> u128 {
        // The canonical bytes are always valid alphabet characters.
        base32::decode_value(&self.chars[TIME_LEN..]).unwrap_or_default()
    }

    /// Returns the timestamp and randomness as a pair.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::TimestampOverflow`] like [`Ulid::to_timestamp`].
    pub fn to_parts(&self) -> Result<(u64, u128), Error> {
        Ok((self.to_timestamp()?, self.randomness_value()))
    }

    /// Returns the timestamp as a [`SystemTime`].
    ///
    /// # Errors
    ///
    /// Fails with [`Error::TimestampOverflow`] if the timestamp is out of range for
    /// a ULID or for [`SystemTime`].
    pub fn datetime(&self) -> Result<SystemTime, Error> {
        SystemTime::UNIX_EPOCH
            .checked_add(Duration::from_millis(self.to_timestamp()?))
            .ok_or(Error::TimestampOverflow)
    }

    fn render_field(&self, field: &[u8]) -> String {
        // Safety: `field` is a sub-slice of `chars`
        let field = unsafe { base32::as_str(field) };
        if self.lowercase {
            field.to_ascii_lowercase()
        } else {
            field.to_owned()
        }
    }
}

impl PartialEq for Ulid {
    fn eq(&self, other: &Self) -> bool {
        self.chars == other.chars
    }
}

impl Eq for Ulid {}

impl PartialOrd for Ulid {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ulid {
    fn cmp(&self, other: &Self) -> Ordering {
        self.chars.cmp(&other.chars)
    }
}

impl Hash for Ulid {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.chars.hash(state);
    }
}

impl fmt::Debug for Ulid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ulid")
            .field("string", &self.as_canonical_str())
            .field("timestamp", &self.to_timestamp().ok())
            .field("randomness", &format!("{:020X}", self.randomness_value()))
            .field("lowercase", &self.lowercase)
            .finish()
    }
}

impl fmt::Display for Ulid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buffer = self.chars;
        if self.lowercase {
            buffer.make_ascii_lowercase();
        }
        // Safety: lowercasing alphabet bytes keeps them ASCII
        f.pad(unsafe { base32::as_str(&buffer) })
    }
}

impl FromStr for Ulid {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s, false)
    }
}

impl TryFrom<&str> for Ulid {
    type Error = Error;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::from_string(s, false)
    }
}

impl From<Ulid> for String {
    fn from(ulid: Ulid) -> Self {
        ulid.to_string()
    }
}
