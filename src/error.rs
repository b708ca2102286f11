use thiserror::Error;

/// Errors that can occur when parsing or generating ULIDs.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Error)]
pub enum Error {
    /// The ULID string (or a timestamp field) does not have the expected length.
    #[error("invalid ULID string (wrong length): got {length} bytes")]
    InvalidFormat { length: usize },
    /// The ULID string contains a character outside of the Crockford Base32 alphabet.
    #[error("invalid ULID string (wrong characters)")]
    InvalidAlphabet,
    /// A timestamp field contains a character outside of the Crockford Base32 alphabet.
    #[error("invalid ULID string: timestamp contains an invalid character")]
    InvalidCharacter,
    /// The timestamp is too large.
    #[error("invalid ULID string: timestamp too large")]
    TimestampOverflow,
    /// The given randomness for the ULID is too large.
    #[error("randomness is too large")]
    RandomnessOutOfRange,
    /// All random digits are at their maximum and the millisecond has not advanced.
    #[error("randomness exhausted for the current millisecond")]
    RandomnessExhausted,
    /// The clock did not provide a usable timestamp.
    #[error("clock is unavailable")]
    ClockUnavailable,
    /// The random source produced a digit outside of `0..32`.
    #[error("random source produced an invalid digit")]
    InvalidEntropy,
}

impl Error {
    /// Returns `true` if the error was caused by malformed input text.
    #[must_use]
    pub const fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidFormat { .. } | Self::InvalidAlphabet | Self::InvalidCharacter | Self::TimestampOverflow
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            Error::InvalidFormat { length: 27 }.to_string(),
            "invalid ULID string (wrong length): got 27 bytes"
        );
        assert_eq!(Error::InvalidAlphabet.to_string(), "invalid ULID string (wrong characters)");
        assert_eq!(Error::TimestampOverflow.to_string(), "invalid ULID string: timestamp too large");
    }

    #[test]
    fn test_is_parse_error() {
        assert!(Error::InvalidAlphabet.is_parse_error());
        assert!(Error::InvalidFormat { length: 0 }.is_parse_error());
        assert!(!Error::RandomnessExhausted.is_parse_error());
        assert!(!Error::ClockUnavailable.is_parse_error());
    }
}
