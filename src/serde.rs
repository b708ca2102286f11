use std::fmt;

use serde::{
    de::{self, Deserializer, Visitor},
    Deserialize, Serialize, Serializer,
};

use crate::Ulid;

impl Serialize for Ulid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Ulid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct UlidVisitor;

        impl Visitor<'_> for UlidVisitor {
            type Value = Ulid;
            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a 26 character Crockford Base32 ULID string")
            }
            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                // Keep lowercase input lowercase, so values survive a round trip unchanged.
                let lowercase = value.bytes().any(|b| b.is_ascii_lowercase())
                    && !value.bytes().any(|b| b.is_ascii_uppercase());
                Ulid::from_string(value, lowercase).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_str(UlidVisitor)
    }
}

#[cfg(test)]
mod tests {
    use serde_derive::{Deserialize, Serialize};

    use crate::{Error, Ulid};

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Record {
        id: Ulid,
    }

    #[test]
    fn test_round_trip_keeps_case() {
        // cspell:disable-next-line
        let json = r#"{"id":"01an4z07by79ka1307sr9x4mv3"}"#;
        let record: Record = serde_json::from_str(json).unwrap();
        assert!(record.id.is_lowercase());
        assert_eq!(serde_json::to_string(&record).unwrap(), json);

        // cspell:disable-next-line
        let json = r#"{"id":"01AN4Z07BY79KA1307SR9X4MV3"}"#;
        let record: Record = serde_json::from_str(json).unwrap();
        assert!(!record.id.is_lowercase());
        assert_eq!(serde_json::to_string(&record).unwrap(), json);
    }

    #[test]
    fn test_rejects_invalid() {
        let err = serde_json::from_str::<Record>(r#"{"id":"not-a-valid-ulid"}"#).unwrap_err();
        assert!(err.to_string().contains(&Error::InvalidFormat { length: 16 }.to_string()));
    }
}
