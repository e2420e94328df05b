//! Serde utilities for archive payloads.

use serde::de::{self, Visitor};
use serde::Deserializer;
use std::fmt;

/// Module to handle deserialization of message IDs that might be strings or numbers.
pub mod string_to_u64 {
    use super::{Deserializer, Visitor, de, fmt};

    /// Deserializes a u64 from a string or number.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a string or a non-negative integer.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct StringOrIntVisitor;

        impl Visitor<'_> for StringOrIntVisitor {
            type Value = u64;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or integer representing a message ID")
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(value)
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                u64::try_from(value).map_err(|_| E::custom(format!("negative message ID: {value}")))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                value.trim().parse::<u64>().map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_any(StringOrIntVisitor)
    }

    /// Module to handle deserialization of optional message IDs.
    pub mod option {
        use super::{Deserializer, Visitor, de, fmt};

        /// Deserializes an optional u64 from a string or number.
        ///
        /// # Errors
        ///
        /// Returns an error if deserialization fails.
        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
        where
            D: Deserializer<'de>,
        {
            struct OptionVisitor;

            impl<'de> Visitor<'de> for OptionVisitor {
                type Value = Option<u64>;

                fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                    formatter.write_str("optional message ID")
                }

                fn visit_none<E>(self) -> Result<Self::Value, E>
                where
                    E: de::Error,
                {
                    Ok(None)
                }

                fn visit_unit<E>(self) -> Result<Self::Value, E>
                where
                    E: de::Error,
                {
                    Ok(None)
                }

                fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
                where
                    D: Deserializer<'de>,
                {
                    super::deserialize(deserializer).map(Some)
                }
            }
            deserializer.deserialize_option(OptionVisitor)
        }
    }
}
