//! `#[serde(with = "...")]` adapters for [`GalaxyId`] fields.
//!
//! The derived impl writes the raw integer. JSON consumers that parse numbers
//! as doubles lose precision past 2^53, so API payloads use [`as_string`].
//!
//! [`GalaxyId`]: crate::GalaxyId

/// Serialize a [`GalaxyId`] as its native `u64`, rejecting the reserved bit
/// on the way back in.
///
/// [`GalaxyId`]: crate::GalaxyId
pub mod as_native {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::{GalaxyId, ParseIdError, SnowflakeId};

    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S>(id: &GalaxyId, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        id.to_raw().serialize(s)
    }

    /// # Errors
    ///
    /// Returns an error if the deserializer fails or the reserved top bit is
    /// set.
    pub fn deserialize<'de, D>(d: D) -> Result<GalaxyId, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = u64::deserialize(d)?;
        if raw & GalaxyId::RESERVED_MASK != 0 {
            return Err(serde::de::Error::custom(ParseIdError::ReservedBitSet {
                raw,
            }));
        }
        Ok(GalaxyId::from_raw(raw))
    }
}

/// Serialize a [`GalaxyId`] as its decimal string.
///
/// [`GalaxyId`]: crate::GalaxyId
pub mod as_string {
    use serde::{Deserializer, Serializer};

    use crate::GalaxyId;

    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S>(id: &GalaxyId, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.collect_str(id)
    }

    /// # Errors
    ///
    /// Returns an error if the input is not a string holding a valid
    /// [`GalaxyId`].
    pub fn deserialize<'de, D>(d: D) -> Result<GalaxyId, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DecimalVisitor;

        impl serde::de::Visitor<'_> for DecimalVisitor {
            type Value = GalaxyId;

            fn expecting(&self, formatter: &mut core::fmt::Formatter) -> core::fmt::Result {
                formatter.write_str("a decimal galaxy id string")
            }

            #[inline]
            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                v.parse().map_err(serde::de::Error::custom)
            }
        }

        d.deserialize_str(DecimalVisitor)
    }
}
