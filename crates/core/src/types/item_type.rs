//! The closed set of battle item types.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an [`ItemType`] from a string.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown item type: {0}")]
pub struct ItemTypeError(pub String);

/// The kind of a battle item.
///
/// This is a closed set: the per-type stats summary always returns exactly one
/// entry per variant, so adding a variant here changes the wire contract of
/// `/api/stats/items-summary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemType {
    Glove,
    StunHammer,
    Mist,
    Time,
    SecondBooster,
    ThirdBooster,
}

impl ItemType {
    /// Every item type, in canonical display order.
    pub const ALL: [Self; 6] = [
        Self::Glove,
        Self::StunHammer,
        Self::Mist,
        Self::Time,
        Self::SecondBooster,
        Self::ThirdBooster,
    ];

    /// The wire/database representation (`SCREAMING_SNAKE_CASE`).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Glove => "GLOVE",
            Self::StunHammer => "STUN_HAMMER",
            Self::Mist => "MIST",
            Self::Time => "TIME",
            Self::SecondBooster => "SECOND_BOOSTER",
            Self::ThirdBooster => "THIRD_BOOSTER",
        }
    }

    /// Parse an `ItemType` from its wire representation.
    ///
    /// # Errors
    ///
    /// Returns [`ItemTypeError`] if the input is not one of the declared types.
    pub fn parse(s: &str) -> Result<Self, ItemTypeError> {
        match s {
            "GLOVE" => Ok(Self::Glove),
            "STUN_HAMMER" => Ok(Self::StunHammer),
            "MIST" => Ok(Self::Mist),
            "TIME" => Ok(Self::Time),
            "SECOND_BOOSTER" => Ok(Self::SecondBooster),
            "THIRD_BOOSTER" => Ok(Self::ThirdBooster),
            other => Err(ItemTypeError(other.to_owned())),
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ItemType {
    type Err = ItemTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// SQLx support (with postgres feature) - stored as TEXT
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for ItemType {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for ItemType {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for ItemType {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_variants() {
        for ty in ItemType::ALL {
            assert_eq!(ItemType::parse(ty.as_str()).unwrap(), ty);
        }
    }

    #[test]
    fn test_parse_unknown() {
        let err = ItemType::parse("SWORD").unwrap_err();
        assert_eq!(err.0, "SWORD");
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert!(ItemType::parse("glove").is_err());
    }

    #[test]
    fn test_all_has_no_duplicates() {
        for (i, a) in ItemType::ALL.iter().enumerate() {
            for b in ItemType::ALL.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_serde_wire_form() {
        let json = serde_json::to_string(&ItemType::StunHammer).unwrap();
        assert_eq!(json, "\"STUN_HAMMER\"");

        let parsed: ItemType = serde_json::from_str("\"SECOND_BOOSTER\"").unwrap();
        assert_eq!(parsed, ItemType::SecondBooster);
    }

    #[test]
    fn test_from_str() {
        let ty: ItemType = "MIST".parse().unwrap();
        assert_eq!(ty, ItemType::Mist);
    }
}
