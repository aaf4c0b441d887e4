// Common types used across multiple domains and layers
//
// Role and VerificationStatus live here because the auth layer (common) and
// the account model (domains) both need them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
#[error("Unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Implements `Display`, `FromStr` and PostgreSQL TEXT encoding for a
/// fieldless enum, given the database spelling of each variant.
#[macro_export]
macro_rules! impl_text_enum {
    ($ty:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = $crate::common::types::UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($ty::$variant),)+
                    _ => Err($crate::common::types::UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl sqlx::Type<sqlx::Postgres> for $ty {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <str as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <str as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl sqlx::Encode<'_, sqlx::Postgres> for $ty {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
            }
        }

        impl sqlx::Decode<'_, sqlx::Postgres> for $ty {
            fn decode(
                value: sqlx::postgres::PgValueRef<'_>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let text = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                Ok(text.parse::<$ty>()?)
            }
        }
    };
}

/// Account role, attached by the identity layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Standard,
    Artist,
    Admin,
}

impl_text_enum!(Role, "role", {
    Standard => "standard",
    Artist => "artist",
    Admin => "admin",
});

/// Account-level verification state, mirroring the latest request.
///
/// ```text
/// Unverified ─┐
///             ├─submit─► Pending ─approve─► Verified
/// Rejected ◄──┘             └──────reject──► Rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Unverified,
    Pending,
    Verified,
    Rejected,
}

impl_text_enum!(VerificationStatus, "verification status", {
    Unverified => "unverified",
    Pending => "pending",
    Verified => "verified",
    Rejected => "rejected",
});

impl VerificationStatus {
    /// States from which a new request may be submitted.
    pub fn can_submit(&self) -> bool {
        matches!(self, VerificationStatus::Unverified | VerificationStatus::Rejected)
    }
}

impl Default for VerificationStatus {
    fn default() -> Self {
        VerificationStatus::Unverified
    }
}
