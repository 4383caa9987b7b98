//! Non-negative point balance type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing [`Points`].
#[derive(thiserror::Error, Debug, Clone, Copy)]
pub enum PointsError {
    /// The input value is negative.
    #[error("points cannot be negative (got {0})")]
    Negative(i32),
}

/// A quantity of points.
///
/// Points are the single currency of the progression engine: task
/// completions credit them, achievement unlocks debit them, and the level
/// tables in [`crate::progression`] are keyed off them. The wrapper
/// guarantees the value is never negative, so a balance or a reward amount
/// can always be used without re-checking the sign.
///
/// ## Examples
///
/// ```
/// use fithero_core::Points;
///
/// let balance = Points::new(95)?;
/// let reward = Points::new(10)?;
///
/// let credited = balance.saturating_add(reward);
/// assert_eq!(credited.as_i32(), 105);
///
/// // Debits that would go negative are refused, not clamped
/// assert!(credited.checked_sub(Points::new(200)?).is_none());
/// # Ok::<(), fithero_core::PointsError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32")]
pub struct Points(i32);

impl Points {
    /// Zero points.
    pub const ZERO: Self = Self(0);

    /// Create a new `Points` value.
    ///
    /// # Errors
    ///
    /// Returns `PointsError::Negative` if `value` is below zero.
    pub const fn new(value: i32) -> Result<Self, PointsError> {
        if value < 0 {
            return Err(PointsError::Negative(value));
        }
        Ok(Self(value))
    }

    /// Get the underlying i32 value.
    #[must_use]
    pub const fn as_i32(&self) -> i32 {
        self.0
    }

    /// Add two point amounts, saturating at `i32::MAX`.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Subtract `other` from `self`.
    ///
    /// Returns `None` if the result would be negative - there are no partial
    /// debits and no negative balances.
    #[must_use]
    pub const fn checked_sub(self, other: Self) -> Option<Self> {
        if self.0 < other.0 {
            return None;
        }
        Some(Self(self.0 - other.0))
    }
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i32> for Points {
    type Error = PointsError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Points> for i32 {
    fn from(points: Points) -> Self {
        points.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Points {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i32 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i32 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Points {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let v = <i32 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Stored values are kept non-negative by a CHECK constraint
        Ok(Self::new(v)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Points {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i32 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_negative() {
        assert!(matches!(Points::new(-1), Err(PointsError::Negative(-1))));
        assert!(Points::new(0).is_ok());
        assert!(Points::new(1000).is_ok());
    }

    #[test]
    fn test_saturating_add() {
        let a = Points::new(95).unwrap();
        let b = Points::new(10).unwrap();
        assert_eq!(a.saturating_add(b).as_i32(), 105);

        let max = Points::new(i32::MAX).unwrap();
        assert_eq!(max.saturating_add(b).as_i32(), i32::MAX);
    }

    #[test]
    fn test_checked_sub_refuses_overdraft() {
        let balance = Points::new(30).unwrap();
        let cost = Points::new(50).unwrap();
        assert!(balance.checked_sub(cost).is_none());
    }

    #[test]
    fn test_credit_then_debit_is_identity() {
        let start = Points::new(250).unwrap();
        let amount = Points::new(75).unwrap();
        let credited = start.saturating_add(amount);
        let back = credited.checked_sub(amount).unwrap();
        assert_eq!(back, start);
    }

    #[test]
    fn test_debit_to_zero() {
        let balance = Points::new(50).unwrap();
        assert_eq!(
            balance.checked_sub(Points::new(50).unwrap()),
            Some(Points::ZERO)
        );
    }

    #[test]
    fn test_serde_transparent() {
        let p = Points::new(42).unwrap();
        assert_eq!(serde_json::to_string(&p).unwrap(), "42");
        let parsed: Points = serde_json::from_str("42").unwrap();
        assert_eq!(parsed, p);
    }

    #[test]
    fn test_serde_rejects_negative() {
        assert!(serde_json::from_str::<Points>("-5").is_err());
    }
}
