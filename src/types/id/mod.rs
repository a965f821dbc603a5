//! Type-safe snowflake ids.
//!
//! Discord transmits every id as a decimal string in JSON. [`Id`] stores it
//! as a non-zero `u64` tagged with a [marker] so ids of different resources
//! can't be mixed up, and derives the creation time encoded in the upper
//! 42 bits.

pub mod marker;

use chrono::{DateTime, TimeZone, Utc};
use serde::{
    de::{Deserializer, Error as DeError, Visitor},
    Deserialize, Serialize, Serializer,
};
use std::{
    cmp::Ordering,
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    hash::{Hash, Hasher},
    marker::PhantomData,
    num::NonZeroU64,
    str::FromStr,
};

/// Milliseconds between the Unix epoch and the Discord epoch (2015-01-01).
pub const DISCORD_EPOCH_MS: u64 = 1_420_070_400_000;

/// A snowflake id for the resource type `T`.
pub struct Id<T> {
    phantom: PhantomData<fn(T) -> T>,
    value: NonZeroU64,
}

impl<T> Id<T> {
    /// Create an id from a raw value.
    ///
    /// # Panics
    ///
    /// Panics if `n` is 0. Use [`Id::new_checked`] for untrusted values.
    #[track_caller]
    pub const fn new(n: u64) -> Self {
        match NonZeroU64::new(n) {
            Some(value) => Self::from_nonzero(value),
            None => panic!("value is zero"),
        }
    }

    /// Create an id if `n` is non-zero.
    pub const fn new_checked(n: u64) -> Option<Self> {
        match NonZeroU64::new(n) {
            Some(value) => Some(Self::from_nonzero(value)),
            None => None,
        }
    }

    const fn from_nonzero(value: NonZeroU64) -> Self {
        Self {
            phantom: PhantomData,
            value,
        }
    }

    /// Raw value of the id.
    pub const fn get(self) -> u64 {
        self.value.get()
    }

    /// Change the marker type, e.g. to use a context-menu target id as a
    /// user id.
    pub const fn cast<New>(self) -> Id<New> {
        Id::from_nonzero(self.value)
    }

    /// Unix-millisecond timestamp encoded in the snowflake.
    pub const fn timestamp_ms(self) -> u64 {
        (self.value.get() >> 22) + DISCORD_EPOCH_MS
    }

    /// When the resource was created.
    pub fn created_at(self) -> DateTime<Utc> {
        let ms = self.timestamp_ms() as i64;
        Utc.timestamp_millis_opt(ms)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Build a snowflake usable as a `before`/`after` pagination bound.
    ///
    /// The worker, process and increment bits are all zero, or all one when
    /// `high` is set, so the id sorts at the very start (or end) of the
    /// millisecond. Returns `None` for instants before the Discord epoch.
    pub fn from_datetime(dt: DateTime<Utc>, high: bool) -> Option<Self> {
        let ms = u64::try_from(dt.timestamp_millis()).ok()?;
        let since_epoch = ms.checked_sub(DISCORD_EPOCH_MS)?;
        let low = if high { (1 << 22) - 1 } else { 0 };
        Self::new_checked((since_epoch << 22) + low)
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> Debug for Id<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("Id")?;
        let type_name = std::any::type_name::<T>();
        if let Some(position) = type_name.rfind("::") {
            if let Some(slice) = type_name.get(position + 2..) {
                f.write_str("<")?;
                f.write_str(slice)?;
                f.write_str(">")?;
            }
        }
        f.write_str("(")?;
        Debug::fmt(&self.value, f)?;
        f.write_str(")")
    }
}

impl<T> Display for Id<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.value.get(), f)
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> PartialEq<u64> for Id<T> {
    fn eq(&self, other: &u64) -> bool {
        self.value.get() == *other
    }
}

impl<T> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.value.get());
    }
}

impl<T> From<NonZeroU64> for Id<T> {
    fn from(value: NonZeroU64) -> Self {
        Self::from_nonzero(value)
    }
}

impl<T> From<Id<T>> for u64 {
    fn from(id: Id<T>) -> Self {
        id.get()
    }
}

impl<T> FromStr for Id<T> {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NonZeroU64::from_str(s).map(Self::from_nonzero)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor<T> {
            phantom: PhantomData<T>,
        }

        impl<T> Visitor<'_> for IdVisitor<T> {
            type Value = Id<T>;

            fn expecting(&self, f: &mut Formatter<'_>) -> FmtResult {
                f.write_str("a discord snowflake")
            }

            fn visit_u64<E: DeError>(self, value: u64) -> Result<Self::Value, E> {
                Id::new_checked(value).ok_or_else(|| DeError::custom("id is zero"))
            }

            fn visit_i64<E: DeError>(self, value: i64) -> Result<Self::Value, E> {
                let value = u64::try_from(value).map_err(DeError::custom)?;
                self.visit_u64(value)
            }

            fn visit_str<E: DeError>(self, value: &str) -> Result<Self::Value, E> {
                let value = value.parse::<u64>().map_err(DeError::custom)?;
                self.visit_u64(value)
            }
        }

        deserializer.deserialize_any(IdVisitor {
            phantom: PhantomData,
        })
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.value)
    }
}
